use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::PathBuf;

use clap::Parser;
use log::info;
use tritag::{Sentence, Trainer};

#[derive(Parser, Debug)]
#[command(about = "A program to train models of Tritag.")]
struct Args {
    /// A tagged training corpus: one sentence per line, tokens written as `form/tag`
    #[arg(long, required = true)]
    tagged: Vec<PathBuf>,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// The zstd compression level of the model file
    #[arg(long, default_value = "19")]
    zstd_level: i32,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut trainer = Trainer::new();
    for path in args.tagged {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        for line in f.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if trainer.n_sentences() % 10000 == 0 {
                eprint!("# of sentences: {}\r", trainer.n_sentences());
                stderr().flush()?;
            }
            let s = Sentence::from_tagged(&line)?;
            trainer.push_sentence(&s)?;
        }
        eprintln!("# of sentences: {}", trainer.n_sentences());
    }

    let model = trainer.train();
    info!("model: {model}");

    eprintln!("Saving model file...");
    let mut f = zstd::Encoder::new(File::create(args.model)?, args.zstd_level)?;
    f.multithread(args.zstd_workers)?;
    model.write(&mut f)?;
    f.finish()?;

    Ok(())
}
