use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tritag::{LexiconEntry, Model};

#[derive(Parser, Debug)]
#[command(about = "A program to manipulate trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output the lexicon contained in the model
    #[arg(long)]
    dump_lexicon: Option<PathBuf>,

    /// Replace the lexicon if the argument is specified
    #[arg(long)]
    replace_lexicon: Option<PathBuf>,
}

#[derive(Deserialize, Serialize)]
struct LexiconRecord {
    word: String,
    tag: String,
    capital: bool,
    freq: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(fs::File::open(args.model_in)?)?;
    let mut model = Model::read(&mut f)?;
    println!("{model}");

    if let Some(path) = args.dump_lexicon {
        eprintln!("Saving lexicon file...");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for entry in model.lexicon_entries() {
            wtr.serialize(LexiconRecord {
                word: entry.word,
                tag: entry.tag,
                capital: entry.capital,
                freq: entry.freq,
            })?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.replace_lexicon {
        eprintln!("Loading lexicon file...");
        let file = fs::File::open(path)?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut entries = vec![];
        for result in rdr.deserialize() {
            let record: LexiconRecord = result?;
            entries.push(LexiconEntry {
                word: record.word,
                tag: record.tag,
                capital: record.capital,
                freq: record.freq,
            });
        }
        model.replace_lexicon(entries)?;
        println!("{model}");
    }

    if let Some(path) = args.model_out {
        eprintln!("Saving model file...");
        let mut f = zstd::Encoder::new(fs::File::create(path)?, 19)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
