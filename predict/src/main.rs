use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::info;
use tritag::{
    Model, Sentence, Substitution, SuffixModelConfig, Tagger, TaggerConfig, UnknownWordStrategy,
};

#[derive(Parser, Debug)]
#[command(about = "A program to perform part-of-speech tagging.")]
struct Args {
    /// The model file to use when tagging text
    #[arg(long)]
    model: PathBuf,

    /// The estimator for unknown words: {tree, lookup}
    #[arg(long, default_value = "lookup")]
    unknown_words: UnknownWordStrategy,

    /// Paths less probable than the best one by this factor are pruned
    #[arg(long, default_value = "1000")]
    beam_factor: f64,

    /// A file of substitution rules (`pattern<TAB>replacement`) for unknown words
    #[arg(long)]
    substitutions: Option<PathBuf>,

    /// The maximum suffix length used for unknown words
    #[arg(long, default_value = "2")]
    max_suffix_len: usize,

    /// The maximum number of tags considered for an unknown word
    #[arg(long, default_value = "10")]
    max_tags: usize,

    /// Number of threads (0 tags on the main thread)
    #[arg(long, default_value = "0")]
    n_threads: usize,

    /// Number of sentences sent to the threads at once
    #[arg(long, default_value = "256")]
    chunk_size: usize,

    /// Append the log-probability of each sentence after a tab
    #[arg(long)]
    print_score: bool,
}

fn print_sentence<W>(out: &mut W, s: &Sentence, score: f64, print_score: bool) -> std::io::Result<()>
where
    W: Write,
{
    let tagged = s
        .to_tagged_string()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    if print_score {
        writeln!(out, "{tagged}\t{score}")
    } else {
        writeln!(out, "{tagged}")
    }
}

/// Sets the tags of the non-empty lines of a chunk, in order. Empty lines stay `None`.
fn attach_results(
    chunk: Vec<Option<Sentence>>,
    results: Vec<(Vec<String>, f64)>,
) -> Result<Vec<Option<(Sentence, f64)>>, Box<dyn std::error::Error>> {
    let n_sentences = chunk.iter().flatten().count();
    if n_sentences != results.len() {
        return Err(format!(
            "expected {} tagged sentences, but got {}",
            n_sentences,
            results.len()
        )
        .into());
    }
    let mut results = results.into_iter();
    let mut tagged = Vec::with_capacity(chunk.len());
    for s in chunk {
        let Some(mut s) = s else {
            tagged.push(None);
            continue;
        };
        let (tags, score) = results.next().ok_or("a tagged sentence is missing")?;
        s.set_tags(tags)?;
        tagged.push(Some((s, score)));
    }
    Ok(tagged)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let substitutions = match &args.substitutions {
        Some(path) => Substitution::read_rules(BufReader::new(File::open(path)?))?,
        None => vec![],
    };
    info!("{} substitution rules", substitutions.len());
    let config = TaggerConfig {
        beam_factor: args.beam_factor,
        unknown_words: args.unknown_words,
        suffix: SuffixModelConfig {
            max_suffix_len: args.max_suffix_len,
            max_tags: args.max_tags,
            ..SuffixModelConfig::default()
        },
        substitutions,
    };

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    info!("model: {model}");
    let tagger = Tagger::from_config(&model, config)?;

    eprintln!("Start tagging");
    let mut out = BufWriter::new(stdout().lock());
    let mut n_tokens = 0;
    let start = Instant::now();
    if args.n_threads == 0 {
        for line in stdin().lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                writeln!(out)?;
                continue;
            }
            let mut s = Sentence::from_tokenized(&line)?;
            let score = tagger.tag_sentence(&mut s)?;
            n_tokens += s.len();
            print_sentence(&mut out, &s, score, args.print_score)?;
        }
    } else {
        let tagger = tagger.multithreading(args.n_threads);
        let mut lines = stdin().lock().lines().peekable();
        while lines.peek().is_some() {
            let mut chunk = vec![];
            for line in lines.by_ref().take(args.chunk_size.max(1)) {
                let line = line?;
                if line.trim().is_empty() {
                    chunk.push(None);
                } else {
                    chunk.push(Some(Sentence::from_tokenized(&line)?));
                }
            }
            let batch = chunk
                .iter()
                .flatten()
                .map(|s| s.forms().to_vec())
                .collect();
            let results = tagger.tag_batch(batch)?;
            for s in attach_results(chunk, results)? {
                let Some((s, score)) = s else {
                    writeln!(out)?;
                    continue;
                };
                n_tokens += s.len();
                print_sentence(&mut out, &s, score, args.print_score)?;
            }
        }
    }
    out.flush()?;
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [tokens/sec]",
        n_tokens as f64 / duration.as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_results() {
        let chunk = vec![
            Some(Sentence::from_tokenized("dogs bark").unwrap()),
            None,
            Some(Sentence::from_tokenized("cats").unwrap()),
        ];
        let results = vec![
            (vec!["NNS".to_string(), "VBP".to_string()], -1.5),
            (vec!["NNS".to_string()], -0.5),
        ];

        let tagged = attach_results(chunk, results).unwrap();
        assert_eq!(3, tagged.len());
        let (s, score) = tagged[0].as_ref().unwrap();
        assert_eq!("dogs/NNS bark/VBP", s.to_tagged_string().unwrap());
        assert_eq!(-1.5, *score);
        assert!(tagged[1].is_none());
        let (s, score) = tagged[2].as_ref().unwrap();
        assert_eq!("cats/NNS", s.to_tagged_string().unwrap());
        assert_eq!(-0.5, *score);
    }

    #[test]
    fn test_attach_missing_results() {
        let chunk = vec![
            Some(Sentence::from_tokenized("dogs bark").unwrap()),
            Some(Sentence::from_tokenized("cats").unwrap()),
        ];
        let results = vec![(vec!["NNS".to_string(), "VBP".to_string()], -1.5)];

        let result = attach_results(chunk, results);
        assert_eq!(
            "expected 2 tagged sentences, but got 1",
            result.err().unwrap().to_string()
        );
    }
}
