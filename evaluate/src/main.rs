use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use log::info;
use tritag::{
    Model, Sentence, Substitution, SuffixModelConfig, Tagger, TaggerConfig, Trainer,
    UnknownWordStrategy,
};

#[derive(Parser, Debug)]
#[command(
    about = "A program to evaluate the accuracy of Tritag.",
    group = ArgGroup::new("mode").required(true),
)]
struct Args {
    /// A tagged corpus: one sentence per line, tokens written as `form/tag`
    #[arg(long)]
    corpus: PathBuf,

    /// The model file to evaluate on the whole corpus
    #[arg(long, group = "mode")]
    model: Option<PathBuf>,

    /// The number of cross-validation folds; sentence i belongs to fold i mod K
    #[arg(long, group = "mode")]
    n_folds: Option<usize>,

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
}

/// Counts of correctly and incorrectly tagged tokens, split by lexicon membership.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Evaluator {
    known_correct: usize,
    known_incorrect: usize,
    unknown_correct: usize,
    unknown_incorrect: usize,
}

impl Evaluator {
    fn process(
        &mut self,
        tagger: &Tagger,
        model: &Model,
        sentence: &Sentence,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let gold = sentence.tags().ok_or("the sentence has no tags")?;
        let (tags, _) = tagger.tag(sentence.forms())?;
        for ((form, gold), tag) in sentence.forms().iter().zip(gold).zip(tags) {
            let known = model.word_tag_freqs().contains_key(form);
            match (known, *gold == tag) {
                (true, true) => self.known_correct += 1,
                (true, false) => self.known_incorrect += 1,
                (false, true) => self.unknown_correct += 1,
                (false, false) => self.unknown_incorrect += 1,
            }
        }
        Ok(())
    }

    fn merge(&mut self, other: &Self) {
        self.known_correct += other.known_correct;
        self.known_incorrect += other.known_incorrect;
        self.unknown_correct += other.unknown_correct;
        self.unknown_incorrect += other.unknown_incorrect;
    }

    fn known_accuracy(&self) -> f64 {
        ratio(self.known_correct, self.known_correct + self.known_incorrect)
    }

    fn unknown_accuracy(&self) -> f64 {
        ratio(self.unknown_correct, self.unknown_correct + self.unknown_incorrect)
    }

    fn accuracy(&self) -> f64 {
        let correct = self.known_correct + self.unknown_correct;
        ratio(
            correct,
            correct + self.known_incorrect + self.unknown_incorrect,
        )
    }

    fn summary(&self) -> String {
        format!(
            "{:.6} (known: {:.6}, unknown: {:.6})",
            self.accuracy(),
            self.known_accuracy(),
            self.unknown_accuracy()
        )
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        f64::NAN
    } else {
        n as f64 / d as f64
    }
}

/// Returns the indices of the training sentences and of the test sentences of `fold`.
fn split_folds(n_sentences: usize, n_folds: usize, fold: usize) -> (Vec<usize>, Vec<usize>) {
    (0..n_sentences).partition(|i| i % n_folds != fold)
}

fn evaluate(
    tagger: &Tagger,
    model: &Model,
    sentences: &[Sentence],
    indices: impl Iterator<Item = usize>,
) -> Result<Evaluator, Box<dyn std::error::Error>> {
    let mut evaluator = Evaluator::default();
    for (n, i) in indices.enumerate() {
        if n % 1000 == 0 {
            eprint!("# of tagged sentences: {n}\r");
            stderr().flush()?;
        }
        evaluator.process(tagger, model, &sentences[i])?;
    }
    Ok(evaluator)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let substitutions = match &args.substitutions {
        Some(path) => Substitution::read_rules(BufReader::new(File::open(path)?))?,
        None => vec![],
    };
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

    eprintln!("Loading corpus...");
    let mut sentences = vec![];
    for line in BufReader::new(File::open(&args.corpus)?).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        sentences.push(Sentence::from_tagged(&line)?);
    }
    eprintln!("# of sentences: {}", sentences.len());

    if let Some(path) = args.model {
        eprintln!("Loading model file...");
        let mut f = zstd::Decoder::new(File::open(path)?)?;
        let model = Model::read(&mut f)?;
        info!("model: {model}");
        let tagger = Tagger::from_config(&model, config)?;

        let evaluator = evaluate(&tagger, &model, &sentences, 0..sentences.len())?;
        println!("Accuracy: {}", evaluator.summary());
        return Ok(());
    }

    let n_folds = args.n_folds.unwrap_or_default();
    if n_folds < 2 {
        return Err("data should be split in at least 2 folds".into());
    }

    let mut total = Evaluator::default();
    for fold in 0..n_folds {
        let (train, test) = split_folds(sentences.len(), n_folds, fold);
        let mut trainer = Trainer::new();
        for &i in &train {
            trainer.push_sentence(&sentences[i])?;
        }
        let model = trainer.train();
        info!("fold {fold} model: {model}");
        let tagger = Tagger::from_config(&model, config.clone())?;

        let evaluator = evaluate(&tagger, &model, &sentences, test.into_iter())?;
        println!("Fold {fold} accuracy: {}", evaluator.summary());
        total.merge(&evaluator);
    }
    println!("Overall accuracy: {}", total.summary());

    Ok(())
}
