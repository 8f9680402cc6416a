#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Tritag
//!
//! Tritag is a trigram hidden Markov model part-of-speech tagger.
//!
//! Transition probabilities are smoothed by deleted interpolation, and words missing from the
//! lexicon are handled by suffix statistics (Brants, 2000).
//!
//! ## Examples
//!
//! ```
//! use tritag::{Model, Sentence, Tagger, TaggerConfig, Trainer};
//!
//! let mut trainer = Trainer::new();
//! for line in ["The/DT dog/NN barks/VBZ", "A/DT cat/NN sleeps/VBZ"] {
//!     trainer.push_sentence(&Sentence::from_tagged(line).unwrap()).unwrap();
//! }
//! let model = trainer.train();
//!
//! let mut buf = vec![];
//! model.write(&mut buf).unwrap();
//! let model = Model::read(&mut buf.as_slice()).unwrap();
//!
//! let tagger = Tagger::from_config(&model, TaggerConfig::default()).unwrap();
//! let mut s = Sentence::from_tokenized("The cat barks").unwrap();
//! tagger.tag_sentence(&mut s).unwrap();
//! assert_eq!("The/DT cat/NN barks/VBZ", s.to_tagged_string().unwrap());
//! ```
//!
//! Tagging on several threads requires **crate feature** `multithreading`. For more details,
//! see `MultithreadTagger`.

#[cfg(test)]
mod utils;

mod config;
mod emission;
mod lexicon;
mod model;
mod ngram;
mod numberer;
mod sentence;
mod suffix_model;
mod suffix_tree;
mod tagger;
mod trainer;
mod trigram_model;

pub mod errors;

pub use config::{TaggerConfig, UnknownWordStrategy};
pub use emission::{EmissionModel, TagProbs};
pub use lexicon::{Lexicon, Substitution};
pub use model::{LexiconEntry, Model};
pub use ngram::{Bigram, Tag, Trigram, Unigram, END_TOKEN, START_TOKEN};
pub use numberer::TagNumberer;
pub use sentence::Sentence;
pub use suffix_model::{SuffixLookupModel, SuffixModel, SuffixModelConfig, WordShape};
pub use tagger::Tagger;
pub use trainer::Trainer;
pub use trigram_model::{LinearInterpolationModel, SmoothingParameters, TransitionModel};

#[cfg(feature = "multithreading")]
pub use tagger::MultithreadTagger;
