use std::borrow::Cow;

use hashbrown::HashMap;

use crate::lexicon::Lexicon;
use crate::ngram::Tag;
use crate::suffix_model::{SuffixLookupModel, SuffixModel};

/// Log-probabilities of candidate tags.
pub type TagProbs = HashMap<Tag, f64>;

/// Emission probability estimator.
#[derive(Debug, Clone)]
pub enum EmissionModel {
    /// Probabilities of known words, optionally backed by another estimator.
    Lexicon(Lexicon),

    /// Suffix statistics computed on each query.
    Suffix(SuffixModel),

    /// Precomputed suffix statistics.
    SuffixLookup(SuffixLookupModel),
}

impl EmissionModel {
    /// Returns the log-probabilities of the candidate tags of `word`.
    ///
    /// The result is empty only if a lexicon without fallback does not know the word.
    pub fn tag_probs(&self, word: &str) -> Cow<'_, TagProbs> {
        match self {
            Self::Lexicon(lexicon) => lexicon.tag_probs(word),
            Self::Suffix(suffix) => Cow::Owned(suffix.tag_probs(word)),
            Self::SuffixLookup(lookup) => lookup.tag_probs(word),
        }
    }
}

impl From<Lexicon> for EmissionModel {
    fn from(lexicon: Lexicon) -> Self {
        Self::Lexicon(lexicon)
    }
}

impl From<SuffixModel> for EmissionModel {
    fn from(suffix: SuffixModel) -> Self {
        Self::Suffix(suffix)
    }
}

impl From<SuffixLookupModel> for EmissionModel {
    fn from(lookup: SuffixLookupModel) -> Self {
        Self::SuffixLookup(lookup)
    }
}
