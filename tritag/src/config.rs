use core::fmt;
use core::str::FromStr;

use crate::errors::TritagError;
use crate::lexicon::Substitution;
use crate::suffix_model::SuffixModelConfig;

/// Estimator used for words missing from the lexicon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownWordStrategy {
    /// Walks the suffix tree for every unknown word.
    Tree,

    /// Looks up precomputed suffix probabilities.
    #[default]
    Lookup,
}

impl FromStr for UnknownWordStrategy {
    type Err = TritagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(Self::Tree),
            "lookup" => Ok(Self::Lookup),
            _ => Err(TritagError::invalid_argument(
                "unknown_words",
                format!("unknown strategy `{s}`, expected `tree` or `lookup`"),
            )),
        }
    }
}

impl fmt::Display for UnknownWordStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Lookup => write!(f, "lookup"),
        }
    }
}

/// Configuration of a [`Tagger`](crate::Tagger) built by
/// [`Tagger::from_config()`](crate::Tagger::from_config).
#[derive(Debug, Clone)]
pub struct TaggerConfig {
    /// Paths less probable than the best one by this factor are pruned. Must be at least 1;
    /// `f64::INFINITY` disables pruning.
    pub beam_factor: f64,

    pub unknown_words: UnknownWordStrategy,

    pub suffix: SuffixModelConfig,

    /// Rules applied to unknown words before falling back to the suffix model.
    pub substitutions: Vec<Substitution>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            beam_factor: 1000.,
            unknown_words: UnknownWordStrategy::default(),
            suffix: SuffixModelConfig::default(),
            substitutions: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_word_strategy_from_str() {
        assert_eq!(UnknownWordStrategy::Tree, "tree".parse().unwrap());
        assert_eq!(UnknownWordStrategy::Lookup, "lookup".parse().unwrap());
        assert_eq!(
            "InvalidArgumentError: unknown_words: unknown strategy `Tree`, expected `tree` or `lookup`",
            &"Tree".parse::<UnknownWordStrategy>().err().unwrap().to_string()
        );
    }

    #[test]
    fn test_default_config() {
        let config = TaggerConfig::default();

        assert_eq!(1000., config.beam_factor);
        assert_eq!(UnknownWordStrategy::Lookup, config.unknown_words);
        assert_eq!(2, config.suffix.max_suffix_len);
        assert!(config.substitutions.is_empty());
    }
}
