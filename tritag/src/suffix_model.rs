use std::borrow::Cow;
use std::sync::LazyLock;

use hashbrown::HashMap;
use log::{debug, info};
use regex::Regex;

use crate::emission::TagProbs;
use crate::errors::{Result, TritagError};
use crate::model::Model;
use crate::ngram::{starts_with_uppercase, Tag, END_TOKEN, START_TOKEN};
use crate::suffix_tree::{reversed_suffix, SuffixTree};

// Only the first alternative is anchored at the start and only the last one at the end.
static CARDINAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)|([0-9]+\.)|([0-9.,:-]+[0-9]+)|([0-9]+[a-zA-Z]{1,3})$").unwrap()
});

/// Configuration of the suffix model.
///
/// The defaults work reasonably well on German and English corpora of 50,000 to 100,000
/// sentences. Unknown words behave like low-frequency words, so only words whose training
/// frequency is at most the cutoff of their shape contribute to the suffix statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixModelConfig {
    /// Maximum suffix length in characters.
    pub max_suffix_len: usize,

    /// Frequency cutoff of words starting with an uppercase letter.
    pub upper_max_freq: usize,

    /// Frequency cutoff of other words.
    pub lower_max_freq: usize,

    /// Frequency cutoff of words containing a hyphen.
    pub dash_max_freq: usize,

    /// Frequency cutoff of cardinals.
    pub cardinal_max_freq: usize,

    /// Number of tags returned for a word.
    pub max_tags: usize,
}

impl Default for SuffixModelConfig {
    fn default() -> Self {
        Self {
            max_suffix_len: 2,
            upper_max_freq: 2,
            lower_max_freq: 8,
            dash_max_freq: 4,
            cardinal_max_freq: 10,
            max_tags: 10,
        }
    }
}

/// Shape class of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordShape {
    /// Starts with an uppercase letter.
    Upper = 0,

    /// Looks like a number.
    Cardinal = 1,

    /// Contains a hyphen.
    Dash = 2,

    /// Anything else.
    Lower = 3,
}

impl WordShape {
    /// Classifies a word. The classes are checked in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::WordShape;
    ///
    /// assert_eq!(WordShape::Upper, WordShape::of("Berlin-Mitte"));
    /// assert_eq!(WordShape::Cardinal, WordShape::of("1990"));
    /// assert_eq!(WordShape::Dash, WordShape::of("well-known"));
    /// assert_eq!(WordShape::Lower, WordShape::of("known"));
    /// ```
    pub fn of(word: &str) -> Self {
        if starts_with_uppercase(word) {
            Self::Upper
        } else if CARDINAL_PATTERN.is_match(word) {
            Self::Cardinal
        } else if word.contains('-') {
            Self::Dash
        } else {
            Self::Lower
        }
    }

    fn max_freq(self, config: &SuffixModelConfig) -> usize {
        match self {
            Self::Upper => config.upper_max_freq,
            Self::Cardinal => config.cardinal_max_freq,
            Self::Dash => config.dash_max_freq,
            Self::Lower => config.lower_max_freq,
        }
    }
}

/// Emission estimator for unknown words based on suffix statistics (Brants, 2000).
#[derive(Debug, Clone)]
pub struct SuffixModel {
    trees: [SuffixTree; 4],
    unigram_freqs: HashMap<Tag, usize>,
    theta: f64,
    max_tags: usize,
}

impl SuffixModel {
    /// Creates a new suffix model.
    ///
    /// # Arguments
    ///
    /// * `config` - Suffix model configuration.
    /// * `model` - A model with word and unigram frequencies.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `config.max_tags` is 0.
    /// * the model has fewer than two unigrams.
    pub fn new(config: SuffixModelConfig, model: &Model) -> Result<Self> {
        if config.max_tags == 0 {
            return Err(TritagError::invalid_argument(
                "config",
                "max_tags must be at least 1",
            ));
        }
        let markers: Vec<u32> = [START_TOKEN, END_TOKEN]
            .iter()
            .filter_map(|marker| model.tag_numberer.get(marker))
            .collect();

        let theta = calculate_theta(model, &markers)?;
        info!("suffix model theta: {theta:.6}");

        let unigram_freqs: HashMap<Tag, usize> = model
            .unigram_freqs
            .iter()
            .filter(|(unigram, _)| !markers.contains(&unigram.0.id))
            .map(|(unigram, &freq)| (unigram.0, freq))
            .collect();

        let mut trees = [(); 4].map(|_| SuffixTree::new(&unigram_freqs, config.max_suffix_len));
        for (word, tag_freqs) in &model.word_tag_freqs {
            if word.is_empty() || word == START_TOKEN || word == END_TOKEN {
                continue;
            }
            let word_freq: usize = tag_freqs.values().sum();
            let shape = WordShape::of(word);
            if word_freq <= shape.max_freq(&config) {
                trees[shape as usize].add_word(word, tag_freqs);
            }
        }

        Ok(Self {
            trees,
            unigram_freqs,
            theta,
            max_tags: config.max_tags,
        })
    }

    /// Returns the smoothing weight θ.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Estimates log-scores of the best tags of `word`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::{Sentence, SuffixModel, SuffixModelConfig, Trainer};
    ///
    /// let mut trainer = Trainer::new();
    /// for line in ["the/DT dog/NN walks/VBZ", "a/DT cat/NN talks/VBZ"] {
    ///     trainer.push_sentence(&Sentence::from_tagged(line).unwrap()).unwrap();
    /// }
    /// let model = trainer.train();
    /// let suffix_model = SuffixModel::new(SuffixModelConfig::default(), &model).unwrap();
    ///
    /// let probs = suffix_model.tag_probs("balks");
    /// let best = probs.iter().max_by(|a, b| a.1.total_cmp(b.1)).unwrap().0;
    /// assert_eq!("VBZ", model.tag_numberer().label(best.id).unwrap());
    /// ```
    pub fn tag_probs(&self, word: &str) -> TagProbs {
        let tree = &self.trees[WordShape::of(word) as usize];
        let mut probs = tree.suffix_tag_probs(word, self.theta);
        self.bayesian_inversion(&mut probs);
        best_n_log_space(probs, self.max_tags)
    }

    fn bayesian_inversion(&self, probs: &mut TagProbs) {
        for (tag, prob) in probs.iter_mut() {
            let freq = self.unigram_freqs.get(tag).copied().unwrap_or(0);
            *prob /= freq as f64;
        }
    }

    /// Precomputes the probabilities of every suffix in the trees.
    pub fn lookup(self) -> SuffixLookupModel {
        let max_len = self.trees[0].max_len();
        let tables = [0, 1, 2, 3].map(|i| {
            let mut table = HashMap::new();
            self.trees[i].for_each_suffix(self.theta, |suffix, probs| {
                let mut probs = probs.clone();
                self.bayesian_inversion(&mut probs);
                table.insert(suffix.to_string(), best_n_log_space(probs, self.max_tags));
            });
            table
        });
        debug!(
            "suffix lookup tables: upper = {}, cardinal = {}, dash = {}, lower = {}",
            tables[0].len(),
            tables[1].len(),
            tables[2].len(),
            tables[3].len(),
        );
        SuffixLookupModel { tables, max_len }
    }
}

/// Suffix model whose probabilities are precomputed for every suffix seen in training.
#[derive(Debug, Clone)]
pub struct SuffixLookupModel {
    tables: [HashMap<String, TagProbs>; 4],
    max_len: usize,
}

impl SuffixLookupModel {
    /// Returns the probabilities of the longest stored suffix of `word`.
    pub fn tag_probs(&self, word: &str) -> Cow<'_, TagProbs> {
        let table = &self.tables[WordShape::of(word) as usize];
        let mut rev = reversed_suffix(word, self.max_len);
        let mut key = String::with_capacity(rev.len() * 4);
        loop {
            key.clear();
            key.extend(rev.iter());
            if let Some(probs) = table.get(&key) {
                return Cow::Borrowed(probs);
            }
            if rev.pop().is_none() {
                return Cow::Owned(TagProbs::new());
            }
        }
    }
}

fn calculate_theta(model: &Model, markers: &[u32]) -> Result<f64> {
    let n_unigrams = model.unigram_freqs.len();
    if n_unigrams < 2 {
        return Err(TritagError::invalid_model(
            "the model needs at least two unigrams",
        ));
    }
    let p_avg = 1. / n_unigrams as f64;

    let tag_freqs = || {
        model
            .unigram_freqs
            .iter()
            .filter(|(unigram, _)| !markers.contains(&unigram.0.id))
            .map(|(_, &freq)| freq)
    };
    let freq_sum: usize = tag_freqs().sum();
    let stddev_sum: f64 = tag_freqs()
        .map(|freq| {
            let p = freq as f64 / freq_sum as f64;
            (p - p_avg).powi(2)
        })
        .sum();

    Ok((stddev_sum / (n_unigrams - 1) as f64).sqrt())
}

/// Keeps the `n` best tags, ordered by score and then by tag, and takes the logarithm.
fn best_n_log_space(probs: TagProbs, n: usize) -> TagProbs {
    let mut sorted: Vec<(Tag, f64)> = probs.into_iter().collect();
    sorted.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    sorted.truncate(n);
    sorted.into_iter().map(|(tag, p)| (tag, p.ln())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::utils::tests::train_model;

    fn corpus() -> Model {
        train_model(&[
            "The/DT dog/NN walks/VBZ quickly/RB ./.",
            "A/DT cat/NN talks/VBZ loudly/RB ./.",
            "Dogs/NNS barked/VBD 3/CD times/NNS ./.",
            "The/DT well-known/JJ cats/NNS sleep/VBP ./.",
            "Mary/NNP jumped/VBD 12.5/CD meters/NNS ./.",
            "A/DT kid/NN walked/VBD home/NN ./.",
        ])
    }

    #[test]
    fn test_word_shape_priority() {
        assert_eq!(WordShape::Upper, WordShape::of("Über"));
        assert_eq!(WordShape::Cardinal, WordShape::of("12.5"));
        assert_eq!(WordShape::Cardinal, WordShape::of("3rd"));
        assert_eq!(WordShape::Cardinal, WordShape::of("1990-1995"));
        assert_eq!(WordShape::Dash, WordShape::of("-lrb-"));
        assert_eq!(WordShape::Lower, WordShape::of(""));
        assert_eq!(WordShape::Lower, WordShape::of("ändern"));
    }

    #[test]
    fn test_cardinal_pattern_anchors() {
        // The first alternative matches any word starting with a digit.
        assert_eq!(WordShape::Cardinal, WordShape::of("1st-rate"));
        assert_eq!(WordShape::Cardinal, WordShape::of("abc1,5"));
        assert_eq!(WordShape::Dash, WordShape::of("x-ray"));
    }

    #[test]
    fn test_theta() {
        let model = corpus();
        let suffix_model = SuffixModel::new(SuffixModelConfig::default(), &model).unwrap();

        let markers = [0, 1];
        let n = model.unigram_freqs().len() as f64;
        let freq_sum: usize = model
            .unigram_freqs()
            .iter()
            .filter(|(u, _)| !markers.contains(&u.0.id))
            .map(|(_, f)| f)
            .sum();
        let expected = (model
            .unigram_freqs()
            .iter()
            .filter(|(u, _)| !markers.contains(&u.0.id))
            .map(|(_, &f)| (f as f64 / freq_sum as f64 - 1. / n).powi(2))
            .sum::<f64>()
            / (n - 1.))
            .sqrt();
        assert!((expected - suffix_model.theta()).abs() < 1e-12);
    }

    #[test]
    fn test_shared_suffix_same_distribution() {
        let model = corpus();
        let suffix_model = SuffixModel::new(SuffixModelConfig::default(), &model).unwrap();

        assert_eq!(
            suffix_model.tag_probs("stalks"),
            suffix_model.tag_probs("balks")
        );
        assert_eq!(
            suffix_model.tag_probs("shouted"),
            suffix_model.tag_probs("rented")
        );
    }

    #[test]
    fn test_max_tags() {
        let model = corpus();
        let config = SuffixModelConfig {
            max_tags: 3,
            ..SuffixModelConfig::default()
        };
        let suffix_model = SuffixModel::new(config, &model).unwrap();

        let probs = suffix_model.tag_probs("zorks");
        assert_eq!(3, probs.len());
        assert!(probs.values().all(|p| p.is_finite()));
    }

    #[test]
    fn test_tag_probs_values() {
        // Suffix tree: root {X: 1 + 1, Y: 2 + 2}, "b" {X: 1, Y: 2}, "ab" {X: 1}, "cb" {Y: 2}.
        let model = train_model(&["ab/X", "cb/Y", "cb/Y"]);
        let x = Tag::new(model.tag_numberer().get("X").unwrap(), false);
        let y = Tag::new(model.tag_numberer().get("Y").unwrap(), false);
        let suffix_model = SuffixModel::new(SuffixModelConfig::default(), &model).unwrap();
        let theta = suffix_model.theta();
        let back_off = |rel_freqs: &[f64]| {
            rel_freqs
                .iter()
                .fold(0., |p, &rel| (rel + theta * p) / (theta + 1.))
        };

        // Word frequencies: X = 1, Y = 2.
        let expected_x = (back_off(&[2. / 6., 1. / 3., 1.]) / 1.).ln();
        let expected_y = (back_off(&[4. / 6., 2. / 3., 0.]) / 2.).ln();

        let probs = suffix_model.tag_probs("zab");
        assert_eq!(2, probs.len());
        assert!((expected_x - probs[&x]).abs() < 1e-12);
        assert!((expected_y - probs[&y]).abs() < 1e-12);

        let config = SuffixModelConfig {
            max_tags: 1,
            ..SuffixModelConfig::default()
        };
        let suffix_model = SuffixModel::new(config, &model).unwrap();
        let probs = suffix_model.tag_probs("zab");
        assert_eq!(1, probs.len());
        assert!((expected_x - probs[&x]).abs() < 1e-12);
    }

    #[test]
    fn test_best_n_ties_by_tag() {
        let probs: TagProbs = [
            (Tag::new(4, false), 0.5),
            (Tag::new(2, false), 0.5),
            (Tag::new(3, false), 0.25),
        ]
        .into_iter()
        .collect();

        let best = best_n_log_space(probs, 1);
        assert_eq!(1, best.len());
        assert!(best.contains_key(&Tag::new(2, false)));
    }

    #[test]
    fn test_lookup_equals_tree() {
        let model = corpus();
        let suffix_model = SuffixModel::new(SuffixModelConfig::default(), &model).unwrap();
        let lookup = suffix_model.clone().lookup();

        for word in model.word_tag_freqs().keys() {
            if word == START_TOKEN || word == END_TOKEN {
                continue;
            }
            assert_eq!(
                suffix_model.tag_probs(word),
                *lookup.tag_probs(word),
                "{word}"
            );
        }
    }

    #[test]
    fn test_lookup_shortens_suffix() {
        let model = corpus();
        let suffix_model = SuffixModel::new(SuffixModelConfig::default(), &model).unwrap();
        let lookup = suffix_model.clone().lookup();

        // "xs" is not a stored suffix, but "s" is.
        assert_eq!(
            suffix_model.tag_probs("xs"),
            *lookup.tag_probs("xs")
        );
        assert_eq!(
            suffix_model.tag_probs("qqq"),
            *lookup.tag_probs("qqq")
        );
    }

    #[test]
    fn test_zero_max_tags() {
        let model = corpus();
        let config = SuffixModelConfig {
            max_tags: 0,
            ..SuffixModelConfig::default()
        };

        assert!(SuffixModel::new(config, &model).is_err());
    }
}
