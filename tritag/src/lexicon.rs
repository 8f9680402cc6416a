use std::borrow::Cow;
use std::io::BufRead;

use hashbrown::HashMap;
use regex::Regex;

use crate::emission::{EmissionModel, TagProbs};
use crate::errors::{Result, TritagError};
use crate::model::Model;
use crate::ngram::{starts_with_uppercase, Unigram};

/// Rewriting rule applied to words missing from the lexicon.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub pattern: Regex,
    pub replacement: String,
}

impl Substitution {
    /// Creates a new substitution rule.
    ///
    /// # Errors
    ///
    /// If `pattern` is not a valid regular expression, an error variant will be returned.
    pub fn new<S>(pattern: &str, replacement: S) -> Result<Self>
    where
        S: Into<String>,
    {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Reads substitution rules, one `pattern<TAB>replacement` pair per line.
    ///
    /// Blank lines are skipped. Replacements may refer to capture groups with `$1`.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `rdr` generates an error.
    /// * a line does not consist of exactly two tab-separated fields.
    /// * a pattern is not a valid regular expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::Substitution;
    ///
    /// let rules = "[0-9]\t0\n\n^-+$\t-\n";
    /// let substitutions = Substitution::read_rules(rules.as_bytes()).unwrap();
    ///
    /// assert_eq!(2, substitutions.len());
    ///
    /// let word = substitutions.iter().fold("1-2".to_string(), |w, s| {
    ///     s.pattern.replace_all(&w, s.replacement.as_str()).into_owned()
    /// });
    /// assert_eq!("0-0", word);
    /// ```
    pub fn read_rules<R>(rdr: R) -> Result<Vec<Self>>
    where
        R: BufRead,
    {
        let mut substitutions = vec![];
        for line in rdr.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(pattern), Some(replacement), None) => {
                    substitutions.push(Self::new(pattern, replacement)?);
                }
                _ => {
                    return Err(TritagError::invalid_argument(
                        "rdr",
                        format!("incorrect substitution: {line}"),
                    ));
                }
            }
        }
        Ok(substitutions)
    }
}

/// Emission estimator for words seen in the training data.
///
/// The probability of a word given a tag is `f(w, t) / f(t)`.
#[derive(Debug, Clone)]
pub struct Lexicon {
    word_tag_probs: HashMap<String, TagProbs>,
    substitutions: Vec<Substitution>,
    fallback: Option<Box<EmissionModel>>,
}

impl Lexicon {
    /// Creates a lexicon without substitutions and without fallback.
    pub fn new(model: &Model) -> Self {
        let word_tag_probs = model
            .word_tag_freqs
            .iter()
            .map(|(word, tag_freqs)| {
                let probs = tag_freqs
                    .iter()
                    .map(|(&tag, &freq)| {
                        let tag_freq = model.unigram_freqs.get(&Unigram(tag)).copied().unwrap_or(0);
                        (tag, (freq as f64 / tag_freq as f64).ln())
                    })
                    .collect();
                (word.clone(), probs)
            })
            .collect();
        Self {
            word_tag_probs,
            substitutions: vec![],
            fallback: None,
        }
    }

    /// Sets the estimator used for words that are not in the lexicon.
    pub fn with_fallback<E>(mut self, fallback: E) -> Self
    where
        E: Into<EmissionModel>,
    {
        self.fallback = Some(Box::new(fallback.into()));
        self
    }

    /// Sets the rules applied to words that are not in the lexicon before a second lookup.
    pub fn with_substitutions(mut self, substitutions: Vec<Substitution>) -> Self {
        self.substitutions = substitutions;
        self
    }

    /// Checks whether `word`, or its lowercased form if it is capitalized, is in the lexicon.
    pub fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    fn lookup(&self, word: &str) -> Option<&TagProbs> {
        self.word_tag_probs.get(word).or_else(|| {
            if starts_with_uppercase(word) {
                self.word_tag_probs.get(&word.to_lowercase())
            } else {
                None
            }
        })
    }

    /// Returns the log-probabilities of the tags `word` was seen with.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::{Lexicon, Sentence, Trainer};
    ///
    /// let mut trainer = Trainer::new();
    /// trainer.push_sentence(&Sentence::from_tagged("the/DT dog/NN").unwrap()).unwrap();
    /// let model = trainer.train();
    /// let lexicon = Lexicon::new(&model);
    ///
    /// assert_eq!(1, lexicon.tag_probs("The").len());
    /// assert!(lexicon.tag_probs("cat").is_empty());
    /// ```
    pub fn tag_probs(&self, word: &str) -> Cow<'_, TagProbs> {
        if let Some(probs) = self.lookup(word) {
            return Cow::Borrowed(probs);
        }

        if !self.substitutions.is_empty() {
            let mut subst_word = word.to_string();
            for subst in &self.substitutions {
                subst_word = subst
                    .pattern
                    .replace_all(&subst_word, subst.replacement.as_str())
                    .into_owned();
            }
            if let Some(probs) = self.lookup(&subst_word) {
                return Cow::Borrowed(probs);
            }
        }

        match &self.fallback {
            Some(fallback) => fallback.tag_probs(word),
            None => Cow::Owned(TagProbs::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap as StdHashMap;

    use crate::ngram::Tag;
    use crate::numberer::TagNumberer;

    fn model_with_word(word: &str) -> Model {
        let mut tag_numberer = TagNumberer::new();
        let a = Tag::new(tag_numberer.number("A"), false);
        let b = Tag::new(tag_numberer.number("B"), false);
        let mut word_tag_freqs = StdHashMap::new();
        word_tag_freqs.insert(word.to_string(), [(a, 3), (b, 1)].into_iter().collect());
        Model {
            tag_numberer,
            word_tag_freqs,
            unigram_freqs: [(Unigram(a), 30), (Unigram(b), 10)].into_iter().collect(),
            bigram_freqs: StdHashMap::new(),
            trigram_freqs: StdHashMap::new(),
        }
    }

    #[test]
    fn test_conditional_probabilities() {
        let lexicon = Lexicon::new(&model_with_word("w"));

        let probs = lexicon.tag_probs("w");
        assert_eq!(2, probs.len());
        assert!((probs[&Tag::new(0, false)] - (3f64 / 30.).ln()).abs() < 1e-12);
        assert!((probs[&Tag::new(1, false)] - (1f64 / 10.).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_lowercase_retry() {
        let lexicon = Lexicon::new(&model_with_word("house"));

        assert_eq!(2, lexicon.tag_probs("House").len());
        assert!(lexicon.contains("House"));
        assert!(!lexicon.contains("hOUSE"));
        assert!(lexicon.tag_probs("HOUSES").is_empty());
    }

    #[test]
    fn test_substitutions() {
        let lexicon = Lexicon::new(&model_with_word("00.00")).with_substitutions(vec![
            Substitution::new("[0-9]", "0").unwrap(),
            Substitution::new(",", ".").unwrap(),
        ]);

        assert_eq!(2, lexicon.tag_probs("12,75").len());
        assert!(lexicon.tag_probs("1275").is_empty());
    }

    #[test]
    fn test_substitution_then_lowercase() {
        let lexicon = Lexicon::new(&model_with_word("e-mail"))
            .with_substitutions(vec![Substitution::new("^E", "E-").unwrap()]);

        assert_eq!(2, lexicon.tag_probs("Email").len());
    }

    #[test]
    fn test_fallback_gets_original_word() {
        let fallback = Lexicon::new(&model_with_word("12,75"));
        let lexicon = Lexicon::new(&model_with_word("x"))
            .with_substitutions(vec![Substitution::new("[0-9]", "0").unwrap()])
            .with_fallback(fallback);

        assert_eq!(2, lexicon.tag_probs("12,75").len());
        assert!(lexicon.tag_probs("99,99").is_empty());
    }

    #[test]
    fn test_read_rules_malformed() {
        let result = Substitution::read_rules("a\tb\tc\n".as_bytes());

        assert_eq!(
            "InvalidArgumentError: rdr: incorrect substitution: a\tb\tc",
            &result.err().unwrap().to_string()
        );
        assert!(matches!(
            Substitution::read_rules("(\tx\n".as_bytes()),
            Err(TritagError::RegexError(_))
        ));
    }
}
