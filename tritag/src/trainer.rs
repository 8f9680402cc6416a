use log::debug;

use crate::errors::{Result, TritagError};
use crate::model::Model;
use crate::ngram::{Bigram, Tag, Trigram, Unigram, END_TOKEN, START_TOKEN};
use crate::sentence::Sentence;

/// Frequency collector.
///
/// # Examples
///
/// ```
/// use tritag::{Sentence, Trainer};
///
/// let mut trainer = Trainer::new();
/// for line in ["The/DT dog/NN barks/VBZ", "A/DT cat/NN sleeps/VBZ"] {
///     let s = Sentence::from_tagged(line).unwrap();
///     trainer.push_sentence(&s).unwrap();
/// }
/// let model = trainer.train();
///
/// // Two start markers and one end marker are added to each sentence.
/// let corpus_size: usize = model.unigram_freqs().values().sum();
/// assert_eq!(12, corpus_size);
/// ```
pub struct Trainer {
    model: Model,
    start_tag: Tag,
    end_tag: Tag,
    n_sentences: usize,
}

impl Trainer {
    /// Creates a new trainer.
    ///
    /// The sentence markers always receive the numbers 0 and 1.
    pub fn new() -> Self {
        let mut model = Model::default();
        let start_tag = Tag::for_word(model.tag_numberer.number(START_TOKEN), START_TOKEN);
        let end_tag = Tag::for_word(model.tag_numberer.number(END_TOKEN), END_TOKEN);
        Self {
            model,
            start_tag,
            end_tag,
            n_sentences: 0,
        }
    }

    /// Adds the frequencies of a tagged sentence.
    ///
    /// # Arguments
    ///
    /// * `sentence` - A sentence with tags.
    ///
    /// # Errors
    ///
    /// If the sentence has no tags, an error variant will be returned.
    pub fn push_sentence(&mut self, sentence: &Sentence) -> Result<()> {
        let labels = sentence.tags().ok_or_else(|| {
            TritagError::invalid_argument("sentence", "the sentence has no tags")
        })?;

        let mut tags = Vec::with_capacity(sentence.len() + 3);
        tags.push(self.start_tag);
        tags.push(self.start_tag);
        self.add_word(START_TOKEN, self.start_tag);
        self.add_word(START_TOKEN, self.start_tag);
        for (form, label) in sentence.forms().iter().zip(labels) {
            let tag = Tag::for_word(self.model.tag_numberer.number(label), form);
            self.add_word(form, tag);
            tags.push(tag);
        }
        tags.push(self.end_tag);
        self.add_word(END_TOKEN, self.end_tag);

        for (i, &tag) in tags.iter().enumerate() {
            *self.model.unigram_freqs.entry(Unigram(tag)).or_insert(0) += 1;
            if i >= 1 {
                *self
                    .model
                    .bigram_freqs
                    .entry(Bigram(tags[i - 1], tag))
                    .or_insert(0) += 1;
            }
            if i >= 2 {
                *self
                    .model
                    .trigram_freqs
                    .entry(Trigram(tags[i - 2], tags[i - 1], tag))
                    .or_insert(0) += 1;
            }
        }

        self.n_sentences += 1;
        Ok(())
    }

    fn add_word(&mut self, form: &str, tag: Tag) {
        *self
            .model
            .word_tag_freqs
            .entry(form.to_string())
            .or_default()
            .entry(tag)
            .or_insert(0) += 1;
    }

    /// Number of sentences pushed so far.
    pub fn n_sentences(&self) -> usize {
        self.n_sentences
    }

    /// Finishes collecting and returns the model.
    pub fn train(self) -> Model {
        debug!(
            "collected {} sentences: {}",
            self.n_sentences, self.model
        );
        self.model
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_untagged_sentence() {
        let mut trainer = Trainer::new();
        let s = Sentence::from_tokenized("dog runs").unwrap();

        assert!(trainer.push_sentence(&s).is_err());
        assert_eq!(0, trainer.n_sentences());
    }

    #[test]
    fn test_frequencies() {
        let mut trainer = Trainer::new();
        trainer
            .push_sentence(&Sentence::from_tagged("Dogs/NOUN run/VERB").unwrap())
            .unwrap();
        trainer
            .push_sentence(&Sentence::from_tagged("dogs/NOUN bark/VERB").unwrap())
            .unwrap();
        assert_eq!(2, trainer.n_sentences());
        let model = trainer.train();

        let start = Tag::new(0, false);
        let end = Tag::new(1, false);
        let noun = Tag::new(2, false);
        let noun_cap = Tag::new(2, true);
        let verb = Tag::new(3, false);

        assert_eq!(
            &["<START>", "<END>", "NOUN", "VERB"],
            model.tag_numberer().labels()
        );
        assert_eq!(Some(&4), model.unigram_freqs().get(&Unigram(start)));
        assert_eq!(Some(&2), model.unigram_freqs().get(&Unigram(end)));
        assert_eq!(Some(&1), model.unigram_freqs().get(&Unigram(noun)));
        assert_eq!(Some(&1), model.unigram_freqs().get(&Unigram(noun_cap)));
        assert_eq!(Some(&2), model.unigram_freqs().get(&Unigram(verb)));
        assert_eq!(10, model.unigram_freqs().values().sum::<usize>());

        assert_eq!(Some(&2), model.bigram_freqs().get(&Bigram(start, start)));
        assert_eq!(Some(&2), model.bigram_freqs().get(&Bigram(verb, end)));
        assert_eq!(
            Some(&1),
            model.trigram_freqs().get(&Trigram(start, noun_cap, verb))
        );
        assert_eq!(
            Some(&1),
            model.trigram_freqs().get(&Trigram(start, start, noun))
        );
        assert_eq!(
            Some(&1),
            model.trigram_freqs().get(&Trigram(start, start, noun_cap))
        );

        assert_eq!(Some(&4), model.word_tag_freqs()[START_TOKEN].get(&start));
        assert_eq!(Some(&2), model.word_tag_freqs()[END_TOKEN].get(&end));
        assert_eq!(Some(&1), model.word_tag_freqs()["Dogs"].get(&noun_cap));
    }

    #[test]
    fn test_bigram_and_trigram_totals() {
        let mut trainer = Trainer::new();
        for line in ["a/X b/Y c/Z", "d/X"] {
            trainer
                .push_sentence(&Sentence::from_tagged(line).unwrap())
                .unwrap();
        }
        let model = trainer.train();

        // A sentence of n tokens has n + 3 unigrams, n + 2 bigrams and n + 1 trigrams.
        assert_eq!(10, model.unigram_freqs().values().sum::<usize>());
        assert_eq!(8, model.bigram_freqs().values().sum::<usize>());
        assert_eq!(6, model.trigram_freqs().values().sum::<usize>());
    }
}
