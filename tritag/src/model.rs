use core::fmt;
use std::collections::HashMap;
use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, TritagError};
use crate::ngram::{Bigram, Tag, Trigram, Unigram, END_TOKEN, START_TOKEN};
use crate::numberer::TagNumberer;

/// Frequency of a word with a particular tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    pub word: String,
    pub tag: String,
    pub capital: bool,
    pub freq: usize,
}

/// Model data.
///
/// A model holds the frequency tables collected by the [`Trainer`](crate::Trainer) and the
/// bijection between tag labels and numbers. It is read-only during tagging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Decode, Encode)]
pub struct Model {
    pub(crate) tag_numberer: TagNumberer,
    pub(crate) word_tag_freqs: HashMap<String, HashMap<Tag, usize>>,
    pub(crate) unigram_freqs: HashMap<Unigram, usize>,
    pub(crate) bigram_freqs: HashMap<Bigram, usize>,
    pub(crate) trigram_freqs: HashMap<Trigram, usize>,
}

impl Model {
    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        Ok(bincode::decode_from_std_read(
            rdr,
            bincode::config::standard(),
        )?)
    }

    pub fn tag_numberer(&self) -> &TagNumberer {
        &self.tag_numberer
    }

    pub fn word_tag_freqs(&self) -> &HashMap<String, HashMap<Tag, usize>> {
        &self.word_tag_freqs
    }

    pub fn unigram_freqs(&self) -> &HashMap<Unigram, usize> {
        &self.unigram_freqs
    }

    pub fn bigram_freqs(&self) -> &HashMap<Bigram, usize> {
        &self.bigram_freqs
    }

    pub fn trigram_freqs(&self) -> &HashMap<Trigram, usize> {
        &self.trigram_freqs
    }

    /// Returns the tag of the start-of-sentence marker.
    ///
    /// # Errors
    ///
    /// If the model was not produced by the trainer, the marker may be missing.
    pub fn start_tag(&self) -> Result<Tag> {
        self.marker_tag(START_TOKEN)
    }

    /// Returns the tag of the end-of-sentence marker.
    ///
    /// # Errors
    ///
    /// If the model was not produced by the trainer, the marker may be missing.
    pub fn end_tag(&self) -> Result<Tag> {
        self.marker_tag(END_TOKEN)
    }

    fn marker_tag(&self, marker: &str) -> Result<Tag> {
        self.tag_numberer
            .get(marker)
            .map(|id| Tag::new(id, false))
            .ok_or_else(|| TritagError::invalid_model(format!("{marker} tag is not defined")))
    }

    /// Returns the lexicon as a list of entries sorted by word and tag.
    ///
    /// Entries of the sentence markers are omitted.
    pub fn lexicon_entries(&self) -> Vec<LexiconEntry> {
        let mut entries = vec![];
        for (word, tag_freqs) in &self.word_tag_freqs {
            if word == START_TOKEN || word == END_TOKEN {
                continue;
            }
            for (tag, &freq) in tag_freqs {
                // Tags in the lexicon are always numbered by the trainer.
                let label = self.tag_numberer.label(tag.id).unwrap_or_default();
                entries.push(LexiconEntry {
                    word: word.clone(),
                    tag: label.to_string(),
                    capital: tag.capital,
                    freq,
                });
            }
        }
        entries.sort_unstable_by(|a, b| {
            (&a.word, &a.tag, a.capital).cmp(&(&b.word, &b.tag, b.capital))
        });
        entries
    }

    /// Replaces the lexicon.
    ///
    /// Entries of the sentence markers are kept, so that the model can still decode sentences.
    /// The n-gram tables are left untouched.
    ///
    /// # Arguments
    ///
    /// * `entries` - New lexicon entries.
    ///
    /// # Errors
    ///
    /// If an entry refers to a tag that has no unigram frequency, or has a zero frequency, an
    /// error variant will be returned and the model is left unchanged.
    pub fn replace_lexicon<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = LexiconEntry>,
    {
        let mut word_tag_freqs: HashMap<String, HashMap<Tag, usize>> = HashMap::new();
        for marker in [START_TOKEN, END_TOKEN] {
            if let Some(tag_freqs) = self.word_tag_freqs.get(marker) {
                word_tag_freqs.insert(marker.to_string(), tag_freqs.clone());
            }
        }
        for entry in entries {
            if entry.word.is_empty() || entry.word == START_TOKEN || entry.word == END_TOKEN {
                return Err(TritagError::invalid_argument(
                    "entries",
                    format!("invalid word: `{}`", entry.word),
                ));
            }
            if entry.freq == 0 {
                return Err(TritagError::invalid_argument(
                    "entries",
                    format!("frequency of `{}` must be positive", entry.word),
                ));
            }
            let tag = self
                .tag_numberer
                .get(&entry.tag)
                .map(|id| Tag::new(id, entry.capital))
                .filter(|tag| self.unigram_freqs.contains_key(&Unigram(*tag)))
                .ok_or_else(|| {
                    TritagError::invalid_argument(
                        "entries",
                        format!("unknown tag `{}` for `{}`", entry.tag, entry.word),
                    )
                })?;
            *word_tag_freqs
                .entry(entry.word)
                .or_default()
                .entry(tag)
                .or_insert(0) += entry.freq;
        }
        self.word_tag_freqs = word_tag_freqs;
        Ok(())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} words, {} unigrams, {} bigrams, {} trigrams",
            self.word_tag_freqs.len(),
            self.unigram_freqs.len(),
            self.bigram_freqs.len(),
            self.trigram_freqs.len(),
        )
    }
}
