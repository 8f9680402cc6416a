use core::fmt;

use bincode::{Decode, Encode};

/// Start-of-sentence marker. Used both as a form and as a tag.
pub const START_TOKEN: &str = "<START>";

/// End-of-sentence marker. Used both as a form and as a tag.
pub const END_TOKEN: &str = "<END>";

/// Part-of-speech tag.
///
/// `id` is the number assigned by the model's [`TagNumberer`](crate::TagNumberer).
/// `capital` records whether the tagged word started with an uppercase letter, so the
/// same label may appear as two distinct tags.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Decode, Encode)]
pub struct Tag {
    pub id: u32,
    pub capital: bool,
}

impl Tag {
    pub const fn new(id: u32, capital: bool) -> Self {
        Self { id, capital }
    }

    /// Creates a tag whose capitalization flag is taken from the first character of `word`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::Tag;
    ///
    /// assert!(Tag::for_word(0, "Berlin").capital);
    /// assert!(!Tag::for_word(0, "berlin").capital);
    /// assert!(!Tag::for_word(0, "").capital);
    /// ```
    pub fn for_word(id: u32, word: &str) -> Self {
        Self::new(id, starts_with_uppercase(word))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.capital {
            write!(f, "{} (capital)", self.id)
        } else {
            write!(f, "{}", self.id)
        }
    }
}

/// Tag unigram.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Decode, Encode)]
pub struct Unigram(pub Tag);

/// Tag bigram.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Decode, Encode)]
pub struct Bigram(pub Tag, pub Tag);

/// Tag trigram.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Decode, Encode)]
pub struct Trigram(pub Tag, pub Tag, pub Tag);

impl Trigram {
    /// The bigram formed by the two most recent tags.
    pub const fn suffix_bigram(&self) -> Bigram {
        Bigram(self.1, self.2)
    }

    /// The bigram formed by the two oldest tags.
    pub const fn prefix_bigram(&self) -> Bigram {
        Bigram(self.0, self.1)
    }
}

pub(crate) fn starts_with_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}
