use crate::errors::{Result, TritagError};

/// Sentence of whitespace-separated tokens, optionally annotated with tags.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Sentence {
    pub(crate) forms: Vec<String>,
    pub(crate) tags: Option<Vec<String>>,
}

impl Sentence {
    /// Creates a new [`Sentence`] from a tokenized string.
    ///
    /// # Arguments
    ///
    /// * `tokenized_text` - A string containing whitespaces between tokens.
    ///
    /// # Returns
    ///
    /// A new [`Sentence`] without tags.
    ///
    /// # Errors
    ///
    /// If the given `tokenized_text` contains no token, an error variant will be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::Sentence;
    ///
    /// let s = Sentence::from_tokenized("How are you ?").unwrap();
    /// assert_eq!(4, s.len());
    ///
    /// let s = Sentence::from_tokenized("   ");
    /// assert!(s.is_err());
    /// ```
    pub fn from_tokenized<S>(tokenized_text: S) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let forms: Vec<String> = tokenized_text
            .as_ref()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if forms.is_empty() {
            return Err(TritagError::invalid_argument(
                "tokenized_text",
                "`tokenized_text` is empty",
            ));
        }
        Ok(Self { forms, tags: None })
    }

    /// Creates a new [`Sentence`] from a tagged string.
    ///
    /// Every token has the form `form/tag`. The token is split at the last slash, so forms
    /// may contain slashes themselves.
    ///
    /// # Arguments
    ///
    /// * `tagged_text` - A string of whitespace-separated `form/tag` tokens.
    ///
    /// # Returns
    ///
    /// A new [`Sentence`] with tags.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `tagged_text` contains no token.
    /// * a token has no slash.
    /// * a token has an empty form or an empty tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::Sentence;
    ///
    /// let s = Sentence::from_tagged("and/or/CC then/RB").unwrap();
    /// assert_eq!(&["and/or", "then"], s.forms());
    /// assert_eq!(Some(&["CC".to_string(), "RB".to_string()][..]), s.tags());
    ///
    /// assert!(Sentence::from_tagged("untagged words").is_err());
    /// ```
    pub fn from_tagged<S>(tagged_text: S) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let mut forms = vec![];
        let mut tags = vec![];
        for token in tagged_text.as_ref().split_whitespace() {
            let (form, tag) = token.rsplit_once('/').ok_or_else(|| {
                TritagError::invalid_argument(
                    "tagged_text",
                    format!("`{token}` does not contain a tag"),
                )
            })?;
            if form.is_empty() {
                return Err(TritagError::invalid_argument(
                    "tagged_text",
                    format!("`{token}` has an empty form"),
                ));
            }
            if tag.is_empty() {
                return Err(TritagError::invalid_argument(
                    "tagged_text",
                    format!("`{token}` has an empty tag"),
                ));
            }
            forms.push(form.to_string());
            tags.push(tag.to_string());
        }
        if forms.is_empty() {
            return Err(TritagError::invalid_argument(
                "tagged_text",
                "`tagged_text` is empty",
            ));
        }
        Ok(Self {
            forms,
            tags: Some(tags),
        })
    }

    /// Generates a string of `form/tag` tokens.
    ///
    /// # Errors
    ///
    /// If the sentence has no tags, an error variant will be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::Sentence;
    ///
    /// let mut s = Sentence::from_tokenized("Time flies").unwrap();
    /// assert!(s.to_tagged_string().is_err());
    ///
    /// s.set_tags(vec!["NN".to_string(), "VBZ".to_string()]).unwrap();
    /// assert_eq!("Time/NN flies/VBZ", s.to_tagged_string().unwrap());
    /// ```
    pub fn to_tagged_string(&self) -> Result<String> {
        let tags = self.tags.as_ref().ok_or_else(|| {
            TritagError::invalid_argument("sentence", "the sentence has no tags")
        })?;
        let mut result = String::new();
        for (i, (form, tag)) in self.forms.iter().zip(tags).enumerate() {
            if i != 0 {
                result.push(' ');
            }
            result.push_str(form);
            result.push('/');
            result.push_str(tag);
        }
        Ok(result)
    }

    /// Replaces the tags of the sentence.
    ///
    /// # Errors
    ///
    /// If the number of tags differs from the number of tokens, an error variant will be
    /// returned.
    pub fn set_tags(&mut self, tags: Vec<String>) -> Result<()> {
        if tags.len() != self.forms.len() {
            return Err(TritagError::invalid_argument(
                "tags",
                format!(
                    "expected {} tags, but got {}",
                    self.forms.len(),
                    tags.len()
                ),
            ));
        }
        self.tags.replace(tags);
        Ok(())
    }

    pub fn forms(&self) -> &[String] {
        &self.forms
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_from_tokenized_empty() {
        let s = Sentence::from_tokenized("");

        assert!(s.is_err());
        assert_eq!(
            "InvalidArgumentError: tokenized_text: `tokenized_text` is empty",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sentence_from_tokenized_extra_whitespace() {
        let s = Sentence::from_tokenized("  The  cat\tsat ").unwrap();

        let expected = Sentence {
            forms: vec!["The".to_string(), "cat".to_string(), "sat".to_string()],
            tags: None,
        };
        assert_eq!(expected, s);
    }

    #[test]
    fn test_sentence_from_tagged() {
        let s = Sentence::from_tagged("The/DT cat/NN sat/VBD ./.").unwrap();

        let expected = Sentence {
            forms: vec![
                "The".to_string(),
                "cat".to_string(),
                "sat".to_string(),
                ".".to_string(),
            ],
            tags: Some(vec![
                "DT".to_string(),
                "NN".to_string(),
                "VBD".to_string(),
                ".".to_string(),
            ]),
        };
        assert_eq!(expected, s);
    }

    #[test]
    fn test_sentence_from_tagged_without_tag() {
        let s = Sentence::from_tagged("The/DT cat");

        assert!(s.is_err());
        assert_eq!(
            "InvalidArgumentError: tagged_text: `cat` does not contain a tag",
            &s.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sentence_from_tagged_empty_parts() {
        assert_eq!(
            "InvalidArgumentError: tagged_text: `/DT` has an empty form",
            &Sentence::from_tagged("/DT").err().unwrap().to_string()
        );
        assert_eq!(
            "InvalidArgumentError: tagged_text: `cat/` has an empty tag",
            &Sentence::from_tagged("cat/").err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sentence_tagged_string_inverse() {
        let line = "1/2/CD cups/NNS of/IN flour/NN";
        let s = Sentence::from_tagged(line).unwrap();

        assert_eq!(line, s.to_tagged_string().unwrap());
    }

    #[test]
    fn test_sentence_set_tags_length_mismatch() {
        let mut s = Sentence::from_tokenized("a b").unwrap();

        assert!(s.set_tags(vec!["DT".to_string()]).is_err());
        assert!(s.tags().is_none());
    }
}
