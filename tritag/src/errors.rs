//! Definition of errors.

use thiserror::Error;

use crate::ngram::Tag;

pub type Result<T, E = TritagError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TritagError {
    /// The transition model was asked about a tag that has no unigram entry.
    #[error("unknown tag: {0}")]
    UnknownTag(Tag),

    /// The emission model returned no candidate tags for a token.
    #[error("no tag probabilities for: {0}")]
    EmptyEmission(String),

    /// Every path was pruned away, so no terminal state exists.
    #[error("no path through the trellis survived the beam")]
    NoPath,

    #[error(transparent)]
    InvalidModel(#[from] InvalidModelError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    #[error("worker threads are disconnected")]
    Disconnected,

    #[error(transparent)]
    RegexError(#[from] regex::Error),

    #[error(transparent)]
    DecodeError(#[from] bincode::error::DecodeError),

    #[error(transparent)]
    EncodeError(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl TritagError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }
}

/// Error used when the model is invalid.
#[derive(Debug, Error)]
#[error("InvalidModelError: {msg}")]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

/// Error used when the argument is invalid.
#[derive(Debug, Error)]
#[error("InvalidArgumentError: {arg}: {msg}")]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_message() {
        let e = TritagError::invalid_argument("beam_factor", "must be at least 1");
        assert_eq!(
            "InvalidArgumentError: beam_factor: must be at least 1",
            e.to_string()
        );
    }

    #[test]
    fn test_unknown_tag_message() {
        let e = TritagError::UnknownTag(Tag::new(7, true));
        assert_eq!("unknown tag: 7 (capital)", e.to_string());
    }
}
