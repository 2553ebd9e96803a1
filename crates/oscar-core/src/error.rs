//! Error types for OSC encoding, decoding and pattern compilation

use thiserror::Error;

/// Result type alias for oscar-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// oscar-core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Fixed-width value ran past the end of the buffer
    #[error("expected {expected} ({needed} bytes), only {have} bytes")]
    Truncated {
        expected: &'static str,
        needed: usize,
        have: usize,
    },

    /// No NUL terminator found while reading a string
    #[error("no termination in string {0:?}")]
    UnterminatedString(String),

    /// String bytes are not valid UTF-8
    #[error("string is not valid UTF-8: {0}")]
    InvalidString(String),

    /// Address could not be read
    #[error("reading address pattern: {0}")]
    Address(Box<Error>),

    /// Type tag string could not be read
    #[error("reading type tag: {0}")]
    TypeTag(Box<Error>),

    /// Type tag string is empty or does not start with ','
    #[error("invalid type tag string: {0:?}")]
    InvalidTypeTags(String),

    /// No decoder is registered for this tag
    #[error("unknown type tag {0}")]
    UnknownTypeTag(char),

    /// An argument failed to decode
    #[error("reading argument {index} ({tag}): {source}")]
    Argument {
        index: usize,
        tag: char,
        source: Box<Error>,
    },

    /// Pattern text ended where a matcher was expected
    #[error("unexpected end of pattern")]
    UnexpectedEnd,

    /// Pattern text did not start with the expected token
    #[error("expected {expected:?}, got: {found:?}")]
    UnexpectedToken { expected: char, found: String },

    /// Character class has no closing ']'
    #[error("expected ']' somewhere, got: {0:?}")]
    UnterminatedClass(String),

    /// Character class range runs backwards
    #[error("invalid range {start}-{end}, {end}<{start}")]
    InvalidRange { start: char, end: char },
}

impl Error {
    /// True for errors produced while compiling an address pattern
    pub fn is_pattern_error(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedEnd
                | Error::UnexpectedToken { .. }
                | Error::UnterminatedClass(_)
                | Error::InvalidRange { .. }
        )
    }
}
