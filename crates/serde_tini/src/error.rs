//! Error types for serde_tini.

use std::fmt;

use tini_format::FormatError;

/// Error type for serde_tini operations.
#[derive(Debug)]
pub enum Error {
    /// The input is not a valid document.
    Parse(tini_tree::Error),
    /// The value has no text form.
    Format(FormatError),
    /// Scalars that could not be stored in their destination fields.
    Type(TypeError),
    /// Anything else: serde custom errors, unsupported shapes.
    Message(String),
}

impl Error {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Error::Message(msg.into())
    }

    pub(crate) fn custom(msg: impl fmt::Display) -> Self {
        Error::Message(msg.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{err}"),
            Error::Format(err) => write!(f, "ini: {err}"),
            Error::Type(err) => write!(f, "{err}"),
            Error::Message(msg) => write!(f, "ini: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Format(err) => Some(err),
            Error::Type(err) => Some(err),
            Error::Message(_) => None,
        }
    }
}

impl From<tini_tree::Error> for Error {
    fn from(err: tini_tree::Error) -> Self {
        Error::Parse(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err)
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::custom(msg)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::custom(msg)
    }
}

/// Scalars whose resolved type did not fit their destination.
///
/// Binding continues past each mismatch with the destination's zero value,
/// so one `TypeError` lists every failed field, one line each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    /// `line N: cannot unmarshal !!tag `value` into T`
    pub errors: Vec<String>,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ini: unmarshal errors:\n  {}", self.errors.join("\n  "))
    }
}

impl std::error::Error for TypeError {}

/// Result type for serde_tini operations.
pub type Result<T> = std::result::Result<T, Error>;
