use std::fmt;

use tini_tokenizer::{ScanError, ScanErrorKind};

use crate::{Mark, TokenKind};

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The scanner could not produce a token.
    Scan(ScanErrorKind),
    /// A token that the grammar does not allow here.
    UnexpectedToken {
        /// What the parser was looking for, e.g. `<value> or <map>`.
        expected: &'static str,
        /// What it found.
        found: TokenKind,
    },
    /// An event was requested after the end of the document.
    PastDocumentEnd,
}

impl ParseErrorKind {
    /// What the parser was doing when the error happened.
    pub fn context(&self) -> &'static str {
        match self {
            ParseErrorKind::Scan(kind) => kind.context(),
            ParseErrorKind::UnexpectedToken { .. } => "while parsing a section",
            ParseErrorKind::PastDocumentEnd => "while parsing the document",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Scan(kind) => write!(f, "{kind}"),
            ParseErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "did not find expected {expected}, found {found}")
            }
            ParseErrorKind::PastDocumentEnd => {
                write!(f, "attempted to read past end of document")
            }
        }
    }
}

/// An error produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Where it went wrong.
    pub mark: Mark,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, mark: Mark) -> Self {
        Self { kind, mark }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ParseError {}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        Self {
            kind: ParseErrorKind::Scan(err.kind),
            mark: err.mark,
        }
    }
}
