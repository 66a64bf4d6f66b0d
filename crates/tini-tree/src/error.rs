//! The error type of the tini core.

use std::fmt;

use tini_parse::{Mark, ParseError, ParseErrorKind, ScanErrorKind, Span};

/// What went wrong while reading a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Decoding, scanning or parsing failed.
    Parse(ParseErrorKind),
    /// A section inherits from a section that was not declared before it.
    InheritNotFound(String),
    /// The builder received an event the grammar does not allow here.
    UnexpectedEvent(String),
    /// An event arrived after the end of the document.
    PastDocumentEnd,
    /// The input stream could not be read.
    Io(String),
}

/// Which layer of the pipeline produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed UTF-8, control characters, or I/O failure.
    Reader,
    /// No token can start at the failing position.
    Scanner,
    /// The token or event sequence violates the grammar.
    Parser,
    /// Section inheritance could not be resolved.
    Merge,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse(kind) => write!(f, "{kind}"),
            ErrorKind::InheritNotFound(parent) => {
                write!(f, "inherit section '{parent}' does not exist")
            }
            ErrorKind::UnexpectedEvent(msg) => write!(f, "unexpected event: {msg}"),
            ErrorKind::PastDocumentEnd => write!(f, "attempted to read past end of document"),
            ErrorKind::Io(msg) => write!(f, "input error: {msg}"),
        }
    }
}

/// An error produced while reading a document into a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong, if the failure has a position.
    pub span: Option<Span>,
}

impl Error {
    /// Create a new error.
    pub fn new(kind: ErrorKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }

    /// Which layer produced this error.
    pub fn category(&self) -> ErrorCategory {
        match &self.kind {
            ErrorKind::Io(_) | ErrorKind::Parse(ParseErrorKind::Scan(ScanErrorKind::Reader(_))) => {
                ErrorCategory::Reader
            }
            ErrorKind::Parse(ParseErrorKind::Scan(_)) => ErrorCategory::Scanner,
            ErrorKind::Parse(_) | ErrorKind::UnexpectedEvent(_) | ErrorKind::PastDocumentEnd => {
                ErrorCategory::Parser
            }
            ErrorKind::InheritNotFound(_) => ErrorCategory::Merge,
        }
    }

    /// Position of the failure.
    pub fn mark(&self) -> Option<Mark> {
        self.span.map(|span| span.start)
    }

    /// 1-based line of the failure.
    pub fn line(&self) -> Option<usize> {
        self.mark().map(|mark| mark.line + 1)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line() {
            Some(line) => write!(f, "ini: line {line}: {}", self.kind),
            None => write!(f, "ini: {}", self.kind),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self {
            kind: ErrorKind::Parse(err.kind),
            span: Some(Span::empty(err.mark)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err.to_string()),
            span: None,
        }
    }
}
