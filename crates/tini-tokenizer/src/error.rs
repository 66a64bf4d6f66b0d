//! Reader and scanner errors.

use std::fmt;

use crate::Mark;

/// What went wrong while decoding the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderErrorKind {
    /// A byte that cannot start a UTF-8 sequence.
    InvalidLeadingOctet(u8),
    /// The input ended in the middle of a UTF-8 sequence.
    IncompleteSequence,
    /// A continuation byte was expected.
    InvalidTrailingOctet(u8),
    /// An overlong encoding.
    InvalidLength,
    /// A surrogate or a value above U+10FFFF.
    InvalidCodePoint(u32),
    /// A code point outside the printable set.
    ControlCharacter(u32),
}

impl fmt::Display for ReaderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderErrorKind::InvalidLeadingOctet(b) => {
                write!(f, "invalid leading UTF-8 octet #{b:02X}")
            }
            ReaderErrorKind::IncompleteSequence => write!(f, "incomplete UTF-8 octet sequence"),
            ReaderErrorKind::InvalidTrailingOctet(b) => {
                write!(f, "invalid trailing UTF-8 octet #{b:02X}")
            }
            ReaderErrorKind::InvalidLength => write!(f, "invalid length of a UTF-8 sequence"),
            ReaderErrorKind::InvalidCodePoint(v) => {
                write!(f, "invalid Unicode character #{v:X}")
            }
            ReaderErrorKind::ControlCharacter(v) => {
                write!(f, "control characters are not allowed (#{v:X})")
            }
        }
    }
}

/// An error produced while decoding the input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderError {
    /// What went wrong.
    pub kind: ReaderErrorKind,
    /// Where the offending sequence starts.
    pub mark: Mark,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.kind, self.mark.index)
    }
}

impl std::error::Error for ReaderError {}

/// What went wrong while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// The input could not be decoded.
    Reader(ReaderErrorKind),
    /// A section name contains a character outside `[A-Za-z0-9_-]`.
    InvalidSectionName(char),
    /// `[]` or `[:parent]`.
    EmptySectionName,
    /// A header that is not closed by `]` on the same line.
    UnterminatedSection,
    /// Something other than a comment follows `]` on the header line.
    MissingLineBreak(char),
    /// A key that starts with a character that cannot start a key.
    InvalidKeyStart(Option<char>),
    /// Two dots in a row, or a dot at either end of a dotted key.
    EmptyKey,
    /// A key not followed by `=` on its line. `None` for the end of the line.
    MissingValueIndicator(Option<char>),
    /// A quoted scalar without its closing quote.
    UnterminatedQuoted,
    /// A backslash followed by an unsupported character.
    UnknownEscape(char),
    /// `\x`, `\u` or `\U` followed by a non-hex digit.
    InvalidHexDigit,
    /// `\x`, `\u` or `\U` naming a surrogate or a value above U+10FFFF.
    InvalidEscapeCode(u32),
    /// Content after a closing quote on a value line.
    TrailingContent(char),
}

impl ScanErrorKind {
    /// What the scanner was doing when the error happened.
    pub fn context(&self) -> &'static str {
        match self {
            ScanErrorKind::Reader(_) => "while reading the input",
            ScanErrorKind::InvalidSectionName(_)
            | ScanErrorKind::EmptySectionName
            | ScanErrorKind::UnterminatedSection => "while scanning a section header",
            ScanErrorKind::MissingLineBreak(_) => "while scanning for the section entry",
            ScanErrorKind::InvalidKeyStart(_)
            | ScanErrorKind::EmptyKey
            | ScanErrorKind::MissingValueIndicator(_) => "while scanning a key",
            ScanErrorKind::UnterminatedQuoted
            | ScanErrorKind::UnknownEscape(_)
            | ScanErrorKind::InvalidHexDigit
            | ScanErrorKind::InvalidEscapeCode(_) => "while scanning a quoted scalar",
            ScanErrorKind::TrailingContent(_) => "while scanning a value",
        }
    }
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanErrorKind::Reader(kind) => write!(f, "{kind}"),
            ScanErrorKind::InvalidSectionName(c) => {
                write!(f, "found character {c:?} that cannot start for any section key")
            }
            ScanErrorKind::EmptySectionName => write!(f, "found empty section name"),
            ScanErrorKind::UnterminatedSection => write!(f, "did not find expected ']'"),
            ScanErrorKind::MissingLineBreak(c) => write!(
                f,
                "must have a line break before the first section key, found {c:?}"
            ),
            ScanErrorKind::InvalidKeyStart(Some(c)) => {
                write!(f, "found character {c:?} that cannot start any key")
            }
            ScanErrorKind::InvalidKeyStart(None) => write!(f, "found empty key"),
            ScanErrorKind::EmptyKey => write!(f, "empty map key"),
            ScanErrorKind::MissingValueIndicator(Some(c)) => {
                write!(f, "could not find expected '=', found {c:?}")
            }
            ScanErrorKind::MissingValueIndicator(None) => {
                write!(f, "could not find expected '=' before the end of the line")
            }
            ScanErrorKind::UnterminatedQuoted => {
                write!(f, "found unexpected end of line or stream")
            }
            ScanErrorKind::UnknownEscape(c) => {
                write!(f, "found unknown escape character {c:?}")
            }
            ScanErrorKind::InvalidHexDigit => write!(f, "did not find expected hexdecimal number"),
            ScanErrorKind::InvalidEscapeCode(v) => {
                write!(f, "found invalid Unicode character escape code #{v:X}")
            }
            ScanErrorKind::TrailingContent(c) => {
                write!(f, "found unexpected character {c:?} after quoted scalar")
            }
        }
    }
}

/// An error produced while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// What went wrong.
    pub kind: ScanErrorKind,
    /// Where it went wrong.
    pub mark: Mark,
}

impl ScanError {
    /// Create a new scan error.
    pub fn new(kind: ScanErrorKind, mark: Mark) -> Self {
        Self { kind, mark }
    }

    /// Whether the error came from decoding rather than scanning.
    pub fn is_reader_error(&self) -> bool {
        matches!(self.kind, ScanErrorKind::Reader(_))
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ScanError {}

impl From<ReaderError> for ScanError {
    fn from(err: ReaderError) -> Self {
        Self {
            kind: ScanErrorKind::Reader(err.kind),
            mark: err.mark,
        }
    }
}
