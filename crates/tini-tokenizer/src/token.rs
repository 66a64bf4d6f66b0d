//! Token types for the tini scanner.

use std::borrow::Cow;
use std::fmt;

use crate::Span;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Virtual token opening the stream.
    DocumentStart,
    /// Virtual token closing the stream.
    DocumentEnd,

    // Section header
    /// `[`
    SectionStart,
    /// `:`
    SectionInherit,
    /// `]`
    SectionEntry,

    // Entries
    /// Precedes the scalar naming one key segment.
    Key,
    /// `.` between two key segments.
    Map,
    /// `=`
    Value,
    /// Section name, key segment or value.
    Scalar,

    /// `# ...` or `; ...` up to the end of the line.
    Comment,
}

impl TokenKind {
    /// Human-readable name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::DocumentStart => "<document-start>",
            TokenKind::DocumentEnd => "<document-end>",
            TokenKind::SectionStart => "<section-start>",
            TokenKind::SectionInherit => "<section-inherit>",
            TokenKind::SectionEntry => "<section-entry>",
            TokenKind::Key => "<key>",
            TokenKind::Map => "<map>",
            TokenKind::Value => "<value>",
            TokenKind::Scalar => "<scalar>",
            TokenKind::Comment => "<comment>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarStyle {
    /// Unquoted text.
    #[default]
    Plain,
    /// `'...'`
    SingleQuoted,
    /// `"..."`
    DoubleQuoted,
}

impl ScalarStyle {
    /// Whether the scalar was quoted.
    pub fn is_quoted(&self) -> bool {
        !matches!(self, ScalarStyle::Plain)
    }
}

/// A token with its kind, span and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in the source text.
    pub span: Span,
    /// Payload after quote stripping and escape processing.
    ///
    /// Empty for purely structural tokens.
    pub value: Cow<'src, str>,
    /// Scalar style (only meaningful for [`TokenKind::Scalar`]).
    pub style: ScalarStyle,
}

impl<'src> Token<'src> {
    /// Create a structural token without payload.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            value: Cow::Borrowed(""),
            style: ScalarStyle::Plain,
        }
    }

    /// Create a scalar token.
    pub fn scalar(span: Span, value: Cow<'src, str>, style: ScalarStyle) -> Self {
        Self {
            kind: TokenKind::Scalar,
            span,
            value,
            style,
        }
    }

    /// Create a comment token.
    pub fn comment(span: Span, text: &'src str) -> Self {
        Self {
            kind: TokenKind::Comment,
            span,
            value: Cow::Borrowed(text),
            style: ScalarStyle::Plain,
        }
    }
}
