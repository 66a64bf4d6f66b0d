//! Event-based parser for tini documents.
//!
//! [`Parser`] pulls tokens from the [`Scanner`] and turns them into a flat
//! stream of [`Event`]s: one `SectionEntry` per section header (or an
//! implicit `default` section), then alternating key and value scalars, with
//! a `Mapping` event between the segments of a dotted key.

pub use tini_tokenizer::{
    DEFAULT_SECTION, Mark, ReaderErrorKind, ScalarStyle, ScanErrorKind, Scanner, Span, Token,
    TokenKind,
};

mod tracing_macros;

mod error;
pub use error::{ParseError, ParseErrorKind};

mod event;
pub use event::{Event, Tag};

mod parser;
pub use parser::Parser;
