//! A scanner for tini documents.
//!
//! The scanner turns raw bytes into a stream of [`Token`]s. Input is first
//! validated by the [`reader`], which rejects malformed UTF-8 and control
//! characters, and then scanned with one token of lookahead.

mod error;
pub use error::{ReaderError, ReaderErrorKind, ScanError, ScanErrorKind};

mod mark;
pub use mark::{Mark, Span};

pub mod reader;

mod scanner;
pub use scanner::{Scanner, is_key_start};

mod token;
pub use token::{ScalarStyle, Token, TokenKind};

/// Name of the implicit section holding keys declared before any header.
pub const DEFAULT_SECTION: &str = "default";
