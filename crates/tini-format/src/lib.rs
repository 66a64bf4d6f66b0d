//! Emitter for tini documents.
//!
//! The inverse of [`tini_tree::parse`]: lays a document tree out as text that
//! parses back to the same sections, keys and scalar values. Keys of the
//! `default` section come first without a header, nested mappings become
//! dotted keys, and strings that would read back as another type are quoted.
//!
//! ```
//! use tini_format::{FormatOptions, format_document};
//!
//! let doc = tini_tree::parse_str("name = demo\n[db]\nport = 5432\n").unwrap();
//! let text = format_document(&doc, &FormatOptions::default()).unwrap();
//! assert_eq!(text, "name = demo\n\n[db]\nport = 5432\n");
//! ```

mod options;
mod scalar;
mod writer;

pub use options::{FormatOptions, QuoteStyle};
pub use scalar::{
    can_be_plain, can_be_plain_key, escape_double_quoted, escape_single_quoted, quote,
};
pub use writer::{FormatError, IniWriter, format_document};
