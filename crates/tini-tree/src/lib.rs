//! Document tree for tini configuration files.
//!
//! This crate reads a document into a [`Node`] tree: sections, keys, nested
//! mappings from dotted keys, and scalars. Section inheritance is resolved
//! while building, so the returned tree is complete.
//!
//! ```
//! let doc = tini_tree::parse_str("[common]\nhost = db\nport = 5432\n[dev:common]\nport = 5433\n")?;
//! let dev = doc.section("dev").unwrap();
//! assert_eq!(dev.get("host").and_then(|n| n.as_str()), Some("db"));
//! assert_eq!(dev.get("port").and_then(|n| n.as_str()), Some("5433"));
//! # Ok::<(), tini_tree::Error>(())
//! ```

use std::io::Read;

use tini_parse::Parser;

mod builder;
mod diagnostic;
mod error;
mod node;
pub mod resolve;

pub use builder::TreeBuilder;
pub use error::{Error, ErrorCategory, ErrorKind};
pub use node::{Node, NodeKind};
pub use resolve::{ResolveError, Resolved};
pub use tini_parse::{DEFAULT_SECTION, Mark, ScalarStyle, Span, Tag};

/// Parse a document from raw bytes.
pub fn parse(bytes: &[u8]) -> Result<Node, Error> {
    build(Parser::from_bytes(bytes)?)
}

/// Parse a document from text.
pub fn parse_str(source: &str) -> Result<Node, Error> {
    build(Parser::new(source))
}

/// Read a stream to the end and parse it.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Node, Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse(&bytes)
}

fn build(mut parser: Parser<'_>) -> Result<Node, Error> {
    let mut builder = TreeBuilder::new();
    while !builder.is_finished() {
        builder.event(parser.next_event()?)?;
    }
    builder.finish()
}
