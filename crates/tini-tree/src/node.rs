//! Node types for tini documents.
//!
//! A document is a tree of [`Node`]s:
//! - the `Document` root holds `(name, body)` pairs, one per section
//! - a `Section` body and a `Mapping` hold `(key, value)` pairs
//! - values are `Scalar`s, or `Mapping`s produced by dotted keys
//!
//! Pairs are stored flat in `children` (`key, value, key, value, ...`) in
//! first-declaration order. Keys are unique among their siblings.

use tini_parse::{ScalarStyle, Span, Tag};

use crate::resolve::{self, ResolveError, Resolved};

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The root of a parsed document.
    Document,
    /// The body of a section.
    Section,
    /// A nested mapping produced by a dotted key.
    Mapping,
    /// A key, a section name, or a leaf value.
    Scalar,
}

impl NodeKind {
    /// Whether nodes of this kind hold key/value pairs.
    pub fn is_composite(&self) -> bool {
        !matches!(self, NodeKind::Scalar)
    }
}

/// A node in a tini document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What this node is.
    pub kind: NodeKind,
    /// Explicit type tag (scalars only). `None` means infer from the text.
    pub tag: Option<Tag>,
    /// Scalar text, key or section name. Empty for composite nodes.
    pub value: String,
    /// How the scalar was written.
    pub style: ScalarStyle,
    /// Flat `key, value` pairs for composite nodes.
    pub children: Vec<Node>,
    /// Comment lines preceding this node in the source.
    ///
    /// On the document root: comments after the last entry.
    pub comment: Option<String>,
    /// Parent section a section body was declared to inherit from.
    pub inherit: Option<String>,
    /// Source span (None if programmatically constructed).
    pub span: Option<Span>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            tag: None,
            value: String::new(),
            style: ScalarStyle::Plain,
            children: Vec::new(),
            comment: None,
            inherit: None,
            span: None,
        }
    }

    /// Create an empty document.
    pub fn document() -> Self {
        Node::new(NodeKind::Document)
    }

    /// Create an empty section body.
    pub fn section_body() -> Self {
        Node::new(NodeKind::Section)
    }

    /// Create an empty mapping.
    pub fn mapping() -> Self {
        Node::new(NodeKind::Mapping)
    }

    /// Create a plain scalar (no tag).
    pub fn scalar(text: impl Into<String>) -> Self {
        Node {
            value: text.into(),
            ..Node::new(NodeKind::Scalar)
        }
    }

    /// Attach a tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Attach a scalar style.
    pub fn with_style(mut self, style: ScalarStyle) -> Self {
        self.style = style;
        self
    }

    /// Attach a source span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check if this is a scalar.
    pub fn is_scalar(&self) -> bool {
        self.kind == NodeKind::Scalar
    }

    /// Check if this is a mapping.
    pub fn is_mapping(&self) -> bool {
        self.kind == NodeKind::Mapping
    }

    /// 1-based line of this node, if it came from source.
    pub fn line(&self) -> Option<usize> {
        self.span.map(|span| span.start.line + 1)
    }

    /// 1-based column of this node, if it came from source.
    pub fn column(&self) -> Option<usize> {
        self.span.map(|span| span.start.column + 1)
    }

    /// Get as string (scalars only).
    pub fn as_str(&self) -> Option<&str> {
        self.is_scalar().then_some(self.value.as_str())
    }

    /// Resolve a scalar to its typed value.
    pub fn resolve(&self) -> Result<Resolved<'_>, ResolveError> {
        if !self.is_scalar() {
            return Err(ResolveError::NotScalar(self.kind));
        }
        resolve::resolve(self.tag, &self.value)
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.children.len() / 2
    }

    /// Whether there are no key/value pairs.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterate over key/value pairs in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.children
            .chunks_exact(2)
            .map(|pair| (&pair[0], &pair[1]))
    }

    /// Iterate over `(name, body)` of every section of a document.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.pairs()
            .filter(|(_, body)| body.kind == NodeKind::Section)
            .map(|(name, body)| (name.value.as_str(), body))
    }

    /// Get the body of a section by name (documents only).
    pub fn section(&self, name: &str) -> Option<&Node> {
        if self.kind != NodeKind::Document {
            return None;
        }
        self.child(name)
    }

    /// Get the value paired with `key`.
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.position(key).map(|i| &self.children[i + 1])
    }

    /// Get a value by dotted path.
    ///
    /// On a document the first segment names the section:
    /// `doc.get("server.tls.port")`.
    pub fn get(&self, path: &str) -> Option<&Node> {
        path.split('.')
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Index in `children` of the key node named `key`.
    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.children
            .chunks_exact(2)
            .position(|pair| pair[0].value == key)
            .map(|i| i * 2)
    }

    /// Append a pair, or replace the value of an existing key in place.
    ///
    /// Returns the index of the value in `children`.
    pub fn insert(&mut self, key: Node, value: Node) -> usize {
        match self.position(&key.value) {
            Some(i) => {
                if key.comment.is_some() {
                    self.children[i].comment = key.comment;
                }
                self.children[i + 1] = value;
                i + 1
            }
            None => {
                self.children.push(key);
                self.children.push(value);
                self.children.len() - 1
            }
        }
    }
}
