//! Tree builder from parse events.
//!
//! Keys assigned twice within one section overwrite in place; mappings built
//! by dotted keys accumulate. A section declared as `[child:parent]` then
//! receives deep copies of every parent key it does not define itself.

use std::mem;

use tini_parse::{DEFAULT_SECTION, Event, Span};
use tracing::debug;

use crate::{Error, ErrorKind, Node};

/// Builder that constructs a tree from parse events.
pub struct TreeBuilder {
    document: Option<Node>,
    section: Option<SectionFrame>,
    pending_comments: Vec<String>,
    ended: bool,
}

/// The section currently being built.
struct SectionFrame {
    name: Node,
    body: Node,
    parent: Option<(String, Span)>,
    state: SectionState,
    /// Segments of the key being read.
    keys: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionState {
    /// Just entered; an inherit declaration may follow.
    AwaitingInherit,
    /// Between entries.
    BuildingOwnKeys,
    /// After a key segment: a mapping or the value.
    AfterKey,
    /// After a mapping: the next key segment.
    AfterMapping,
}

impl TreeBuilder {
    /// Create a new tree builder.
    pub fn new() -> Self {
        Self {
            document: None,
            section: None,
            pending_comments: Vec::new(),
            ended: false,
        }
    }

    /// Whether `DocumentEnd` has been received.
    pub fn is_finished(&self) -> bool {
        self.ended
    }

    /// Finish building and return the document.
    pub fn finish(self) -> Result<Node, Error> {
        match self.document {
            Some(document) if self.ended => Ok(document),
            _ => Err(unexpected("input ended before the end of the document", None)),
        }
    }

    /// Feed one event.
    pub fn event(&mut self, event: Event<'_>) -> Result<(), Error> {
        if self.ended {
            return Err(Error::new(ErrorKind::PastDocumentEnd, Some(event.span())));
        }

        match event {
            Event::DocumentStart { span } => {
                if self.document.is_some() {
                    return Err(unexpected("second document start", Some(span)));
                }
                self.document = Some(Node::document().with_span(span));
            }
            Event::DocumentEnd { span } => {
                self.close_section()?;
                let comment = self.take_comment();
                self.document_mut(span)?.comment = comment;
                self.ended = true;
            }
            Event::SectionEntry { span, name } => {
                self.close_section()?;
                self.document_mut(span)?;
                let mut name = Node::scalar(name).with_span(span);
                name.comment = self.take_comment();
                self.section = Some(SectionFrame {
                    name,
                    body: Node::section_body().with_span(span),
                    parent: None,
                    state: SectionState::AwaitingInherit,
                    keys: Vec::new(),
                });
            }
            Event::SectionInherit { span, parent } => {
                let frame = self.frame(span, "inherit declaration")?;
                if frame.state != SectionState::AwaitingInherit {
                    return Err(unexpected("inherit declaration after the first key", Some(span)));
                }
                frame.parent = Some((parent.into_owned(), span));
                frame.state = SectionState::BuildingOwnKeys;
            }
            Event::Mapping { span } => {
                let frame = self.frame(span, "mapping")?;
                if frame.state != SectionState::AfterKey {
                    return Err(unexpected("mapping without a key", Some(span)));
                }
                frame.state = SectionState::AfterMapping;
            }
            Event::Scalar {
                span,
                value,
                style,
                tag,
            } => {
                let comment = self.take_comment();
                let frame = self.frame(span, "scalar")?;
                let mut node = Node::scalar(value).with_style(style).with_span(span);
                node.tag = tag;
                match frame.state {
                    SectionState::AwaitingInherit | SectionState::BuildingOwnKeys => {
                        node.comment = comment;
                        frame.keys = vec![node];
                        frame.state = SectionState::AfterKey;
                    }
                    SectionState::AfterMapping => {
                        frame.keys.push(node);
                        frame.state = SectionState::AfterKey;
                    }
                    SectionState::AfterKey => {
                        let keys = mem::take(&mut frame.keys);
                        assign(&mut frame.body, keys.into_iter(), node);
                        frame.state = SectionState::BuildingOwnKeys;
                    }
                }
            }
            Event::Comment { span, text } => {
                if let Some(frame) = &self.section
                    && matches!(
                        frame.state,
                        SectionState::AfterKey | SectionState::AfterMapping
                    )
                {
                    return Err(unexpected("comment inside an entry", Some(span)));
                }
                self.pending_comments.push(text.into_owned());
            }
        }
        Ok(())
    }

    fn document_mut(&mut self, span: Span) -> Result<&mut Node, Error> {
        self.document
            .as_mut()
            .ok_or_else(|| unexpected("event before the document start", Some(span)))
    }

    fn frame(&mut self, span: Span, what: &str) -> Result<&mut SectionFrame, Error> {
        self.section
            .as_mut()
            .ok_or_else(|| unexpected(&format!("{what} outside of a section"), Some(span)))
    }

    fn take_comment(&mut self) -> Option<String> {
        if self.pending_comments.is_empty() {
            return None;
        }
        let comment = self.pending_comments.join("\n");
        self.pending_comments.clear();
        Some(comment)
    }

    /// Fold the finished section into the document.
    fn close_section(&mut self) -> Result<(), Error> {
        let Some(frame) = self.section.take() else {
            return Ok(());
        };
        let SectionFrame {
            name,
            body,
            parent,
            state,
            keys,
        } = frame;

        if matches!(state, SectionState::AfterKey | SectionState::AfterMapping) {
            let span = keys.last().and_then(|key| key.span);
            return Err(unexpected("key without a value", span));
        }

        let span = name.span.unwrap_or_default();
        let document = self.document_mut(span)?;

        let position = document.position(&name.value);
        let mut body = match position {
            Some(i) => {
                debug!(section = %name.value, "Section declared again, merging into earlier body");
                if name.comment.is_some() {
                    document.children[i].comment = name.comment.clone();
                }
                let mut earlier = mem::replace(&mut document.children[i + 1], Node::section_body());
                overwrite(&mut earlier, body);
                earlier
            }
            None => body,
        };

        if let Some((parent, span)) = parent {
            match document.child(&parent) {
                Some(source) => {
                    debug!(section = %name.value, parent = %parent, "Inheriting keys");
                    inherit(&mut body, source);
                }
                None if parent == DEFAULT_SECTION => {}
                None => return Err(Error::new(ErrorKind::InheritNotFound(parent), Some(span))),
            }
            body.inherit = Some(parent);
        }

        debug!(section = %name.value, keys = body.len(), "Section closed");
        match position {
            Some(i) => document.children[i + 1] = body,
            None => {
                document.children.push(name);
                document.children.push(body);
            }
        }
        Ok(())
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected(msg: &str, span: Option<Span>) -> Error {
    Error::new(ErrorKind::UnexpectedEvent(msg.to_owned()), span)
}

/// Assign `value` at the key path `keys` within one section.
///
/// The last segment overwrites in place. Intermediate segments descend into
/// existing mappings; a non-mapping in the way is replaced by a new mapping.
fn assign(target: &mut Node, mut keys: std::vec::IntoIter<Node>, value: Node) {
    let Some(key) = keys.next() else {
        return;
    };
    if keys.len() == 0 {
        target.insert(key, value);
        return;
    }

    let index = match target.position(&key.value) {
        Some(i) if target.children[i + 1].is_mapping() => {
            if key.comment.is_some() {
                target.children[i].comment = key.comment;
            }
            i + 1
        }
        existing => {
            if existing.is_some() {
                debug!(key = %key.value, "Value replaced by a mapping");
            }
            let mut mapping = Node::mapping();
            mapping.span = key.span;
            target.insert(key, mapping)
        }
    };
    assign(&mut target.children[index], keys, value);
}

/// Apply the pairs of a later declaration of a section to its earlier body.
fn overwrite(target: &mut Node, source: Node) {
    let mut children = source.children.into_iter();
    while let (Some(key), Some(value)) = (children.next(), children.next()) {
        match target.position(&key.value) {
            Some(i) if value.is_mapping() && target.children[i + 1].is_mapping() => {
                if key.comment.is_some() {
                    target.children[i].comment = key.comment;
                }
                overwrite(&mut target.children[i + 1], value);
            }
            _ => {
                target.insert(key, value);
            }
        }
    }
}

/// Copy every pair of `parent` that `child` lacks; recurse where both hold
/// mappings. Existing child values are never replaced.
fn inherit(child: &mut Node, parent: &Node) {
    for (key, value) in parent.pairs() {
        match child.position(&key.value) {
            Some(i) => {
                if value.is_mapping() && child.children[i + 1].is_mapping() {
                    inherit(&mut child.children[i + 1], value);
                }
            }
            None => {
                child.children.push(key.clone());
                child.children.push(value.clone());
            }
        }
    }
}
