//! Event types for the tini parser.

use std::borrow::Cow;
use std::fmt;

use crate::{ScalarStyle, Span};

/// Events emitted by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'src> {
    /// Start of document.
    DocumentStart {
        /// Empty span at the start of input.
        span: Span,
    },
    /// End of document.
    DocumentEnd {
        /// Empty span at the end of input.
        span: Span,
    },

    /// Start of a section.
    ///
    /// Keys before the first header belong to a synthesized `default`
    /// section whose span is empty.
    SectionEntry {
        /// Span of the section name.
        span: Span,
        /// Section name.
        name: Cow<'src, str>,
    },
    /// The section just entered extends `parent`.
    SectionInherit {
        /// Span of the parent name.
        span: Span,
        /// Parent section name (`default` when left empty).
        parent: Cow<'src, str>,
    },

    /// The preceding key holds a mapping; the next scalar is a key inside it.
    Mapping {
        /// Span of the `.` separator.
        span: Span,
    },

    /// A key segment or a value.
    Scalar {
        /// Span of the scalar, quotes included.
        span: Span,
        /// Value after escape processing.
        value: Cow<'src, str>,
        /// How the scalar was written.
        style: ScalarStyle,
        /// Explicit type tag. `None` means the type is inferred from the text.
        tag: Option<Tag>,
    },

    /// A `#` or `;` comment line.
    Comment {
        /// Span of the comment, marker included.
        span: Span,
        /// Comment text without the marker.
        text: Cow<'src, str>,
    },
}

impl Event<'_> {
    /// Span of this event.
    pub fn span(&self) -> Span {
        match self {
            Event::DocumentStart { span }
            | Event::DocumentEnd { span }
            | Event::SectionEntry { span, .. }
            | Event::SectionInherit { span, .. }
            | Event::Mapping { span }
            | Event::Scalar { span, .. }
            | Event::Comment { span, .. } => *span,
        }
    }

    /// Short name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Event::DocumentStart { .. } => "document start",
            Event::DocumentEnd { .. } => "document end",
            Event::SectionEntry { .. } => "section entry",
            Event::SectionInherit { .. } => "section inherit",
            Event::Mapping { .. } => "mapping",
            Event::Scalar { .. } => "scalar",
            Event::Comment { .. } => "comment",
        }
    }
}

/// Type hint attached to a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `!!null`
    Null,
    /// `!!bool`
    Bool,
    /// `!!int`
    Int,
    /// `!!float`
    Float,
    /// `!!str`
    Str,
    /// `!!binary`
    Binary,
}

impl Tag {
    /// The tag in `!!name` form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Null => "!!null",
            Tag::Bool => "!!bool",
            Tag::Int => "!!int",
            Tag::Float => "!!float",
            Tag::Str => "!!str",
            Tag::Binary => "!!binary",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
