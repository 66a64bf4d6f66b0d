//! Position tracking for source locations.

/// A position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mark {
    /// Byte offset from the start of the input.
    pub index: usize,
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based column, counted in characters.
    pub column: usize,
}

impl Mark {
    /// Create a new mark.
    #[inline]
    pub fn new(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
        }
    }
}

/// A range in the source text, delimited by two marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start of the range (inclusive).
    pub start: Mark,
    /// End of the range (exclusive).
    pub end: Mark,
}

impl Span {
    /// Create a new span from start and end marks.
    #[inline]
    pub fn new(start: Mark, end: Mark) -> Self {
        debug_assert!(start.index <= end.index);
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub fn empty(mark: Mark) -> Self {
        Self {
            start: mark,
            end: mark,
        }
    }

    /// Length of this span in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.index - self.start.index
    }

    /// Whether this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.index == self.end.index
    }

    /// Extend this span to include another span.
    #[inline]
    pub fn extend(&self, other: Span) -> Span {
        let start = if other.start.index < self.start.index {
            other.start
        } else {
            self.start
        };
        let end = if other.end.index > self.end.index {
            other.end
        } else {
            self.end
        };
        Span { start, end }
    }

    /// Get the source text for this span.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start.index..self.end.index]
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start.index..span.end.index
    }
}
