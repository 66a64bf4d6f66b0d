//! Formatting options for tini output.

/// Which quote character to use when a string cannot be written plain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `"..."`, with backslash escapes.
    #[default]
    Double,
    /// `'...'`, with `''` for a literal quote. Strings holding line breaks
    /// or non-printable characters still fall back to double quotes.
    Single,
}

/// Options for tini output.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Write `key = value` instead of `key=value`.
    pub spaced_equals: bool,

    /// Quote character for strings that need quoting.
    pub quote_style: QuoteStyle,

    /// Separate sections with an empty line.
    pub blank_line_between_sections: bool,

    /// Write comments attached to sections and keys.
    pub emit_comments: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            spaced_equals: true,
            quote_style: QuoteStyle::Double,
            blank_line_between_sections: true,
            emit_comments: true,
        }
    }
}

impl FormatOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// `key=value`, no blank lines between sections.
    pub fn compact(mut self) -> Self {
        self.spaced_equals = false;
        self.blank_line_between_sections = false;
        self
    }

    /// Set the preferred quote character.
    pub fn quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    /// Drop comments from the output.
    pub fn without_comments(mut self) -> Self {
        self.emit_comments = false;
        self
    }
}
