//! Scanner for tini documents.

use std::borrow::Cow;
use std::collections::VecDeque;

use tracing::trace;

use crate::reader;
use crate::{Mark, ScalarStyle, ScanError, ScanErrorKind, Span, Token, TokenKind};

/// A scanner that produces tokens from tini source text.
///
/// The scanner queues the tokens of one construct at a time (a whole section
/// header, or every segment of a dotted key) and hands them out with one
/// token of lookahead.
#[derive(Clone)]
pub struct Scanner<'src> {
    /// The source text being scanned.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current position.
    mark: Mark,

    /// Tokens scanned but not yet handed out.
    tokens: VecDeque<Token<'src>>,
    document_start_produced: bool,
    document_end_produced: bool,
    /// Set once an error has been returned; the scanner yields nothing after.
    failed: bool,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner for already-decoded text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            mark: Mark::default(),
            tokens: VecDeque::new(),
            document_start_produced: false,
            document_end_produced: false,
            failed: false,
        }
    }

    /// Validate `bytes` and create a scanner over them.
    pub fn from_bytes(bytes: &'src [u8]) -> Result<Self, ScanError> {
        Ok(Self::new(reader::decode(bytes)?))
    }

    /// The source text being scanned.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// The current position.
    #[inline]
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Look at the next token without consuming it.
    ///
    /// Returns `None` once [`TokenKind::DocumentEnd`] has been consumed.
    pub fn peek_token(&mut self) -> Result<Option<&Token<'src>>, ScanError> {
        self.fill()?;
        Ok(self.tokens.front())
    }

    /// Consume the next token.
    pub fn next_token(&mut self) -> Result<Option<Token<'src>>, ScanError> {
        self.fill()?;
        Ok(self.tokens.pop_front())
    }

    fn fill(&mut self) -> Result<(), ScanError> {
        if self.failed {
            return Ok(());
        }
        while self.tokens.is_empty() && !self.document_end_produced {
            if let Err(err) = self.fetch_next_token() {
                trace!("Scan error at {:?}: {}", err.mark, err);
                self.failed = true;
                self.tokens.clear();
                return Err(err);
            }
        }
        Ok(())
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Peek at the nth character (0-indexed) without consuming.
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    /// Advance by one character on the current line and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.mark.index += c.len_utf8();
        self.mark.column += 1;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Consume one line break (`\r\n` counts as one).
    fn skip_line(&mut self) {
        let width = match self.peek() {
            Some('\r') if self.peek_nth(1) == Some('\n') => 2,
            Some(c) if is_break(c) => c.len_utf8(),
            _ => return,
        };
        self.mark.index += width;
        self.mark.line += 1;
        self.mark.column = 0;
        self.remaining = &self.remaining[width..];
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(c) if is_blank(c)) {
            self.advance();
        }
    }

    fn push(&mut self, token: Token<'src>) {
        trace!(
            "Token {:?} at {}:{}: {:?}",
            token.kind, token.span.start.line, token.span.start.column, token.value
        );
        self.tokens.push_back(token);
    }

    fn push_structural(&mut self, kind: TokenKind, start: Mark) {
        self.push(Token::new(kind, Span::new(start, self.mark)));
    }

    fn error<T>(&self, kind: ScanErrorKind, mark: Mark) -> Result<T, ScanError> {
        Err(ScanError::new(kind, mark))
    }

    fn fetch_next_token(&mut self) -> Result<(), ScanError> {
        if !self.document_start_produced {
            self.document_start_produced = true;
            self.push_structural(TokenKind::DocumentStart, self.mark);
            return Ok(());
        }

        self.scan_to_next_token();
        if !self.tokens.is_empty() {
            // A comment was queued; hand it out before scanning further.
            return Ok(());
        }

        if self.is_eof() {
            self.document_end_produced = true;
            self.push_structural(TokenKind::DocumentEnd, self.mark);
            return Ok(());
        }

        match self.peek() {
            Some('[') if self.mark.column == 0 => self.fetch_section_header(),
            Some('=') => self.fetch_value(),
            _ => self.fetch_key(),
        }
    }

    /// Skip blanks and line breaks, queueing at most one comment.
    fn scan_to_next_token(&mut self) {
        loop {
            self.skip_blanks();
            match self.peek() {
                Some('#' | ';') => {
                    self.scan_comment();
                    return;
                }
                Some(c) if is_break(c) => self.skip_line(),
                _ => return,
            }
        }
    }

    fn scan_comment(&mut self) {
        let start = self.mark;
        self.advance();
        let text_start = self.mark.index;
        while matches!(self.peek(), Some(c) if !is_break(c)) {
            self.advance();
        }
        let text = self.source[text_start..self.mark.index].trim();
        self.push(Token::comment(Span::new(start, self.mark), text));
    }

    /// Scan `[name]` or `[name:parent]` up to the end of the header line.
    fn fetch_section_header(&mut self) -> Result<(), ScanError> {
        let start = self.mark;
        self.advance();
        self.push_structural(TokenKind::SectionStart, start);

        self.skip_blanks();
        let name = self.scan_section_name()?;
        if name.value.is_empty() {
            return self.error(ScanErrorKind::EmptySectionName, name.span.start);
        }
        self.push(name);

        self.skip_blanks();
        if self.peek() == Some(':') {
            let colon = self.mark;
            self.advance();
            self.push_structural(TokenKind::SectionInherit, colon);
            self.skip_blanks();
            let parent = self.scan_section_name()?;
            self.push(parent);
            self.skip_blanks();
        }

        if self.peek() != Some(']') {
            return self.error(ScanErrorKind::UnterminatedSection, self.mark);
        }
        let close = self.mark;
        self.advance();
        self.push_structural(TokenKind::SectionEntry, close);

        self.skip_blanks();
        match self.peek() {
            None | Some('#' | ';') => Ok(()),
            Some(c) if is_break(c) => Ok(()),
            Some(c) => self.error(ScanErrorKind::MissingLineBreak(c), self.mark),
        }
    }

    fn scan_section_name(&mut self) -> Result<Token<'src>, ScanError> {
        let start = self.mark;
        while let Some(c) = self.peek() {
            if is_section_char(c) {
                self.advance();
            } else if matches!(c, ':' | ']') || is_blank(c) || is_break(c) {
                break;
            } else {
                return self.error(ScanErrorKind::InvalidSectionName(c), self.mark);
            }
        }
        let value = &self.source[start.index..self.mark.index];
        Ok(Token::scalar(
            Span::new(start, self.mark),
            Cow::Borrowed(value),
            ScalarStyle::Plain,
        ))
    }

    /// Scan a key: segments separated by `.`, each plain or quoted, followed
    /// by the `=` on the same line. Blanks around a `.` belong to no segment.
    fn fetch_key(&mut self) -> Result<(), ScanError> {
        let mut first = true;
        loop {
            let segment = self.scan_key_segment(first)?;
            self.push(Token::new(TokenKind::Key, Span::empty(segment.span.start)));
            self.push(segment);

            self.skip_blanks();
            match self.peek() {
                Some('.') => {
                    let dot = self.mark;
                    self.advance();
                    self.push_structural(TokenKind::Map, dot);
                    self.skip_blanks();
                    first = false;
                }
                Some('=') => return Ok(()),
                Some(c) if !is_break(c) => {
                    return self.error(ScanErrorKind::MissingValueIndicator(Some(c)), self.mark);
                }
                _ => return self.error(ScanErrorKind::MissingValueIndicator(None), self.mark),
            }
        }
    }

    /// One key segment. A quoted segment is literal: it may hold `.`, `=`
    /// and blanks. Only the first segment of a key needs a key-start
    /// character.
    fn scan_key_segment(&mut self, first: bool) -> Result<Token<'src>, ScanError> {
        let start = self.mark;

        if let Some(quote @ ('\'' | '"')) = self.peek() {
            if first {
                match self.peek_nth(1) {
                    Some(c) if is_key_start(c) => {}
                    Some(c) if c == quote => {
                        return self.error(ScanErrorKind::InvalidKeyStart(None), start);
                    }
                    other => return self.error(ScanErrorKind::InvalidKeyStart(other), start),
                }
            }
            let segment = self.scan_quoted_scalar()?;
            if segment.value.is_empty() {
                return self.error(ScanErrorKind::EmptyKey, start);
            }
            return Ok(segment);
        }

        if first {
            match self.peek() {
                Some(c) if is_key_start(c) => {}
                other => return self.error(ScanErrorKind::InvalidKeyStart(other), start),
            }
        }

        let mut end = start;
        while let Some(c) = self.peek() {
            if matches!(c, '.' | '=') || is_break(c) {
                break;
            }
            self.advance();
            if !is_blank(c) {
                end = self.mark;
            }
        }
        if end.index == start.index {
            return self.error(ScanErrorKind::EmptyKey, start);
        }
        Ok(Token::scalar(
            Span::new(start, end),
            Cow::Borrowed(&self.source[start.index..end.index]),
            ScalarStyle::Plain,
        ))
    }

    /// Scan `=` and the value that follows it on the same line.
    fn fetch_value(&mut self) -> Result<(), ScanError> {
        let start = self.mark;
        self.advance();
        self.push_structural(TokenKind::Value, start);
        self.skip_blanks();

        if matches!(self.peek(), Some('\'' | '"')) {
            let scalar = self.scan_quoted_scalar()?;
            self.push(scalar);
            self.skip_blanks();
            return match self.peek() {
                None | Some('#' | ';') => Ok(()),
                Some(c) if is_break(c) => Ok(()),
                Some(c) => self.error(ScanErrorKind::TrailingContent(c), self.mark),
            };
        }

        let value = self.scan_plain_value();
        self.push(value);
        Ok(())
    }

    /// A plain value runs to the end of the line, or to a `#`/`;` that opens
    /// the value or follows a blank.
    fn scan_plain_value(&mut self) -> Token<'src> {
        let start = self.mark;
        let mut end = self.mark;
        let mut after_blank = true;
        while let Some(c) = self.peek() {
            if is_break(c) || (after_blank && matches!(c, '#' | ';')) {
                break;
            }
            self.advance();
            after_blank = is_blank(c);
            if !after_blank {
                end = self.mark;
            }
        }
        let value = &self.source[start.index..end.index];
        Token::scalar(
            Span::new(start, end),
            Cow::Borrowed(value),
            ScalarStyle::Plain,
        )
    }

    /// Scan a single- or double-quoted scalar, starting at the opening quote.
    fn scan_quoted_scalar(&mut self) -> Result<Token<'src>, ScanError> {
        let start = self.mark;
        let Some(quote) = self.advance() else {
            return self.error(ScanErrorKind::UnterminatedQuoted, start);
        };
        let single = quote == '\'';
        let content_start = self.mark.index;
        let mut owned: Option<String> = None;

        loop {
            match self.peek() {
                None => return self.error(ScanErrorKind::UnterminatedQuoted, start),
                Some(c) if is_break(c) => {
                    return self.error(ScanErrorKind::UnterminatedQuoted, start);
                }
                Some(c) if c == quote => {
                    if self.peek_nth(1) == Some(quote) {
                        let buf = owned.get_or_insert_with(|| {
                            self.source[content_start..self.mark.index].to_owned()
                        });
                        buf.push(quote);
                        self.advance();
                        self.advance();
                        continue;
                    }
                    let end_of_content = self.mark.index;
                    self.advance();
                    let value = match owned {
                        Some(buf) => Cow::Owned(buf),
                        None => Cow::Borrowed(&self.source[content_start..end_of_content]),
                    };
                    let style = if single {
                        ScalarStyle::SingleQuoted
                    } else {
                        ScalarStyle::DoubleQuoted
                    };
                    return Ok(Token::scalar(Span::new(start, self.mark), value, style));
                }
                Some('\\') if !single => {
                    if owned.is_none() {
                        owned = Some(self.source[content_start..self.mark.index].to_owned());
                    }
                    let escape_mark = self.mark;
                    self.advance();
                    match self.peek() {
                        None => return self.error(ScanErrorKind::UnterminatedQuoted, start),
                        Some(b) if is_break(b) => {
                            // Line continuation: drop the break and the next line's indent.
                            self.skip_line();
                            self.skip_blanks();
                        }
                        Some(e) => {
                            self.advance();
                            let unescaped = match e {
                                '0' => '\0',
                                'a' => '\x07',
                                'b' => '\x08',
                                't' | '\t' => '\t',
                                'n' => '\n',
                                'v' => '\x0B',
                                'f' => '\x0C',
                                'r' => '\r',
                                'e' => '\x1B',
                                ' ' => ' ',
                                '"' => '"',
                                '\'' => '\'',
                                '\\' => '\\',
                                'N' => '\u{85}',
                                '_' => '\u{A0}',
                                'L' => '\u{2028}',
                                'P' => '\u{2029}',
                                'x' => self.scan_hex_escape(2)?,
                                'u' => self.scan_hex_escape(4)?,
                                'U' => self.scan_hex_escape(8)?,
                                other => {
                                    return self
                                        .error(ScanErrorKind::UnknownEscape(other), escape_mark);
                                }
                            };
                            if let Some(buf) = owned.as_mut() {
                                buf.push(unescaped);
                            }
                        }
                    }
                }
                Some(c) => {
                    self.advance();
                    if let Some(buf) = owned.as_mut() {
                        buf.push(c);
                    }
                }
            }
        }
    }

    fn scan_hex_escape(&mut self, digits: usize) -> Result<char, ScanError> {
        let start = self.mark;
        let mut value: u32 = 0;
        for _ in 0..digits {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    self.advance();
                    value = (value << 4) | d;
                }
                None => return self.error(ScanErrorKind::InvalidHexDigit, self.mark),
            }
        }
        char::from_u32(value).ok_or(ScanError::new(
            ScanErrorKind::InvalidEscapeCode(value),
            start,
        ))
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Result<Token<'src>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[inline]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[inline]
fn is_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[inline]
fn is_section_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Whether `c` may be the first character of a key.
pub fn is_key_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-'
}
