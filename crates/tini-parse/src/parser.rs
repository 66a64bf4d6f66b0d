//! Pull-based event parser for tini.

use std::borrow::Cow;
use std::collections::VecDeque;

use crate::{
    DEFAULT_SECTION, Event, ParseError, ParseErrorKind, Scanner, Span, Tag, Token, TokenKind,
};
#[allow(unused_imports)]
use crate::trace;

/// Pull-based event parser for tini documents.
#[derive(Clone)]
pub struct Parser<'src> {
    scanner: Scanner<'src>,
    state: ParserState,
    event_queue: VecDeque<Event<'src>>,
}

/// Parser state machine states, named by what is expected next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Haven't emitted DocumentStart yet.
    DocumentStart,
    /// Before the first section: a bare key opens the `default` section.
    SectionFirstStart,
    /// A key, a section header, or the end of the document.
    SectionKey,
    /// After a key segment: `.` and another segment, or `=` and the value.
    SectionValue,
    /// Document ended.
    End,
}

impl<'src> Parser<'src> {
    /// Create a new parser for already-decoded text.
    pub fn new(source: &'src str) -> Self {
        Self::from_scanner(Scanner::new(source))
    }

    /// Validate `bytes` and create a parser over them.
    pub fn from_bytes(bytes: &'src [u8]) -> Result<Self, ParseError> {
        Ok(Self::from_scanner(Scanner::from_bytes(bytes)?))
    }

    /// Create a parser that pulls tokens from `scanner`.
    pub fn from_scanner(scanner: Scanner<'src>) -> Self {
        Self {
            scanner,
            state: ParserState::DocumentStart,
            event_queue: VecDeque::new(),
        }
    }

    /// The source text being parsed.
    pub fn source(&self) -> &'src str {
        self.scanner.source()
    }

    /// Get the next event from the parser.
    ///
    /// Fails with [`ParseErrorKind::PastDocumentEnd`] once
    /// [`Event::DocumentEnd`] has been returned.
    pub fn next_event(&mut self) -> Result<Event<'src>, ParseError> {
        // Drain queue first
        if let Some(event) = self.event_queue.pop_front() {
            return Ok(event);
        }

        let event = self.advance()?;
        trace!("Event {:?} (state now {:?})", event, self.state);
        Ok(event)
    }

    /// Parse all events into a vector, up to and including `DocumentEnd`.
    pub fn parse_to_vec(mut self) -> Result<Vec<Event<'src>>, ParseError> {
        let mut events = Vec::new();
        loop {
            let event = self.next_event()?;
            let done = matches!(event, Event::DocumentEnd { .. });
            events.push(event);
            if done {
                return Ok(events);
            }
        }
    }

    /// Advance the state machine.
    fn advance(&mut self) -> Result<Event<'src>, ParseError> {
        match self.state {
            ParserState::DocumentStart => {
                let token = self.expect(TokenKind::DocumentStart, "<document-start>")?;
                self.state = ParserState::SectionFirstStart;
                Ok(Event::DocumentStart { span: token.span })
            }
            ParserState::SectionFirstStart => match self.peek_kind()? {
                TokenKind::Key => {
                    let span = Span::empty(self.peek_span()?.start);
                    trace!("Bare key before any header, opening the default section");
                    self.state = ParserState::SectionKey;
                    Ok(Event::SectionEntry {
                        span,
                        name: Cow::Borrowed(DEFAULT_SECTION),
                    })
                }
                _ => self.parse_section_boundary("<key> or <section-start>"),
            },
            ParserState::SectionKey => match self.peek_kind()? {
                TokenKind::Key => {
                    self.next_token()?;
                    let key = self.expect(TokenKind::Scalar, "<scalar>")?;
                    self.state = ParserState::SectionValue;
                    Ok(key_event(key))
                }
                _ => self.parse_section_boundary("<key> or <section-start>"),
            },
            ParserState::SectionValue => match self.peek_kind()? {
                TokenKind::Map => {
                    let map = self.next_token()?;
                    self.expect(TokenKind::Key, "<key>")?;
                    let key = self.expect(TokenKind::Scalar, "<scalar>")?;
                    self.event_queue.push_back(key_event(key));
                    Ok(Event::Mapping { span: map.span })
                }
                TokenKind::Value => {
                    self.next_token()?;
                    let value = self.expect(TokenKind::Scalar, "<scalar>")?;
                    self.state = ParserState::SectionKey;
                    let tag = value.style.is_quoted().then_some(Tag::Str);
                    Ok(Event::Scalar {
                        span: value.span,
                        value: value.value,
                        style: value.style,
                        tag,
                    })
                }
                found => Err(self.unexpected("<value> or <map>", found)),
            },
            ParserState::End => Err(ParseError::new(
                ParseErrorKind::PastDocumentEnd,
                self.scanner.mark(),
            )),
        }
    }

    /// Handle what may appear between entries: comments, section headers and
    /// the end of the document.
    fn parse_section_boundary(
        &mut self,
        expected: &'static str,
    ) -> Result<Event<'src>, ParseError> {
        match self.peek_kind()? {
            TokenKind::Comment => {
                let token = self.next_token()?;
                Ok(Event::Comment {
                    span: token.span,
                    text: token.value,
                })
            }
            TokenKind::SectionStart => self.parse_section_header(),
            TokenKind::DocumentEnd => {
                let token = self.next_token()?;
                self.state = ParserState::End;
                Ok(Event::DocumentEnd { span: token.span })
            }
            found => Err(self.unexpected(expected, found)),
        }
    }

    /// `[` name (`:` parent)? `]`
    fn parse_section_header(&mut self) -> Result<Event<'src>, ParseError> {
        self.expect(TokenKind::SectionStart, "<section-start>")?;
        let name = self.expect(TokenKind::Scalar, "<scalar>")?;

        if self.peek_kind()? == TokenKind::SectionInherit {
            self.next_token()?;
            let parent = self.expect(TokenKind::Scalar, "<scalar>")?;
            let value = if parent.value.is_empty() {
                Cow::Borrowed(DEFAULT_SECTION)
            } else {
                parent.value
            };
            self.event_queue.push_back(Event::SectionInherit {
                span: parent.span,
                parent: value,
            });
        }

        self.expect(TokenKind::SectionEntry, "<section-entry>")?;
        self.state = ParserState::SectionKey;
        Ok(Event::SectionEntry {
            span: name.span,
            name: name.value,
        })
    }

    fn peek_token(&mut self) -> Result<&Token<'src>, ParseError> {
        let mark = self.scanner.mark();
        self.scanner
            .peek_token()?
            .ok_or(ParseError::new(ParseErrorKind::PastDocumentEnd, mark))
    }

    fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        Ok(self.peek_token()?.kind)
    }

    fn peek_span(&mut self) -> Result<Span, ParseError> {
        Ok(self.peek_token()?.span)
    }

    fn next_token(&mut self) -> Result<Token<'src>, ParseError> {
        let mark = self.scanner.mark();
        self.scanner
            .next_token()?
            .ok_or(ParseError::new(ParseErrorKind::PastDocumentEnd, mark))
    }

    /// Consume the next token, which must be of `kind`.
    fn expect(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<Token<'src>, ParseError> {
        let found = self.peek_kind()?;
        if found != kind {
            return Err(self.unexpected(expected, found));
        }
        self.next_token()
    }

    /// Build the error for an unexpected token, positioned at that token.
    fn unexpected(&mut self, expected: &'static str, found: TokenKind) -> ParseError {
        match self.peek_span() {
            Ok(span) => ParseError::new(
                ParseErrorKind::UnexpectedToken { expected, found },
                span.start,
            ),
            Err(err) => err,
        }
    }
}

fn key_event(token: Token<'_>) -> Event<'_> {
    Event::Scalar {
        span: token.span,
        value: token.value,
        style: token.style,
        tag: None,
    }
}

impl<'src> Iterator for Parser<'src> {
    type Item = Result<Event<'src>, ParseError>;

    /// Yields events up to and including `DocumentEnd`, or up to the first
    /// error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ParserState::End && self.event_queue.is_empty() {
            return None;
        }
        let result = self.next_event();
        if result.is_err() {
            self.state = ParserState::End;
            self.event_queue.clear();
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests;
