//! Scalar handling for tini output.
//!
//! Decides whether a value or key can be written plain, and escapes string
//! content for the two quoted forms.

use std::borrow::Cow;
use std::fmt::Write as _;

use tini_tokenizer::is_key_start;
use tini_tokenizer::reader::is_printable;
use tini_tree::resolve::{Resolved, resolve};

use crate::QuoteStyle;

/// Check if a string can be written as a plain value and still read back
/// as the same string.
///
/// A plain value is valid when:
/// 1. It survives plain scanning unchanged (see [`survives_plain`])
/// 2. It does not resolve to another type (`42`, `true`, `~`, the empty string)
pub fn can_be_plain(s: &str) -> bool {
    survives_plain(s) && matches!(resolve(None, s), Ok(Resolved::Str(_)))
}

/// Check if a plain value reads back as exactly `s`, ignoring its type.
///
/// Fails for leading or trailing blanks, a leading quote, line breaks,
/// non-printable characters, and a `#` or `;` that would start a comment.
pub(crate) fn survives_plain(s: &str) -> bool {
    if s.starts_with(['\'', '"']) || s.starts_with(is_blank) || s.ends_with(is_blank) {
        return false;
    }
    let mut after_blank = true;
    for c in s.chars() {
        if is_break(c) || !is_printable(c as u32) || (after_blank && matches!(c, '#' | ';')) {
            return false;
        }
        after_blank = is_blank(c);
    }
    true
}

/// Check if a string can be written as an unquoted key.
pub fn can_be_plain_key(s: &str) -> bool {
    is_plain_segment(s, true)
}

/// Check if `s` can be one `.`-separated segment of a plain key. Only the
/// first segment of a key needs a key-start character.
pub(crate) fn is_plain_segment(s: &str, first: bool) -> bool {
    let Some(c) = s.chars().next() else {
        return false;
    };
    if first && !is_key_start(c) {
        return false;
    }
    !s.starts_with(is_blank)
        && !s.starts_with(['\'', '"'])
        && !s.ends_with(is_blank)
        && !s
            .chars()
            .any(|c| matches!(c, '.' | '=') || is_break(c) || !is_printable(c as u32))
}

/// Escape a string for double-quoted output.
///
/// Returns the escaped content (without surrounding quotes).
pub fn escape_double_quoted(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\0' => result.push_str("\\0"),
            '\x07' => result.push_str("\\a"),
            '\x08' => result.push_str("\\b"),
            '\t' => result.push_str("\\t"),
            '\n' => result.push_str("\\n"),
            '\x0B' => result.push_str("\\v"),
            '\x0C' => result.push_str("\\f"),
            '\r' => result.push_str("\\r"),
            '\x1B' => result.push_str("\\e"),
            '\u{85}' => result.push_str("\\N"),
            '\u{2028}' => result.push_str("\\L"),
            '\u{2029}' => result.push_str("\\P"),
            c if !is_printable(c as u32) => {
                let code = c as u32;
                let _ = match code {
                    0..=0xFF => write!(result, "\\x{code:02X}"),
                    0x100..=0xFFFF => write!(result, "\\u{code:04X}"),
                    _ => write!(result, "\\U{code:08X}"),
                };
            }
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape a string for single-quoted output.
///
/// Returns `None` when the string holds something a single-quoted scalar
/// cannot carry: line breaks or non-printable characters.
pub fn escape_single_quoted(s: &str) -> Option<Cow<'_, str>> {
    if s.chars().any(|c| is_break(c) || !is_printable(c as u32)) {
        return None;
    }
    if !s.contains('\'') {
        return Some(Cow::Borrowed(s));
    }
    Some(Cow::Owned(s.replace('\'', "''")))
}

/// Quote `s` in the preferred style, falling back to double quotes.
pub fn quote(s: &str, style: QuoteStyle) -> String {
    if style == QuoteStyle::Single
        && let Some(escaped) = escape_single_quoted(s)
    {
        return format!("'{escaped}'");
    }
    format!("\"{}\"", escape_double_quoted(s))
}

fn needs_escape(c: char) -> bool {
    matches!(c, '"' | '\\' | '\t') || is_break(c) || !is_printable(c as u32)
}

#[inline]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[inline]
fn is_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}
