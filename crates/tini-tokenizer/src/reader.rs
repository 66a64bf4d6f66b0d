//! Input validation.
//!
//! Documents are read as raw bytes and must be well-formed UTF-8 (RFC 3629)
//! containing only printable characters. A leading byte order mark is
//! dropped; marks produced by the scanner are relative to the text after it.

use crate::{Mark, ReaderError, ReaderErrorKind};

const BOM: char = '\u{FEFF}';

/// Validate `bytes` and return them as text, without a leading BOM.
pub fn decode(bytes: &[u8]) -> Result<&str, ReaderError> {
    let mut pos = 0;
    let mut line = 0;
    let mut column = 0;

    while pos < bytes.len() {
        let mark = Mark::new(pos, line, column);
        let fail = |kind| Err(ReaderError { kind, mark });

        let lead = bytes[pos];
        let (width, mut value) = match lead {
            b if b & 0x80 == 0x00 => (1, u32::from(b)),
            b if b & 0xE0 == 0xC0 => (2, u32::from(b & 0x1F)),
            b if b & 0xF0 == 0xE0 => (3, u32::from(b & 0x0F)),
            b if b & 0xF8 == 0xF0 => (4, u32::from(b & 0x07)),
            b => return fail(ReaderErrorKind::InvalidLeadingOctet(b)),
        };

        if pos + width > bytes.len() {
            return fail(ReaderErrorKind::IncompleteSequence);
        }

        for &octet in &bytes[pos + 1..pos + width] {
            if octet & 0xC0 != 0x80 {
                return fail(ReaderErrorKind::InvalidTrailingOctet(octet));
            }
            value = (value << 6) | u32::from(octet & 0x3F);
        }

        let shortest = match width {
            1 => true,
            2 => value >= 0x80,
            3 => value >= 0x800,
            _ => value >= 0x10000,
        };
        if !shortest {
            return fail(ReaderErrorKind::InvalidLength);
        }

        if (0xD800..=0xDFFF).contains(&value) || value > 0x10FFFF {
            return fail(ReaderErrorKind::InvalidCodePoint(value));
        }

        if !is_printable(value) {
            return fail(ReaderErrorKind::ControlCharacter(value));
        }

        match value {
            // CR LF counts once, on the LF.
            0x0D if bytes.get(pos + 1) == Some(&b'\n') => column += 1,
            0x0A | 0x0D | 0x85 | 0x2028 | 0x2029 => {
                line += 1;
                column = 0;
            }
            _ => column += 1,
        }
        pos += width;
    }

    let text = std::str::from_utf8(bytes).map_err(|err| ReaderError {
        kind: ReaderErrorKind::InvalidLength,
        mark: Mark::new(err.valid_up_to(), line, column),
    })?;
    Ok(text.strip_prefix(BOM).unwrap_or(text))
}

/// Whether a code point may appear in a document.
pub fn is_printable(value: u32) -> bool {
    matches!(
        value,
        0x09 | 0x0A | 0x0D
            | 0x20..=0x7E
            | 0x85
            | 0xA0..=0xD7FF
            | 0xE000..=0xFFFD
            | 0x10000..=0x10FFFF
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn kind(bytes: &[u8]) -> ReaderErrorKind {
        decode(bytes).unwrap_err().kind
    }

    #[test]
    fn test_plain_ascii() {
        assert_eq!(decode(b"a=1\n").unwrap(), "a=1\n");
    }

    #[test]
    fn test_multibyte() {
        assert_eq!(decode("k=é€😀".as_bytes()).unwrap(), "k=é€😀");
    }

    #[test]
    fn test_bom_is_dropped() {
        assert_eq!(decode(b"\xEF\xBB\xBFa=1").unwrap(), "a=1");
    }

    #[test]
    fn test_invalid_leading_octet() {
        assert_eq!(kind(b"a=\xFF"), ReaderErrorKind::InvalidLeadingOctet(0xFF));
        assert_eq!(kind(b"\x80"), ReaderErrorKind::InvalidLeadingOctet(0x80));
    }

    #[test]
    fn test_incomplete_sequence() {
        assert_eq!(kind(b"a=\xE2\x82"), ReaderErrorKind::IncompleteSequence);
    }

    #[test]
    fn test_invalid_trailing_octet() {
        assert_eq!(kind(b"\xC3a"), ReaderErrorKind::InvalidTrailingOctet(b'a'));
    }

    #[test]
    fn test_overlong() {
        assert_eq!(kind(b"\xC0\xAF"), ReaderErrorKind::InvalidLength);
        assert_eq!(kind(b"\xE0\x80\xAF"), ReaderErrorKind::InvalidLength);
    }

    #[test]
    fn test_surrogate() {
        assert_eq!(
            kind(b"\xED\xA0\x80"),
            ReaderErrorKind::InvalidCodePoint(0xD800)
        );
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(kind(b"a=\x01"), ReaderErrorKind::ControlCharacter(0x01));
        assert_eq!(kind(b"a=\x7F"), ReaderErrorKind::ControlCharacter(0x7F));
        assert!(decode(b"a=\t1\r\n").is_ok());
    }

    #[test]
    fn test_error_mark() {
        let err = decode(b"a=1\nbb=\x01").unwrap_err();
        assert_eq!(err.mark, Mark::new(7, 1, 3));

        let err = decode(b"a=1\r\nb=\x01").unwrap_err();
        assert_eq!(err.mark.line, 1);
        assert_eq!(err.mark.column, 2);
    }
}
