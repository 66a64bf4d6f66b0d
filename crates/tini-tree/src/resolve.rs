//! Scalar type resolution.
//!
//! Plain scalars carry no tag and are classified by their text: null, bool,
//! int, float, or string. Quoted scalars carry the `!!str` tag and are always
//! strings. An explicit tag restricts resolution to that type.

use std::fmt;

use tini_parse::Tag;

use crate::NodeKind;

/// The typed value of a scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    /// `~`, `null`, or empty text.
    Null,
    /// `true`, `yes`, `on`, ...
    Bool(bool),
    /// An integer that fits `i64`.
    Int(i64),
    /// A positive integer above `i64::MAX`.
    Uint(u64),
    /// A float, including `.inf` and `.nan`.
    Float(f64),
    /// Anything else.
    Str(&'a str),
}

impl Resolved<'_> {
    /// The tag this value resolves to.
    pub fn tag(&self) -> Tag {
        match self {
            Resolved::Null => Tag::Null,
            Resolved::Bool(_) => Tag::Bool,
            Resolved::Int(_) | Resolved::Uint(_) => Tag::Int,
            Resolved::Float(_) => Tag::Float,
            Resolved::Str(_) => Tag::Str,
        }
    }
}

/// A scalar could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The text does not satisfy the explicit tag.
    TagMismatch {
        /// The explicit tag.
        tag: Tag,
        /// The scalar text.
        value: String,
    },
    /// Only scalars resolve.
    NotScalar(NodeKind),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::TagMismatch { tag, value } => {
                write!(f, "cannot decode {value:?} as a {tag} value")
            }
            ResolveError::NotScalar(kind) => write!(f, "cannot resolve a {kind:?} node"),
        }
    }
}

impl std::error::Error for ResolveError {}

const TRUE: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON",
];
const FALSE: &[&str] = &[
    "n", "N", "no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF",
];
const NULL: &[&str] = &["", "~", "null", "Null", "NULL"];
const NAN: &[&str] = &[".nan", ".NaN", ".NAN"];
const INF: &[&str] = &[".inf", ".Inf", ".INF", "+.inf", "+.Inf", "+.INF"];
const NEG_INF: &[&str] = &["-.inf", "-.Inf", "-.INF"];

/// Resolve `text` under an optional explicit tag.
pub fn resolve(tag: Option<Tag>, text: &str) -> Result<Resolved<'_>, ResolveError> {
    let mismatch = |tag| ResolveError::TagMismatch {
        tag,
        value: text.to_owned(),
    };
    match tag {
        None => Ok(infer(text)),
        Some(Tag::Str | Tag::Binary) => Ok(Resolved::Str(text)),
        Some(Tag::Null) => NULL
            .contains(&text)
            .then_some(Resolved::Null)
            .ok_or_else(|| mismatch(Tag::Null)),
        Some(Tag::Bool) => resolve_bool(text).ok_or_else(|| mismatch(Tag::Bool)),
        Some(Tag::Int) => resolve_int(text).ok_or_else(|| mismatch(Tag::Int)),
        Some(Tag::Float) => match resolve_int(text) {
            Some(Resolved::Int(v)) => Ok(Resolved::Float(v as f64)),
            Some(Resolved::Uint(v)) => Ok(Resolved::Float(v as f64)),
            _ => resolve_float(text).ok_or_else(|| mismatch(Tag::Float)),
        },
    }
}

fn infer(text: &str) -> Resolved<'_> {
    if NULL.contains(&text) {
        return Resolved::Null;
    }
    resolve_bool(text)
        .or_else(|| resolve_int(text))
        .or_else(|| resolve_float(text))
        .unwrap_or(Resolved::Str(text))
}

fn resolve_bool(text: &str) -> Option<Resolved<'static>> {
    if TRUE.contains(&text) {
        Some(Resolved::Bool(true))
    } else if FALSE.contains(&text) {
        Some(Resolved::Bool(false))
    } else {
        None
    }
}

/// Integers: optional sign, `_` separators, and `0x`/`0o`/`0b` or
/// leading-zero octal forms.
fn resolve_int(text: &str) -> Option<Resolved<'static>> {
    let plain = text.replace('_', "");
    let (negative, unsigned) = match plain.as_bytes().first()? {
        b'-' => (true, &plain[1..]),
        b'+' => (false, &plain[1..]),
        _ => (false, plain.as_str()),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(oct) = unsigned.strip_prefix("0o") {
        (8, oct)
    } else if let Some(bin) = unsigned.strip_prefix("0b") {
        (2, bin)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // from_str_radix accepts a sign of its own.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, radix).ok()?;

    if negative {
        if magnitude <= i64::MAX as u64 + 1 {
            Some(Resolved::Int((magnitude as i64).wrapping_neg()))
        } else {
            None
        }
    } else if let Ok(v) = i64::try_from(magnitude) {
        Some(Resolved::Int(v))
    } else {
        Some(Resolved::Uint(magnitude))
    }
}

fn resolve_float(text: &str) -> Option<Resolved<'static>> {
    if NAN.contains(&text) {
        return Some(Resolved::Float(f64::NAN));
    }
    if INF.contains(&text) {
        return Some(Resolved::Float(f64::INFINITY));
    }
    if NEG_INF.contains(&text) {
        return Some(Resolved::Float(f64::NEG_INFINITY));
    }
    let plain = text.replace('_', "");
    if !is_float_syntax(&plain) {
        return None;
    }
    plain.parse().ok().map(Resolved::Float)
}

/// `[-+]?[0-9]*\.?[0-9]+([eE][-+][0-9]+)?`
fn is_float_syntax(text: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(i) => (&unsigned[..i], Some(&unsigned[i + 1..])),
        None => (unsigned, None),
    };

    if let Some(exponent) = exponent {
        match exponent.strip_prefix(['-', '+']) {
            Some(digits) if all_digits(digits) => {}
            _ => return false,
        }
    }

    match mantissa.split_once('.') {
        Some((whole, fraction)) => {
            (whole.is_empty() || all_digits(whole)) && all_digits(fraction)
        }
        None => all_digits(mantissa),
    }
}
