//! Durations written as `1h30m`, `250ms` or `1.5s`.
//!
//! Use with `#[serde(with = "serde_tini::duration")]` on a
//! [`std::time::Duration`] field. Plain integers are read as nanoseconds.
//!
//! ```
//! use std::time::Duration;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Retry {
//!     #[serde(with = "serde_tini::duration")]
//!     backoff: Duration,
//! }
//!
//! let retry: Retry = serde_tini::from_str("backoff = 1m30s").unwrap();
//! assert_eq!(retry.backoff, Duration::from_secs(90));
//! assert_eq!(serde_tini::to_string(&retry).unwrap(), "backoff = 1m30s\n");
//! ```

use std::fmt;
use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// Newtype name the tini deserializer recognizes to report malformed
/// durations as type errors.
pub(crate) const NAME: &str = "$serde_tini::Duration";

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A malformed duration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationError {
    input: String,
    reason: &'static str,
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid duration {:?}: {}", self.input, self.reason)
    }
}

impl std::error::Error for DurationError {}

/// Parse a duration: a sequence of decimal numbers, each with an optional
/// fraction and a unit (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`). A lone `0`
/// needs no unit.
pub fn parse(input: &str) -> Result<Duration, DurationError> {
    let err = |reason| DurationError {
        input: input.to_owned(),
        reason,
    };

    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if let Some(negative) = rest.strip_prefix('-') {
        if negative.trim_start_matches('0').is_empty() && !negative.is_empty() {
            return Ok(Duration::ZERO);
        }
        return Err(err("negative durations are not supported"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(err("empty"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after) = rest.split_at(int_len);
        let (frac_part, after) = match after.strip_prefix('.') {
            Some(after) => {
                let len = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
                after.split_at(len)
            }
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err("expected a number"));
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            "" => return Err(err("missing unit")),
            _ => return Err(err("unknown unit")),
        };

        let int: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err("out of range"))?
        };
        let mut nanos = int.checked_mul(scale).ok_or_else(|| err("out of range"))?;

        // Digits beyond nanosecond precision of the largest unit add nothing.
        let frac_part = &frac_part[..frac_part.len().min(13)];
        if !frac_part.is_empty() {
            let frac: u128 = frac_part.parse().map_err(|_| err("out of range"))?;
            nanos += frac * scale / 10u128.pow(frac_part.len() as u32);
        }

        total = total.checked_add(nanos).ok_or_else(|| err("out of range"))?;
        rest = after;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| err("out of range"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Format a duration the way [`parse`] reads it: `1h30m0s`, `1.5s`,
/// `250ms`, `0s`.
pub fn format(duration: Duration) -> String {
    let total = duration.as_nanos();
    if total == 0 {
        return "0s".to_owned();
    }
    if total < 1_000 {
        return format!("{total}ns");
    }
    if total < 1_000_000 {
        return format!("{}\u{b5}s", decimal(total, 3));
    }
    if total < NANOS_PER_SEC {
        return format!("{}ms", decimal(total, 6));
    }

    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
    let seconds = decimal(
        u128::from(seconds) * NANOS_PER_SEC + u128::from(duration.subsec_nanos()),
        9,
    );
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, m) => format!("{m}m{seconds}s"),
        (h, m) => format!("{h}h{m}m{seconds}s"),
    }
}

/// `value / 10^places` with trailing fraction zeros removed.
fn decimal(value: u128, places: u32) -> String {
    let unit = 10u128.pow(places);
    let (int, frac) = (value / unit, value % unit);
    if frac == 0 {
        return int.to_string();
    }
    let frac = format!("{frac:0width$}", width = places as usize);
    format!("{int}.{}", frac.trim_end_matches('0'))
}

/// Serialize a duration as a string.
pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*duration))
}

/// Deserialize a duration from a string or from integer nanoseconds.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    deserializer.deserialize_newtype_struct(NAME, DurationVisitor)
}

struct DurationVisitor;

impl<'de> Visitor<'de> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as `1h30m` or integer nanoseconds")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
        Ok(Duration::from_nanos(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
        u64::try_from(v)
            .map(Duration::from_nanos)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
        parse(v).map_err(E::custom)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, d: D) -> Result<Duration, D::Error> {
        d.deserialize_any(self)
    }
}
