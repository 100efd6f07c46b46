//! Elapsed-time wrapper with a compact human string codec (`1h30m`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Rejected duration text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The string is not a valid compact duration.
    #[error("invalid duration value: {0:?}")]
    Invalid(String),
}

/// Elapsed time serialized as a compact string instead of a raw integer.
///
/// Accepted input is a sequence of `<number>[.<fraction>]<unit>` groups with units
/// `h`, `m`, `s`, `ms`, `us` (or `µs`) and `ns`, e.g. `1h30m`, `45m`, `1.5s`.
/// Output uses only the `h`, `m` and `s` groups, omitting zero groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(std::time::Duration);

impl Duration {
    /// Zero-length duration.
    pub const ZERO: Self = Self(std::time::Duration::ZERO);

    /// Parses a compact duration string.
    pub fn parse(s: &str) -> Result<Self, DurationError> {
        let invalid = || DurationError::Invalid(s.to_string());

        let mut rest = s.strip_prefix('+').unwrap_or(s);
        if rest == "0" {
            return Ok(Self::ZERO);
        }
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut total: u128 = 0;
        while !rest.is_empty() {
            let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            let (int_part, tail) = rest.split_at(int_len);
            let (frac_part, tail) = match tail.strip_prefix('.') {
                Some(after) => {
                    let frac_len = after.bytes().take_while(u8::is_ascii_digit).count();
                    after.split_at(frac_len)
                }
                None => ("", tail),
            };
            if int_part.is_empty() && frac_part.is_empty() {
                return Err(invalid());
            }

            let unit_len = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_len);
            let scale = unit_nanos(unit).ok_or_else(invalid)?;

            let whole: u128 = if int_part.is_empty() {
                0
            } else {
                int_part.parse().map_err(|_| invalid())?
            };
            let mut frac: u128 = 0;
            let mut step = scale;
            for digit in frac_part.bytes() {
                step /= 10;
                if step == 0 {
                    break;
                }
                frac += u128::from(digit - b'0') * step;
            }

            total = whole
                .checked_mul(scale)
                .and_then(|v| v.checked_add(frac))
                .and_then(|v| v.checked_add(total))
                .ok_or_else(invalid)?;
            rest = tail;
        }

        let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
        // Remainder of a division by 1e9 always fits in u32.
        let nanos = (total % NANOS_PER_SEC) as u32;
        Ok(Self(std::time::Duration::new(secs, nanos)))
    }

    /// Formats the duration in its compact form; inverse of [`Duration::parse`].
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Duration of `mins` whole minutes, saturating at the largest whole-second value.
    pub fn from_minutes(mins: u64) -> Self {
        Self(std::time::Duration::from_secs(mins.saturating_mul(60)))
    }

    /// Underlying elapsed-time value.
    pub fn value(&self) -> std::time::Duration {
        self.0
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Self(value)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        let nanos = self.0.subsec_nanos();
        if secs == 0 && nanos == 0 {
            return f.write_str("0s");
        }

        let (h, m, s) = (secs / 3600, secs % 3600 / 60, secs % 60);
        if h > 0 {
            write!(f, "{h}h")?;
        }
        if m > 0 {
            write!(f, "{m}m")?;
        }
        if s > 0 || nanos > 0 {
            write!(f, "{s}")?;
            if nanos > 0 {
                let frac = format!("{nanos:09}");
                write!(f, ".{}", frac.trim_end_matches('0'))?;
            }
            f.write_str("s")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DurationVisitor;

impl de::Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string such as \"1h30m\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Duration::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DurationVisitor)
    }
}
