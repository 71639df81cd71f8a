//! Istio duration strings
//!
//! Route timeouts and fault delays are protobuf durations written in Go
//! duration syntax: one or more `<decimal><unit>` terms, e.g. `0.5s`, `1m30s`,
//! `250ms`. Units: `h`, `m`, `s`, `ms`, `us`/`µs`, `ns`.

use std::time::Duration;

use thiserror::Error;

/// Why a duration string was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// Empty input
    #[error("empty duration")]
    Empty,
    /// A term had no number in front of its unit
    #[error("invalid duration '{0}': expected a number")]
    MissingNumber(String),
    /// A term had no unit or an unknown one
    #[error("invalid duration '{0}': unknown or missing unit")]
    BadUnit(String),
    /// Negative durations are not valid timeouts
    #[error("invalid duration '{0}': negative")]
    Negative(String),
    /// Too large to represent in nanoseconds
    #[error("invalid duration '{0}': overflow")]
    Overflow(String),
}

const UNITS: [(&str, u128); 7] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60_000_000_000),
    ("h", 3_600_000_000_000),
];

/// Parse a Go-style duration string
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }
    if s.starts_with('-') {
        return Err(DurationError::Negative(input.to_string()));
    }
    let mut rest = s.strip_prefix('+').unwrap_or(s);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = UNITS
            .iter()
            .find(|(unit, _)| *unit == &rest[..unit_len])
            .map(|(_, scale)| *scale)
            .ok_or_else(|| DurationError::BadUnit(input.to_string()))?;
        rest = &rest[unit_len..];

        total_nanos = term_nanos(number, scale, input)?
            .checked_add(total_nanos)
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000).unwrap_or(u64::MAX);
    Ok(Duration::new(secs, (total_nanos % 1_000_000_000) as u32))
}

// Integer arithmetic keeps `10us` at exactly 10_000ns.
fn term_nanos(number: &str, scale: u128, input: &str) -> Result<u128, DurationError> {
    let missing = || DurationError::MissingNumber(input.to_string());
    let overflow = || DurationError::Overflow(input.to_string());

    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(missing());
    }
    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !digits(whole) || !digits(frac) {
        return Err(missing());
    }

    // Digits only, so a parse failure means the value is out of range.
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
    let mut place = scale;
    for digit in frac.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        nanos = nanos
            .checked_add(u128::from(digit - b'0') * place)
            .ok_or_else(overflow)?;
    }
    Ok(nanos)
}
