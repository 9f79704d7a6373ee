//! Text format for Duration values
//!
//! Durations render and parse in the `72h3m0.5s` style: a sequence of
//! decimal numbers, each with an optional fraction and a unit suffix
//! (`ns`, `us`/`µs`, `ms`, `s`, `m`, `h`), with an optional leading sign.
//! This is the form used by casts to and from text and by JSON.

use crate::error::{Error, Result};
use crate::types::ValueType;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MIN: u64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MIN;

/// Render a nanosecond count
///
/// Durations under one second use the largest unit below a second that
/// keeps an integer part (`1.5µs`, `150ms`); longer ones use hours, minutes
/// and fractional seconds (`1h2m3.5s`). Zero is `0s`.
pub fn format_duration(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }

    let mut u = nanos.unsigned_abs();
    let mut out = String::new();

    if u < NANOS_PER_SEC {
        let (prec, unit) = if u < NANOS_PER_MICRO {
            (0, "ns")
        } else if u < NANOS_PER_MILLI {
            (3, "µs")
        } else {
            (6, "ms")
        };
        let frac = take_fraction(&mut u, prec);
        out.push_str(&u.to_string());
        out.push_str(&frac);
        out.push_str(unit);
    } else {
        let frac = take_fraction(&mut u, 9);
        let secs = u % 60;
        u /= 60;
        if u > 0 {
            let mins = u % 60;
            u /= 60;
            if u > 0 {
                out.push_str(&u.to_string());
                out.push('h');
            }
            out.push_str(&mins.to_string());
            out.push('m');
        }
        out.push_str(&secs.to_string());
        out.push_str(&frac);
        out.push('s');
    }

    if nanos < 0 {
        out.insert(0, '-');
    }
    out
}

/// Strip `prec` low decimal digits off `v` and render them as a fraction
/// without trailing zeros (empty when they are all zero)
fn take_fraction(v: &mut u64, prec: usize) -> String {
    let mut digits = Vec::with_capacity(prec);
    let mut significant = false;
    for _ in 0..prec {
        let digit = (*v % 10) as u8;
        significant = significant || digit != 0;
        if significant {
            digits.push(b'0' + digit);
        }
        *v /= 10;
    }
    if digits.is_empty() {
        return String::new();
    }
    digits.push(b'.');
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Parse duration text into a nanosecond count
///
/// ```
/// use docmodel_core::duration::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), 5_400_000_000_000);
/// assert_eq!(parse_duration("-1.5s").unwrap(), -1_500_000_000);
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result<i64> {
    let err = |reason: &str| Error::parse(ValueType::Duration, s, reason);

    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    if rest == "0" {
        return Ok(0);
    }
    if rest.is_empty() {
        return Err(err("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        // Integer part
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let int_digits = &rest[..int_len];
        rest = &rest[int_len..];

        // Fraction
        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_digits = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(err("expected number"));
        }

        // Unit
        let unit_len = rest
            .char_indices()
            .find(|(_, c)| *c == '.' || c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];
        let scale: u64 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SEC,
            "m" => NANOS_PER_MIN,
            "h" => NANOS_PER_HOUR,
            "" => return Err(err("missing unit")),
            _ => return Err(err("unknown unit")),
        };

        let mut whole: u128 = 0;
        for b in int_digits.bytes() {
            whole = whole
                .checked_mul(10)
                .and_then(|w| w.checked_add(u128::from(b - b'0')))
                .filter(|w| *w <= u128::from(u64::MAX))
                .ok_or_else(|| err("overflow"))?;
        }
        let mut component = whole * u128::from(scale);

        // Digits past nanosecond precision of the largest unit are dropped
        let mut frac: u128 = 0;
        let mut frac_scale: u128 = 1;
        for b in frac_digits.bytes().take(20) {
            frac = frac * 10 + u128::from(b - b'0');
            frac_scale *= 10;
        }
        component += frac * u128::from(scale) / frac_scale;

        total = total
            .checked_add(component)
            .ok_or_else(|| err("overflow"))?;
        if total > u128::from(i64::MAX as u64) + 1 {
            return Err(err("overflow"));
        }
    }

    if negative {
        // Allows exactly i64::MIN
        Ok((total as i128).wrapping_neg() as i64)
    } else if total > i64::MAX as u128 {
        Err(err("overflow"))
    } else {
        Ok(total as i64)
    }
}
