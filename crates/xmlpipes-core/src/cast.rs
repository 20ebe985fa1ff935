//! Value casting into the daemon's attribute wire representations.
//!
//! One pure function per attribute type. Attributes delegate to the caster
//! matching their declared type (see [`Attribute::cast`](crate::Attribute::cast)).
//!
//! | Type | Output | Notes |
//! |------|--------|-------|
//! | `bool` | `0` / `1` | null, `false`, and zero are `0` |
//! | `int` | integer | truncates; optional bit-width check |
//! | `float` | float | null is `0.0` |
//! | `timestamp` | epoch seconds | numbers round half away from zero |
//! | `multi` | `"a,b,c"` | strings become CRC32 checksums |
//! | `str2ordinal` | string | |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Error, Result};
use crate::value::Value;

/// Default (and maximum) width of integer attributes.
pub const DEFAULT_INT_BITS: u32 = 32;

/// CRC32 checksum of a string, as used for class tags and string MVA entries.
pub fn checksum(value: &str) -> u32 {
    crc32fast::hash(value.as_bytes())
}

/// Cast to a boolean attribute: `0` if the value is falsy, `1` otherwise.
pub fn bool(value: &Value) -> i64 {
    match value {
        Value::Null | Value::Bool(false) | Value::Int(0) => 0,
        Value::Float(v) if *v == 0.0 => 0,
        _ => 1,
    }
}

/// Cast to a float attribute.
///
/// Strings are read leniently: the longest numeric prefix wins and
/// non-numeric text reads as `0.0`.
pub fn float(value: &Value) -> Result<f64> {
    match value {
        Value::Null => Ok(0.0),
        Value::Int(v) => Ok(*v as f64),
        Value::Float(v) => Ok(*v),
        Value::Str(s) => Ok(leading_float(s)),
        Value::Time(t) => Ok(t.timestamp() as f64),
        Value::Bool(_) | Value::List(_) => Err(Error::cast("float", value)),
    }
}

/// Cast to a timestamp attribute (UNIX epoch seconds).
///
/// Accepts numbers (fractions rounded to the nearest second, ties away from
/// zero), times, and date strings in RFC 3339, RFC 2822, or common
/// `YYYY-MM-DD[ HH:MM:SS]` layouts.
pub fn timestamp(value: &Value) -> Result<i64> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Float(v) => {
            let rounded = v.round();
            if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
                Ok(rounded as i64)
            } else {
                Err(Error::cast("timestamp", value))
            }
        }
        Value::Time(t) => Ok(t.timestamp()),
        Value::Str(s) => parse_time(s)
            .map(|t| t.timestamp())
            .ok_or_else(|| Error::cast("timestamp", value)),
        Value::Null | Value::Bool(_) | Value::List(_) => Err(Error::cast("timestamp", value)),
    }
}

/// Cast to a multi-value attribute: a comma-separated list of integers.
///
/// Scalars are treated as one-element lists. Order and duplicates are kept.
pub fn multi(value: &Value) -> Result<String> {
    let items = match value {
        Value::List(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let part = match item {
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) | Value::Null => "0".to_string(),
            Value::Time(t) => t.timestamp().to_string(),
            Value::Str(s) => checksum(s).to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::List(_) => return Err(Error::cast("multi", value)),
        };
        parts.push(part);
    }

    Ok(parts.join(","))
}

/// Cast to an integer attribute.
///
/// Floats truncate toward zero, strings read their leading integer, null is
/// `0`. When `check_bits` is set, a value whose magnitude needs more than
/// `bits` bits fails with [`Error::Range`].
pub fn int(value: &Value, bits: u32, check_bits: bool) -> Result<i64> {
    let v = match value {
        Value::Null => 0,
        Value::Int(v) => *v,
        Value::Float(v) if v.is_finite() => {
            let t = v.trunc();
            // i64::MAX is not representable; 2^63 is the first float past it.
            if t < i64::MIN as f64 || t >= i64::MAX as f64 {
                return Err(Error::cast("int", value));
            }
            t as i64
        }
        Value::Str(s) => leading_int(s),
        Value::Time(t) => t.timestamp(),
        Value::Float(_) | Value::Bool(_) | Value::List(_) => {
            return Err(Error::cast("int", value));
        }
    };

    if check_bits && bit_length(v) > bits {
        return Err(Error::Range { value: v, bits });
    }

    Ok(v)
}

/// Cast to an ordinal (`str2ordinal`) attribute.
pub fn ordinal(value: &Value) -> String {
    value.to_string()
}

/// Number of binary digits in the magnitude of `v` (`0` counts as one digit).
fn bit_length(v: i64) -> u32 {
    (u64::BITS - v.unsigned_abs().leading_zeros()).max(1)
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let end = numeric_prefix_len(s, false);
    s[..end].parse().unwrap_or(0)
}

fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let end = numeric_prefix_len(s, true);
    s[..end].parse().unwrap_or(0.0)
}

fn numeric_prefix_len(s: &str, allow_fraction: bool) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 {
            end = frac;
        }
    }
    end
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Some(t.with_timezone(&Utc));
    }
    for layout in ["%a %b %d %H:%M:%S %z %Y", "%Y-%m-%d %H:%M:%S %z"] {
        if let Ok(t) = DateTime::parse_from_str(s, layout) {
            return Some(t.with_timezone(&Utc));
        }
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}

// ============================================================================
// Tests
// ============================================================================
