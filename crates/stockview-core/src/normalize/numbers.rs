//! Number coercion for ledger values.
//!
//! Ledger exports mix `44.900` (dot as thousands separator), `12,5` (comma as
//! decimal point), rupiah prefixes and plain JSON numbers.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use std::str::FromStr;

/// Coerce a string into a number.
///
/// Strips everything except digits, `.`, `-` and `,`, drops dots that group
/// thousands (a dot followed by exactly three digits and then a non-digit or
/// the end), and reads the first remaining comma as the decimal point.
/// Returns `None` when no number is recoverable.
pub fn to_number(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ','))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = collapse_grouping_dots(&cleaned).replacen(',', ".", 1);
    Decimal::from_str(&normalized).ok()
}

/// Coerce a float. Non-finite values are not numbers.
pub fn number_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok()
}

/// Coerce a decoded JSON cell (number or string).
pub fn value_to_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(number_from_f64)
            }
        }
        Value::String(s) => to_number(s),
        _ => None,
    }
}

/// Amount with zero as the fallback.
pub fn amount_or_zero(input: &str) -> Decimal {
    to_number(input).unwrap_or(Decimal::ZERO)
}

/// Integer quantity, truncated toward zero, with zero as the fallback.
pub fn parse_integer(input: &str) -> i64 {
    to_number(input).map(decimal_to_quantity).unwrap_or(0)
}

/// Truncate a decimal to an integer quantity; out-of-range values become zero.
pub fn decimal_to_quantity(value: Decimal) -> i64 {
    value.trunc().to_i64().unwrap_or(0)
}

fn collapse_grouping_dots(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'.' && is_grouping_dot(&bytes[i + 1..]) {
            continue;
        }
        out.push(b as char);
    }

    out
}

fn is_grouping_dot(rest: &[u8]) -> bool {
    rest.len() >= 3
        && rest[..3].iter().all(u8::is_ascii_digit)
        && rest.get(3).is_none_or(|b| !b.is_ascii_digit())
}

/// Format an amount the Indonesian way (44.900 or 1.234,50).
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let s = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    if decimal_part != "00" {
        formatted.push(',');
        formatted.push_str(decimal_part);
    }

    formatted
}
