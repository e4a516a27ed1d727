//! Recipient weights
//!
//! Weights arrive as loosely-typed values (numbers, numeric strings, or
//! garbage) and leave as fractions of a whole. Only recipients with a
//! finite, positive share survive normalization.

use serde_json::{Map, Value};
use tracing::debug;

use crate::Recipient;

/// Weight of a recipient that does not carry one
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Read a weight from a recipient object, defaulting when absent or falsy
pub fn weight_of(recipient: &Map<String, Value>) -> f64 {
    match recipient.get("weight") {
        Some(w) if is_truthy(w) => parse_float(w),
        _ => DEFAULT_WEIGHT,
    }
}

/// Parse a value as a float, reading the longest decimal prefix of its text.
///
/// Numbers pass through. Strings skip leading whitespace then accept an
/// optional sign followed by `Infinity` or a decimal literal with optional
/// fraction and exponent; anything after the prefix is ignored. Arrays are
/// read as their elements joined by `,`. Everything else is NaN.
pub fn parse_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        Value::Array(_) => parse_float_prefix(&array_text(value)),
        Value::Null | Value::Bool(_) | Value::Object(_) => f64::NAN,
    }
}

fn array_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(array_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn is_leading_space(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{0085}')
}

fn parse_float_prefix(text: &str) -> f64 {
    let s = text.trim_start_matches(is_leading_space);
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };
    let sign = if negative { -1.0 } else { 1.0 };

    if s[pos..].starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        frac_digits = &s[frac_start..end];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            pos = end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return f64::NAN;
    }

    let mut exponent = "";
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut end = pos + 1;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        let digits_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_start {
            exponent = &s[pos + 1..end];
        }
    }

    let literal = format!(
        "{}{}.{}e{}",
        if negative { "-" } else { "" },
        if int_digits.is_empty() { "0" } else { int_digits },
        if frac_digits.is_empty() { "0" } else { frac_digits },
        if exponent.is_empty() { "0" } else { exponent },
    );
    literal.parse().unwrap_or(f64::NAN)
}

fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Scale weights so they sum to 1.
///
/// Candidates whose weight is not finite and positive are dropped before the
/// total is taken. When the plain total overflows, weights are first divided
/// by the largest one. A recipient whose scaled weight underflows to zero
/// next to a much larger one is dropped. Order is preserved.
pub fn normalize(candidates: Vec<Recipient>) -> Vec<Recipient> {
    let mut recipients: Vec<Recipient> = candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, recipient)| {
            if is_valid_weight(recipient.weight) {
                Some(recipient)
            } else {
                debug!(index, weight = recipient.weight, "dropping recipient with invalid weight");
                None
            }
        })
        .collect();

    let mut total: f64 = recipients.iter().map(|r| r.weight).sum();
    if total.is_infinite() {
        let max = recipients.iter().map(|r| r.weight).fold(0.0, f64::max);
        for recipient in &mut recipients {
            recipient.weight /= max;
        }
        total = recipients.iter().map(|r| r.weight).sum();
    }
    for recipient in &mut recipients {
        recipient.weight /= total;
    }

    recipients.retain(|r| {
        let keep = is_valid_weight(r.weight);
        if !keep {
            debug!(total, "dropping recipient after scaling");
        }
        keep
    });
    recipients
}
