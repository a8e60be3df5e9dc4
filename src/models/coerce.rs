//! Parse-or-default conversions for loosely typed JSON values.
//!
//! Both the inventory UI and Airtable send numbers either as JSON numbers or as strings
//! (`"5"`, `"2.50"`). Every conversion here is total: absent or non-numeric input yields
//! the zero value instead of an error.

use serde_json::Value;

/// Converts a JSON value to an integer quantity.
///
/// Floats truncate toward zero, strings use their leading numeric prefix
/// (`"12abc"` -> 12, `"2.9"` -> 2), booleans map to 1/0.
pub fn coerce_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => numeric_prefix(s)
            .and_then(|p| p.parse::<i64>().ok().or_else(|| p.parse::<f64>().ok().map(|f| f as i64)))
            .unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// Converts a JSON value to a floating-point cost.
pub fn coerce_float(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => numeric_prefix(s)
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Converts a JSON value to text. Scalars are rendered, everything else is empty.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Longest prefix of `raw` (after leading whitespace) that reads as a decimal number,
/// optionally signed, with optional fraction and exponent.
fn numeric_prefix(raw: &str) -> Option<&str> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_start = end;
    end = digits_from(end);
    let mut has_digits = end > int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    Some(&s[..end])
}
