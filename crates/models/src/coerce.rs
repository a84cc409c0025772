//! Normalisation of untrusted payload fields.
//!
//! All functions are total: malformed input yields the fallback.

use serde_json::Value;

/// Reads a numeric field. Numbers and numeric strings are accepted;
/// anything that does not produce a finite value returns `fallback`.
pub fn number(value: Option<&Value>, fallback: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => n,
        _ => fallback,
    }
}

/// Reads a text field. Null or absent fields return `fallback`, everything
/// else is stringified.
pub fn text(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Like [`text`], but blank values return `fallback` too.
pub fn non_blank(value: Option<&Value>, fallback: &str) -> String {
    let raw = text(value, fallback);
    if raw.trim().is_empty() {
        fallback.to_string()
    } else {
        raw
    }
}

/// Reads a CSS colour. Blank values return `fallback`.
pub fn color(value: Option<&Value>, fallback: &str) -> String {
    non_blank(value, fallback)
}

pub fn flag(value: Option<&Value>, fallback: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        _ => fallback,
    }
}

/// Parses the leading integer of a user-entered string: optional
/// whitespace, an optional sign, then digits. Trailing garbage is ignored
/// (`"2500.75"` is 2500). Returns `None` when no digit leads the input.
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses the leading decimal number of a user-entered string: optional
/// whitespace, an optional sign, digits with an optional fraction and
/// exponent. Trailing garbage is ignored (`"100abc"` is 100).
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = match bytes.first() {
        Some(b'-' | b'+') => 1,
        _ => 0,
    };
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'-' | b'+')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }

    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}
