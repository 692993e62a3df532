//! Scalar normalization
//!
//! Readings arrive as numbers, numeric strings, empty strings or `null`.
//! A stored [`Scalar`] is always "present"; absence is modelled by the slot
//! not existing at all. Display code asks [`presence`] whether a slot holds
//! anything, summation asks [`numeric`], which folds every unknown to zero.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A last-received reading value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Value that parsed as a finite float
    Number(f64),
    /// Non-empty value that did not parse; present, but sums as zero
    Text(String),
}

impl Scalar {
    /// Numeric view of the scalar; unparseable text is 0
    pub fn as_f64(&self) -> f64 {
        match self {
            Scalar::Number(n) if n.is_finite() => *n,
            Scalar::Number(_) => 0.0,
            Scalar::Text(s) => parse_float(s).unwrap_or(0.0),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Normalize a raw wire value. `None` means absent: nothing should be stored.
pub fn normalize(raw: &Value) -> Option<Scalar> {
    match raw {
        Value::Null => None,
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(Scalar::Number),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(match parse_float(s) {
            Some(v) => Scalar::Number(v),
            None => Scalar::Text(s.clone()),
        }),
        Value::Bool(b) => Some(Scalar::Text(b.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// True iff the slot holds a value that is not the empty string
pub fn presence(slot: Option<&Scalar>) -> bool {
    match slot {
        None => false,
        Some(Scalar::Text(s)) => !s.is_empty(),
        Some(Scalar::Number(_)) => true,
    }
}

/// Addable value of a slot: absent, empty, NaN and unparseable are 0
pub fn numeric(slot: Option<&Scalar>) -> f64 {
    slot.map(Scalar::as_f64).unwrap_or(0.0)
}

/// Parse the longest leading float of `s`, ignoring surrounding whitespace.
///
/// Mirrors how dashboards have always read meter values: `"230.1 V"` is
/// 230.1, `"abc"` is nothing. Non-finite results are rejected.
pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    let end = numeric_prefix_len(s);
    if end == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// Length of the `[+-]digits[.digits][e[+-]digits]` prefix, 0 if no digits.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}
