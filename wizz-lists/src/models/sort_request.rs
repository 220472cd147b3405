//! Batch list request and length coercion

use serde_json::Value;

/// Largest list a request may ask for
pub const MAX_LENGTH: usize = 25;

/// Length used when the request gives none (or zero, or garbage)
pub const DEFAULT_LENGTH: usize = 10;

/// One list resolution request
#[derive(Debug, Clone, PartialEq)]
pub struct SortRequest {
    pub subject: String,
    /// Criterion exactly as the caller sent it
    pub sort_key_raw: String,
    /// Effective item count, always within 1..=MAX_LENGTH
    pub length: usize,
}

impl SortRequest {
    pub fn new(subject: impl Into<String>, sort_key_raw: impl Into<String>, length: usize) -> Self {
        Self {
            subject: subject.into(),
            sort_key_raw: sort_key_raw.into(),
            length: length.clamp(1, MAX_LENGTH),
        }
    }
}

/// Coerce a loosely-typed JSON count into `1..=max`
///
/// Numbers are truncated toward zero and numeric strings are parsed.
/// Missing, zero, and non-numeric values mean `default`. Negative values
/// clamp to 1.
pub fn coerce_count(value: Option<&Value>, default: usize, max: usize) -> usize {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(true)) => Some(1.0),
        _ => None,
    };

    let number = match number {
        Some(n) if !n.is_nan() && n.trunc() != 0.0 => n.trunc(),
        _ => return default.clamp(1, max),
    };

    number.clamp(1.0, max as f64) as usize
}

/// Effective length for the batch endpoint (`1..=25`, default 10)
pub fn clamp_length(value: Option<&Value>) -> usize {
    coerce_count(value, DEFAULT_LENGTH, MAX_LENGTH)
}
