//! Numeric Primitives
//! Cell parsing under a [`ParseErrorPolicy`] and min-max scaling.

use crate::config::ParseErrorPolicy;

/// Outcome of parsing one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Value(f64),
    /// Row should be left out (`SkipRow` policy)
    Skip,
    /// Run should abort (`Fail` policy)
    Invalid,
}

/// Parse a trimmed cell as `f64`, applying `policy` to empty or malformed text.
///
/// Missing cells (`None`) are treated like malformed ones.
pub fn parse_cell(cell: Option<&str>, policy: ParseErrorPolicy) -> CellValue {
    match cell.and_then(|s| s.trim().parse::<f64>().ok()) {
        Some(v) => CellValue::Value(v),
        None => match policy {
            ParseErrorPolicy::Zero => CellValue::Value(0.0),
            ParseErrorPolicy::SkipRow => CellValue::Skip,
            ParseErrorPolicy::Fail => CellValue::Invalid,
        },
    }
}

/// Scale `data` to [0, 1] by its own min and max.
///
/// Returns `None` for empty input, non-finite values, when every value is
/// equal (the range would be zero), or when `max - min` overflows.
pub fn min_max_normalize(data: &[f64]) -> Option<(Vec<f64>, f64, f64)> {
    if data.is_empty() || data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let (min, max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return None;
    }

    let scaled = data.iter().map(|v| (v - min) / range).collect();
    Some((scaled, min, max))
}
