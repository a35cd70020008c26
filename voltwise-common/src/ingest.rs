//! Sanitization of raw outcome samples.
//!
//! This is the only place that looks at NaN, infinities or non-numeric
//! entries. Everything downstream of a [`SampleSet`] may assume finite input
//! and a strictly positive range.

use serde_json::Value;

use crate::error::AnalyticsError;

/// Widening applied to a zero-width range so bin widths stay positive.
pub const DEGENERATE_SPAN: f64 = 1.0;

/// Relative widening used instead of [`DEGENERATE_SPAN`] once the magnitude is
/// large enough that adding 1.0 would be lost to rounding.
const DEGENERATE_SPAN_RELATIVE: f64 = 1e-9;

/// A value that may or may not hold a usable sample.
pub trait RawSample {
    /// Returns the value as a finite `f64`, or `None` if it must be discarded.
    fn finite_value(&self) -> Option<f64>;
}

impl RawSample for f64 {
    fn finite_value(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }
}

impl RawSample for f32 {
    fn finite_value(&self) -> Option<f64> {
        f64::from(*self).finite_value()
    }
}

impl RawSample for Option<f64> {
    fn finite_value(&self) -> Option<f64> {
        self.and_then(|v| v.finite_value())
    }
}

/// JSON numbers are taken as-is and numeric strings are parsed; `null`,
/// booleans, arrays and objects are never samples.
impl RawSample for Value {
    fn finite_value(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64().and_then(|v| v.finite_value()),
            Value::String(s) => s.trim().parse::<f64>().ok().and_then(|v| v.finite_value()),
            _ => None,
        }
    }
}

impl<T: RawSample + ?Sized> RawSample for &T {
    fn finite_value(&self) -> Option<f64> {
        (**self).finite_value()
    }
}

/// Finite samples of one simulation run plus the range found while collecting them.
///
/// Immutable once built; a new run means a new `SampleSet`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    values: Vec<f64>,
    min: f64,
    max: f64,
    raw_len: usize,
    degenerate: bool,
}

impl SampleSet {
    /// Keep the finite entries of `raw`, tracking min/max in the same pass.
    ///
    /// Returns [`AnalyticsError::EmptyDataset`] when nothing usable remains.
    /// When every kept value is equal the range is widened (see
    /// [`SampleSet::is_degenerate`]) rather than reported as an error.
    pub fn ingest<T: RawSample>(raw: &[T]) -> Result<Self, AnalyticsError> {
        let mut values = Vec::with_capacity(raw.len());
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in raw.iter().filter_map(RawSample::finite_value) {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
            values.push(v);
        }

        if values.is_empty() {
            return Err(AnalyticsError::EmptyDataset { discarded: raw.len() });
        }

        // Equal values, or a spread so small it is subnormal.
        let degenerate = max - min < f64::MIN_POSITIVE;
        if degenerate {
            (min, max) = widen(min);
        }

        Ok(Self { values, min, max, raw_len: raw.len(), degenerate })
    }

    /// Ingest a JSON value that is expected to be an array of samples.
    pub fn from_json(raw: &Value) -> Result<Self, AnalyticsError> {
        match raw {
            Value::Array(items) => Self::ingest(items),
            Value::Null => Err(AnalyticsError::invalid_input("raw samples are missing")),
            other => Err(AnalyticsError::invalid_input(format!(
                "expected an array of numbers, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Lower bound of the histogram range (the smallest sample).
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound of the histogram range. Equals the largest sample unless
    /// the set is degenerate.
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Length of the input before sanitization.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    pub fn discarded(&self) -> usize {
        self.raw_len - self.values.len()
    }

    /// `true` when the samples collapsed to a single value (or a subnormal
    /// spread) and the range was widened.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Arithmetic mean using Kahan compensated summation.
    ///
    /// Always finite: when the plain sum overflows, the terms are scaled by
    /// `1/n` before summing.
    pub fn mean(&self) -> f64 {
        let n = self.values.len() as f64;
        let sum = kahan_sum(self.values.iter().copied());
        if sum.is_finite() {
            return sum / n;
        }
        let scaled = kahan_sum(self.values.iter().map(|v| v / n));
        if scaled.is_finite() {
            scaled
        } else {
            self.min / 2.0 + self.max / 2.0
        }
    }
}

/// Build a positive-width range around a single value.
pub(crate) fn widen(value: f64) -> (f64, f64) {
    let span = DEGENERATE_SPAN.max(value.abs() * DEGENERATE_SPAN_RELATIVE);
    let upper = value + span;
    if upper.is_finite() {
        (value, upper)
    } else {
        // Only reachable next to f64::MAX; widen downwards instead.
        (value - span, value)
    }
}

fn kahan_sum(data: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn widen_keeps_small_values_at_unit_span() {
        assert_eq!(widen(500_000.0), (500_000.0, 500_001.0));
        assert_eq!(widen(-3.0), (-3.0, -2.0));
    }

    #[test]
    fn widen_scales_for_huge_magnitudes() {
        let (lo, hi) = widen(1e17);
        assert_eq!(lo, 1e17);
        assert!(hi > lo, "1.0 would be lost to rounding at 1e17");
    }

    #[test]
    fn widen_near_f64_max_goes_downwards() {
        let (lo, hi) = widen(f64::MAX);
        assert_eq!(hi, f64::MAX);
        assert!(lo < hi);
    }

    #[test]
    fn kahan_sum_recovers_small_terms() {
        let mut data = vec![1e16];
        data.extend(std::iter::repeat(1.0).take(100));
        assert_eq!(kahan_sum(data), 1e16 + 100.0);
    }

    #[test]
    fn json_numeric_strings_are_coerced() {
        assert_eq!(json!(" 42.5 ").finite_value(), Some(42.5));
        assert_eq!(json!("NaN").finite_value(), None);
        assert_eq!(json!("-Infinity").finite_value(), None);
        assert_eq!(json!(true).finite_value(), None);
        assert_eq!(json!([1]).finite_value(), None);
    }
}
