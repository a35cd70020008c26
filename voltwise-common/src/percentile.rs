use serde::{Deserialize, Serialize};

use crate::ingest::SampleSet;

/// A probability paired with the sample value at that rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileThreshold {
    pub p: f64,
    pub value: f64,
}

/// The thresholds reported for every analysis. `None` when there is no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p05: Option<f64>,
    pub p50: Option<f64>,
    pub p95: Option<f64>,
    pub p99: Option<f64>,
}

impl Percentiles {
    pub fn from_sorted(sorted: &SortedSamples) -> Self {
        Self {
            p05: sorted.value_at(0.05),
            p50: sorted.value_at(0.50),
            p95: sorted.value_at(0.95),
            p99: sorted.value_at(0.99),
        }
    }
}

/// Samples sorted ascending, so several thresholds can share one sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedSamples(Vec<f64>);

impl SortedSamples {
    pub fn new(samples: &SampleSet) -> Self {
        Self::sorted(samples.values().to_vec())
    }

    /// Sort an arbitrary slice; non-finite entries are dropped first.
    pub fn from_slice(values: &[f64]) -> Self {
        Self::sorted(values.iter().copied().filter(|v| v.is_finite()).collect())
    }

    fn sorted(mut values: Vec<f64>) -> Self {
        values.sort_unstable_by(f64::total_cmp);
        Self(values)
    }

    /// Value at index `floor(n * p)`, clamped to the last element.
    ///
    /// `p` outside `[0, 1]` is clamped; `None` for an empty set or NaN `p`.
    pub fn value_at(&self, p: f64) -> Option<f64> {
        if self.0.is_empty() || p.is_nan() {
            return None;
        }
        let p = p.clamp(0.0, 1.0);
        let idx = (p * self.0.len() as f64).floor() as usize;
        Some(self.0[idx.min(self.0.len() - 1)])
    }

    pub fn threshold(&self, p: f64) -> Option<PercentileThreshold> {
        self.value_at(p).map(|value| PercentileThreshold { p, value })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Sort a copy of `values` and return the element at index `floor(n * p)`.
/// Returns `None` for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    SortedSamples::from_slice(values).value_at(p)
}
