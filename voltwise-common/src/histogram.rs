use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::format;
use crate::ingest::{widen, SampleSet};

/// One histogram bar: samples in `[bin_start, bin_end)`. The last bin of a
/// histogram also holds samples equal to its end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: u64,
}

impl Bin {
    pub fn width(&self) -> f64 {
        self.bin_end - self.bin_start
    }

    /// A bin is elevated when it starts at or above the tail threshold.
    pub fn is_elevated(&self, threshold: f64) -> bool {
        self.bin_start >= threshold
    }

    /// Axis label in lakh, e.g. `₹5.0L`.
    pub fn label(&self) -> String {
        format::lakh(self.bin_start, 1)
    }
}

/// Uniform-width bins spanning the range of a [`SampleSet`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Histogram {
    bins: Vec<Bin>,
}

impl Histogram {
    /// Partition `samples` into `bin_count` bins in one pass.
    ///
    /// Edge `i` is `min + i * width` and is shared by the bins on either side,
    /// so adjacent edges are bit-identical; the last edge is `max` itself. A
    /// sample's bin starts from `floor((v - min) / width)` and is nudged by at
    /// most one step so that `bin_start <= v < bin_end` holds exactly against
    /// those edges (`v <= bin_end` for the last bin).
    pub fn build(samples: &SampleSet, bin_count: usize) -> Result<Self, AnalyticsError> {
        if bin_count == 0 {
            return Err(AnalyticsError::invalid_input("histogram needs at least one bin"));
        }

        let n = bin_count as f64;
        let (min, max) = (samples.min(), samples.max());
        let (min, max, width) = match bin_width(min, max, n) {
            Some(width) => (min, max, width),
            None => {
                // Range too narrow to split into distinct bins.
                let (lo, hi) = widen(min);
                let (lo, hi) = (lo.min(min), hi.max(max));
                match bin_width(lo, hi, n) {
                    Some(width) => (lo, hi, width),
                    None => {
                        return Err(AnalyticsError::invalid_input(format!(
                            "{bin_count} bins cannot split a range this narrow"
                        )))
                    }
                }
            }
        };

        let last = bin_count - 1;
        let edge = |i: usize| {
            if i >= bin_count {
                return max;
            }
            let e = min + i as f64 * width;
            if e.is_finite() {
                e
            } else {
                let t = i as f64 / n;
                min * (1.0 - t) + max * t
            }
        };

        let mut counts = vec![0u64; bin_count];
        for &v in samples.values() {
            // `as usize` saturates, so an overflowing quotient still clamps to `last`.
            let mut idx = (((v - min) / width).floor() as usize).min(last);
            while idx > 0 && v < edge(idx) {
                idx -= 1;
            }
            while idx < last && v >= edge(idx + 1) {
                idx += 1;
            }
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin { bin_start: edge(i), bin_end: edge(i + 1), count })
            .collect();

        Ok(Self { bins })
    }

    /// Placeholder for a run with no usable data.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bin> {
        self.bins.iter()
    }

    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Indices of the bins starting at or above `threshold`.
    pub fn elevated_indices(&self, threshold: f64) -> Vec<usize> {
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_elevated(threshold))
            .map(|(i, _)| i)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Histogram {
    type Item = &'a Bin;
    type IntoIter = std::slice::Iter<'a, Bin>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins.iter()
    }
}

/// Width of one of `n` bins over `[min, max]`, or `None` when it would not be
/// a normal, positive float distinguishable at both ends of the range.
fn bin_width(min: f64, max: f64, n: f64) -> Option<f64> {
    let span = max - min;
    // Opposite-signed extremes can overflow the span.
    let width = if span.is_finite() { span / n } else { max / n - min / n };
    // Steps near the ulp at either end would collapse neighbouring edges.
    let quarter = width / 4.0;
    let resolvable = min + quarter > min && max - quarter < max;
    (width.is_normal() && width > 0.0 && resolvable).then_some(width)
}
