use voltwise_common::{AnalysisReport, LogEntry, PULSE_CAPACITY};

/// A broken invariant observed in a server response.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// Histogram counts do not add up to the samples the payload held.
    CountMismatch { expected: usize, actual: u64 },
    /// Bin `index` does not start where bin `index - 1` ends.
    BinGap { index: usize },
    /// Some bin has zero or negative width.
    EmptyBinWidth { index: usize },
    /// p05 ≤ p50 ≤ p95 ≤ p99 does not hold.
    NonMonotonePercentiles,
    /// An elevated bin starts below the p95 it was flagged against.
    ElevatedBelowThreshold { index: usize },
    /// The pulse returned more entries than its capacity.
    PulseOverflow { len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Sequence number of the request within its worker.
    pub request: u64,
    pub kind: ViolationKind,
}

/// Check an analysis report against the payload it was produced from.
pub fn check_report(report: &AnalysisReport, valid_count: usize) -> Vec<ViolationKind> {
    let mut found = Vec::new();

    if report.sample_count != valid_count || report.histogram.total_count() != valid_count as u64 {
        found.push(ViolationKind::CountMismatch {
            expected: valid_count,
            actual: report.histogram.total_count(),
        });
    }

    let bins = report.histogram.bins();
    for (index, bin) in bins.iter().enumerate() {
        if bin.width() <= 0.0 {
            found.push(ViolationKind::EmptyBinWidth { index });
        }
        if index > 0 && bins[index - 1].bin_end != bin.bin_start {
            found.push(ViolationKind::BinGap { index });
        }
    }

    let p = &report.percentiles;
    let ordered = [p.p05, p.p50, p.p95, p.p99];
    if ordered.windows(2).any(|w| matches!((w[0], w[1]), (Some(a), Some(b)) if a > b)) {
        found.push(ViolationKind::NonMonotonePercentiles);
    }

    if let Some(p95) = p.p95 {
        for &index in &report.elevated_bins {
            if bins.get(index).map_or(true, |b| b.bin_start < p95) {
                found.push(ViolationKind::ElevatedBelowThreshold { index });
            }
        }
    }

    found
}

pub fn check_pulse(entries: &[LogEntry]) -> Vec<ViolationKind> {
    if entries.len() > PULSE_CAPACITY {
        vec![ViolationKind::PulseOverflow { len: entries.len() }]
    } else {
        Vec::new()
    }
}
