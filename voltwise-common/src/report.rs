use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AnalyticsError;
use crate::histogram::Histogram;
use crate::ingest::SampleSet;
use crate::payload::SimulationPayload;
use crate::percentile::{Percentiles, SortedSamples};
use crate::tail_risk::{TailEventView, TailRiskSummary};

/// Everything derived from one [`SimulationPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Entries in the payload before sanitization.
    pub raw_count: usize,
    /// Finite samples kept; equals the histogram's total count.
    pub sample_count: usize,
    pub discarded_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub histogram: Histogram,
    pub percentiles: Percentiles,
    /// Histogram bins starting at or above the sample p95.
    pub elevated_bins: Vec<usize>,
    pub tail_risk: TailRiskSummary,
    pub tail_event: Option<TailEventView>,
    /// Conditions recovered from while producing this report.
    pub diagnostics: Vec<AnalyticsError>,
}

impl AnalysisReport {
    /// `true` when there was nothing to chart.
    pub fn is_placeholder(&self) -> bool {
        self.sample_count == 0
    }
}

/// Run the full pipeline over `payload` with `bin_count` histogram bins.
///
/// The ratio uses the p95 of the samples; the payload's own `p95_inr` only
/// stands in when no sample survives sanitization. Likewise the payload's
/// expected cost is preferred, with the sample mean as fallback.
pub fn analyze(payload: &SimulationPayload, bin_count: usize) -> AnalysisReport {
    let mut diagnostics = Vec::new();

    let samples = match SampleSet::from_json(&payload.raw_costs) {
        Ok(samples) => Some(samples),
        Err(err) => {
            diagnostics.push(err);
            None
        }
    };

    let raw_count = match (&samples, &payload.raw_costs) {
        (Some(s), _) => s.raw_len(),
        (None, serde_json::Value::Array(items)) => items.len(),
        (None, _) => 0,
    };

    if let Some(s) = samples.as_ref().filter(|s| s.is_degenerate()) {
        diagnostics.push(AnalyticsError::DegenerateRange { value: s.min() });
    }

    let histogram = match &samples {
        Some(s) => Histogram::build(s, bin_count).unwrap_or_else(|err| {
            diagnostics.push(err);
            Histogram::empty()
        }),
        None => Histogram::empty(),
    };

    let percentiles = samples
        .as_ref()
        .map(|s| Percentiles::from_sorted(&SortedSamples::new(s)))
        .unwrap_or_default();

    let p95 = percentiles
        .p95
        .or(payload.financials.p95_inr.filter(|v| v.is_finite()))
        .unwrap_or(0.0);
    let expected = payload
        .financials
        .expected_cost_inr
        .filter(|v| v.is_finite())
        .or_else(|| samples.as_ref().map(SampleSet::mean))
        .unwrap_or(0.0);

    let tail_risk = TailRiskSummary::assess(p95, expected, payload.market_label());
    if tail_risk.ratio.is_undefined() {
        diagnostics.push(AnalyticsError::UndefinedRatio);
    }

    let elevated_bins = percentiles
        .p95
        .map(|threshold| histogram.elevated_indices(threshold))
        .unwrap_or_default();

    let tail_event = payload
        .financials
        .tail_event
        .as_ref()
        .map(|event| TailEventView::from_event(event, payload.asset_kind()));

    for err in &diagnostics {
        warn!(%err, "analysis degraded");
    }

    let sample_count = samples.as_ref().map_or(0, SampleSet::len);
    info!(
        raw = raw_count,
        kept = sample_count,
        bins = histogram.len(),
        ratio = %tail_risk.ratio,
        classification = tail_risk.classification.as_str(),
        "analysis complete"
    );

    AnalysisReport {
        raw_count,
        sample_count,
        discarded_count: raw_count - sample_count,
        min: samples.as_ref().map(SampleSet::min),
        max: samples.as_ref().map(SampleSet::max),
        histogram,
        percentiles,
        elevated_bins,
        tail_risk,
        tail_event,
        diagnostics,
    }
}
