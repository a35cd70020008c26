//! Risk-distribution analytics shared by the Voltwise server, client and harnesses.
//!
//! The pipeline is one-shot and synchronous:
//!
//! ```text
//! raw samples ──► SampleSet ──► Histogram
//!                     │
//!                     └──────► SortedSamples ──► TailRiskSummary
//! ```
//!
//! [`analyze`] runs the whole pipeline over a [`SimulationPayload`] and never
//! fails: every problem with the input degrades to an empty or sentinel value
//! and is listed in [`AnalysisReport::diagnostics`]. The only stateful piece is
//! [`RollingLogBuffer`], which the caller owns.

pub mod error;
pub mod format;
pub mod histogram;
pub mod ingest;
pub mod payload;
pub mod percentile;
pub mod pulse;
pub mod report;
pub mod tail_risk;

pub use error::{AnalyticsError, ErrorResponse, Result, VoltwiseError};
pub use histogram::{Bin, Histogram};
pub use ingest::{RawSample, SampleSet};
pub use payload::{AssetAnalysis, Financials, MarketInfo, SimulationPayload, TailEvent};
pub use percentile::{percentile, PercentileThreshold, Percentiles, SortedSamples};
pub use pulse::{LogEntry, LogKind, RollingLogBuffer, PULSE_CAPACITY};
pub use report::{analyze, AnalysisReport};
pub use tail_risk::{Jurisdiction, RiskBand, RiskRatio, TailEventView, TailRiskSummary};

/// Number of histogram bins used when the caller does not ask for a specific count.
pub const DEFAULT_BINS: usize = 40;
/// Upper bound on the bin count accepted over the wire.
pub const MAX_BINS: usize = 1_000;
/// Maximum size of an externally posted status message, in bytes.
pub const MAX_MESSAGE_LEN: usize = 512;
