use rand::Rng;
use serde_json::Value;
use voltwise_common::{Financials, MarketInfo, SimulationPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Analyze,
    ReadPulse,
    PostStatus,
}

/// Workload profiles controlling the mix of requests each worker issues.
///
/// | Profile      | ANALYZE % | GET /pulse % | POST /pulse % |
/// |--------------|-----------|--------------|---------------|
/// | AnalyzeHeavy |     80    |      15      |       5       |
/// | Balanced     |     40    |      40      |      20       |
/// | PulseHeavy   |     10    |      60      |      30       |
/// | AnalyzeOnly  |    100    |       0      |       0       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadProfile {
    AnalyzeHeavy,
    Balanced,
    PulseHeavy,
    AnalyzeOnly,
}

impl WorkloadProfile {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "analyze-heavy" => Some(Self::AnalyzeHeavy),
            "balanced" => Some(Self::Balanced),
            "pulse-heavy" => Some(Self::PulseHeavy),
            "analyze-only" => Some(Self::AnalyzeOnly),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            Self::AnalyzeHeavy => "analyze-heavy",
            Self::Balanced => "balanced",
            Self::PulseHeavy => "pulse-heavy",
            Self::AnalyzeOnly => "analyze-only",
        }
    }

    /// Draw a random operation using `rng`.
    pub fn sample(&self, rng: &mut impl Rng) -> Op {
        let roll: u32 = rng.gen_range(0..100);
        self.op_for_roll(roll)
    }

    /// Map a roll in `0..100` to an `Op` according to the profile's percentages.
    pub fn op_for_roll(&self, roll: u32) -> Op {
        let (analyze, read) = match self {
            Self::AnalyzeHeavy => (80, 95),
            Self::Balanced => (40, 80),
            Self::PulseHeavy => (10, 70),
            Self::AnalyzeOnly => return Op::Analyze,
        };
        if roll < analyze {
            Op::Analyze
        } else if roll < read {
            Op::ReadPulse
        } else {
            Op::PostStatus
        }
    }
}

const MARKETS: [&str; 4] = ["IN_IEX", "US_PJM", "EU_NORDPOOL", "US_ERCOT"];

/// A generated payload and the number of its samples the server must keep.
#[derive(Debug, Clone)]
pub struct GeneratedPayload {
    pub payload: SimulationPayload,
    pub valid_count: usize,
}

/// Build a payload of `sample_count` lognormal-ish costs around ₹5L, with
/// roughly `dirty_fraction` of the entries replaced by junk the server must discard.
pub fn generate_payload(rng: &mut impl Rng, sample_count: usize, dirty_fraction: f64) -> GeneratedPayload {
    let dirty_fraction = dirty_fraction.clamp(0.0, 1.0);
    let mut valid_count = 0;
    let mut sum = 0.0;

    let raw: Vec<Value> = (0..sample_count)
        .map(|_| {
            if rng.gen_bool(dirty_fraction) {
                return junk_entry(rng);
            }
            // Product of uniforms gives a right-skewed tail.
            let cost = 300_000.0 * (1.0 + rng.gen::<f64>()) * (1.0 + rng.gen::<f64>() * rng.gen::<f64>());
            valid_count += 1;
            sum += cost;
            Value::from(cost)
        })
        .collect();

    let expected = if valid_count > 0 { sum / valid_count as f64 } else { 0.0 };
    let market = MARKETS[rng.gen_range(0..MARKETS.len())];

    let payload = SimulationPayload {
        financials: Financials {
            expected_cost_inr: Some(expected),
            market: Some(MarketInfo { source: Some(market.to_string()) }),
            ..Financials::default()
        },
        raw_costs: Value::Array(raw),
        asset_analysis: None,
    };

    GeneratedPayload { payload, valid_count }
}

fn junk_entry(rng: &mut impl Rng) -> Value {
    match rng.gen_range(0..4) {
        0 => Value::Null,
        1 => Value::from("NaN"),
        2 => Value::from("Infinity"),
        _ => Value::from("n/a"),
    }
}
