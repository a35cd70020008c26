use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Market label assumed when the payload does not name one.
pub const DEFAULT_MARKET: &str = "Global Market";

/// Result of one simulation run as delivered by the simulation service.
///
/// Every field is optional on the wire; `raw_costs` is kept as raw JSON so
/// malformed entries reach the ingestor instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationPayload {
    #[serde(default)]
    pub financials: Financials,
    #[serde(default)]
    pub raw_costs: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_analysis: Option<AssetAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p95_inr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_cost_inr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_event: Option<TailEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketInfo>,
}

/// The single worst simulated path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_inr: Option<f64>,
    /// Storage state of charge (0..=1) when the worst path peaked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bess_soc_at_peak: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetAnalysis {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl SimulationPayload {
    /// Payload with clean samples and the two headline financials.
    pub fn new(raw_costs: Vec<f64>, expected_cost_inr: f64, p95_inr: f64) -> Self {
        Self {
            financials: Financials {
                p95_inr: Some(p95_inr),
                expected_cost_inr: Some(expected_cost_inr),
                ..Financials::default()
            },
            raw_costs: Value::from(raw_costs),
            asset_analysis: None,
        }
    }

    pub fn with_market(mut self, source: impl Into<String>) -> Self {
        self.financials.market = Some(MarketInfo { source: Some(source.into()) });
        self
    }

    pub fn with_tail_event(mut self, event: TailEvent) -> Self {
        self.financials.tail_event = Some(event);
        self
    }

    pub fn with_asset(mut self, kind: impl Into<String>) -> Self {
        self.asset_analysis = Some(AssetAnalysis { kind: Some(kind.into()) });
        self
    }

    pub fn market_label(&self) -> &str {
        self.financials
            .market
            .as_ref()
            .and_then(|m| m.source.as_deref())
            .unwrap_or(DEFAULT_MARKET)
    }

    pub fn asset_kind(&self) -> Option<&str> {
        self.asset_analysis.as_ref().and_then(|a| a.kind.as_deref())
    }
}
