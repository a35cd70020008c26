use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::format;
use crate::payload::TailEvent;

/// Premium over the expected cost above which a run is classed as exposed.
pub const EXPOSED_PREMIUM: f64 = 0.20;
/// Premium above which the tail is called out as significant.
pub const SIGNIFICANT_TAIL_PREMIUM: f64 = 0.15;

/// `p95 / expected`, or `Undefined` when that quotient has no meaning.
///
/// Serializes as a JSON number or the string `"undefined"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskRatio {
    Defined(f64),
    Undefined,
}

impl RiskRatio {
    /// Zero expected value, non-finite inputs, or an overflowing quotient
    /// all give `Undefined`.
    pub fn compute(p95: f64, expected: f64) -> Self {
        if expected == 0.0 || !expected.is_finite() || !p95.is_finite() {
            return Self::Undefined;
        }
        let ratio = p95 / expected;
        if ratio.is_finite() {
            Self::Defined(ratio)
        } else {
            Self::Undefined
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(*v),
            Self::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl fmt::Display for RiskRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(v) => write!(f, "{v:.2}x"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

impl Serialize for RiskRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Defined(v) => serializer.serialize_f64(*v),
            Self::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

impl<'de> Deserialize<'de> for RiskRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Self::Defined(v)),
            Repr::Text(s) if s == "undefined" => Ok(Self::Undefined),
            Repr::Text(s) => Err(de::Error::custom(format!("invalid risk ratio {s:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskBand {
    Stable,
    RiskExposed,
    Undefined,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::RiskExposed => "RISK_EXPOSED",
            Self::Undefined => "UNDEFINED",
        }
    }
}

/// Market region, derived from a market label by tag matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Jurisdiction {
    India,
    UnitedStates,
    Europe,
    Global,
}

const JURISDICTION_TAGS: &[(Jurisdiction, &[&str])] = &[
    (Jurisdiction::India, &["India", "IEX", "IN_"]),
    (Jurisdiction::UnitedStates, &["USA", "PJM", "ERCOT", "US_"]),
    (Jurisdiction::Europe, &["EU", "Nord Pool", "NORDPOOL", "EPEX"]),
];

impl Jurisdiction {
    /// First region with a tag contained in `label`; `Global` otherwise.
    pub fn classify(label: &str) -> Self {
        JURISDICTION_TAGS
            .iter()
            .find(|(_, tags)| tags.iter().any(|tag| label.contains(tag)))
            .map(|(jurisdiction, _)| *jurisdiction)
            .unwrap_or(Self::Global)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::India => "INDIA",
            Self::UnitedStates => "UNITED_STATES",
            Self::Europe => "EUROPE",
            Self::Global => "GLOBAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailRiskSummary {
    pub ratio: RiskRatio,
    pub p95: f64,
    pub expected: f64,
    pub classification: RiskBand,
    /// `(p95 - expected) / |expected|` as a percentage, one decimal.
    pub premium_pct: Option<f64>,
    pub significant_tail: bool,
    pub jurisdiction: Jurisdiction,
}

impl TailRiskSummary {
    pub fn assess(p95: f64, expected: f64, market_label: &str) -> Self {
        let ratio = RiskRatio::compute(p95, expected);
        let premium = ratio.value().map(|_| (p95 - expected) / expected.abs());

        let classification = match premium {
            None => RiskBand::Undefined,
            Some(p) if p > EXPOSED_PREMIUM => RiskBand::RiskExposed,
            Some(_) => RiskBand::Stable,
        };

        Self {
            ratio,
            p95,
            expected,
            classification,
            premium_pct: premium.map(|p| (p * 1000.0).round() / 10.0),
            significant_tail: premium.is_some_and(|p| p > SIGNIFICANT_TAIL_PREMIUM),
            jurisdiction: Jurisdiction::classify(market_label),
        }
    }
}

/// Display-ready rendering of a [`TailEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailEventView {
    pub max_exposure: String,
    pub peak_price: String,
    pub peak_hour: Option<u32>,
    /// Only present for battery assets.
    pub soc_at_peak_pct: Option<u32>,
}

impl TailEventView {
    /// Missing or non-finite figures render as zero.
    pub fn from_event(event: &TailEvent, asset_kind: Option<&str>) -> Self {
        let finite_or_zero = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
        let is_battery = asset_kind.is_some_and(|k| k.contains("BESS"));

        Self {
            max_exposure: format::lakh(finite_or_zero(event.cost_inr), 2),
            peak_price: format::rupees(finite_or_zero(event.max_price), 2),
            peak_hour: event.peak_hour,
            soc_at_peak_pct: is_battery
                .then(|| (finite_or_zero(event.bess_soc_at_peak).clamp(0.0, 1.0) * 100.0).round() as u32),
        }
    }
}
