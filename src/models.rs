use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three pairwise rates of a triangle A -> B -> C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSet {
    /// units of B per 1 A
    pub rate_ab: f64,
    /// units of C per 1 B
    pub rate_bc: f64,
    /// units of C per 1 A (direct leg)
    pub rate_ac: f64,
}

impl RateSet {
    pub fn new(rate_ab: f64, rate_bc: f64, rate_ac: f64) -> Self {
        Self { rate_ab, rate_bc, rate_ac }
    }
}

/// Which leg is solved from the other two and the target margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FixMode {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "fix_ab")]
    FixAB,
    #[serde(rename = "fix_bc")]
    FixBC,
    #[serde(rename = "fix_ac")]
    FixAC,
}

/// Snapshot handed to the evaluator. Built fresh per evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateModel {
    pub rates: RateSet,
    pub mode: FixMode,
    pub target_profit_percent: f64,
}

impl RateModel {
    pub fn unconstrained(rates: RateSet) -> Self {
        Self { rates, mode: FixMode::None, target_profit_percent: 0.0 }
    }

    pub fn fixed(rates: RateSet, mode: FixMode, target_profit_percent: f64) -> Self {
        Self { rates, mode, target_profit_percent }
    }

    /// Target margin, only when a fixed-profit mode is active.
    pub fn target(&self) -> Option<f64> {
        match self.mode {
            FixMode::None => None,
            _ => Some(self.target_profit_percent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Profitable,
    Unprofitable,
    Negligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Amount of C reached through B
    pub via_amount: f64,
    /// Amount of C reached directly
    pub direct_amount: f64,
    pub profit_percent: f64,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_reached: Option<bool>,
}

/// Whether a leg came from the feed or from the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    Live,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegProvenance {
    pub ab: RateOrigin,
    pub bc: RateOrigin,
    pub ac: RateOrigin,
}

impl LegProvenance {
    pub fn all(origin: RateOrigin) -> Self {
        Self { ab: origin, bc: origin, ac: origin }
    }

    pub fn is_fully_live(&self) -> bool {
        [self.ab, self.bc, self.ac].iter().all(|o| *o == RateOrigin::Live)
    }
}

/// What a rate source hands back. Provenance is informational only.
#[derive(Debug, Clone, Serialize)]
pub struct RateQuote {
    pub rates: RateSet,
    pub provenance: LegProvenance,
    pub fetched_at: DateTime<Utc>,
}

/// Currency codes of the triangle, e.g. AUD / USDT / CNY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyTriple {
    pub a: String,
    pub b: String,
    pub c: String,
}

impl Default for CurrencyTriple {
    fn default() -> Self {
        Self { a: "AUD".into(), b: "USDT".into(), c: "CNY".into() }
    }
}

/// Input payload for POST /api/evaluate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluateRequest {
    pub rate_ab: Option<f64>,
    pub rate_bc: Option<f64>,
    pub rate_ac: Option<f64>,
    pub initial_amount: Option<f64>,
    #[serde(default)]
    pub mode: FixMode,
    #[serde(default)]
    pub target_profit_percent: f64,
}

/// Output payload for POST /api/evaluate
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub status: String,
    pub currencies: CurrencyTriple,
    pub initial_amount: f64,
    pub mode: FixMode,
    pub rates: RateSet,
    pub display: DisplayFigures,
    pub result: EvaluationResult,
}

/// Rounded copies for the presentation layer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DisplayFigures {
    pub rate_ab: f64,
    pub rate_bc: f64,
    pub rate_ac: f64,
    pub via_amount: f64,
    pub direct_amount: f64,
    pub profit_percent: f64,
}
