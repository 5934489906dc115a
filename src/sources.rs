//! Where the three raw rates come from.

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{LegProvenance, RateOrigin, RateQuote, RateSet};

pub mod fixed;
pub mod http_feed;

pub use fixed::FixedRateSource;
pub use http_feed::HttpRateSource;

/// Supplies a full set of rates. Legs that cannot be resolved fall back to a
/// default and are marked as such, so this never fails as a whole.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_rates(&self) -> RateQuote;
}

/// Merge per-leg lookups with defaults.
pub(crate) fn quote_from_legs(
    defaults: RateSet,
    ab: Option<f64>,
    bc: Option<f64>,
    ac: Option<f64>,
) -> RateQuote {
    let pick = |live: Option<f64>, fallback: f64| match live {
        Some(v) => (v, RateOrigin::Live),
        None => (fallback, RateOrigin::Default),
    };
    let (rate_ab, o_ab) = pick(ab, defaults.rate_ab);
    let (rate_bc, o_bc) = pick(bc, defaults.rate_bc);
    let (rate_ac, o_ac) = pick(ac, defaults.rate_ac);

    RateQuote {
        rates: RateSet::new(rate_ab, rate_bc, rate_ac),
        provenance: LegProvenance { ab: o_ab, bc: o_bc, ac: o_ac },
        fetched_at: Utc::now(),
    }
}
