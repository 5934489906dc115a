use async_trait::async_trait;

use crate::models::{RateQuote, RateSet};
use crate::sources::{quote_from_legs, RateSource};

/// Always returns the configured defaults.
#[derive(Debug, Clone)]
pub struct FixedRateSource {
    rates: RateSet,
}

impl FixedRateSource {
    pub fn new(rates: RateSet) -> Self {
        Self { rates }
    }
}

#[async_trait]
impl RateSource for FixedRateSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_rates(&self) -> RateQuote {
        quote_from_legs(self.rates, None, None, None)
    }
}
