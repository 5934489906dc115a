use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join3;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::error::FeedError;
use crate::models::{CurrencyTriple, RateQuote, RateSet};
use crate::sources::{quote_from_legs, RateSource};

/// Body of `GET {base}/latest/{CODE}`:
/// `{"result":"success","base_code":"AUD","rates":{"CNY":4.71,...}}`
#[derive(Debug, Deserialize)]
struct LatestRates {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Public fiat feed, one request per leg. Each leg falls back on its own.
pub struct HttpRateSource {
    client: reqwest::Client,
    base: Url,
    currencies: CurrencyTriple,
    defaults: RateSet,
}

impl HttpRateSource {
    pub fn new(
        base: Url,
        timeout: Duration,
        currencies: CurrencyTriple,
        defaults: RateSet,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base, currencies, defaults })
    }

    /// `{base}/latest/{code}`, with `code` escaped as a single path segment.
    fn latest_url(&self, code: &str) -> Result<Url, FeedError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::BadBase(self.base.to_string()))?
            .pop_if_empty()
            .push("latest")
            .push(code);
        Ok(url)
    }

    /// Units of `to` per 1 `from`.
    async fn fetch_leg(&self, from: &str, to: &str) -> Result<f64, FeedError> {
        let resp = self.client.get(self.latest_url(from)?).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body: LatestRates = resp.json().await?;

        if let Some(result) = body.result.as_deref() {
            if result != "success" {
                let why = body.error_type.unwrap_or_else(|| result.to_string());
                return Err(FeedError::Rejected(why));
            }
        }

        let rate = *body
            .rates
            .get(to)
            .ok_or_else(|| FeedError::MissingRate(format!("{}/{}", from, to)))?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(FeedError::BadRate { code: format!("{}/{}", from, to), value: rate });
        }
        Ok(rate)
    }

    async fn leg_or_none(&self, from: &str, to: &str) -> Option<f64> {
        match self.fetch_leg(from, to).await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("rate feed: {}/{} unavailable, using default: {}", from, to, e);
                None
            }
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_rates(&self) -> RateQuote {
        let CurrencyTriple { a, b, c } = &self.currencies;
        let (ab, bc, ac) = join3(
            self.leg_or_none(a, b),
            self.leg_or_none(b, c),
            self.leg_or_none(a, c),
        )
        .await;

        let quote = quote_from_legs(self.defaults, ab, bc, ac);
        info!(
            "rate feed: {}/{}={} ({:?}) {}/{}={} ({:?}) {}/{}={} ({:?})",
            a, b, quote.rates.rate_ab, quote.provenance.ab,
            b, c, quote.rates.rate_bc, quote.provenance.bc,
            a, c, quote.rates.rate_ac, quote.provenance.ac,
        );
        quote
    }
}
