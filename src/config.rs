//! Runtime configuration, read from the environment (and `.env` if present).

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::models::{CurrencyTriple, RateSet};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub currencies: CurrencyTriple,
    /// Used for every leg the feed cannot resolve.
    pub default_rates: RateSet,
    pub default_amount: f64,
    /// `None` means no live feed; the fixed source is used.
    pub feed_url: Option<Url>,
    pub feed_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 10000,
            currencies: CurrencyTriple::default(),
            default_rates: RateSet::new(0.5, 7.0, 4.8),
            default_amount: 1.0,
            feed_url: None,
            feed_timeout: Duration::from_secs(5),
        }
    }
}

impl AppConfig {
    /// Load `.env` then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env file loaded: {}", e);
        }
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();

        if let Some(v) = get("PORT") {
            cfg.port = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::NotANumber { key: "PORT", value: v.clone() })?;
        }

        for (key, slot) in [
            ("CURRENCY_A", &mut cfg.currencies.a),
            ("CURRENCY_B", &mut cfg.currencies.b),
            ("CURRENCY_C", &mut cfg.currencies.c),
        ] {
            if let Some(v) = get(key) {
                let code = v.trim().to_uppercase();
                if !code.is_empty() {
                    *slot = code;
                }
            }
        }

        cfg.default_rates.rate_ab = positive(&get, "DEFAULT_RATE_AB", cfg.default_rates.rate_ab)?;
        cfg.default_rates.rate_bc = positive(&get, "DEFAULT_RATE_BC", cfg.default_rates.rate_bc)?;
        cfg.default_rates.rate_ac = positive(&get, "DEFAULT_RATE_AC", cfg.default_rates.rate_ac)?;
        cfg.default_amount = positive(&get, "DEFAULT_AMOUNT", cfg.default_amount)?;

        if let Some(v) = get("RATE_FEED_URL") {
            let v = v.trim();
            if !v.is_empty() {
                let url = Url::parse(v).map_err(|source| ConfigError::BadUrl { key: "RATE_FEED_URL", source })?;
                cfg.feed_url = Some(url);
            }
        }

        let secs = positive(&get, "RATE_FEED_TIMEOUT_SECS", cfg.feed_timeout.as_secs_f64())?;
        cfg.feed_timeout = Duration::try_from_secs_f64(secs)
            .map_err(|_| ConfigError::OutOfRange { key: "RATE_FEED_TIMEOUT_SECS", value: secs })?;

        Ok(cfg)
    }
}

fn positive<F>(get: &F, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::NotANumber { key, value: raw.clone() })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositive { key, value });
    }
    Ok(value)
}
