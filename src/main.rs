use std::net::SocketAddr;
use std::sync::Arc;

use tri_rate_calc::config::AppConfig;
use tri_rate_calc::routes::{self, AppState};
use tri_rate_calc::sources::{FixedRateSource, HttpRateSource, RateSource};
use tri_rate_calc::utils;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    utils::init_tracing();

    let config = AppConfig::from_env()?;

    let source: Arc<dyn RateSource> = match &config.feed_url {
        Some(url) => {
            tracing::info!("using rate feed at {}", url);
            Arc::new(HttpRateSource::new(
                url.clone(),
                config.feed_timeout,
                config.currencies.clone(),
                config.default_rates,
            )?)
        }
        None => {
            tracing::info!("RATE_FEED_URL not set, serving default rates");
            Arc::new(FixedRateSource::new(config.default_rates))
        }
    };

    let c = &config.currencies;
    tracing::info!("triangle {} -> {} -> {} vs {} -> {}", c.a, c.b, c.c, c.a, c.c);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = routes::router(Arc::new(AppState { config, source }));

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
