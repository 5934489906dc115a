use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::error::EngineError;
use crate::logic::evaluate_model;
use crate::models::{DisplayFigures, EvaluateRequest, EvaluateResponse, FixMode, RateModel, RateSet};
use crate::sources::RateSource;
use crate::utils::{round2, round4};

pub struct AppState {
    pub config: AppConfig,
    pub source: Arc<dyn RateSource>,
}

pub type SharedAppState = Arc<AppState>;

pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/rates", get(rates_handler))
        .route("/api/evaluate", post(evaluate_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// GET /api/rates
pub async fn rates_handler(State(state): State<SharedAppState>) -> impl IntoResponse {
    let quote = state.source.fetch_rates().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "source": state.source.name(),
            "currencies": state.config.currencies,
            "quote": quote,
        })),
    )
}

/// POST /api/evaluate
/// Body: { rate_ab?, rate_bc?, rate_ac?, initial_amount?, mode?, target_profit_percent? }
pub async fn evaluate_handler(
    State(state): State<SharedAppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let payload = match payload {
        Ok(Json(p)) => p,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(json!({"status": "error", "kind": "malformed_request", "message": rejection.body_text()})),
            );
        }
    };

    match evaluate_request(&state, payload).await {
        Ok(resp) => (StatusCode::OK, Json(json!(resp))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "kind": e.kind(), "message": e.to_string()})),
        ),
    }
}

/// Fill missing legs from the rate source, then derive and evaluate.
pub async fn evaluate_request(
    state: &AppState,
    req: EvaluateRequest,
) -> Result<EvaluateResponse, EngineError> {
    // the derived leg is overwritten anyway, so it never triggers a fetch
    let needs_feed = (req.rate_ab.is_none() && req.mode != FixMode::FixAB)
        || (req.rate_bc.is_none() && req.mode != FixMode::FixBC)
        || (req.rate_ac.is_none() && req.mode != FixMode::FixAC);

    let fallback = if needs_feed {
        let quote = state.source.fetch_rates().await;
        info!("evaluate: filled missing legs from {} source", state.source.name());
        quote.rates
    } else {
        state.config.default_rates
    };

    let rates = RateSet::new(
        req.rate_ab.unwrap_or(fallback.rate_ab),
        req.rate_bc.unwrap_or(fallback.rate_bc),
        req.rate_ac.unwrap_or(fallback.rate_ac),
    );
    let amount = req.initial_amount.unwrap_or(state.config.default_amount);
    let model = RateModel::fixed(rates, req.mode, req.target_profit_percent);

    let (resolved, result) = evaluate_model(&model, amount)?;

    Ok(EvaluateResponse {
        status: "success".to_string(),
        currencies: state.config.currencies.clone(),
        initial_amount: amount,
        mode: req.mode,
        rates: resolved,
        display: DisplayFigures {
            rate_ab: round4(resolved.rate_ab),
            rate_bc: round4(resolved.rate_bc),
            rate_ac: round4(resolved.rate_ac),
            via_amount: round4(result.via_amount),
            direct_amount: round4(result.direct_amount),
            profit_percent: round2(result.profit_percent),
        },
        result,
    })
}
