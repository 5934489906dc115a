//! Rate sources and request resolution against a local fake feed.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;
use url::Url;

use tri_rate_calc::config::AppConfig;
use tri_rate_calc::error::EngineError;
use tri_rate_calc::models::{
    Classification, CurrencyTriple, EvaluateRequest, FixMode, LegProvenance, RateOrigin, RateQuote, RateSet,
};
use tri_rate_calc::routes::{evaluate_request, router, AppState};
use tri_rate_calc::sources::{FixedRateSource, HttpRateSource, RateSource};

const DEFAULTS: RateSet = RateSet { rate_ab: 0.5, rate_bc: 7.0, rate_ac: 4.8 };

/// Source that always reports the same live quote and counts calls.
struct StubSource {
    rates: RateSet,
    calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl RateSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_rates(&self) -> RateQuote {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        RateQuote {
            rates: self.rates,
            provenance: LegProvenance::all(RateOrigin::Live),
            fetched_at: Utc::now(),
        }
    }
}

fn stub_state(rates: RateSet) -> (AppState, Arc<StubSource>) {
    let stub = Arc::new(StubSource { rates, calls: Default::default() });
    let state = AppState { config: AppConfig::default(), source: stub.clone() };
    (state, stub)
}

async fn latest(Path(code): Path<String>) -> impl IntoResponse {
    match code.as_str() {
        "AUD" => (
            StatusCode::OK,
            Json(json!({"result": "success", "base_code": "AUD", "rates": {"USDT": 0.65, "CNY": 4.7}})),
        ),
        // no CNY quote for the stablecoin
        "USDT" => (
            StatusCode::OK,
            Json(json!({"result": "success", "base_code": "USDT", "rates": {"USD": 1.0}})),
        ),
        "EUR" => (
            StatusCode::OK,
            Json(json!({"result": "error", "error-type": "unsupported-code"})),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

async fn spawn_fake_feed() -> Url {
    let app = Router::new().route("/v6/latest/:code", get(latest));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{}/v6/", addr)).unwrap()
}

/// Serve the real router with `state` and return its base URL.
async fn spawn_app(state: AppState) -> String {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn http_source(base: Url, currencies: CurrencyTriple) -> HttpRateSource {
    HttpRateSource::new(base, Duration::from_secs(2), currencies, DEFAULTS).unwrap()
}

#[tokio::test]
async fn fixed_source_reports_defaults() {
    let q = FixedRateSource::new(DEFAULTS).fetch_rates().await;
    assert_eq!(q.rates, DEFAULTS);
    assert_eq!(q.provenance, LegProvenance::all(RateOrigin::Default));
}

#[tokio::test]
async fn http_source_falls_back_per_leg() {
    let base = spawn_fake_feed().await;
    let q = http_source(base, CurrencyTriple::default()).fetch_rates().await;

    assert_eq!(q.rates, RateSet::new(0.65, 7.0, 4.7));
    assert_eq!(q.provenance.ab, RateOrigin::Live);
    assert_eq!(q.provenance.bc, RateOrigin::Default);
    assert_eq!(q.provenance.ac, RateOrigin::Live);
}

#[tokio::test]
async fn http_source_treats_feed_errors_as_defaults() {
    let base = spawn_fake_feed().await;
    let currencies = CurrencyTriple { a: "EUR".into(), b: "GBP".into(), c: "AUD".into() };
    let q = http_source(base, currencies).fetch_rates().await;

    assert_eq!(q.rates, DEFAULTS);
    assert_eq!(q.provenance, LegProvenance::all(RateOrigin::Default));
}

#[tokio::test]
async fn http_source_survives_unreachable_feed() {
    let base = Url::parse("http://127.0.0.1:1/").unwrap();
    let q = http_source(base, CurrencyTriple::default()).fetch_rates().await;
    assert_eq!(q.rates, DEFAULTS);
    assert!(!q.provenance.is_fully_live());
}

#[tokio::test]
async fn full_request_skips_the_source() {
    let (state, stub) = stub_state(RateSet::new(9.0, 9.0, 9.0));
    let req = EvaluateRequest {
        rate_ab: Some(0.65),
        rate_bc: Some(7.2),
        rate_ac: Some(4.7),
        initial_amount: Some(100_000.0),
        ..Default::default()
    };
    let resp = evaluate_request(&state, req).await.unwrap();

    assert_eq!(stub.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(resp.result.classification, Classification::Unprofitable);
    assert_eq!(resp.display.profit_percent, -0.43);
    assert_eq!(resp.display.via_amount, 468_000.0);
    assert_eq!(resp.result.target_gap, None);
}

#[tokio::test]
async fn missing_legs_come_from_the_source() {
    let (state, stub) = stub_state(RateSet::new(0.65, 7.2, 4.7));
    let req = EvaluateRequest { rate_ab: Some(0.5), ..Default::default() };
    let resp = evaluate_request(&state, req).await.unwrap();

    assert_eq!(stub.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(resp.rates, RateSet::new(0.5, 7.2, 4.7));
    assert_eq!(resp.initial_amount, 1.0);
}

#[tokio::test]
async fn fixed_direct_leg_overrides_supplied_rate() {
    let (state, stub) = stub_state(RateSet::new(9.0, 9.0, 9.0));
    let req = EvaluateRequest {
        rate_ab: Some(0.65),
        rate_bc: Some(7.2),
        rate_ac: None,
        initial_amount: Some(10.0),
        mode: FixMode::FixAC,
        target_profit_percent: 1.2,
    };
    let resp = evaluate_request(&state, req).await.unwrap();

    assert_eq!(stub.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(resp.display.rate_ac, 4.6245);
    assert!((resp.result.profit_percent - 1.2).abs() < 1e-6);
    assert_eq!(resp.result.target_reached, Some(true));
}

#[tokio::test]
async fn engine_errors_reach_the_caller() {
    let (state, _) = stub_state(DEFAULTS);
    let req = EvaluateRequest {
        rate_ab: Some(0.65),
        rate_bc: Some(7.2),
        mode: FixMode::FixAC,
        target_profit_percent: -100.0,
        ..Default::default()
    };
    let err = evaluate_request(&state, req).await.unwrap_err();
    assert!(matches!(err, EngineError::DivisionByZero(_)));

    let req = EvaluateRequest { initial_amount: Some(0.0), ..Default::default() };
    let err = evaluate_request(&state, req).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn mode_names_on_the_wire() {
    let req: EvaluateRequest =
        serde_json::from_str(r#"{"rate_ab":0.65,"mode":"fix_bc","target_profit_percent":0.5}"#).unwrap();
    assert_eq!(req.mode, FixMode::FixBC);
    assert_eq!(req.rate_bc, None);

    let req: EvaluateRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(req.mode, FixMode::None);
    assert_eq!(req.target_profit_percent, 0.0);
}

#[tokio::test]
async fn health_endpoint() {
    let (state, _) = stub_state(DEFAULTS);
    let base = spawn_app(state).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn rates_endpoint_reports_source_and_quote() {
    let (state, stub) = stub_state(RateSet::new(0.65, 7.2, 4.7));
    let base = spawn_app(state).await;

    let resp = reqwest::get(format!("{}/api/rates", base)).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["source"], "stub");
    assert_eq!(body["currencies"], json!({"a": "AUD", "b": "USDT", "c": "CNY"}));
    assert_eq!(body["quote"]["rates"], json!({"rate_ab": 0.65, "rate_bc": 7.2, "rate_ac": 4.7}));
    assert_eq!(body["quote"]["provenance"], json!({"ab": "live", "bc": "live", "ac": "live"}));
    assert!(body["quote"]["fetched_at"].is_string());
    assert_eq!(stub.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn evaluate_endpoint_success() {
    let (state, _) = stub_state(DEFAULTS);
    let base = spawn_app(state).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/evaluate", base))
        .json(&json!({
            "rate_ab": 0.65,
            "rate_bc": 7.2,
            "initial_amount": 100.0,
            "mode": "fix_ac",
            "target_profit_percent": 1.2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["mode"], "fix_ac");
    assert_eq!(body["display"]["rate_ac"], 4.6245);
    assert_eq!(body["display"]["profit_percent"], 1.2);
    assert_eq!(body["result"]["classification"], "profitable");
    assert_eq!(body["result"]["target_reached"], true);
}

#[tokio::test]
async fn evaluate_endpoint_maps_engine_error_to_400() {
    let (state, _) = stub_state(DEFAULTS);
    let base = spawn_app(state).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/evaluate", base))
        .json(&json!({"rate_ab": 0.65, "rate_bc": 7.2, "mode": "fix_ac", "target_profit_percent": -100.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "division_by_zero");
    assert!(body["message"].as_str().unwrap().contains("division by zero"));
}

#[tokio::test]
async fn evaluate_endpoint_reports_malformed_body_as_json() {
    let (state, _) = stub_state(DEFAULTS);
    let base = spawn_app(state).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/evaluate", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();

    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "malformed_request");
    assert!(body["message"].is_string());
}
