//! Three-leg rate arbitrage calculator.
//!
//! Compares converting A -> B -> C against A -> C directly, and can solve one
//! leg backwards so the spread hits a target margin. The engine in [`logic`]
//! is pure; [`sources`] and [`routes`] wrap it in a small HTTP service.

pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod routes;
pub mod sources;
pub mod utils;

pub use error::EngineError;
pub use logic::{derive_rate, evaluate, evaluate_model, evaluate_with_target};
pub use models::{Classification, EvaluationResult, FixMode, RateModel, RateSet};
