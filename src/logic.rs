use crate::error::EngineError;
use crate::models::{Classification, EvaluationResult, FixMode, RateModel, RateSet};
use tracing::debug;

/// Profit percentages inside +/- this band are treated as noise.
pub const NEGLIGIBLE_EPSILON: f64 = 1e-5;

/// A target counts as reached when the gap is below this (in percent points).
pub const TARGET_EPSILON: f64 = 0.01;

/// Rejects rates that are non-finite or <= 0.
///
/// The leg solved by `mode` is skipped; its incoming value is overwritten by
/// `derive_rate` and never read.
pub fn validate_rates(rates: &RateSet, mode: FixMode) -> Result<(), EngineError> {
    let legs = [
        ("rate_ab", rates.rate_ab, mode == FixMode::FixAB),
        ("rate_bc", rates.rate_bc, mode == FixMode::FixBC),
        ("rate_ac", rates.rate_ac, mode == FixMode::FixAC),
    ];
    for (name, value, derived) in legs {
        if derived {
            continue;
        }
        if !value.is_finite() || value <= 0.0 {
            return Err(EngineError::InvalidInput(format!("{} must be > 0, got {}", name, value)));
        }
    }
    Ok(())
}

/// Solves the leg picked by `mode` so that the via path beats the direct
/// path by exactly `target_profit_percent`.
pub fn derive_rate(
    mode: FixMode,
    rate_ab: f64,
    rate_bc: f64,
    rate_ac: f64,
    target_profit_percent: f64,
) -> Result<RateSet, EngineError> {
    if mode != FixMode::None && !target_profit_percent.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "target_profit_percent must be finite, got {}",
            target_profit_percent
        )));
    }

    let factor = 1.0 + target_profit_percent / 100.0;
    let (out, name, derived) = match mode {
        FixMode::None => return Ok(RateSet::new(rate_ab, rate_bc, rate_ac)),
        FixMode::FixAB => {
            if rate_bc == 0.0 {
                return Err(EngineError::DivisionByZero("rate_bc"));
            }
            let v = rate_ac * factor / rate_bc;
            (RateSet::new(v, rate_bc, rate_ac), "rate_ab", v)
        }
        FixMode::FixBC => {
            if rate_ab == 0.0 {
                return Err(EngineError::DivisionByZero("rate_ab"));
            }
            let v = rate_ac * factor / rate_ab;
            (RateSet::new(rate_ab, v, rate_ac), "rate_bc", v)
        }
        FixMode::FixAC => {
            if factor == 0.0 {
                return Err(EngineError::DivisionByZero("1 + target_profit_percent/100"));
            }
            let v = rate_ab * rate_bc / factor;
            (RateSet::new(rate_ab, rate_bc, v), "rate_ac", v)
        }
    };

    if !derived.is_finite() || derived <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "derived {} is not a positive rate ({}) for target {}%",
            name, derived, target_profit_percent
        )));
    }
    Ok(out)
}

pub fn classify(profit_percent: f64) -> Classification {
    if profit_percent > NEGLIGIBLE_EPSILON {
        Classification::Profitable
    } else if profit_percent < -NEGLIGIBLE_EPSILON {
        Classification::Unprofitable
    } else {
        Classification::Negligible
    }
}

/// Converts `initial_amount` of A to C both ways and compares.
pub fn evaluate(
    rate_ab: f64,
    rate_bc: f64,
    rate_ac: f64,
    initial_amount: f64,
) -> Result<EvaluationResult, EngineError> {
    if !initial_amount.is_finite() || initial_amount <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "initial_amount must be > 0, got {}",
            initial_amount
        )));
    }
    // zero is allowed so an empty direct leg still yields the 0% policy
    for (name, value) in [("rate_ab", rate_ab), ("rate_bc", rate_bc), ("rate_ac", rate_ac)] {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::InvalidInput(format!("{} must be >= 0, got {}", name, value)));
        }
    }

    let via_amount = initial_amount * rate_ab * rate_bc;
    let direct_amount = initial_amount * rate_ac;

    // zero direct amount is reported as 0% rather than an error
    let profit_percent = if direct_amount == 0.0 {
        0.0
    } else {
        (via_amount - direct_amount) / direct_amount * 100.0
    };

    if !via_amount.is_finite() || !direct_amount.is_finite() || !profit_percent.is_finite() {
        return Err(EngineError::InvalidInput("amounts overflow f64".to_string()));
    }

    Ok(EvaluationResult {
        via_amount,
        direct_amount,
        profit_percent,
        classification: classify(profit_percent),
        target_gap: None,
        target_reached: None,
    })
}

/// Same as `evaluate`, plus the distance from `target_profit_percent`.
pub fn evaluate_with_target(
    rate_ab: f64,
    rate_bc: f64,
    rate_ac: f64,
    initial_amount: f64,
    target_profit_percent: f64,
) -> Result<EvaluationResult, EngineError> {
    if !target_profit_percent.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "target_profit_percent must be finite, got {}",
            target_profit_percent
        )));
    }
    let mut res = evaluate(rate_ab, rate_bc, rate_ac, initial_amount)?;
    let gap = (res.profit_percent - target_profit_percent).abs();
    if !gap.is_finite() {
        return Err(EngineError::InvalidInput(format!("target gap overflows f64 for target {}", target_profit_percent)));
    }
    res.target_gap = Some(gap);
    res.target_reached = Some(gap < TARGET_EPSILON);
    Ok(res)
}

/// Validate, derive the fixed leg (if any), then evaluate.
///
/// Returns the resolved rates next to the result so callers can show the
/// derived leg.
pub fn evaluate_model(
    model: &RateModel,
    initial_amount: f64,
) -> Result<(RateSet, EvaluationResult), EngineError> {
    validate_rates(&model.rates, model.mode)?;
    let r = model.rates;
    let resolved = derive_rate(model.mode, r.rate_ab, r.rate_bc, r.rate_ac, model.target_profit_percent)?;

    let result = match model.target() {
        Some(t) => evaluate_with_target(resolved.rate_ab, resolved.rate_bc, resolved.rate_ac, initial_amount, t)?,
        None => evaluate(resolved.rate_ab, resolved.rate_bc, resolved.rate_ac, initial_amount)?,
    };

    debug!(
        mode = ?model.mode,
        rate_ab = resolved.rate_ab,
        rate_bc = resolved.rate_bc,
        rate_ac = resolved.rate_ac,
        profit = result.profit_percent,
        "evaluated triangle"
    );
    Ok((resolved, result))
}
