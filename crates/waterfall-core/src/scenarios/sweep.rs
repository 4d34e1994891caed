use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::allocation::engine::{run_allocation, AllocationOutput, WaterfallConfig};
use crate::allocation::policy::policy_mode;
use crate::error::WaterfallError;
use crate::types::*;
use crate::WaterfallResult;

/// One swept scenario: the candidate return and its allocation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepScenario {
    /// Cumulative achieved return, percent
    pub return_rate_pct: Pct,
    pub result: AllocationOutput,
}

/// Ordered results of a scenario sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutput {
    pub scenarios: Vec<SweepScenario>,
}

/// Run the allocation engine once per candidate return rate.
///
/// Results preserve the caller-supplied order of `return_rates_pct` and
/// are identical to standalone [`crate::allocation::engine::allocate`]
/// calls; no state is shared across scenarios. A configuration error in
/// any scenario aborts the whole sweep.
pub fn sweep(
    config: &WaterfallConfig,
    return_rates_pct: &[Pct],
) -> WaterfallResult<ComputationOutput<SweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut scenarios = Vec::with_capacity(return_rates_pct.len());
    for &rate in return_rates_pct {
        let (result, scenario_warnings) = run_allocation(config, rate)?;
        for warning in scenario_warnings {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
        scenarios.push(SweepScenario {
            return_rate_pct: rate,
            result,
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Hurdle Waterfall Scenario Sweep",
        &serde_json::json!({
            "num_scenarios": return_rates_pct.len(),
            "num_tranches": config.tranches.len(),
            "policy": policy_mode(&config.policy),
        }),
        warnings,
        elapsed,
        SweepOutput { scenarios },
    ))
}

/// Build the ascending ladder of return rates from `min_pct` to
/// `max_pct` inclusive, stepping by `step_pct`. The last value may fall
/// short of `max_pct` when the step does not land on it exactly.
pub fn return_rate_steps(min_pct: Pct, max_pct: Pct, step_pct: Pct) -> WaterfallResult<Vec<Pct>> {
    if step_pct <= Decimal::ZERO {
        return Err(WaterfallError::InvalidInput {
            field: "step_pct".into(),
            reason: "Step must be positive".into(),
        });
    }
    if min_pct > max_pct {
        return Err(WaterfallError::InvalidInput {
            field: "min_pct".into(),
            reason: "Min must be <= max".into(),
        });
    }

    let mut rates = Vec::new();
    let mut current = min_pct;
    while current <= max_pct {
        rates.push(current);
        current += step_pct;
    }
    Ok(rates)
}
