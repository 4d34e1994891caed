use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use waterfall_core::allocation::engine::{self, WaterfallConfig};
use waterfall_core::scenarios::sweep::{self, return_rate_steps};

use crate::input;

/// Request file layout for `allocate`: the waterfall configuration plus
/// an optional achieved return (overridable by the CLI flag).
#[derive(Deserialize)]
struct AllocateRequest {
    #[serde(flatten)]
    config: WaterfallConfig,
    #[serde(default)]
    achieved_return_pct: Option<Decimal>,
}

/// Request file layout for `sweep`: the configuration plus an optional
/// explicit rate list.
#[derive(Deserialize)]
struct SweepRequest {
    #[serde(flatten)]
    config: WaterfallConfig,
    #[serde(default)]
    return_rates_pct: Option<Vec<Decimal>>,
}

/// Arguments for a single waterfall allocation
#[derive(Args)]
pub struct AllocateArgs {
    /// Path to JSON/YAML input file (stdin is used when piped)
    #[arg(long)]
    pub input: Option<String>,

    /// Achieved cumulative return in percent (overrides the input file)
    #[arg(long, allow_hyphen_values = true)]
    pub achieved_return: Option<Decimal>,
}

pub fn run_allocate(args: AllocateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: AllocateRequest = input::read_request(args.input.as_deref())?;

    let rate = args
        .achieved_return
        .or(request.achieved_return_pct)
        .ok_or("--achieved-return is required when the input file omits achieved_return_pct")?;

    let result = engine::allocate(&request.config, rate)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a scenario sweep
#[derive(Args)]
pub struct SweepArgs {
    /// Path to JSON/YAML input file (stdin is used when piped)
    #[arg(long)]
    pub input: Option<String>,

    /// Explicit return rates in percent (comma-separated, overrides the ladder)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub rates: Option<Vec<Decimal>>,

    /// Ladder lower bound, percent
    #[arg(long, default_value = "-20", allow_hyphen_values = true)]
    pub min: Decimal,

    /// Ladder upper bound, percent
    #[arg(long, default_value = "40", allow_hyphen_values = true)]
    pub max: Decimal,

    /// Ladder step, percent
    #[arg(long, default_value = "0.5")]
    pub step: Decimal,
}

pub fn run_sweep(args: SweepArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SweepRequest = input::read_request(args.input.as_deref())?;

    let rates = match (args.rates, request.return_rates_pct) {
        (Some(rates), _) => rates,
        (None, Some(rates)) => rates,
        (None, None) => return_rate_steps(args.min, args.max, args.step)?,
    };

    let result = sweep::sweep(&request.config, &rates)?;
    Ok(serde_json::to_value(result)?)
}
