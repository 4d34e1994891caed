use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use waterfall_core::allocation::engine::{self, WaterfallConfig};
use waterfall_core::scenarios::sweep;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct AllocateRequest {
    #[serde(flatten)]
    config: WaterfallConfig,
    achieved_return_pct: Decimal,
}

#[derive(Deserialize)]
struct SweepRequest {
    #[serde(flatten)]
    config: WaterfallConfig,
    return_rates_pct: Vec<Decimal>,
}

/// Run one hurdle-rate waterfall allocation. Takes and returns JSON.
#[napi]
pub fn allocate_waterfall(input_json: String) -> NapiResult<String> {
    let request: AllocateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = engine::allocate(&request.config, request.achieved_return_pct)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Run the allocation across an ordered list of achieved returns.
/// Takes and returns JSON; scenario order matches the input order.
#[napi]
pub fn sweep_scenarios(input_json: String) -> NapiResult<String> {
    let request: SweepRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        sweep::sweep(&request.config, &request.return_rates_pct).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
