use rust_decimal::{Decimal, RoundingStrategy};
use waterfall_core::types::round_pct;

fn hundred_million() -> Decimal {
    Decimal::from(100_000_000u64)
}

/// Render a monetary amount for tabular display, in hundred-million
/// currency units: 2 decimals below one unit, 1 decimal at or above.
/// Raw numerics are never altered in the serialized output, only in
/// tables.
pub fn money(amount: Decimal) -> String {
    let compact = amount / hundred_million();
    if compact.abs() < Decimal::ONE {
        let rounded = compact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2} x100M")
    } else {
        let rounded = compact.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.1} x100M")
    }
}

/// Render a percentage figure for tabular display, rounded to 2
/// decimal places. Formatting alone would truncate.
pub fn percent(rate: Decimal) -> String {
    format!("{:.2}%", round_pct(rate))
}
