use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentage figures (7 = 7%). Never decimals (0.07).
pub type Pct = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Round a monetary amount to the nearest whole currency unit, halves
/// toward positive infinity: round_money(-11.5) is -11, not -12.
///
/// Applied at every accumulation step rather than deferred to output,
/// so repeated scenario runs cannot accumulate sub-unit drift.
pub fn round_money(amount: Money) -> Money {
    (amount + dec!(0.5)).floor()
}

/// Round a percentage to 2 decimal places for final output, halves
/// toward positive infinity. Never used mid-computation.
pub fn round_pct(pct: Pct) -> Pct {
    (pct * dec!(100) + dec!(0.5)).floor() / dec!(100)
}

/// Classification of an allocation outcome relative to the hurdle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioType {
    /// Total profit exceeds the hurdle amount
    Profit,
    /// Aggregate loss, absorbed junior-first
    Loss,
    /// Profit between zero and the hurdle amount (inclusive)
    BreakEven,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_halves_toward_positive_infinity() {
        assert_eq!(round_money(dec!(1.5)), dec!(2));
        assert_eq!(round_money(dec!(11.5)), dec!(12));
        assert_eq!(round_money(dec!(1.35)), dec!(1));
        // Negative halves go up, not away from zero
        assert_eq!(round_money(dec!(-1.5)), dec!(-1));
        assert_eq!(round_money(dec!(-11.5)), dec!(-11));
        assert_eq!(round_money(dec!(-4.8)), dec!(-5));
    }

    #[test]
    fn test_round_pct_two_places() {
        assert_eq!(round_pct(dec!(42.857142)), dec!(42.86));
        assert_eq!(round_pct(dec!(7.125)), dec!(7.13));
        assert_eq!(round_pct(dec!(-3.005)), dec!(-3));
    }

    #[test]
    fn test_scenario_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ScenarioType::BreakEven).unwrap(),
            "\"break-even\""
        );
        assert_eq!(
            serde_json::to_string(&ScenarioType::Profit).unwrap(),
            "\"profit\""
        );
        assert_eq!(
            serde_json::to_string(&ScenarioType::Loss).unwrap(),
            "\"loss\""
        );
    }
}
