use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Pct;

/// How excess profit above the hurdle is split among tranches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DistributionPolicy {
    /// One share mapping (percent per tranche id) applied to all excess profit.
    Global { shares: BTreeMap<String, Pct> },
    /// Cumulative-return bands, each with its own share mapping.
    /// Bands are sorted by `min_return_pct` before use; gaps and overlaps
    /// are permitted in storage.
    RangeBased { bands: Vec<DistributionBand> },
}

/// A single cumulative-return band of a range-based policy.
///
/// Covers the return span `(min_return_pct, max_return_pct]`, expressed as
/// cumulative percentages of total capital. `None` for `max_return_pct`
/// means unbounded above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionBand {
    pub min_return_pct: Pct,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_return_pct: Option<Pct>,
    /// Distribution share (percent) per tranche id. Missing ids get zero.
    pub shares: BTreeMap<String, Pct>,
}

/// Look up a tranche's share in a mapping. Absent entries count as zero,
/// never as an error.
pub fn share_for(shares: &BTreeMap<String, Pct>, tranche_id: &str) -> Pct {
    shares.get(tranche_id).copied().unwrap_or(Decimal::ZERO)
}

/// Return the policy's bands sorted by `min_return_pct` ascending.
/// The sort is stable, so equal minimums keep their storage order.
pub fn sorted_bands(bands: &[DistributionBand]) -> Vec<&DistributionBand> {
    let mut sorted: Vec<&DistributionBand> = bands.iter().collect();
    sorted.sort_by_key(|b| b.min_return_pct);
    sorted
}

/// Short label for the policy variant, used in output metadata.
pub fn policy_mode(policy: &DistributionPolicy) -> &'static str {
    match policy {
        DistributionPolicy::Global { .. } => "global",
        DistributionPolicy::RangeBased { .. } => "range_based",
    }
}

/// Warn when a share mapping does not sum to 100%.
///
/// The engine does not enforce this sum; inconsistent policies still
/// compute, and the discrepancy is surfaced to the caller as a warning.
pub(crate) fn collect_share_warnings(policy: &DistributionPolicy, warnings: &mut Vec<String>) {
    match policy {
        DistributionPolicy::Global { shares } => {
            let sum: Decimal = shares.values().copied().sum();
            if sum != dec!(100) {
                warnings.push(format!(
                    "Global distribution shares sum to {sum}%, not 100%"
                ));
            }
        }
        DistributionPolicy::RangeBased { bands } => {
            for (idx, band) in bands.iter().enumerate() {
                let sum: Decimal = band.shares.values().copied().sum();
                if sum != dec!(100) {
                    warnings.push(format!(
                        "Distribution band {idx} (min {}%) shares sum to {sum}%, not 100%",
                        band.min_return_pct
                    ));
                }
            }
        }
    }
}
