use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::allocation::policy::{
    collect_share_warnings, policy_mode, share_for, sorted_bands, DistributionPolicy,
};
use crate::error::WaterfallError;
use crate::types::*;
use crate::WaterfallResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Committed capital for a tranche, either absolute or relative to the
/// base tranche's capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CapitalSpec {
    /// Absolute amount in base currency units
    Amount { amount: Money },
    /// Percentage of the base tranche's capital (14 = 14%)
    PercentOfBase { percent: Pct },
}

/// One contribution tranche in the capital structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrancheDef {
    /// Stable identifier, unique within a configuration
    pub id: String,
    /// Display label, not load-bearing for the calculation
    pub name: String,
    /// Senior (hurdle) tranche flag; exactly one per configuration
    pub is_base: bool,
    /// Loss-absorption rank: higher = more junior = absorbs loss first.
    /// Ties break by insertion order. The base tranche absorbs last
    /// regardless of its rank.
    pub seniority: u32,
    pub capital: CapitalSpec,
}

/// Capital structure, hurdle terms and distribution policy.
/// One achieved-return figure is supplied per [`allocate`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallConfig {
    pub tranches: Vec<TrancheDef>,
    pub policy: DistributionPolicy,
    /// Preferred return for the base tranche, percent per year
    pub hurdle_rate_pct: Pct,
    pub investment_period_years: Years,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Allocation outcome for a single tranche.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrancheAllocation {
    pub id: String,
    pub name: String,
    pub is_base: bool,
    /// Resolved committed capital
    pub capital: Money,
    /// Hurdle profit actually paid (base tranche only, capped at what
    /// the scenario could fund)
    pub hurdle_profit: Money,
    /// Excess profit received under the distribution policy
    pub excess_profit: Money,
    /// Loss absorbed
    pub loss: Money,
    /// Ending value, clamped to >= 0
    pub ending_value: Money,
    /// Annualized return, percent, 2dp
    pub period_return_pct: Pct,
    /// Cumulative return over the full period, percent, 2dp
    pub cumulative_return_pct: Pct,
}

/// Full result of one waterfall allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationOutput {
    pub total_capital: Money,
    /// Hurdle entitlement of the base tranche for the full period
    pub hurdle_profit: Money,
    /// Aggregate profit above the hurdle (zero when below)
    pub excess_profit: Money,
    pub total_ending_value: Money,
    pub total_period_return_pct: Pct,
    pub total_cumulative_return_pct: Pct,
    pub scenario_type: ScenarioType,
    /// Per-tranche breakdown, in input order
    pub tranches: Vec<TrancheAllocation>,
}

// ---------------------------------------------------------------------------
// Internal allocation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct TrancheState {
    capital: Money,
    hurdle_profit: Money,
    excess_profit: Money,
    loss: Money,
    ending_value: Money,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Run the hurdle-rate waterfall for one achieved-return figure.
///
/// `achieved_return_pct` is the cumulative return over the whole
/// investment period, not an annualized rate. The base tranche is paid
/// its preferred return first; profit above it is split by the
/// distribution policy; losses are absorbed junior-first with the base
/// tranche protected until all others are exhausted.
pub fn allocate(
    config: &WaterfallConfig,
    achieved_return_pct: Pct,
) -> WaterfallResult<ComputationOutput<AllocationOutput>> {
    let start = Instant::now();

    let (output, warnings) = run_allocation(config, achieved_return_pct)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Hurdle-Rate Distribution Waterfall",
        &serde_json::json!({
            "num_tranches": config.tranches.len(),
            "hurdle_rate_pct": config.hurdle_rate_pct.to_string(),
            "investment_period_years": config.investment_period_years.to_string(),
            "achieved_return_pct": achieved_return_pct.to_string(),
            "policy": policy_mode(&config.policy),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// The engine proper, shared between [`allocate`] and the scenario
/// sweeper so that swept results are identical to standalone calls.
pub(crate) fn run_allocation(
    config: &WaterfallConfig,
    achieved_return_pct: Pct,
) -> WaterfallResult<(AllocationOutput, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();

    // --- Validation ---
    if config.tranches.is_empty() {
        return Err(WaterfallError::InvalidInput {
            field: "tranches".into(),
            reason: "At least one tranche is required".into(),
        });
    }
    if config.investment_period_years <= Decimal::ZERO {
        return Err(WaterfallError::InvalidInput {
            field: "investment_period_years".into(),
            reason: "Investment period must be positive".into(),
        });
    }
    let base_count = config.tranches.iter().filter(|t| t.is_base).count();
    if base_count != 1 {
        return Err(WaterfallError::InvalidInput {
            field: "tranches".into(),
            reason: format!("Exactly one base tranche is required, found {base_count}"),
        });
    }
    let base_idx = config
        .tranches
        .iter()
        .position(|t| t.is_base)
        .expect("base tranche checked above");

    // --- Resolve committed capital ---
    let base_capital = match config.tranches[base_idx].capital {
        CapitalSpec::Amount { amount } => amount,
        CapitalSpec::PercentOfBase { .. } => {
            return Err(WaterfallError::InvalidInput {
                field: format!("tranches[{}].capital", config.tranches[base_idx].id),
                reason: "Base tranche capital must be an absolute amount".into(),
            });
        }
    };

    let capitals: Vec<Money> = config
        .tranches
        .iter()
        .map(|t| match t.capital {
            CapitalSpec::Amount { amount } => amount,
            CapitalSpec::PercentOfBase { percent } => {
                round_money(base_capital * percent / dec!(100))
            }
        })
        .collect();

    let total_capital: Money = capitals.iter().copied().sum();
    if total_capital <= Decimal::ZERO {
        return Err(WaterfallError::InvalidInput {
            field: "tranches".into(),
            reason: "Total resolved capital must be positive".into(),
        });
    }

    collect_share_warnings(&config.policy, &mut warnings);

    let mut states: Vec<TrancheState> = capitals
        .iter()
        .map(|&capital| TrancheState {
            capital,
            hurdle_profit: Decimal::ZERO,
            excess_profit: Decimal::ZERO,
            loss: Decimal::ZERO,
            ending_value: capital,
        })
        .collect();

    // --- Hurdle entitlement and scenario profit ---
    let hurdle_cum_rate = config.hurdle_rate_pct / dec!(100) * config.investment_period_years;
    let hurdle_profit = round_money(base_capital * hurdle_cum_rate);
    let total_profit = round_money(total_capital * achieved_return_pct / dec!(100));

    // --- Waterfall branch ---
    if total_profit > hurdle_profit {
        // Excess-profit case: base gets the full hurdle, remainder is
        // split by the distribution policy.
        states[base_idx].hurdle_profit = hurdle_profit;
        states[base_idx].ending_value += hurdle_profit;

        let excess = total_profit - hurdle_profit;
        match &config.policy {
            DistributionPolicy::Global { shares } => {
                for (idx, tranche) in config.tranches.iter().enumerate() {
                    let amount = round_money(excess * share_for(shares, &tranche.id) / dec!(100));
                    states[idx].excess_profit += amount;
                    states[idx].ending_value += amount;
                }
            }
            DistributionPolicy::RangeBased { bands } => {
                distribute_by_bands(
                    config,
                    &mut states,
                    bands,
                    excess,
                    total_profit,
                    hurdle_profit,
                    total_capital,
                    &mut warnings,
                );
            }
        }
    } else if total_profit >= Decimal::ZERO {
        // Shortfall without loss: the base tranche is paid up to its
        // hurdle; any residual above the cap goes to the others pro-rata
        // by capital.
        let paid = total_profit.min(hurdle_profit);
        states[base_idx].hurdle_profit = paid;
        states[base_idx].ending_value += paid;

        let remaining = total_profit - paid;
        if remaining > Decimal::ZERO {
            let non_base_capital: Money = capitals
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != base_idx)
                .map(|(_, c)| *c)
                .sum();
            if non_base_capital > Decimal::ZERO {
                for (idx, state) in states.iter_mut().enumerate() {
                    if idx == base_idx {
                        continue;
                    }
                    state.ending_value += round_money(remaining * state.capital / non_base_capital);
                }
            }
        }
    } else {
        // Loss case: junior tranches (higher rank) lose principal first,
        // the base tranche only after every other tranche is exhausted.
        let mut remaining_loss = total_profit.abs();

        let mut loss_order: Vec<usize> = (0..config.tranches.len())
            .filter(|&idx| idx != base_idx)
            .collect();
        loss_order.sort_by_key(|&idx| std::cmp::Reverse(config.tranches[idx].seniority));

        for idx in loss_order {
            if remaining_loss <= Decimal::ZERO {
                break;
            }
            let absorbed = remaining_loss.min(states[idx].capital);
            states[idx].loss = absorbed;
            states[idx].ending_value = states[idx].capital - absorbed;
            remaining_loss -= absorbed;
        }

        if remaining_loss > Decimal::ZERO {
            let absorbed = remaining_loss.min(states[base_idx].capital);
            states[base_idx].loss = absorbed;
            states[base_idx].ending_value = states[base_idx].capital - absorbed;
        }
    }

    // --- Per-tranche returns ---
    let tranches: Vec<TrancheAllocation> = config
        .tranches
        .iter()
        .zip(states.iter())
        .map(|(def, state)| {
            let ending_value = state.ending_value.max(Decimal::ZERO);
            let (period_return_pct, cumulative_return_pct) = if state.capital > Decimal::ZERO {
                let cumulative = (ending_value - state.capital) / state.capital * dec!(100);
                (
                    round_pct(cumulative / config.investment_period_years),
                    round_pct(cumulative),
                )
            } else {
                (Decimal::ZERO, Decimal::ZERO)
            };
            TrancheAllocation {
                id: def.id.clone(),
                name: def.name.clone(),
                is_base: def.is_base,
                capital: state.capital,
                hurdle_profit: state.hurdle_profit,
                excess_profit: state.excess_profit,
                loss: state.loss,
                ending_value,
                period_return_pct,
                cumulative_return_pct,
            }
        })
        .collect();

    // --- Aggregates ---
    let total_ending_value: Money = tranches.iter().map(|t| t.ending_value).sum();
    let total_cumulative = (total_ending_value - total_capital) / total_capital * dec!(100);

    let scenario_type = if total_profit > hurdle_profit {
        ScenarioType::Profit
    } else if total_profit < Decimal::ZERO {
        ScenarioType::Loss
    } else {
        ScenarioType::BreakEven
    };

    let output = AllocationOutput {
        total_capital,
        hurdle_profit,
        excess_profit: (total_profit - hurdle_profit).max(Decimal::ZERO),
        total_ending_value,
        total_period_return_pct: round_pct(total_cumulative / config.investment_period_years),
        total_cumulative_return_pct: round_pct(total_cumulative),
        scenario_type,
        tranches,
    };

    Ok((output, warnings))
}

/// Distribute excess profit by walking the sorted cumulative-return bands.
///
/// Both the hurdle point and the achieved point are expressed as
/// cumulative-return percentages of total capital; each band receives a
/// slice of the excess proportional to how much of the span
/// `(hurdle%, achieved%]` it covers. Spans no band covers are simply
/// unattributed, which is allowed and reported as a warning.
#[allow(clippy::too_many_arguments)]
fn distribute_by_bands(
    config: &WaterfallConfig,
    states: &mut [TrancheState],
    bands: &[crate::allocation::policy::DistributionBand],
    excess: Money,
    total_profit: Money,
    hurdle_profit: Money,
    total_capital: Money,
    warnings: &mut Vec<String>,
) {
    let total_cum = total_profit / total_capital * dec!(100);
    let hurdle_cum = hurdle_profit / total_capital * dec!(100);
    let total_span = total_cum - hurdle_cum;

    let mut current = hurdle_cum;
    let mut allocated: Money = Decimal::ZERO;

    for band in sorted_bands(bands) {
        let lo = current.max(band.min_return_pct);
        let hi = band
            .max_return_pct
            .map_or(total_cum, |max| max.min(total_cum));

        if hi > lo && total_cum > lo {
            let band_amount = round_money(excess * (hi - lo) / total_span);
            for (idx, tranche) in config.tranches.iter().enumerate() {
                let amount =
                    round_money(band_amount * share_for(&band.shares, &tranche.id) / dec!(100));
                states[idx].excess_profit += amount;
                states[idx].ending_value += amount;
            }
            allocated += band_amount;
            current = hi;
        }

        if current >= total_cum {
            break;
        }
    }

    if allocated < excess {
        warnings.push(format!(
            "Range policy leaves {} of {} excess profit unattributed to any band",
            excess - allocated,
            excess
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::policy::DistributionBand;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn shares(pairs: &[(&str, Decimal)]) -> BTreeMap<String, Pct> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn tranche(id: &str, seniority: u32, is_base: bool, capital: CapitalSpec) -> TrancheDef {
        TrancheDef {
            id: id.into(),
            name: id.to_uppercase(),
            is_base,
            seniority,
            capital,
        }
    }

    /// Base 100, second tranche 14% of base, third tranche 1% of base,
    /// 7%/year hurdle over 2 years (14% cumulative => hurdle profit 14).
    fn three_tranche_config() -> WaterfallConfig {
        WaterfallConfig {
            tranches: vec![
                tranche("base", 1, true, CapitalSpec::Amount { amount: dec!(100) }),
                tranche(
                    "mezz",
                    2,
                    false,
                    CapitalSpec::PercentOfBase { percent: dec!(14) },
                ),
                tranche(
                    "junior",
                    3,
                    false,
                    CapitalSpec::PercentOfBase { percent: dec!(1) },
                ),
            ],
            policy: DistributionPolicy::Global {
                shares: shares(&[
                    ("base", dec!(15)),
                    ("mezz", dec!(70)),
                    ("junior", dec!(15)),
                ]),
            },
            hurdle_rate_pct: dec!(7),
            investment_period_years: dec!(2),
        }
    }

    fn find<'a>(out: &'a AllocationOutput, id: &str) -> &'a TrancheAllocation {
        out.tranches.iter().find(|t| t.id == id).unwrap()
    }

    #[test]
    fn test_capital_resolution_percent_of_base() {
        let config = three_tranche_config();
        let (out, _) = run_allocation(&config, dec!(0)).unwrap();
        assert_eq!(find(&out, "base").capital, dec!(100));
        assert_eq!(find(&out, "mezz").capital, dec!(14));
        assert_eq!(find(&out, "junior").capital, dec!(1));
        assert_eq!(out.total_capital, dec!(115));
    }

    #[test]
    fn test_excess_profit_global_distribution() {
        // 20% cumulative on 115 => profit 23; hurdle 14; excess 9
        let config = three_tranche_config();
        let (out, _) = run_allocation(&config, dec!(20)).unwrap();

        assert_eq!(out.scenario_type, ScenarioType::Profit);
        assert_eq!(out.hurdle_profit, dec!(14));
        assert_eq!(out.excess_profit, dec!(9));

        let base = find(&out, "base");
        assert_eq!(base.hurdle_profit, dec!(14));
        // 15% of 9 = 1.35 -> rounds to 1
        assert_eq!(base.excess_profit, dec!(1));
        assert_eq!(base.ending_value, dec!(115));

        let mezz = find(&out, "mezz");
        // 70% of 9 = 6.3 -> 6
        assert_eq!(mezz.excess_profit, dec!(6));
        assert_eq!(mezz.ending_value, dec!(20));

        let junior = find(&out, "junior");
        assert_eq!(junior.excess_profit, dec!(1));
        assert_eq!(junior.ending_value, dec!(2));
    }

    #[test]
    fn test_shortfall_caps_base_hurdle_payment() {
        // 10% cumulative on 115 => profit round(11.5) = 12, below hurdle 14
        let config = three_tranche_config();
        let (out, _) = run_allocation(&config, dec!(10)).unwrap();

        assert_eq!(out.scenario_type, ScenarioType::BreakEven);
        let base = find(&out, "base");
        assert_eq!(base.hurdle_profit, dec!(12));
        assert_eq!(base.ending_value, dec!(112));
        // Other tranches keep exactly their capital
        assert_eq!(find(&out, "mezz").ending_value, dec!(14));
        assert_eq!(find(&out, "junior").ending_value, dec!(1));
    }

    #[test]
    fn test_break_even_at_exact_hurdle() {
        // Zero-capital non-base tranches: total capital == base capital,
        // so 14% cumulative hits the hurdle exactly.
        let mut config = three_tranche_config();
        config.tranches[1].capital = CapitalSpec::PercentOfBase { percent: dec!(0) };
        config.tranches[2].capital = CapitalSpec::Amount { amount: dec!(0) };

        let (out, _) = run_allocation(&config, dec!(14)).unwrap();
        assert_eq!(out.scenario_type, ScenarioType::BreakEven);
        assert_eq!(out.excess_profit, dec!(0));

        let base = find(&out, "base");
        assert_eq!(base.hurdle_profit, dec!(14));
        assert_eq!(base.excess_profit, dec!(0));

        // Zero-capital tranches report zero returns, never divide by zero
        let mezz = find(&out, "mezz");
        assert_eq!(mezz.period_return_pct, dec!(0));
        assert_eq!(mezz.cumulative_return_pct, dec!(0));
    }

    #[test]
    fn test_loss_absorbed_junior_first() {
        // -10% on 115 => profit round(-11.5) = -11 (half toward +inf),
        // so the pool absorbs a loss of 11
        let config = three_tranche_config();
        let (out, _) = run_allocation(&config, dec!(-10)).unwrap();

        assert_eq!(out.scenario_type, ScenarioType::Loss);
        let junior = find(&out, "junior");
        assert_eq!(junior.loss, dec!(1));
        assert_eq!(junior.ending_value, dec!(0));

        let mezz = find(&out, "mezz");
        assert_eq!(mezz.loss, dec!(10));
        assert_eq!(mezz.ending_value, dec!(4));

        let base = find(&out, "base");
        assert_eq!(base.loss, dec!(0));
        assert_eq!(base.ending_value, dec!(100));
    }

    #[test]
    fn test_loss_reaches_base_after_others_exhausted() {
        // -100% wipes everything: junior 1, mezz 14, base 100
        let config = three_tranche_config();
        let (out, _) = run_allocation(&config, dec!(-100)).unwrap();

        assert_eq!(find(&out, "junior").loss, dec!(1));
        assert_eq!(find(&out, "mezz").loss, dec!(14));
        assert_eq!(find(&out, "base").loss, dec!(100));
        assert_eq!(out.total_ending_value, dec!(0));
    }

    #[test]
    fn test_loss_order_tie_breaks_by_insertion_order() {
        let config = WaterfallConfig {
            tranches: vec![
                tranche("base", 1, true, CapitalSpec::Amount { amount: dec!(100) }),
                tranche("first", 2, false, CapitalSpec::Amount { amount: dec!(10) }),
                tranche("second", 2, false, CapitalSpec::Amount { amount: dec!(10) }),
            ],
            policy: DistributionPolicy::Global {
                shares: shares(&[("base", dec!(100))]),
            },
            hurdle_rate_pct: dec!(0),
            investment_period_years: dec!(1),
        };

        // Loss of 5 on equal-rank tranches hits the earlier-inserted one
        let (out, _) = run_allocation(&config, dec!(-4)).unwrap();
        // total capital 120, -4% => profit round(-4.8) = -5
        assert_eq!(find(&out, "first").loss, dec!(5));
        assert_eq!(find(&out, "second").loss, dec!(0));
    }

    #[test]
    fn test_range_distribution_walks_bands_in_order() {
        // base 100 + mezz 100 = 200 total; hurdle 14 => 7% cumulative.
        // Achieved 15% => profit 30, excess 16, span 7%..15%.
        let config = WaterfallConfig {
            tranches: vec![
                tranche("base", 1, true, CapitalSpec::Amount { amount: dec!(100) }),
                tranche("mezz", 2, false, CapitalSpec::Amount { amount: dec!(100) }),
            ],
            policy: DistributionPolicy::RangeBased {
                bands: vec![
                    // Deliberately stored out of order
                    DistributionBand {
                        min_return_pct: dec!(10),
                        max_return_pct: None,
                        shares: shares(&[("mezz", dec!(100))]),
                    },
                    DistributionBand {
                        min_return_pct: dec!(7),
                        max_return_pct: Some(dec!(10)),
                        shares: shares(&[("base", dec!(50)), ("mezz", dec!(50))]),
                    },
                ],
            },
            hurdle_rate_pct: dec!(7),
            investment_period_years: dec!(2),
        };

        let (out, warnings) = run_allocation(&config, dec!(15)).unwrap();
        assert_eq!(out.excess_profit, dec!(16));

        // Band (7,10]: 3/8 of 16 = 6, split 50/50 => 3 each
        // Band (10,inf): 5/8 of 16 = 10, all to mezz
        assert_eq!(find(&out, "base").excess_profit, dec!(3));
        assert_eq!(find(&out, "mezz").excess_profit, dec!(13));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_range_gap_leaves_span_unattributed() {
        // Single band starting above the hurdle: span 7%..10% is a gap.
        let config = WaterfallConfig {
            tranches: vec![
                tranche("base", 1, true, CapitalSpec::Amount { amount: dec!(100) }),
                tranche("mezz", 2, false, CapitalSpec::Amount { amount: dec!(100) }),
            ],
            policy: DistributionPolicy::RangeBased {
                bands: vec![DistributionBand {
                    min_return_pct: dec!(10),
                    max_return_pct: None,
                    shares: shares(&[("mezz", dec!(100))]),
                }],
            },
            hurdle_rate_pct: dec!(7),
            investment_period_years: dec!(2),
        };

        let (out, warnings) = run_allocation(&config, dec!(15)).unwrap();
        // 5/8 of the 16 excess is attributed, the gap's 6 is not
        assert_eq!(find(&out, "mezz").excess_profit, dec!(10));
        assert_eq!(find(&out, "base").excess_profit, dec!(0));
        assert!(warnings.iter().any(|w| w.contains("unattributed")));
    }

    #[test]
    fn test_range_bands_entirely_above_achieved_allocate_zero() {
        let config = WaterfallConfig {
            tranches: vec![
                tranche("base", 1, true, CapitalSpec::Amount { amount: dec!(100) }),
                tranche("mezz", 2, false, CapitalSpec::Amount { amount: dec!(100) }),
            ],
            policy: DistributionPolicy::RangeBased {
                bands: vec![DistributionBand {
                    min_return_pct: dec!(50),
                    max_return_pct: None,
                    shares: shares(&[("mezz", dec!(100))]),
                }],
            },
            hurdle_rate_pct: dec!(7),
            investment_period_years: dec!(2),
        };

        let (out, warnings) = run_allocation(&config, dec!(15)).unwrap();
        // Aggregate excess still reconciles even though nobody received it
        assert_eq!(out.excess_profit, dec!(16));
        for t in &out.tranches {
            assert_eq!(t.excess_profit, dec!(0));
        }
        assert!(warnings.iter().any(|w| w.contains("unattributed")));
    }

    #[test]
    fn test_no_hurdle_rate_distributes_all_profit_as_excess() {
        let mut config = three_tranche_config();
        config.hurdle_rate_pct = dec!(0);

        let (out, _) = run_allocation(&config, dec!(10)).unwrap();
        assert_eq!(out.hurdle_profit, dec!(0));
        assert_eq!(out.scenario_type, ScenarioType::Profit);
        // profit round(11.5) = 12, all excess
        assert_eq!(out.excess_profit, dec!(12));
    }

    #[test]
    fn test_return_percentages() {
        let config = three_tranche_config();
        let (out, _) = run_allocation(&config, dec!(20)).unwrap();

        let mezz = find(&out, "mezz");
        // (20 - 14) / 14 = 42.857..% cumulative, half per year
        assert_eq!(mezz.cumulative_return_pct, dec!(42.86));
        assert_eq!(mezz.period_return_pct, dec!(21.43));

        let base = find(&out, "base");
        assert_eq!(base.cumulative_return_pct, dec!(15.00));
        assert_eq!(base.period_return_pct, dec!(7.50));
    }

    #[test]
    fn test_aggregate_totals_sum_over_tranches() {
        let config = three_tranche_config();
        let (out, _) = run_allocation(&config, dec!(20)).unwrap();
        let sum: Money = out.tranches.iter().map(|t| t.ending_value).sum();
        assert_eq!(out.total_ending_value, sum);
    }

    #[test]
    fn test_share_sum_warning_surfaces() {
        let mut config = three_tranche_config();
        config.policy = DistributionPolicy::Global {
            shares: shares(&[("base", dec!(15)), ("mezz", dec!(70))]),
        };
        let (_, warnings) = run_allocation(&config, dec!(20)).unwrap();
        assert!(warnings.iter().any(|w| w.contains("not 100%")));
    }

    #[test]
    fn test_missing_share_entry_means_zero() {
        let mut config = three_tranche_config();
        config.policy = DistributionPolicy::Global {
            shares: shares(&[("base", dec!(50)), ("mezz", dec!(50))]),
        };
        let (out, _) = run_allocation(&config, dec!(20)).unwrap();
        assert_eq!(find(&out, "junior").excess_profit, dec!(0));
    }

    #[test]
    fn test_invalid_no_tranches() {
        let config = WaterfallConfig {
            tranches: vec![],
            policy: DistributionPolicy::Global {
                shares: BTreeMap::new(),
            },
            hurdle_rate_pct: dec!(7),
            investment_period_years: dec!(2),
        };
        let err = allocate(&config, dec!(10)).unwrap_err();
        match err {
            WaterfallError::InvalidInput { field, .. } => assert_eq!(field, "tranches"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_non_positive_period() {
        let mut config = three_tranche_config();
        config.investment_period_years = dec!(0);
        assert!(allocate(&config, dec!(10)).is_err());
    }

    #[test]
    fn test_invalid_missing_base_tranche() {
        let mut config = three_tranche_config();
        config.tranches[0].is_base = false;
        assert!(allocate(&config, dec!(10)).is_err());
    }

    #[test]
    fn test_invalid_duplicate_base_tranche() {
        let mut config = three_tranche_config();
        config.tranches[1].is_base = true;
        assert!(allocate(&config, dec!(10)).is_err());
    }

    #[test]
    fn test_invalid_base_capital_as_percent() {
        let mut config = three_tranche_config();
        config.tranches[0].capital = CapitalSpec::PercentOfBase { percent: dec!(50) };
        assert!(allocate(&config, dec!(10)).is_err());
    }

    #[test]
    fn test_invalid_zero_total_capital() {
        let config = WaterfallConfig {
            tranches: vec![tranche(
                "base",
                1,
                true,
                CapitalSpec::Amount { amount: dec!(0) },
            )],
            policy: DistributionPolicy::Global {
                shares: BTreeMap::new(),
            },
            hurdle_rate_pct: dec!(7),
            investment_period_years: dec!(2),
        };
        assert!(allocate(&config, dec!(10)).is_err());
    }

    #[test]
    fn test_envelope_metadata() {
        let config = three_tranche_config();
        let result = allocate(&config, dec!(20)).unwrap();
        assert!(result.methodology.contains("Waterfall"));
        assert!(!result.metadata.version.is_empty());
    }
}
