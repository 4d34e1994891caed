use rust_decimal::Decimal;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::units;

/// Format output as tables using the tabled crate.
///
/// Allocation results get a per-tranche table plus an aggregate table;
/// sweep results get one row per scenario. Anything else falls back to
/// a flat field/value table.
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match envelope.get("result") {
        Some(result) if result.get("scenarios").is_some() => {
            print_sweep_table(result);
        }
        Some(result) if result.get("tranches").is_some() => {
            print_allocation_table(result);
        }
        Some(result) => print_flat_object(result),
        None => print_flat_object(value),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_allocation_table(result: &Value) {
    if let Some(Value::Array(tranches)) = result.get("tranches") {
        let mut builder = Builder::default();
        builder.push_record([
            "Tranche",
            "Capital",
            "Hurdle Profit",
            "Excess Profit",
            "Loss",
            "Ending Value",
            "Return/yr",
            "Cumulative",
        ]);
        for tranche in tranches {
            let get = |key: &str| format_field(key, tranche.get(key).unwrap_or(&Value::Null));
            let label = tranche
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            builder.push_record([
                label,
                get("capital"),
                get("hurdle_profit"),
                get("excess_profit"),
                get("loss"),
                get("ending_value"),
                get("period_return_pct"),
                get("cumulative_return_pct"),
            ]);
        }
        println!("{}", Table::from(builder));
    }

    // Aggregate fields below the tranche breakdown
    if let Value::Object(map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            if key == "tranches" {
                continue;
            }
            builder.push_record([key.as_str(), &format_field(key, val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_sweep_table(result: &Value) {
    let Some(Value::Array(scenarios)) = result.get("scenarios") else {
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Rate", "Scenario", "Total Ending Value", "Cumulative Return"]);
    for scenario in scenarios {
        let rate = format_field(
            "return_rate_pct",
            scenario.get("return_rate_pct").unwrap_or(&Value::Null),
        );
        let inner = scenario.get("result").cloned().unwrap_or(Value::Null);
        let get = |key: &str| format_field(key, inner.get(key).unwrap_or(&Value::Null));
        builder.push_record([
            rate,
            get("scenario_type"),
            get("total_ending_value"),
            get("total_cumulative_return_pct"),
        ]);
    }
    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_field(key, val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn is_money_key(key: &str) -> bool {
    matches!(
        key,
        "capital" | "hurdle_profit" | "excess_profit" | "loss" | "ending_value"
            | "total_capital" | "total_ending_value"
    )
}

/// Render one field. Decimals arrive as JSON strings; money and percent
/// fields get the display treatment, everything else prints as-is.
fn format_field(key: &str, value: &Value) -> String {
    if let Some(decimal) = value.as_str().and_then(|s| s.parse::<Decimal>().ok()) {
        if is_money_key(key) {
            return units::money(decimal);
        }
        if key.ends_with("_pct") {
            return units::percent(decimal);
        }
        return decimal.to_string();
    }

    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
