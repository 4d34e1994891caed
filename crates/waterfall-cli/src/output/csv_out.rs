use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Sweep results become one row per scenario; allocation results one
/// row per tranche; anything else a field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(scenarios)) = result.get("scenarios") {
        let _ = wtr.write_record([
            "return_rate_pct",
            "scenario_type",
            "total_ending_value",
            "total_cumulative_return_pct",
            "excess_profit",
        ]);
        for scenario in scenarios {
            let inner = scenario.get("result").cloned().unwrap_or(Value::Null);
            let _ = wtr.write_record([
                cell(scenario.get("return_rate_pct")),
                cell(inner.get("scenario_type")),
                cell(inner.get("total_ending_value")),
                cell(inner.get("total_cumulative_return_pct")),
                cell(inner.get("excess_profit")),
            ]);
        }
    } else if let Some(Value::Array(tranches)) = result.get("tranches") {
        let _ = wtr.write_record([
            "id",
            "name",
            "capital",
            "hurdle_profit",
            "excess_profit",
            "loss",
            "ending_value",
            "period_return_pct",
            "cumulative_return_pct",
        ]);
        for tranche in tranches {
            let _ = wtr.write_record([
                cell(tranche.get("id")),
                cell(tranche.get("name")),
                cell(tranche.get("capital")),
                cell(tranche.get("hurdle_profit")),
                cell(tranche.get("excess_profit")),
                cell(tranche.get("loss")),
                cell(tranche.get("ending_value")),
                cell(tranche.get("period_return_pct")),
                cell(tranche.get("cumulative_return_pct")),
            ]);
        }
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.clone(), cell(Some(val))]);
        }
    }

    let _ = wtr.flush();
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}
