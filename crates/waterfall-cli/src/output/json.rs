use serde_json::Value;

/// Pretty-print the full output envelope as JSON. This is the default
/// format and the only one that carries every field untouched.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("Failed to render output as JSON: {e}"),
    }
}
