use serde_json::Value;
use std::io::{self, Read};

/// Read JSON from stdin when data is piped in. Returns None on a TTY or
/// when the pipe carries nothing but whitespace.
pub fn read_piped() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(buffer.trim())?))
}
