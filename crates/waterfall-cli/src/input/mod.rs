pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve the request body from `--input` or piped stdin.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_config(path);
    }
    if let Some(value) = stdin::read_piped()? {
        return Ok(serde_json::from_value(value)?);
    }
    Err("--input <file.json|file.yaml> or piped stdin is required".into())
}
