pub mod json;
pub mod yaml;

use std::path::Path;

use serde_json::Value;

use crate::error::JtError;
use crate::format::Format;

/// Parse text into a serde_json::Value based on format.
pub fn parse(input: &str, format: Format) -> Result<Value, JtError> {
    match format {
        Format::Json => json::parse(input),
        Format::Yaml => yaml::parse(input),
    }
}

/// Read and parse a file, choosing the format from its extension unless forced.
pub fn parse_file(path: &Path, format: Option<Format>) -> Result<Value, JtError> {
    let format = match format {
        Some(f) => f,
        None => Format::from_extension(path)?,
    };
    let content = std::fs::read_to_string(path)?;
    parse(&content, format)
}
