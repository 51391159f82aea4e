use serde_json::Value;

use crate::error::JtError;

/// Parse a JSON string into a serde_json::Value, keeping object key order.
pub fn parse(input: &str) -> Result<Value, JtError> {
    serde_json::from_str(input).map_err(|e| JtError::Parse(e.to_string()))
}
