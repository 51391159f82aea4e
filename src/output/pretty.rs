use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::error::JtError;

/// Serialize a transform result as JSON.
///
/// `indent` is the number of spaces per nesting level; `None` or `0` prints
/// everything on one line.
pub fn format_value(value: &Value, indent: Option<usize>) -> Result<String, JtError> {
    match indent {
        None | Some(0) => serde_json::to_string(value).map_err(|e| JtError::Parse(e.to_string())),
        Some(width) => {
            let indent = " ".repeat(width);
            let mut buf = Vec::new();
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = Serializer::with_formatter(&mut buf, formatter);
            value
                .serialize(&mut ser)
                .map_err(|e| JtError::Parse(e.to_string()))?;
            String::from_utf8(buf).map_err(|e| JtError::Parse(e.to_string()))
        }
    }
}
