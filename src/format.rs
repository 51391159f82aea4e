use std::path::Path;

use crate::error::JtError;

/// Text formats accepted for templates and inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Detect format from a file extension.
    pub fn from_extension(path: &Path) -> Result<Self, JtError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(JtError::NoExtension)?;

        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(JtError::UnknownExtension(other.to_string())),
        }
    }

    /// Parse a format string from CLI flags.
    pub fn from_str_name(s: &str) -> Result<Self, JtError> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(JtError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Guess the format of text with no file name, e.g. standard input.
    pub fn detect(input: &str) -> Self {
        let trimmed = input.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('"') {
            Format::Json
        } else {
            // YAML also accepts bare JSON scalars
            Format::Yaml
        }
    }
}
