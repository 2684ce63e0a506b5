use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the analysis boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzeError {
    /// The caller handed over something other than an ordered list of strings.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An external negative ratio outside `[0, 1]`.
    #[error("negative ratio must be within [0, 1], got {0}")]
    InvalidRatio(f64),
}

/// Errors raised while loading or compiling pattern tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read pattern file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pattern file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render pattern file: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid pattern {pattern:?} in category {category}: {source}")]
    Pattern {
        category: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
