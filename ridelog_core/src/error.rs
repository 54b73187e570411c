//! Error types for the ridelog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ridelog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred (unreadable or missing export archive is fatal)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// XML error from the export reader
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A timestamp attribute did not match the export format
    #[error("invalid timestamp '{raw}': {source}")]
    Timestamp {
        raw: String,
        source: chrono::ParseError,
    },

    /// A record element is missing a required attribute
    #[error("record missing required attribute '{0}'")]
    MissingAttr(&'static str),

    /// A numeric attribute failed to parse
    #[error("invalid number '{value}' in attribute '{attr}'")]
    Number { attr: &'static str, value: String },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An unsupported metric name was requested
    #[error("unknown metric '{0}' (expected distance, duration, elevation or energy)")]
    UnknownMetric(String),
}
