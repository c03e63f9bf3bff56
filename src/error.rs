//! Error types for the nudge agent.

use std::path::PathBuf;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures of the data source. Any of these collapses a run to zero nudges.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required columns in CRM data: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid amount_eur for deal {deal_id}: {value:?}")]
    InvalidAmount { deal_id: String, value: String },

    #[error("Malformed CRM row at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("CRM data has no header row")]
    EmptyCrm,

    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Empty response from {provider}")]
    EmptyResponse { provider: String },
}

/// Snapshot sink errors.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
