//! Error types for the Ask Agent form.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a single submission (or, for configuration, every submission).
#[derive(Error, Debug)]
pub enum Error {
    /// Webhook URL is not configured
    #[error("N8N_WEBHOOK is not set. Add it to the function environment.")]
    ConfigMissing,

    /// Other configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Blank question
    #[error("Please type a question.")]
    EmptyInput,

    /// Request body could not be decoded
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    /// Connection failure or timeout talking to the webhook
    #[error("Request to n8n failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Webhook answered with something that is not JSON
    #[error("n8n returned non-JSON (HTTP {status})")]
    Parse { status: u16, body: String },

    /// Webhook answered with JSON and an error status
    #[error("n8n returned HTTP {status}")]
    Remote {
        status: u16,
        body: serde_json::Value,
    },
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::EmptyInput | Error::InvalidInput(_) => 400,
            Error::Transport(_) | Error::Parse { .. } | Error::Remote { .. } => 502,
            _ => 500,
        }
    }

    /// Short machine-readable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigMissing => "config_missing",
            Error::Config(_) => "config",
            Error::EmptyInput => "empty_input",
            Error::InvalidInput(_) => "invalid_input",
            Error::Transport(_) => "transport",
            Error::Parse { .. } => "parse",
            Error::Remote { .. } => "remote",
        }
    }
}
