//! Domain error types.

use thiserror::Error;

/// Convenience alias for portrait pipeline results.
pub type PortraitResult<T> = Result<T, PortraitError>;

/// Failures of a single portrait request, from validation to parsing.
#[derive(Debug, Error)]
pub enum PortraitError {
    /// The submission was rejected; the message is safe to show the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider answered with a non-success status or could not be reached.
    /// `status` is `None` for transport failures.
    #[error("Upstream error: {detail}")]
    Upstream { status: Option<u16>, detail: String },

    /// The model text was not valid JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Startup configuration errors. These are fatal for the server binary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0}")]
    MissingCredential(&'static str),

    #[error("Invalid {0}: expected a key starting with \"sk-\"")]
    MalformedCredential(&'static str),

    #[error("Unknown upstream provider: {0} (expected \"anthropic\" or \"openai\")")]
    UnknownProvider(String),

    #[error("Invalid upstream endpoint: {0}")]
    InvalidEndpoint(String),
}
