//! Error types for the finance crew

use thiserror::Error;

/// Result type alias for crew operations
pub type Result<T> = std::result::Result<T, CrewError>;

#[derive(Error, Debug)]
pub enum CrewError {

    // =============================
    // Configuration & Input Errors
    // =============================

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InputInvalid(String),

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    // =============================
    // Oracle Errors (surfaced verbatim)
    // =============================

    #[error(transparent)]
    Oracle(#[from] OracleError),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failures raised by the external LLM execution service.
///
/// Carries plain strings so a failure can be compared and cloned by callers
/// without holding on to transport types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("{0} is not configured")]
    MissingCredential(String),

    #[error("LLM network error: {0}")]
    Network(String),

    #[error("LLM request unauthorized: {0}")]
    Unauthorized(String),

    #[error("LLM rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("LLM API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}

impl OracleError {
    /// Classify a non-success HTTP response from an LLM endpoint
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => OracleError::Unauthorized(body),
            429 => OracleError::RateLimited(body),
            _ => OracleError::Http { status, body },
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            OracleError::MalformedResponse(e.to_string())
        } else {
            OracleError::Network(e.to_string())
        }
    }
}
