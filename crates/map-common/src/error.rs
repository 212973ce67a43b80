//! Error types for render and grid-encoding jobs.

use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Primary error type for render/encode operations.
///
/// Every job failure is folded into one of these variants before it crosses
/// the worker boundary; callers always see a single error outcome with a
/// non-empty diagnostic message.
#[derive(Debug, Error)]
pub enum RenderError {
    // === Caller errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported layer type: {0}")]
    UnsupportedLayerType(String),

    // === Collaborator errors ===
    #[error("Datasource error: {0}")]
    Datasource(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Image encoding failed: {0}")]
    Codec(String),

    // === Encoder errors ===
    #[error("Too many distinct grid keys: {0}")]
    TooManyDistinctKeys(String),

    // === Infrastructure errors ===
    #[error("Scheduler is shutting down")]
    ShuttingDown,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RenderError {
    /// Whether resubmitting the same job could ever succeed without the
    /// caller changing something first.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            RenderError::Configuration(_)
                | RenderError::InvalidArgument(_)
                | RenderError::UnsupportedLayerType(_)
        )
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Internal(format!("JSON error: {}", err))
    }
}
