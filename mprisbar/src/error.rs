use thiserror::Error;

use crate::config::Field;

/// Failure of a single call into the player backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("endpoint not found: {0}")]
    NotFound(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown field `{0}` in order")]
    UnknownField(String),

    #[error("field `{0}` appears more than once in order")]
    DuplicateField(Field),

    #[error("order must name at least one field")]
    EmptyOrder,
}

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("backend event stream ended")]
    SubscriptionLost,
}
