use thiserror::Error;

/// Result type for thumbnail-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// An unsupported source format is deliberately absent here: it is a valid
/// terminal state modeled by `CodecChoice::Unsupported`, not a failure.
#[derive(Debug, Error)]
pub enum AppError {
    /// Source bytes could not be decoded; fatal for the whole invocation
    #[error("Decode error: {0}")]
    Decode(String),

    /// Re-encoding a variant failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Resize precondition violated (zero-sized source or target)
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// The external WebP transform failed or was unreachable
    #[error("Transform error: {0}")]
    Transform(String),

    /// Object store download/upload failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Event transport or payload error
    #[error("Event error: {0}")]
    Event(String),

    /// Configuration rejected at startup
    #[error("Config error: {0}")]
    Config(String),

    /// Internal consistency error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Event(err.to_string())
    }
}
