use thiserror::Error;

/// Common error types for the wnode supervisor
#[derive(Error, Debug)]
pub enum WnodeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Logging setup errors
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WnodeError>;

impl From<serde_json::Error> for WnodeError {
    fn from(err: serde_json::Error) -> Self {
        WnodeError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for WnodeError {
    fn from(err: config::ConfigError) -> Self {
        WnodeError::Config(err.to_string())
    }
}

impl From<tracing_subscriber::filter::ParseError> for WnodeError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        WnodeError::Logging(format!("invalid filter directive: {}", err))
    }
}
