use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to bind {addr}: {source}")]
    BindError {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed event: {message}")]
    MalformedEventError { message: String },

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Handler panicked: {message}")]
    HandlerPanic { message: String },

    #[error("Runtime error: {message}")]
    RuntimeError { message: String },
}

impl AppError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEventError {
            message: message.into(),
        }
    }

    /// Process exit code used when the error escapes `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => 2,
            Self::BindError { .. } => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
