//! Error types and handling for spacelock

use thiserror::Error;

/// Result type alias for spacelock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Spacelock error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key error: {0}")]
    Key(String),

    #[error("Token error: {0}")]
    Token(#[from] crate::token::TokenError),

    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] crate::uuids::IdParseError),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] crate::delivery::DeliveryError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(format!("TOML error: {}", err))
    }
}
