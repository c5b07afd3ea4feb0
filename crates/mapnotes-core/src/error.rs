//! Error types for the map notes layer.

use thiserror::Error;

/// Result type alias using the layer's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for map notes operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Notes feed was malformed (bad XML, missing or non-numeric fields)
    #[error("Feed error: {0}")]
    Feed(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(e: std::num::ParseFloatError) -> Self {
        Error::Feed(format!("invalid coordinate: {}", e))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        Error::Feed(format!("invalid note id: {}", e))
    }
}
