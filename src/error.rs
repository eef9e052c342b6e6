//! Error types for the I/O edges of the crate.
//!
//! Rendering never fails; only configuration, transport and presentation do.

/// Result alias used by fallible riftgate operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MQTT error: {0}")]
    Mqtt(String),

    #[error("control socket error: {0}")]
    Socket(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("frame source error: {0}")]
    Source(String),
}

impl Error {
    pub fn mqtt(message: impl Into<String>) -> Self {
        Error::Mqtt(message.into())
    }

    pub fn display(message: impl Into<String>) -> Self {
        Error::Display(message.into())
    }

    pub fn source(message: impl Into<String>) -> Self {
        Error::Source(message.into())
    }
}
