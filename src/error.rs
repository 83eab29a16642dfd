//! Error types for the post studio

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, persisting or exporting a post
#[derive(Error, Debug)]
pub enum Error {
    /// Durable storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored record could not be decoded at all
    #[error("Failed to decode stored post: {0}")]
    Decode(String),

    /// An avatar upload was refused; the message is shown to the user as-is
    #[error("{0}")]
    AvatarRejected(String),

    /// No rendered preview surface is available for capture
    #[error("Tweet preview not found. Please try again.")]
    SurfaceNotFound,

    /// An export is already running
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Rasterization or image encoding failed
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// The encoded file could not be delivered
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

#[cfg(feature = "raster")]
impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Encode(err.to_string())
    }
}
