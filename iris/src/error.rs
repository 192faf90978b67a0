//! Error types for depth-of-field capture.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or running a capture.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid capture configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Required resource missing: {0}")]
    ResourceMissing(String),

    #[error("Degenerate camera geometry: view direction is parallel to the up reference")]
    DegenerateGeometry,

    #[error("Render of sample {index} failed: {source}")]
    Render {
        index: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("Post-process composite failed: {0}")]
    Composite(#[source] anyhow::Error),

    #[error("Capture aborted after {completed} of {total} samples")]
    Aborted { completed: u32, total: u32 },

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: String, actual: String },

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load config '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Encoding(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
