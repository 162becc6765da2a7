//! Error types for the export pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end an export.
///
/// Malformed colors and live/clone structure mismatches are deliberately
/// absent: both degrade locally and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested capture root is not present in the live tree
    #[error("Capture target not found: {0}")]
    MissingTarget(String),

    /// The rasterizer failed to produce an image
    #[error("Rasterization failed: {0}")]
    RenderError(String),

    /// The document assembler failed to produce a document
    #[error("Document assembly failed: {0}")]
    AssemblyError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A tree snapshot could not be loaded
    #[error("Invalid snapshot: {0}")]
    SnapshotError(String),

    /// The scratch color surface could not be created
    #[error("Color surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Filesystem error while persisting a document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SnapshotError(err.to_string())
    }
}
