//! Error types for the handout library.

use std::io;
use thiserror::Error;

/// Result type alias for handout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building a handout.
///
/// The block scanner itself never fails: malformed markup degrades to a
/// valid block list. Errors only come from the edges (files, strict header
/// validation, serialization).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The `[DOC ...]` header contains keys that are not recognized.
    #[error("Unknown DOC header keys: {}", .0.join(", "))]
    UnknownHeaderKeys(Vec<String>),

    /// The `[DOC ...]` header could not be tokenized.
    #[error("Invalid DOC header: {0}")]
    InvalidHeader(String),

    /// A figure page could not be rasterized.
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// An option value is out of range or malformed.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownHeaderKeys(vec!["colour".to_string(), "font".to_string()]);
        assert_eq!(err.to_string(), "Unknown DOC header keys: colour, font");

        let err = Error::Rasterize("pdftoppm exited with status 1".to_string());
        assert_eq!(
            err.to_string(),
            "Rasterization error: pdftoppm exited with status 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
