//! XLSX error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while opening, editing or saving a package
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML that tokenizes but does not form a usable document
    #[error("Malformed XML: {0}")]
    Malformed(String),

    /// A part whose structure cannot be rewritten safely
    #[error("Corrupt part {}: {reason}", path.display())]
    Corrupt {
        /// Path of the offending part
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// No sheet with this name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// A sheet with this name already exists
    #[error("Sheet name already exists: {0}")]
    DuplicateSheet(String),

    /// A part used after it was closed
    #[error("{0} is already closed")]
    Closed(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetsplice_core::Error),
}

impl XlsxError {
    /// Create a corruption error for the part at `path`
    pub fn corrupt<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        XlsxError::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
