//! Error types for mesh import and export.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading or writing mesh files.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// Binary STL shorter than its declared triangle count.
    #[error("invalid face count: expected {expected}, got {got}")]
    InvalidFaceCount {
        /// Declared number of triangles.
        expected: u32,
        /// Number of complete triangles present.
        got: u32,
    },

    /// A required VTK data array is absent.
    #[error("missing data array: {name}")]
    MissingArray {
        /// Name of the array.
        name: String,
    },

    /// A VTK cell type this exporter never writes.
    #[error("unsupported cell type {type_id} with {node_count} nodes")]
    UnsupportedCell {
        /// VTK cell type code.
        type_id: u8,
        /// Number of nodes in the cell.
        node_count: usize,
    },

    /// Declared and actual element counts disagree.
    #[error("{what} count mismatch: declared {declared}, found {found}")]
    CountMismatch {
        /// Which count disagrees.
        what: &'static str,
        /// Count declared in the file header.
        declared: usize,
        /// Count actually present.
        found: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Integer parsing error.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Map a missing file to [`IoError::FileNotFound`], anything else to
    /// [`IoError::Io`].
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
