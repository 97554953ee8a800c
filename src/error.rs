//! Error types for pdfsheet.
//!
//! Two layers of failure exist. [`Error`] is what a caller of the library
//! sees: it is only ever produced for failures that abort the request.
//! [`CapabilityError`] is what a page/table/OCR capability returns; the
//! orchestrator inspects its scope and degrades instead of failing.

use std::io;
use thiserror::Error;

/// Result type alias for pdfsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort an extraction request.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we cannot interpret.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// No stage could open the document.
    #[error("Cannot open document: {reason}")]
    DocumentOpen {
        /// What the opening capability reported.
        reason: String,
    },

    /// The per-request scratch copy of the document could not be created.
    #[error("Cannot materialize document: {0}")]
    Scratch(#[source] io::Error),

    /// The workbook could not be produced after extraction succeeded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The background extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl Error {
    /// The request failed because the input could not be read.
    pub fn is_input_failure(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::DocumentOpen { .. }
                | Error::Scratch(_)
        )
    }

    /// The request failed after extraction, while producing the deliverable.
    pub fn is_output_failure(&self) -> bool {
        matches!(self, Error::Serialization(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Serialization(format!("XML write error: {}", err))
    }
}

#[cfg(feature = "async")]
impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization error: {}", err))
    }
}

/// Failure reported by one capability call.
///
/// The variant is the blast radius of the failure, which is what the
/// orchestrator's degrade-or-fallback policy keys on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The capability could not open or process the document as a whole.
    #[error("document could not be processed: {0}")]
    Document(String),

    /// A single page failed; other pages may still succeed.
    #[error("page {page}: {message}")]
    Page {
        /// 1-based page number.
        page: u32,
        /// What went wrong.
        message: String,
    },

    /// The backing engine is not installed or not reachable.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// Any other failure of the call.
    #[error("{0}")]
    Failed(String),
}

impl CapabilityError {
    /// Build a page-scoped error.
    pub fn page(page: u32, message: impl Into<String>) -> Self {
        CapabilityError::Page {
            page,
            message: message.into(),
        }
    }

    /// Whether this failure concerns the whole document rather than one page.
    pub fn is_document_level(&self) -> bool {
        matches!(
            self,
            CapabilityError::Document(_) | CapabilityError::Unavailable(_)
        )
    }
}

impl From<lopdf::Error> for CapabilityError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => {
                CapabilityError::Document("document is encrypted".to_string())
            }
            _ => CapabilityError::Document(err.to_string()),
        }
    }
}

impl From<CapabilityError> for Error {
    fn from(err: CapabilityError) -> Self {
        Error::DocumentOpen {
            reason: err.to_string(),
        }
    }
}
