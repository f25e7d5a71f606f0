//! Error types for the glyphml library.

use std::io;
use thiserror::Error;

/// Result type alias for glyphml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during markup extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from a sink or an underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A page's content stream could not be walked.
    #[error("Content stream error on page {page}: {message}")]
    ContentStream {
        /// 1-indexed page number.
        page: u32,
        /// Decoder detail.
        message: String,
    },

    /// An embedded raster resource failed to decode or copy.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error decoding a glyph or its font data.
    #[error("Glyph decoding error: {0}")]
    GlyphDecode(String),

    /// The markup sink rejected a write. Always fatal, never retried.
    #[error("Markup sink rejected write: {0}")]
    Sink(String),

    /// Structural failure outside any single page's processing.
    #[error("Document structure error: {0}")]
    Structure(String),

    /// The document completed with recoverable per-page failures.
    ///
    /// Carries the first recorded failure as the representative cause;
    /// the remaining records stay attached for diagnostics.
    #[error("Extraction incomplete: {first}")]
    Incomplete {
        /// The first recorded failure.
        first: Box<ErrorRecord>,
        /// Later failures, in the order they were recorded.
        suppressed: Vec<ErrorRecord>,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is recoverable at page scope.
    ///
    /// Recoverable errors are recorded and processing continues with the
    /// next page; everything else aborts the document.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ContentStream { .. } | Error::ImageExtract(_) | Error::GlyphDecode(_)
        )
    }
}

/// A caught, page-scoped failure recorded during extraction.
#[derive(Error, Debug)]
#[error("page {page}: {error}")]
pub struct ErrorRecord {
    /// 1-indexed page number the failure occurred on.
    pub page: u32,
    /// The underlying error.
    pub error: Error,
}

impl ErrorRecord {
    /// Record an error against a page.
    pub fn new(page: u32, error: Error) -> Self {
        Self { page, error }
    }
}
