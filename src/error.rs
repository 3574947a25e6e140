//! Error types for the zpl2pdf library.
//!
//! Every failure in the pipeline is fatal. A conversion either yields one
//! complete PDF or returns a [`Zpl2PdfError`]; there is no partial output.
//! In particular a failed batch discards the PDFs of the batches that were
//! already rendered, so callers never receive a document with missing labels.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the zpl2pdf library.
#[derive(Debug, Error)]
pub enum Zpl2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("ZPL file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the input (file or stdin) failed for another reason.
    #[error("Failed to read input '{input}': {source}")]
    InputReadFailed {
        input: String,
        #[source]
        source: std::io::Error,
    },

    /// The document contained no bytes at all.
    #[error("Input '{input}' is empty; nothing to convert")]
    EmptyInput { input: String },

    // ── Rendering-service errors ──────────────────────────────────────────
    /// The rasterization service answered with a status other than 200.
    #[error("Failed to convert ZPL to PDF (HTTP {status}): {body}")]
    RenderFailed { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, connection reset…).
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The service did not answer within the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    // ── Merge errors ──────────────────────────────────────────────────────
    /// A rendered batch could not be parsed or the merged document could not be written.
    #[error("Failed to merge rendered PDFs: {0}")]
    MergeFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Zpl2PdfError {
    /// True for failures reported by, or on the way to, the rendering service.
    ///
    /// Timeouts and transport errors are grouped with HTTP failures here: the
    /// pipeline handles all three identically.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            Zpl2PdfError::RenderFailed { .. }
                | Zpl2PdfError::Transport { .. }
                | Zpl2PdfError::Timeout { .. }
        )
    }
}

impl From<lopdf::Error> for Zpl2PdfError {
    fn from(err: lopdf::Error) -> Self {
        Zpl2PdfError::MergeFailed(err.to_string())
    }
}
