//! Progress-callback trait for per-batch conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while the pipeline sends each batch to the rendering service.
//! Small documents produce exactly one batch; a 120-label file produces three.
//!
//! # Example
//!
//! ```rust
//! use zpl2pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_batch_complete(&self, batch_num: usize, total_batches: usize, pdf_len: usize) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Batch {}/{} done ({} bytes)", batch_num, total_batches, pdf_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { rendered: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it renders each batch.
///
/// Batches are rendered one after another, so events arrive in batch order.
/// The trait is still `Send + Sync` because the config that carries it may be
/// shared across tasks. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after splitting, before the first request is sent.
    ///
    /// # Arguments
    /// * `total_batches` — number of render requests that will be issued
    /// * `total_labels`  — number of `^XA` labels detected (0 if none)
    fn on_conversion_start(&self, total_batches: usize, total_labels: usize) {
        let _ = (total_batches, total_labels);
    }

    /// Called just before the request for a batch is sent.
    ///
    /// `batch_num` is 1-indexed.
    fn on_batch_start(&self, batch_num: usize, total_batches: usize) {
        let _ = (batch_num, total_batches);
    }

    /// Called when the service returned a PDF for a batch.
    ///
    /// # Arguments
    /// * `batch_num`     — 1-indexed batch number
    /// * `total_batches` — total batches
    /// * `pdf_len`       — byte length of the returned PDF
    fn on_batch_complete(&self, batch_num: usize, total_batches: usize, pdf_len: usize) {
        let _ = (batch_num, total_batches, pdf_len);
    }

    /// Called when a batch failed. No further batches are attempted.
    fn on_batch_error(&self, batch_num: usize, total_batches: usize, error: &str) {
        let _ = (batch_num, total_batches, error);
    }

    /// Called once after the merged PDF has been produced.
    ///
    /// Not called when the conversion fails.
    fn on_conversion_complete(&self, total_batches: usize, pdf_len: usize) {
        let _ = (total_batches, pdf_len);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
