//! # zpl2pdf
//!
//! Convert ZPL label files to PDF using the Labelary rendering service.
//!
//! ## Why this crate?
//!
//! Labelary renders ZPL beautifully but accepts at most 50 labels per
//! request, and multi-column label sheets exported by some tools put the
//! second column a few millimetres off. This crate takes care of both:
//! it splits large files into service-sized batches, renders each one, and
//! stitches the resulting PDFs back together in order, optionally shifting
//! second-column fields first.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ZPL
//!  │
//!  ├─ 1. Input   read file / stdin as raw bytes
//!  ├─ 2. Adjust  shift second-column ^FO X by the offset (if non-zero)
//!  ├─ 3. Split   one record per line-anchored ^XA
//!  ├─ 4. Batch   ≤ 50 labels per request; small files go out verbatim
//!  ├─ 5. Render  sequential POSTs to Labelary, Accept: application/pdf
//!  └─ 6. Merge   concatenate batch PDFs in order (lopdf)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zpl2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .dpmm(8)
//!         .label_size_in(4.0, 6.0)
//!         .build()?;
//!     let output = convert("labels.zpl", &config).await?;
//!     std::fs::write("labels.pdf", &output.pdf)?;
//!     eprintln!("{} labels in {} batches", output.stats.labels, output.stats.batches);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `zpl2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! zpl2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    cm_to_inches, parse_decimal, parse_offset_cm, ConversionConfig, ConversionConfigBuilder,
};
pub use convert::{
    convert, convert_bytes, convert_bytes_sync, convert_sync, convert_to_file, write_pdf,
};
pub use error::Zpl2PdfError;
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::labelary::{format_dimension, LabelRenderer, LabelaryClient, RenderFuture, RenderRequest};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
