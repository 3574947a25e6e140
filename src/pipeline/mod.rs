//! Pipeline stages for ZPL-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested without the network.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ adjust ──▶ split ──▶ batch ──▶ labelary ──▶ merge
//! (bytes)   (^FO X)    (^XA)     (≤ 50)    (HTTP)       (lopdf)
//! ```
//!
//! 1. [`input`]    — read the file or stdin; decode only when text is needed
//! 2. [`adjust`]   — shift second-column `^FO` commands (skipped for a zero offset)
//! 3. [`split`]    — cut the document into `^XA` label records
//! 4. [`batch`]    — group records into request bodies of at most 50 labels
//! 5. [`labelary`] — one POST per batch; the only stage with network I/O
//! 6. [`merge`]    — concatenate the returned PDFs in batch order

pub mod adjust;
pub mod batch;
pub mod input;
pub mod labelary;
pub mod merge;
pub mod split;
