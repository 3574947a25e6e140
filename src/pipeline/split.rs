//! Label splitting: cut a ZPL document into one record per `^XA` label.
//!
//! A record runs from a line-anchored `^XA` (case-insensitive, leading
//! whitespace allowed) up to the next such marker or the end of the
//! document. Anything before the first marker is dropped, and no attempt is
//! made to pair markers with `^XZ`; the service does its own validation.
//!
//! Splitting works on raw bytes so that non-UTF-8 input (Latin-1 exports
//! from older label designers) is cut without any lossy decode.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::debug;

static RE_LABEL_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mi)^\s*(\^XA)").unwrap());

/// One label of a document, borrowed from it: starts at its `^XA`, trailing whitespace trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRecord<'a> {
    /// Byte offset of the record's `^XA` in the source document.
    pub offset: usize,
    pub bytes: &'a [u8],
}

/// Split `doc` into label records, in document order.
///
/// Returns an empty vector when no `^XA` is found; the caller then treats
/// the whole document as a single opaque unit.
pub fn split_labels(doc: &[u8]) -> Vec<LabelRecord<'_>> {
    // (line start, marker start) per match; a record runs from its marker to
    // the next match's line start, so indentation never leads a record.
    let bounds: Vec<(usize, usize)> = RE_LABEL_START
        .captures_iter(doc)
        .filter_map(|c| Some((c.get(0)?.start(), c.get(1)?.start())))
        .collect();
    if bounds.is_empty() {
        debug!("No ^XA markers found in {} bytes", doc.len());
        return Vec::new();
    }

    let mut records = Vec::with_capacity(bounds.len());
    for (i, &(_, marker)) in bounds.iter().enumerate() {
        let end = bounds.get(i + 1).map_or(doc.len(), |&(line, _)| line);
        records.push(LabelRecord {
            offset: marker,
            bytes: doc[marker..end].trim_ascii_end(),
        });
    }

    debug!("Split {} bytes into {} labels", doc.len(), records.len());
    records
}
