//! Batching: decide how many render requests a document needs and build
//! the body of each.
//!
//! Labelary renders at most 50 labels per request. Documents at or under the
//! limit (or with no detectable labels) go out as a single request carrying
//! the **original bytes**, preamble and trailer included. Only larger
//! documents are rebuilt from their records, `batch_size` labels at a time,
//! joined with `\n` and terminated by a final `\n`.

use crate::pipeline::split::LabelRecord;
use std::borrow::Cow;

/// One render request's worth of labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<'a> {
    /// 0-based position in the conversion.
    pub index: usize,
    /// Labels carried by this batch (0 when the document had no `^XA`).
    pub label_count: usize,
    pub body: Cow<'a, [u8]>,
}

/// Partition `doc` into request bodies.
///
/// `records` must come from [`crate::pipeline::split::split_labels`] on the
/// same `doc`. Always returns at least one batch.
pub fn plan_batches<'a>(
    doc: &'a [u8],
    records: &[LabelRecord<'a>],
    batch_size: usize,
) -> Vec<Batch<'a>> {
    let batch_size = batch_size.max(1);

    if records.len() <= batch_size {
        return vec![Batch {
            index: 0,
            label_count: records.len(),
            body: Cow::Borrowed(doc),
        }];
    }

    records
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            label_count: chunk.len(),
            body: Cow::Owned(join_records(chunk)),
        })
        .collect()
}

/// Number of render requests for `label_count` detected labels.
pub fn batch_count(label_count: usize, batch_size: usize) -> usize {
    let batch_size = batch_size.max(1);
    if label_count <= batch_size {
        1
    } else {
        label_count.div_ceil(batch_size)
    }
}

fn join_records(chunk: &[LabelRecord<'_>]) -> Vec<u8> {
    let len = chunk.iter().map(|r| r.bytes.len() + 1).sum();
    let mut body = Vec::with_capacity(len);
    for record in chunk {
        body.extend_from_slice(record.bytes);
        body.push(b'\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::split::split_labels;

    fn labels(n: usize) -> Vec<u8> {
        let mut doc = b"~JA\n".to_vec();
        for i in 0..n {
            doc.extend_from_slice(format!("^XA^FO10,10^FD{i}^FS^XZ\r\n").as_bytes());
        }
        doc.extend_from_slice(b"~JR");
        doc
    }

    #[test]
    fn no_labels_sends_whole_document() {
        let doc = b"~WC";
        let batches = plan_batches(doc, &split_labels(doc), 50);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].label_count, 0);
        assert!(matches!(batches[0].body, Cow::Borrowed(_)));
        assert_eq!(batches[0].body.as_ref(), doc);
    }

    #[test]
    fn at_limit_sends_original_bytes() {
        let doc = labels(50);
        let records = split_labels(&doc);
        assert_eq!(records.len(), 50);
        let batches = plan_batches(&doc, &records, 50);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].body.as_ref(), doc.as_slice());
    }

    #[test]
    fn over_limit_chunks_in_order() {
        let doc = labels(120);
        let records = split_labels(&doc);
        let batches = plan_batches(&doc, &records, 50);

        let counts: Vec<usize> = batches.iter().map(|b| b.label_count).collect();
        assert_eq!(counts, vec![50, 50, 20]);
        assert_eq!(
            batches.iter().map(|b| b.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let first = std::str::from_utf8(&batches[0].body).unwrap();
        assert!(first.starts_with("^XA^FO10,10^FD0^FS^XZ\n^XA^FO10,10^FD1^FS^XZ\n"));
        assert!(first.ends_with("^FD49^FS^XZ\n"));
        assert!(!first.contains('\r'));
        assert!(!first.contains("~JA"));

        let last = std::str::from_utf8(&batches[2].body).unwrap();
        assert!(last.starts_with("^XA^FO10,10^FD100^FS"));
        // Trailing commands stay attached to the last label.
        assert!(last.ends_with("^FD119^FS^XZ\r\n~JR\n"));
        assert_eq!(last.matches("^XA").count(), 20);
    }

    #[test]
    fn batch_count_matches_plan() {
        for n in [0, 1, 49, 50, 51, 100, 101, 120, 250] {
            let doc = labels(n);
            let planned = plan_batches(&doc, &split_labels(&doc), 50).len();
            assert_eq!(planned, batch_count(n, 50), "n = {n}");
        }
        assert_eq!(batch_count(120, 50), 3);
        assert_eq!(batch_count(0, 50), 1);
    }

    #[test]
    fn zero_batch_size_is_treated_as_one() {
        let doc = labels(3);
        let batches = plan_batches(&doc, &split_labels(&doc), 0);
        assert_eq!(batches.len(), 3);
    }
}
