//! PDF merging: concatenate the per-batch PDFs into one document.
//!
//! Each batch PDF is loaded with `lopdf`, its objects renumbered past the
//! ones already collected, and its pages appended to a fresh page tree in
//! batch order. Attributes a page inherits from its old `/Pages` parent
//! (MediaBox, Resources, …) are copied onto the page before it is
//! re-parented, so nothing visible changes. Source catalogs become
//! unreachable and are pruned before the merged file is written.

use crate::error::Zpl2PdfError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tracing::debug;

/// Page attributes that PDF allows a page to inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// The PDF returned by the service for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// 0-based batch index.
    pub batch: usize,
    pub pdf: Vec<u8>,
}

/// Merge rendered batches, in order, into a single PDF.
///
/// A single batch is returned byte for byte without being parsed.
pub fn merge_pdfs(mut batches: Vec<RenderedPage>) -> Result<Vec<u8>, Zpl2PdfError> {
    match batches.len() {
        0 => return Err(Zpl2PdfError::MergeFailed("no rendered batches to merge".into())),
        1 => return Ok(batches.swap_remove(0).pdf),
        _ => {}
    }

    let mut merged = Document::with_version("1.5");
    let mut page_ids: Vec<ObjectId> = Vec::new();

    for batch in &batches {
        let ids = import_batch(&mut merged, batch)?;
        debug!("Batch {}: {} pages", batch.batch + 1, ids.len());
        page_ids.extend(ids);
    }

    let pages_id = merged.new_object_id();
    for &page_id in &page_ids {
        let page = merged
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?;
        page.set("Parent", pages_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);

    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();

    let mut out = Vec::new();
    merged
        .save_to(&mut out)
        .map_err(|e| Zpl2PdfError::MergeFailed(format!("writing merged PDF: {e}")))?;

    debug!(
        "Merged {} batches into {} pages ({} bytes)",
        batches.len(),
        page_ids.len(),
        out.len()
    );
    Ok(out)
}

/// Move every object of `batch` into `dst` and return its page ids in page order.
fn import_batch(dst: &mut Document, batch: &RenderedPage) -> Result<Vec<ObjectId>, Zpl2PdfError> {
    let mut src = Document::load_mem(&batch.pdf).map_err(|e| {
        Zpl2PdfError::MergeFailed(format!("batch {} is not a readable PDF: {e}", batch.batch + 1))
    })?;
    if src.is_encrypted() {
        return Err(Zpl2PdfError::MergeFailed(format!(
            "batch {} PDF is encrypted",
            batch.batch + 1
        )));
    }

    src.renumber_objects_with(dst.max_id + 1);
    let page_ids: Vec<ObjectId> = src.get_pages().into_values().collect();

    for &page_id in &page_ids {
        let inherited = inherited_attributes(&src, page_id)?;
        let page = src.get_object_mut(page_id).and_then(Object::as_dict_mut)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }

    if src.max_id > dst.max_id {
        dst.max_id = src.max_id;
    }
    dst.objects.extend(src.objects);
    Ok(page_ids)
}

/// Inheritable attributes the page lacks but one of its ancestors defines.
fn inherited_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Vec<(Vec<u8>, Object)>, Zpl2PdfError> {
    let page = doc.get_object(page_id).and_then(Object::as_dict)?;
    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();

    let mut parent = parent_of(page);
    let mut depth = 0;
    while let Some(parent_id) = parent {
        // Malformed trees can loop; real page trees are shallow.
        if missing.is_empty() || depth > 32 {
            break;
        }
        let Ok(node) = doc.get_object(parent_id).and_then(Object::as_dict) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = parent_of(node);
        depth += 1;
    }

    Ok(found)
}

fn parent_of(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(Object::as_reference).ok()
}
