//! Shared helpers for integration tests.
#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};
use std::sync::Mutex;
use zpl2pdf::{LabelRenderer, RenderFuture, RenderRequest, Zpl2PdfError};

/// `n` labels, one per line, each printing its index; wrapped in a preamble and trailer.
pub fn zpl_labels(n: usize) -> Vec<u8> {
    let mut doc = b"~JA\n".to_vec();
    for i in 0..n {
        doc.extend_from_slice(format!("^XA^FO20,20^A0N,40,40^FDlabel {i}^FS^XZ\n").as_bytes());
    }
    doc.extend_from_slice(b"~JR\n");
    doc
}

/// A PDF with one page per marker; each page draws `(marker)`.
pub fn make_pdf(markers: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for marker in markers {
        let content = format!("BT /F1 10 Tf 5 5 Td ({marker}) Tj ET").into_bytes();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 288.into(), 432.into()],
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => markers.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save test pdf");
    out
}

/// Page markers of a PDF, in page order.
pub fn page_markers(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).expect("valid pdf");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let content = doc.get_page_content(id).expect("page content");
            let text = String::from_utf8_lossy(&content).into_owned();
            let start = text.find('(').expect("marker start") + 1;
            let end = text.rfind(')').expect("marker end");
            text[start..end].to_string()
        })
        .collect()
}

/// In-process stand-in for the rendering service.
///
/// Returns one page per `^XA` in the body (one page when there is none),
/// marked `c{call}p{page}`. Optionally fails on a given 1-based call.
#[derive(Default)]
pub struct FakeRenderer {
    pub calls: Mutex<Vec<(Vec<u8>, RenderRequest)>>,
    pub fail_on_call: Option<usize>,
}

impl FakeRenderer {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }

    pub fn bodies(&self) -> Vec<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(body, _)| body.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl LabelRenderer for FakeRenderer {
    fn render(&self, body: Vec<u8>, request: RenderRequest) -> RenderFuture<'_> {
        Box::pin(async move {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((body.clone(), request));
                calls.len()
            };
            if self.fail_on_call == Some(call) {
                return Err(Zpl2PdfError::RenderFailed {
                    status: 400,
                    body: "ERROR: Invalid ZPL".into(),
                });
            }
            let text = String::from_utf8_lossy(&body);
            let pages = text.matches("^XA").count().max(1);
            let markers: Vec<String> = (1..=pages).map(|p| format!("c{call}p{p}")).collect();
            Ok(make_pdf(&markers))
        })
    }
}
