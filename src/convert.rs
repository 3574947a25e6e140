//! Conversion entry points.
//!
//! Every entry point funnels into [`convert_bytes`], which runs the whole
//! pipeline: optional column shift, label split, batching, one render call
//! per batch (strictly in order, one at a time), and the final merge.
//!
//! A failure anywhere aborts the conversion. Batches already rendered are
//! dropped; the caller gets an error, never a PDF with labels missing.

use crate::config::ConversionConfig;
use crate::error::Zpl2PdfError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::batch::{plan_batches, Batch};
use crate::pipeline::labelary::{LabelRenderer, LabelaryClient, RenderRequest};
use crate::pipeline::merge::{merge_pdfs, RenderedPage};
use crate::pipeline::{adjust, input, split};
use crate::progress::ProgressCallback;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a ZPL file (or stdin, when `input` is `-`) to PDF.
///
/// # Errors
/// - File not found / permission denied / empty input
/// - Any render request failing (HTTP status, transport, timeout)
/// - A returned PDF that cannot be merged
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Zpl2PdfError> {
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);
    let zpl = input::read_input(input_str).await?;
    convert_bytes(&zpl, config).await
}

/// Convert ZPL bytes held in memory to PDF.
///
/// With a zero offset the bytes reach the service unmodified (for documents
/// of at most `batch_size` labels). With a non-zero offset the document is
/// decoded, adjusted and re-encoded as UTF-8 first.
///
/// # Example
/// ```rust,no_run
/// use zpl2pdf::{convert_bytes, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let zpl = std::fs::read("labels.zpl")?;
/// let config = ConversionConfig::builder().label_size_cm(10.0, 15.0).build()?;
/// let output = convert_bytes(&zpl, &config).await?;
/// std::fs::write("labels.pdf", &output.pdf)?;
/// # Ok(())
/// # }
/// ```
pub async fn convert_bytes(
    zpl: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Zpl2PdfError> {
    let total_start = Instant::now();
    let renderer = resolve_renderer(config)?;

    // ── Step 1: Column shift ─────────────────────────────────────────────
    let (document, shifted_commands): (Cow<'_, [u8]>, usize) = if config.offset_cm == 0.0 {
        (Cow::Borrowed(zpl), 0)
    } else {
        let text = input::decode_document(zpl);
        let adjusted =
            adjust::adjust_second_column(&text, config.dpmm, config.width_in, config.offset_cm);
        info!(
            "Shifted {} second-column ^FO commands by {} cm",
            adjusted.shifted, config.offset_cm
        );
        (
            Cow::Owned(adjusted.text.into_owned().into_bytes()),
            adjusted.shifted,
        )
    };

    // ── Step 2: Split + batch ────────────────────────────────────────────
    let records = split::split_labels(&document);
    let batches = plan_batches(&document, &records, config.batch_size);
    info!(
        "{} labels detected → {} render request(s)",
        records.len(),
        batches.len()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(batches.len(), records.len());
    }

    // ── Step 3: Render, one batch at a time ──────────────────────────────
    let render_start = Instant::now();
    let batch_total = batches.len();
    let rendered = render_batches(
        renderer.as_ref(),
        batches,
        config.render_request(),
        config.progress_callback.as_ref(),
    )
    .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Step 4: Merge ────────────────────────────────────────────────────
    let merge_start = Instant::now();
    let pdf = tokio::task::spawn_blocking(move || merge_pdfs(rendered))
        .await
        .map_err(|e| Zpl2PdfError::Internal(format!("Merge task panicked: {}", e)))??;
    let merge_duration_ms = merge_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        labels: records.len(),
        batches: batch_total,
        shifted_commands,
        input_bytes: zpl.len(),
        output_bytes: pdf.len(),
        render_duration_ms,
        merge_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} labels, {} batches, {} bytes PDF, {}ms total",
        stats.labels, stats.batches, stats.output_bytes, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(batch_total, pdf.len());
    }

    Ok(ConversionOutput { pdf, stats })
}

/// Render `batches` in order, stopping at the first failure.
///
/// Exactly one request is in flight at any time. On success the returned
/// pages are in batch order.
pub async fn render_batches(
    renderer: &dyn LabelRenderer,
    batches: Vec<Batch<'_>>,
    request: RenderRequest,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<RenderedPage>, Zpl2PdfError> {
    let total = batches.len();
    let mut rendered = Vec::with_capacity(total);

    for batch in batches {
        let batch_num = batch.index + 1;
        if let Some(cb) = progress {
            cb.on_batch_start(batch_num, total);
        }
        debug!(
            "Batch {}/{}: {} labels, {} bytes",
            batch_num,
            total,
            batch.label_count,
            batch.body.len()
        );

        match renderer.render(batch.body.into_owned(), request).await {
            Ok(pdf) => {
                if let Some(cb) = progress {
                    cb.on_batch_complete(batch_num, total, pdf.len());
                }
                rendered.push(RenderedPage {
                    batch: batch.index,
                    pdf,
                });
            }
            Err(e) => {
                warn!("Batch {}/{} failed — {}", batch_num, total, e);
                if let Some(cb) = progress {
                    cb.on_batch_error(batch_num, total, &e.to_string());
                }
                return Err(e);
            }
        }
    }

    Ok(rendered)
}

/// Convert a ZPL file and write the PDF directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Zpl2PdfError> {
    let output = convert(input_str, config).await?;
    write_pdf(output_path.as_ref(), &output.pdf).await?;
    Ok(output.stats)
}

/// Write `pdf` to `path` atomically, creating parent directories.
pub async fn write_pdf(path: &Path, pdf: &[u8]) -> Result<(), Zpl2PdfError> {
    let write_err = |source| Zpl2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, pdf).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally; do not call from inside one.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Zpl2PdfError> {
    runtime()?.block_on(convert(input_str, config))
}

/// Synchronous wrapper around [`convert_bytes`].
pub fn convert_bytes_sync(
    zpl: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Zpl2PdfError> {
    runtime()?.block_on(convert_bytes(zpl, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn runtime() -> Result<tokio::runtime::Runtime, Zpl2PdfError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Zpl2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))
}

/// Use the caller's renderer if one was supplied, else an HTTP client for `base_url`.
fn resolve_renderer(config: &ConversionConfig) -> Result<Arc<dyn LabelRenderer>, Zpl2PdfError> {
    if let Some(ref renderer) = config.renderer {
        return Ok(Arc::clone(renderer));
    }
    let client = LabelaryClient::new(config.base_url.clone(), config.timeout_secs)?;
    Ok(Arc::new(client))
}
