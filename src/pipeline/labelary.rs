//! Rendering-service client: POST a batch of ZPL to Labelary, get a PDF back.
//!
//! This is the only stage with network I/O. Rendering sits behind the
//! [`LabelRenderer`] trait so a caller can wrap the HTTP client with its own
//! retry policy, or swap it for a local renderer, without touching splitting
//! or merging.
//!
//! ## Request shape
//!
//! ```text
//! POST {base}/{dpmm}dpmm/labels/{width}x{height}/
//! Accept: application/pdf
//!
//! ^XA ... ^XZ
//! ```
//!
//! Any status other than `200 OK` is a hard failure carrying the status code
//! and the service's diagnostic text. No retries happen here.

use crate::error::Zpl2PdfError;
use futures::future::BoxFuture;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Label geometry sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub dpmm: u32,
    pub width_in: f64,
    pub height_in: f64,
}

/// Future returned by [`LabelRenderer::render`].
pub type RenderFuture<'a> = BoxFuture<'a, Result<Vec<u8>, Zpl2PdfError>>;

/// Turns a ZPL request body into PDF bytes.
///
/// Implementations must be `Send + Sync` so they can live in a shared
/// [`crate::config::ConversionConfig`].
pub trait LabelRenderer: Send + Sync {
    fn render(&self, body: Vec<u8>, request: RenderRequest) -> RenderFuture<'_>;
}

/// HTTP client for the Labelary printer API.
#[derive(Debug, Clone)]
pub struct LabelaryClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl LabelaryClient {
    /// Build a client for `base_url` (e.g. `http://api.labelary.com/v1/printers`).
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, Zpl2PdfError> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Zpl2PdfError::Transport {
                url: base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout_secs,
        })
    }

    /// Full URL for a request with the given geometry.
    pub fn endpoint(&self, request: &RenderRequest) -> String {
        format!(
            "{}/{}dpmm/labels/{}x{}/",
            self.base_url.trim_end_matches('/'),
            request.dpmm,
            format_dimension(request.width_in),
            format_dimension(request.height_in),
        )
    }

    async fn post(&self, body: Vec<u8>, request: RenderRequest) -> Result<Vec<u8>, Zpl2PdfError> {
        let url = self.endpoint(&request);
        let sent = body.len();

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/pdf")
            .body(body)
            .send()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(Zpl2PdfError::RenderFailed {
                status: status.as_u16(),
                body: text,
            });
        }

        let pdf = response
            .bytes()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        debug!("POST {} → {} bytes in, {} bytes out", url, sent, pdf.len());
        Ok(pdf.to_vec())
    }

    fn request_error(&self, url: &str, e: reqwest::Error) -> Zpl2PdfError {
        if e.is_timeout() {
            Zpl2PdfError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            Zpl2PdfError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl LabelRenderer for LabelaryClient {
    fn render(&self, body: Vec<u8>, request: RenderRequest) -> RenderFuture<'_> {
        Box::pin(self.post(body, request))
    }
}

/// Format a label dimension for the URL path: shortest decimal form with no
/// trailing fractional zeros and no dangling point (`4.0` → `4`, `3.50` → `3.5`).
///
/// Zero, or a value that formats to nothing, falls back to `"1"`.
pub fn format_dimension(value: f64) -> String {
    if value == 0.0 {
        return "1".to_string();
    }
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    let trimmed = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if trimmed.is_empty() {
        "1".to_string()
    } else {
        trimmed.to_string()
    }
}
