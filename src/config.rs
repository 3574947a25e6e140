//! Configuration types for ZPL-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The config is immutable once built and
//! is shared by every batch of a conversion.
//!
//! Units follow the rendering service: label size in **inches**, resolution
//! in **dots per millimetre**. The column offset is given in **centimetres**
//! because that is how the label sheets are measured on the bench.

use crate::error::Zpl2PdfError;
use crate::pipeline::labelary::{LabelRenderer, RenderRequest};
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Public Labelary printer endpoint; the path continues with `{dpmm}dpmm/labels/{w}x{h}/`.
pub const DEFAULT_BASE_URL: &str = "http://api.labelary.com/v1/printers";

/// Largest number of labels Labelary accepts in a single request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Per-request timeout against the rendering service.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a ZPL-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use zpl2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpmm(8)
///     .label_size_in(4.0, 6.0)
///     .offset_cm(0.5)
///     .build()
///     .unwrap();
/// assert_eq!(config.batch_size, 50);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Printer resolution in dots per millimetre. Default: 8 (≈ 203 dpi).
    ///
    /// Labelary supports 6, 8, 12 and 24; other values are passed through and
    /// rejected by the service itself.
    pub dpmm: u32,

    /// Label width in inches. Default: 4.0.
    pub width_in: f64,

    /// Label height in inches. Default: 6.0.
    pub height_in: f64,

    /// Horizontal shift applied to second-column `^FO` commands, in centimetres.
    /// Default: 0.0 (document left untouched).
    ///
    /// Positive values move the second column right, negative values left.
    pub offset_cm: f64,

    /// Maximum labels per render request. Default: 50.
    pub batch_size: usize,

    /// Base URL of the rendering service. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds. Default: 30.
    pub timeout_secs: u64,

    /// Pre-constructed renderer. Takes precedence over `base_url`.
    ///
    /// Use this to plug in a retrying client, a local renderer, or a fake in tests.
    pub renderer: Option<Arc<dyn LabelRenderer>>,

    /// Optional progress callback fired per batch.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpmm: 8,
            width_in: 4.0,
            height_in: 6.0,
            offset_cm: 0.0,
            batch_size: DEFAULT_BATCH_SIZE,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            renderer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpmm", &self.dpmm)
            .field("width_in", &self.width_in)
            .field("height_in", &self.height_in)
            .field("offset_cm", &self.offset_cm)
            .field("batch_size", &self.batch_size)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn LabelRenderer>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The per-request rendering parameters derived from this config.
    pub fn render_request(&self) -> RenderRequest {
        RenderRequest {
            dpmm: self.dpmm,
            width_in: self.width_in,
            height_in: self.height_in,
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn dpmm(mut self, dpmm: u32) -> Self {
        self.config.dpmm = dpmm;
        self
    }

    pub fn width_in(mut self, width: f64) -> Self {
        self.config.width_in = width;
        self
    }

    pub fn height_in(mut self, height: f64) -> Self {
        self.config.height_in = height;
        self
    }

    /// Set both label dimensions in inches.
    pub fn label_size_in(self, width: f64, height: f64) -> Self {
        self.width_in(width).height_in(height)
    }

    /// Set both label dimensions in centimetres (converted to inches).
    pub fn label_size_cm(self, width: f64, height: f64) -> Self {
        self.label_size_in(cm_to_inches(width), cm_to_inches(height))
    }

    pub fn offset_cm(mut self, offset: f64) -> Self {
        self.config.offset_cm = offset;
        self
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.config.batch_size = n;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn LabelRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Zpl2PdfError> {
        let c = &self.config;
        if c.dpmm == 0 {
            return Err(Zpl2PdfError::InvalidConfig(
                "dpmm must be ≥ 1".into(),
            ));
        }
        for (name, value) in [("width", c.width_in), ("height", c.height_in)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Zpl2PdfError::InvalidConfig(format!(
                    "label {name} must be a positive number of inches, got {value}"
                )));
            }
        }
        if !c.offset_cm.is_finite() {
            return Err(Zpl2PdfError::InvalidConfig(format!(
                "offset must be finite, got {}",
                c.offset_cm
            )));
        }
        if c.batch_size == 0 {
            return Err(Zpl2PdfError::InvalidConfig(
                "batch size must be ≥ 1".into(),
            ));
        }
        if c.timeout_secs == 0 {
            return Err(Zpl2PdfError::InvalidConfig(
                "timeout must be ≥ 1 second".into(),
            ));
        }
        if c.renderer.is_none() && !is_http_url(&c.base_url) {
            return Err(Zpl2PdfError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        Ok(self.config)
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

// ── Numeric input helpers ────────────────────────────────────────────────

/// Convert centimetres to inches.
pub fn cm_to_inches(cm: f64) -> f64 {
    cm / 2.54
}

/// Parse a decimal typed by a person: surrounding whitespace is ignored and
/// either `,` or `.` may be the decimal separator.
///
/// Returns `None` for empty or unparsable input.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.replace(',', ".").parse::<f64>().ok()
}

/// Parse the column offset in centimetres. Anything unparsable means "no offset".
pub fn parse_offset_cm(raw: &str) -> f64 {
    parse_decimal(raw).filter(|v| v.is_finite()).unwrap_or(0.0)
}
