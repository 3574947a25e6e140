//! CLI binary for zpl2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use zpl2pdf::{
    cm_to_inches, convert_to_file, parse_decimal, parse_offset_cm, ConversionConfig,
    ConversionProgressCallback, ConversionStats, ProgressCallback,
};

// ── Terminal styling ─────────────────────────────────────────────────────────

const GREEN: &str = "32";
const RED: &str = "31";
const DIM: &str = "2";
const BOLD: &str = "1";

fn paint(sgr: &str, s: &str) -> String {
    format!("\x1b[{sgr}m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar over render batches.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        // Length is set once the batch plan is known.
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} Rendering [{bar:40.green/238}] {pos}/{len} batches  {elapsed}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_batches: usize, total_labels: usize) {
        self.bar.set_length(total_batches as u64);
        let labels = if total_labels == 0 {
            "no ^XA markers, sending file as-is".to_string()
        } else {
            format!("{total_labels} labels")
        };
        self.bar.println(format!(
            "{} {}",
            paint(BOLD, &format!("{total_batches} batch(es)")),
            paint(DIM, &labels)
        ));
    }

    fn on_batch_complete(&self, batch_num: usize, total: usize, pdf_len: usize) {
        self.bar.println(format!(
            "  {} Batch {:>3}/{:<3}  {}",
            paint(GREEN, "✓"),
            batch_num,
            total,
            paint(DIM, &format!("{pdf_len:>8} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_error(&self, batch_num: usize, total: usize, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Batch {:>3}/{:<3}  {}",
            paint(RED, "✗"),
            batch_num,
            total,
            paint(RED, &msg),
        ));
        self.bar.finish_and_clear();
    }

    fn on_conversion_complete(&self, _total_batches: usize, _pdf_len: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # 4x6 in labels at 203 dpi
  zpl2pdf labels.zpl -o labels.pdf

  # 10x15 cm labels at 300 dpi
  zpl2pdf --units cm --width 10 --height 15 --dpmm 12 labels.zpl -o labels.pdf

  # Two-column sheet: move the right-hand column 0,5 cm to the left
  zpl2pdf --units cm --width 10 --height 15 --offset -0,5 sheet.zpl -o sheet.pdf

  # Read from stdin
  cat labels.zpl | zpl2pdf - -o labels.pdf

RESOLUTIONS (--dpmm):
  6   152 dpi
  8   203 dpi (default)
  12  300 dpi
  24  600 dpi

NOTES:
  Files with more than 50 labels (^XA ... ^XZ) are rendered in batches of 50
  and merged into a single PDF. Any failed batch aborts the whole conversion.

ENVIRONMENT VARIABLES:
  ZPL2PDF_ENDPOINT   Rendering service base URL
  RUST_LOG           Log filter (overrides --verbose/--quiet)
"#;

/// Convert ZPL label files to PDF via the Labelary API.
#[derive(Parser, Debug)]
#[command(
    name = "zpl2pdf",
    version,
    about = "Convert ZPL label files to PDF via the Labelary API",
    long_about = "Convert a ZPL label file (text) to a PDF using the Labelary rendering \
service. Large files are split into batches of 50 labels and merged back together; an \
optional offset shifts the second column of two-up label sheets.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// ZPL input file, or `-` for stdin.
    input: String,

    /// Output PDF path.
    #[arg(short, long, env = "ZPL2PDF_OUTPUT")]
    output: PathBuf,

    /// Printer resolution in dots per millimetre (8 ≈ 203 dpi).
    #[arg(long, env = "ZPL2PDF_DPMM", default_value_t = 8,
          value_parser = clap::value_parser!(u32).range(1..))]
    dpmm: u32,

    /// Label width (see --units).
    #[arg(long, env = "ZPL2PDF_WIDTH", default_value = "4", value_parser = parse_size)]
    width: f64,

    /// Label height (see --units).
    #[arg(long, env = "ZPL2PDF_HEIGHT", default_value = "6", value_parser = parse_size)]
    height: f64,

    /// Unit for --width and --height.
    #[arg(long, env = "ZPL2PDF_UNITS", value_enum, default_value = "in")]
    units: UnitsArg,

    /// Second-column offset in centimetres; `,` or `.` decimals. Unparsable → 0.
    #[arg(long, env = "ZPL2PDF_OFFSET", default_value = "0", allow_hyphen_values = true)]
    offset: String,

    /// Maximum labels per render request.
    #[arg(long, env = "ZPL2PDF_BATCH_SIZE", default_value_t = 50,
          value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// Rendering service base URL.
    #[arg(long, env = "ZPL2PDF_ENDPOINT", default_value = zpl2pdf::config::DEFAULT_BASE_URL)]
    endpoint: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ZPL2PDF_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Print conversion stats as JSON on stdout.
    #[arg(long, env = "ZPL2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "ZPL2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ZPL2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ZPL2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum UnitsArg {
    /// Inches.
    In,
    /// Centimetres.
    Cm,
}

/// Parse a positive label dimension, accepting `,` as decimal separator.
fn parse_size(s: &str) -> std::result::Result<f64, String> {
    match parse_decimal(s) {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("'{s}' is not a positive number")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let stats = convert_to_file(&cli.input, &cli.output, &config)
        .await
        .context("Error converting ZPL to PDF")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        print_summary(&stats, &cli.output);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let (width_in, height_in) = match cli.units {
        UnitsArg::In => (cli.width, cli.height),
        UnitsArg::Cm => (cm_to_inches(cli.width), cm_to_inches(cli.height)),
    };

    let mut builder = ConversionConfig::builder()
        .dpmm(cli.dpmm)
        .label_size_in(width_in, height_in)
        .offset_cm(parse_offset_cm(&cli.offset))
        .batch_size(usize::try_from(cli.batch_size).context("Batch size too large")?)
        .base_url(cli.endpoint.clone())
        .timeout_secs(cli.timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(stats: &ConversionStats, output: &std::path::Path) {
    eprintln!(
        "{}  {} labels  {} batch(es)  {}ms  →  {}",
        paint(GREEN, "✔"),
        stats.labels,
        stats.batches,
        stats.total_duration_ms,
        paint(BOLD, &output.display().to_string()),
    );
    if stats.shifted_commands > 0 {
        eprintln!(
            "   {}",
            paint(DIM, &format!("{} second-column ^FO commands shifted", stats.shifted_commands))
        );
    }
}
