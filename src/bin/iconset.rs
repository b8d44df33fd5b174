//! CLI binary for edgequake-iconset.
//!
//! A thin shim over the library crate: `iconset convert` maps flags to
//! `ConversionConfig` and prints the batch result, `iconset check` maps
//! flags to `CheckConfig` and prints one report per SVG.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_iconset::quality::{format_summary, general_tips, output_guide};
use edgequake_iconset::{
    check_all, convert_all, format_report, BatchOutput, CheckConfig, ConversionConfig,
    ConversionProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// The bar length is the number of source documents.
const BAR_TEMPLATE: &str = "{spinner:.cyan} {prefix:.bold}  \
     [{bar:42.green/238}] {pos:>3}/{len} sources  \
     ⏱ {elapsed_precise}  {msg}";

/// Terminal progress callback: one bar over documents, one log line per
/// finished document and per skipped file. Works when documents finish out
/// of order (`--concurrency > 1`).
struct CliProgressCallback {
    bar: ProgressBar,
    /// Files skipped across the batch.
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading fonts…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_documents} source file(s)…"))
        ));
    }

    fn on_document_start(&self, stem: &str, _index: usize, _total: usize) {
        self.bar.set_message(stem.to_string());
    }

    fn on_artifact_error(&self, stem: &str, file_name: &str, error: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "    {} {}/{}  {}",
            yellow("⚠"),
            stem,
            file_name,
            dim(&msg)
        ));
    }

    fn on_document_complete(&self, stem: &str, written: usize, failed: usize) {
        let line = match (written, failed) {
            (0, 0) => format!("  {} {:<24} {}", red("✗"), stem, red("failed")),
            (w, 0) => format!("  {} {:<24} {}", green("✓"), stem, dim(&format!("{w} files"))),
            (w, f) => format!(
                "  {} {:<24} {}",
                yellow("⚠"),
                stem,
                dim(&format!("{w} files, {f} skipped"))
            ),
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, complete_count: usize) {
        self.bar.finish_and_clear();
        let incomplete = total_documents.saturating_sub(complete_count);
        if incomplete == 0 {
            eprintln!(
                "{} {} icon set(s) generated",
                green("✔"),
                bold(&complete_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} icon sets complete  ({} incomplete, {} files skipped)",
                if complete_count == 0 {
                    red("✘")
                } else {
                    yellow("⚠")
                },
                bold(&complete_count.to_string()),
                total_documents,
                red(&incomplete.to_string()),
                self.skipped.load(Ordering::SeqCst),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert everything in ./input to ./output/{name}/
  iconset convert

  # Custom directories and sizes
  iconset convert --input art --output public/icons --sizes 16,32,180,512

  # Opaque white background, fail the build if any icon is missing
  iconset convert --background '#ffffff' --strict

  # Check SVG sources before converting
  iconset check --input art

  # Machine-readable results
  iconset check --json > report.json

GENERATED FILES (per source):
  {name}-{size}x{size}.png   16, 32, 48, 64, 96, 128, 192, 256, 512
  apple-touch-icon.png       180x180
  android-chrome-192x192.png 192x192
  android-chrome-512x512.png 512x512
  mstile-150x150.png         150x150
  favicon.ico                16, 32, 48 frames
  favicon.png                32x32

ENVIRONMENT VARIABLES:
  ICONSET_INPUT         Input directory (default: input)
  ICONSET_OUTPUT        Output directory (default: output)
  ICONSET_SIZES         Comma-separated general PNG sizes
  ICONSET_ICO_SIZES     Comma-separated favicon.ico frame sizes
  ICONSET_BACKGROUND    Background colour as #RRGGBB or #RRGGBBAA
  ICONSET_CONCURRENCY   Documents converted in parallel (default: 1)
  RUST_LOG              Override log filtering (e.g. edgequake_iconset=debug)
"#;

/// Generate favicon sets from SVG/PNG artwork and check SVG icon quality.
#[derive(Parser, Debug)]
#[command(
    name = "iconset",
    version,
    about = "Generate favicon sets from SVG/PNG artwork and check SVG icon quality",
    long_about = "Render every SVG or PNG in an input directory to the PNG sizes, \
favicon.ico and platform icons a website needs, with supersampling and sharpening \
for crisp small sizes. The `check` command flags SVG features that degrade at \
favicon sizes.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "ICONSET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "ICONSET_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every source in the input directory into an icon set.
    Convert(ConvertArgs),
    /// Check SVG sources for features that break at small sizes.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Directory containing .svg (and .png) sources.
    #[arg(short, long, env = "ICONSET_INPUT", default_value = "input")]
    input: PathBuf,

    /// Directory receiving one sub-directory per source.
    #[arg(short, long, env = "ICONSET_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// General PNG sizes, comma-separated.
    #[arg(long, env = "ICONSET_SIZES", value_delimiter = ',')]
    sizes: Vec<u32>,

    /// favicon.ico frame sizes, comma-separated (max 256).
    #[arg(long, env = "ICONSET_ICO_SIZES", value_delimiter = ',')]
    ico_sizes: Vec<u32>,

    /// Only convert .svg files; ignore .png sources.
    #[arg(long, env = "ICONSET_NO_RASTER_INPUTS")]
    no_raster_inputs: bool,

    /// Fill the transparent background: #RRGGBB or #RRGGBBAA.
    #[arg(long, env = "ICONSET_BACKGROUND", value_parser = parse_background)]
    background: Option<[u8; 4]>,

    /// Number of documents converted in parallel.
    #[arg(short, long, env = "ICONSET_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Exit with status 2 when any icon set is incomplete.
    #[arg(long, env = "ICONSET_STRICT")]
    strict: bool,

    /// Output structured JSON (BatchOutput) instead of a summary.
    #[arg(long, env = "ICONSET_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "ICONSET_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Directory containing .svg sources.
    #[arg(short, long, env = "ICONSET_INPUT", default_value = "input")]
    input: PathBuf,

    /// Flag more <path> elements than this.
    #[arg(long, default_value_t = 20)]
    max_paths: usize,

    /// Flag any path data longer than this many characters.
    #[arg(long, default_value_t = 1000)]
    max_path_len: usize,

    /// Flag more linear + radial gradients than this.
    #[arg(long, default_value_t = 5)]
    max_gradients: usize,

    /// Flag text whose font-size is below this.
    #[arg(long, default_value_t = 12.0)]
    min_font_size: f64,

    /// Flag opacity values below this (0–1).
    #[arg(long, default_value_t = 0.5)]
    min_opacity: f64,

    /// Flag files larger than this many bytes.
    #[arg(long, default_value_t = 50_000)]
    max_file_bytes: u64,

    /// Output structured JSON (CheckOutput) instead of text reports.
    #[arg(long, env = "ICONSET_JSON")]
    json: bool,

    /// Do not print the general design tips after the reports.
    #[arg(long)]
    no_tips: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar and the check reports carry the user-facing output,
    // so library INFO logs are only shown when neither is printing.
    let quiet_logs = match &cli.command {
        Command::Convert(args) => show_progress(args, cli.quiet) || args.json,
        Command::Check(_) => true,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || quiet_logs {
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

    match cli.command {
        Command::Convert(args) => run_convert(args, cli.quiet).await,
        Command::Check(args) => run_check(args, cli.quiet),
    }
}

fn show_progress(args: &ConvertArgs, quiet: bool) -> bool {
    !quiet && !args.no_progress && !args.json
}

// ── convert ──────────────────────────────────────────────────────────────

async fn run_convert(args: ConvertArgs, quiet: bool) -> Result<ExitCode> {
    let progress_cb: Option<ProgressCallback> = if show_progress(&args, quiet) {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_convert_config(&args, progress_cb)?;
    let output = convert_all(&config).await.context("Conversion failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !quiet {
        if output.is_empty_input() {
            eprintln!(
                "{} No .svg{} files found in {}",
                yellow("⚠"),
                if config.accept_raster_inputs { " or .png" } else { "" },
                bold(&config.input_dir.display().to_string())
            );
            eprintln!("  Put your artwork there and run `iconset convert` again.");
            return Ok(ExitCode::SUCCESS);
        }
        print_batch_summary(&output, config.progress_callback.is_some());
        eprintln!();
        eprintln!("{}", output_guide());
    }

    if config.strict && !output.is_complete() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_convert_config(
    args: &ConvertArgs,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .input_dir(&args.input)
        .output_dir(&args.output)
        .accept_raster_inputs(!args.no_raster_inputs)
        .background(args.background)
        .concurrency(args.concurrency)
        .strict(args.strict);

    if !args.sizes.is_empty() {
        builder = builder.png_sizes(args.sizes.clone());
    }
    if !args.ico_sizes.is_empty() {
        builder = builder.ico_sizes(args.ico_sizes.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_batch_summary(output: &BatchOutput, progress_shown: bool) {
    // The progress callback already printed one line per document.
    if !progress_shown {
        for bundle in &output.bundles {
            let mark = if bundle.is_complete() {
                green("✓")
            } else {
                yellow("⚠")
            };
            eprintln!(
                "  {} {:<24} {} files  {}",
                mark,
                bundle.stem,
                bundle.written_count(),
                dim(&format!("{}ms", bundle.duration_ms))
            );
        }
    }

    for bundle in output.bundles.iter().filter(|b| !b.is_complete()) {
        for artifact in &bundle.artifacts {
            if let Some(ref e) = artifact.error {
                eprintln!("    {} {}/{}: {}", red("✗"), bundle.stem, artifact.file_name, e);
            }
            for w in &artifact.warnings {
                eprintln!("    {} {}/{}: {}", yellow("⚠"), bundle.stem, artifact.file_name, w);
            }
        }
    }
    for failed in &output.failed {
        eprintln!(
            "  {} {}: {}",
            red("✗"),
            failed.source.display(),
            red(&failed.error)
        );
    }

    let s = &output.stats;
    eprintln!(
        "{}  {}/{} icon sets complete  {} files written  {} skipped  {}ms  →  {}",
        if output.is_complete() {
            green("✔")
        } else {
            yellow("⚠")
        },
        s.complete_documents,
        s.total_documents,
        s.files_written,
        s.files_skipped,
        s.total_duration_ms,
        bold(&output.output_dir.display().to_string()),
    );
}

/// Parse `#RRGGBB` / `#RRGGBBAA` (leading `#` optional).
fn parse_background(s: &str) -> std::result::Result<[u8; 4], String> {
    let hex = s.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected #RRGGBB or #RRGGBBAA, got '{s}'"));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

// ── check ────────────────────────────────────────────────────────────────

fn run_check(args: CheckArgs, quiet: bool) -> Result<ExitCode> {
    let config = CheckConfig::builder()
        .input_dir(&args.input)
        .max_paths(args.max_paths)
        .max_path_data_len(args.max_path_len)
        .max_gradients(args.max_gradients)
        .min_font_size(args.min_font_size)
        .min_opacity(args.min_opacity)
        .max_file_bytes(args.max_file_bytes)
        .build()
        .context("Invalid configuration")?;

    let output = check_all(&config).context("Quality check failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    if output.is_empty_input() {
        if !quiet {
            eprintln!(
                "{} No .svg files found in {}",
                yellow("⚠"),
                bold(&config.input_dir.display().to_string())
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", bold("SVG quality report"));
    println!("{}", "═".repeat(60));
    for report in &output.reports {
        print!("{}", format_report(report));
    }
    if !quiet {
        eprintln!("{}", format_summary(&output));
    }
    if !args.no_tips && !quiet {
        println!();
        println!("{}", general_tips());
    }
    Ok(ExitCode::SUCCESS)
}
