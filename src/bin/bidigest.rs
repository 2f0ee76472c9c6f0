//! CLI binary for bilingual-digest.
//!
//! A thin shim over the library crate that maps CLI flags to `DigestConfig`,
//! runs the pipeline and reports where the artifacts went.

use anyhow::{Context, Result};
use bilingual_digest::{
    run, DigestConfig, DigestProgressCallback, DocumentInput, InputMode, ParagraphRecord,
    ProgressCallback,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the document, one log line per
/// finished paragraph.
struct CliProgressCallback {
    bar: ProgressBar,
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    /// Stop the spinner and clear it so an error report is not drawn over.
    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl DigestProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_paragraphs: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} paragraphs  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_paragraphs as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Digesting");
        self.bar.reset_eta();
    }

    fn on_paragraph_start(&self, index: usize, _total: usize) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("paragraph {}", index + 1));
    }

    fn on_paragraph_complete(&self, index: usize, total: usize, record: &ParagraphRecord) {
        let elapsed_ms = self
            .started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        let mark = if record.is_degraded() {
            yellow("⚠")
        } else {
            green("✓")
        };
        self.bar.println(format!(
            "  {} Paragraph {:>3}/{:<3}  {}  {}",
            mark,
            index + 1,
            total,
            dim(&format!("{} keywords", record.keywords_en.len())),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _total_paragraphs: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Digest a PDF paper into ./result
  bidigest paper.pdf

  # Process a single English paragraph
  bidigest --mode text "This is a sample English paragraph."

  # Read text from stdin, choose a model
  cat abstract.txt | bidigest --mode text --model gpt-4.1-mini -

  # Export detected tables as CSV alongside the results
  bidigest paper.pdf --table-dir tables -o out

OUTPUT:
  <output-dir>/<name>_result.json            one record per paragraph
  <output-dir>/<name>_translated_paper.txt   Chinese paragraphs, blank-line separated
  <name> is the PDF file stem, or text_input_<YYYYmmdd_HHMMSS> in text mode.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
"#;

/// Summarise and translate English documents paragraph by paragraph.
#[derive(Parser, Debug)]
#[command(
    name = "bidigest",
    version,
    about = "Summarise, extract keywords from and translate English documents into Chinese",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF path (pdf mode) or the English text itself (text mode, `-` for stdin).
    input: String,

    /// Input mode: pdf or text.
    #[arg(long, env = "BIDIGEST_MODE", default_value = "pdf")]
    mode: String,

    /// Directory for the JSON and translated-text artifacts.
    #[arg(short, long = "output-dir", env = "BIDIGEST_OUTPUT_DIR", default_value = "result")]
    output_dir: PathBuf,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "BIDIGEST_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "BIDIGEST_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Do not detect tables in PDF input.
    #[arg(long, env = "BIDIGEST_NO_TABLES")]
    no_tables: bool,

    /// Export detected tables as CSV files into this directory.
    #[arg(long, env = "BIDIGEST_TABLE_DIR")]
    table_dir: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "BIDIGEST_PASSWORD")]
    password: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the records as JSON on stdout.
    #[arg(long, env = "BIDIGEST_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "BIDIGEST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BIDIGEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BIDIGEST_QUIET")]
    quiet: bool,

    /// Also append INFO-level logs (DEBUG with --verbose) to this file.
    #[arg(long, env = "BIDIGEST_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    let console = fmt::layer().with_writer(io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
    );
    let file = match cli.log_file {
        Some(ref path) => {
            let file_filter = if cli.verbose { "debug" } else { "info" };
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(open_log_file(path)?))
                    .with_filter(EnvFilter::new(file_filter)),
            )
        }
        None => None,
    };
    tracing_subscriber::registry().with(console).with(file).init();

    // ── Resolve input ────────────────────────────────────────────────────
    let mode: InputMode = cli.mode.parse()?;
    let value = if mode == InputMode::Text && cli.input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read text from stdin")?;
        buf
    } else {
        cli.input.clone()
    };
    let input = DocumentInput::from_mode(mode, value);

    // ── Build config and run ─────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let outcome = match build_config(&cli, progress.clone().map(|cb| cb as ProgressCallback)) {
        Ok(config) => run(&input, &config).await.context("Run failed"),
        Err(e) => Err(e),
    };
    let output = match outcome {
        Ok(output) => output,
        Err(e) => {
            if let Some(ref cb) = progress {
                cb.abandon();
            }
            return Err(e);
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output.result.records)
            .context("Failed to serialise records")?;
        println!("{json}");
    }

    if !cli.quiet {
        let stats = &output.stats;
        let mark = if stats.degraded_records == 0 {
            green("✔")
        } else {
            yellow("⚠")
        };
        eprintln!(
            "{}  {} paragraphs  {} calls  {}ms",
            mark,
            bold(&stats.paragraphs.to_string()),
            stats.completion_calls,
            stats.total_duration_ms,
        );
        if stats.degraded_records > 0 {
            eprintln!(
                "   {} records have empty fields (model reply was not valid JSON)",
                red(&stats.degraded_records.to_string())
            );
        }
        eprintln!("   → {}", bold(&output.artifacts.result_json.display().to_string()));
        eprintln!("   → {}", bold(&output.artifacts.translated_text.display().to_string()));
    }

    Ok(())
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Map CLI args to `DigestConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DigestConfig> {
    let mut builder = DigestConfig::builder()
        .output_dir(cli.output_dir.clone())
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .extract_tables(!cli.no_tables);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref dir) = cli.table_dir {
        builder = builder.table_dir(dir.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
