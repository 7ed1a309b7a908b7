//! CLI binary for edgequake-pdfjob.
//!
//! A thin shim over the library crate that merges the server config with
//! CLI flags into a `JobConfig`, runs one job archive and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfjob::{run_job, JobConfig, JobProgressCallback, JobReport, ServerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Server config picked up from the working directory when no path is given.
const DEFAULT_SERVER_CONFIG: &str = "serverconfig.json";

/// Log file written inside the configured log directory.
const LOG_FILE_NAME: &str = "pdfjob.log";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

/// Terminal progress callback: one bar for the working set plus a log line
/// per finished document.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_job_start` tells us how many files there are.
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Unpacking job…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, action: &str, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(action.to_string());
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_job_start(&self, action: &str, total_files: usize) {
        self.activate_bar(action, total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{action}: {total_files} files"))
        ));
    }

    fn on_file_start(&self, file_name: &str, _index: usize, _total: usize) {
        self.bar.set_message(file_name.to_string());
    }

    fn on_file_complete(&self, file_name: &str, index: usize, total: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            file_name
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file_name: &str, index: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Keep one line per file.
        let msg = match error.char_indices().nth(80) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            file_name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_job_complete(&self, error_count: usize) {
        self.bar.finish_and_clear();
        if error_count == 0 {
            eprintln!("{} job completed without errors", green("✔"));
        } else {
            eprintln!(
                "{} job completed with {} recorded errors ({} per-file)",
                cyan("⚠"),
                red(&error_count.to_string()),
                self.errors.load(Ordering::SeqCst),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run a job using ./serverconfig.json for the directories
  pdfjob incoming/batch-0042.zip

  # Override the directories
  pdfjob --out-dir /srv/out --work-dir /srv/work batch.zip

  # Machine-readable report
  pdfjob --json batch.zip > report.json

JOB ARCHIVE LAYOUT:
  batch.zip
    ├── batch.config.json   action config (exactly one action enabled)
    ├── batch.idx           index (Split, Concatenate, per-page ScaleAndRotate)
    └── *.pdf               documents

ENVIRONMENT VARIABLES:
  PDFJOB_SERVER_CONFIG    Path to the server config
  PDFJOB_OUT_DIR          Output directory for <stem>.zip
  PDFJOB_WORK_DIR         Parent directory of per-job workspaces
  PDFJOB_LOG_DIR          Directory for pdfjob.log
  PDFIUM_LIB_PATH         Path to libpdfium (TextConvert only)
  RUST_LOG                Log filter, e.g. edgequake_pdfjob=debug
"#;

/// Run a single-action batch PDF job archive.
#[derive(Parser, Debug)]
#[command(
    name = "pdfjob",
    version,
    about = "Run a single-action batch PDF job (split, concatenate, copies, scale/rotate, smart-save, text)",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Job archive (.zip) to process.
    archive: PathBuf,

    /// Server config with the log, output and work directories.
    /// Default: ./serverconfig.json when it exists.
    #[arg(long, env = "PDFJOB_SERVER_CONFIG")]
    server_config: Option<PathBuf>,

    /// Directory the finished archive is copied to.
    #[arg(long, env = "PDFJOB_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Parent directory of the per-job workspace.
    #[arg(long, env = "PDFJOB_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Write logs to <LOG_DIR>/pdfjob.log instead of stderr.
    #[arg(long, env = "PDFJOB_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Path to the pdfium shared library used by TextConvert.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the job report as JSON on stdout.
    #[arg(long, env = "PDFJOB_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFJOB_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFJOB_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFJOB_QUIET")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let progress = show_progress.then(CliProgressCallback::new);

    let config = build_config(&cli, progress.clone())?;
    init_logging(&cli, show_progress, config.log_dir.as_deref())?;

    let report = run_job(&cli.archive, &config)
        .with_context(|| format!("Job {} failed", cli.archive.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&report, show_progress);
    }
    Ok(())
}

/// Merge the server config with CLI flags; flags win.
fn build_config(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<JobConfig> {
    let mut builder = JobConfig::builder();

    let server_path = cli.server_config.clone().or_else(|| {
        let default = PathBuf::from(DEFAULT_SERVER_CONFIG);
        default.is_file().then_some(default)
    });
    if let Some(path) = server_path {
        let server = ServerConfig::load(&path)?;
        builder = builder.server_config(&server);
    }

    if let Some(ref dir) = cli.out_dir {
        builder = builder.out_dir(dir);
    }
    if let Some(ref dir) = cli.work_dir {
        builder = builder.work_dir(dir);
    }
    if let Some(ref dir) = cli.log_dir {
        builder = builder.log_dir(dir);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb as Arc<dyn JobProgressCallback>);
    }

    builder.build().context("Invalid configuration")
}

/// Install the tracing subscriber.
///
/// The progress bar owns the terminal, so INFO logs are suppressed while it
/// is shown unless `--verbose` asks for them.
fn init_logging(cli: &Cli, show_progress: bool, log_dir: Option<&Path>) -> Result<()> {
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || (show_progress && log_dir.is_none()) {
        "error"
    } else {
        "info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn print_summary(report: &JobReport, show_progress: bool) {
    let action = report
        .action
        .map(|a| a.name())
        .unwrap_or("no action");
    let destination = report
        .output_archive
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "packaging failed".to_string());

    eprintln!(
        "{}  {}  {} files  {}ms  →  {}",
        if report.is_clean() { green("✔") } else { cyan("⚠") },
        action,
        report.files_processed,
        report.duration_ms,
        bold(&destination),
    );

    // The progress bar already printed per-file errors.
    if show_progress {
        return;
    }
    for record in &report.errors {
        eprintln!(
            "   {} {} [{}] {}",
            red("✗"),
            record.file_name,
            dim(&record.active_step),
            record.message
        );
    }
}
