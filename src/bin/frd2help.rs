//! CLI binary for frd2help.
//!
//! A thin shim over the library crate that maps CLI flags to `HelpConfig`,
//! reads credentials from the environment and prints one block per page.

use anyhow::{Context, Result};
use clap::Parser;
use frd2help::config::DEFAULT_VISION_MODEL;
use frd2help::confluence::DEFAULT_TIMEOUT;
use frd2help::{
    inspect, run, CreatedPage, HelpConfig, ImageMimePolicy, ProgressCallback, RunPaths,
    RunProgressCallback, RunSummary, Screen, Settings,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
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
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const SEPARATOR_WIDTH: usize = 60;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr while a screen is in flight; result lines on stdout.
struct CliProgressCallback {
    spinner: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        spinner.set_prefix("Preparing");
        spinner.set_message("Reading FRD…");
        spinner.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { spinner })
    }

    /// Print to stdout without tearing the spinner line.
    fn say(&self, line: String) {
        self.spinner.suspend(|| println!("{line}"));
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_document_loaded(&self, pdf_path: &Path, page_count: usize, chars: usize) {
        self.say(format!(
            "Read FRD {}  {}",
            bold(&pdf_path.display().to_string()),
            dim(&format!("{page_count} pages, {chars} chars"))
        ));
    }

    fn on_run_start(&self, total_screens: usize) {
        if total_screens == 0 {
            self.say("No screenshots found; nothing to do.".to_string());
        }
    }

    fn on_screen_start(&self, index: usize, total: usize, screen: &Screen) {
        let file = screen
            .image_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.say(format!(
            "Processing screenshot: {file} (screen: {})",
            screen.name
        ));
        self.spinner.set_prefix(format!("{index}/{total}"));
        self.spinner
            .set_message(format!("generating help for {}…", screen.name));
    }

    fn on_help_generated(&self, screen: &Screen, html_chars: usize) {
        self.spinner
            .set_message(format!("publishing {} ({html_chars} chars)…", screen.name));
    }

    fn on_page_published(&self, _screen: &Screen, page: &CreatedPage) {
        self.say(format!(
            "{} Created page: {}\nPage ID: {}\nURL    : {}\n{}",
            green("✓"),
            page.title,
            page.id,
            page.url_or_na(),
            "-".repeat(SEPARATOR_WIDTH)
        ));
    }

    // The error itself is reported once, by main.
    fn on_screen_error(&self, screen: &Screen, _error: &str) {
        self.spinner.finish_and_clear();
        eprintln!("{}", failure_line(screen));
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        self.spinner.finish_and_clear();
        eprintln!(
            "{} {} screens, {} pages created  {}",
            green("✔"),
            bold(&summary.screens.len().to_string()),
            bold(&summary.published_count().to_string()),
            dim(&format!("{}ms", summary.total_duration_ms)),
        );
    }
}

fn failure_line(screen: &Screen) -> String {
    format!("{} {} failed", red("✗"), screen.name)
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate and publish help for every screenshot
  frd2help --pdf data/Complete_OLMS_FRD.pdf --screenshots data/screenshots

  # Publish under a parent page
  frd2help --parent-page-id 123456

  # Generate only, keep the HTML locally
  frd2help --skip-publish --save-html out/

  # Check the inputs without any credentials
  frd2help --inspect-only

ENVIRONMENT VARIABLES:
  GROQ_API_KEY               Groq API key (required)
  GROQ_BASE_URL              Override the model endpoint (default https://api.groq.com/openai/v1)
  CONFLUENCE_BASE_URL        Wiki root, e.g. https://your-domain.atlassian.net/wiki
  CONFLUENCE_USERNAME        Account e-mail used for basic auth
  CONFLUENCE_API_TOKEN       API token for that account
  CONFLUENCE_SPACE_KEY       Space the pages are created in
  CONFLUENCE_PARENT_PAGE_ID  Optional parent page
  PDFIUM_LIB_PATH            Path to libpdfium when it is not on the system library path
  RUST_LOG                   Log filter, e.g. frd2help=debug
"#;

/// Generate end-user help pages from an FRD and screenshots.
#[derive(Parser, Debug)]
#[command(
    name = "frd2help",
    version,
    about = "Generate Confluence help pages from an FRD and UI screenshots",
    long_about = "Reads the functional requirements document once, then for every screenshot asks \
a Groq vision model for an HTML help document and publishes it as a new Confluence page.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Functional requirements document (PDF).
    #[arg(long, env = "FRD2HELP_PDF", default_value = "data/Complete_OLMS_FRD.pdf")]
    pdf: PathBuf,

    /// Directory with one screenshot (.png/.jpg/.jpeg) per screen.
    #[arg(long, env = "FRD2HELP_SCREENSHOTS", default_value = "data/screenshots")]
    screenshots: PathBuf,

    /// Vision model ID.
    #[arg(long, env = "FRD2HELP_MODEL", default_value = DEFAULT_VISION_MODEL)]
    model: String,

    /// FRD characters sent with each screen.
    #[arg(long, env = "FRD2HELP_MAX_FRD_CHARS", default_value_t = 8000)]
    max_frd_chars: usize,

    /// Max output tokens per completion.
    #[arg(long, env = "FRD2HELP_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: u32,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "FRD2HELP_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Model call timeout in seconds (default: none).
    #[arg(long, env = "FRD2HELP_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Page-creation timeout in seconds.
    #[arg(long, env = "FRD2HELP_PUBLISH_TIMEOUT", default_value_t = DEFAULT_TIMEOUT)]
    publish_timeout: u64,

    /// Label placed before the screen name in page titles.
    #[arg(long, env = "FRD2HELP_TITLE_PREFIX", default_value = "Help")]
    title_prefix: String,

    /// Parent page for new pages; overrides CONFLUENCE_PARENT_PAGE_ID.
    #[arg(long)]
    parent_page_id: Option<String>,

    /// Declare every screenshot as image/png, whatever its real format.
    #[arg(long)]
    png_mime: bool,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "FRD2HELP_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Generate help text without creating wiki pages.
    #[arg(long)]
    skip_publish: bool,

    /// Also write each HTML document to <DIR>/<screen>.html.
    #[arg(long, value_name = "DIR")]
    save_html: Option<PathBuf>,

    /// Read the FRD and list screens only; no credentials needed.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FRD2HELP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FRD2HELP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so FRD2HELP_* flags can come from .env too.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and the result lines carry the normal feedback, so library
    // logs stay at warn unless asked for.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let paths = RunPaths {
        pdf_path: cli.pdf.clone(),
        screenshots_dir: cli.screenshots.clone(),
    };

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None).await?;
        let plan = inspect(&paths, &config)
            .await
            .context("Failed to inspect inputs")?;

        println!("File:         {}", plan.pdf_path.display());
        println!("Pages:        {}", plan.frd_pages);
        println!("Empty pages:  {}", plan.frd_empty_pages);
        println!(
            "FRD chars:    {} ({} sent per screen)",
            plan.frd_chars, plan.forwarded_chars
        );
        println!("Screens:      {}", plan.screens.len());
        for screen in &plan.screens {
            println!(
                "  {:<32} {}",
                config.page_title(&screen.name),
                dim(&screen.image_path.display().to_string())
            );
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut settings = load_settings(Path::new(".env"), |k| std::env::var(k).ok())?;
    if let Some(ref parent) = cli.parent_page_id {
        settings.parent_page_id = Some(parent.clone());
    }

    let progress_cb: Option<ProgressCallback> = if cli.quiet {
        None
    } else {
        Some(CliProgressCallback::new() as Arc<dyn RunProgressCallback>)
    };
    let config = build_config(&cli, progress_cb).await?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = run(&paths, &settings, &config)
        .await
        .context("Help generation failed")?;

    if let Some(ref dir) = cli.save_html {
        let saved = summary
            .screens
            .iter()
            .filter(|s| s.html_path.is_some())
            .count();
        if !cli.quiet {
            eprintln!(
                "   {saved} HTML files saved under {}",
                bold(&dir.display().to_string())
            );
        }
    }

    Ok(())
}

/// Credentials from the process environment, falling back to `env_file`.
///
/// A missing file is not an error.
fn load_settings(
    env_file: &Path,
    process_env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut from_file = HashMap::new();
    match dotenvy::from_path_iter(env_file) {
        Ok(iter) => {
            for item in iter {
                let (key, value) =
                    item.with_context(|| format!("Failed to parse {}", env_file.display()))?;
                from_file.insert(key, value);
            }
        }
        Err(e) if e.not_found() => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", env_file.display()));
        }
    }

    let lookup = |key: &str| process_env(key).or_else(|| from_file.get(key).cloned());
    Ok(Settings::from_lookup(lookup))
}

/// Map CLI args to `HelpConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<HelpConfig> {
    let mut builder = HelpConfig::builder()
        .model(cli.model.clone())
        .max_frd_chars(cli.max_frd_chars)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .publish_timeout_secs(cli.publish_timeout)
        .title_prefix(cli.title_prefix.clone())
        .skip_publish(cli.skip_publish)
        .image_mime(if cli.png_mime {
            ImageMimePolicy::AlwaysPng
        } else {
            ImageMimePolicy::Detect
        });

    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(ref dir) = cli.save_html {
        builder = builder.html_output_dir(dir.clone());
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
