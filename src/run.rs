//! The run driver: one FRD, many screenshots, one page per screen.
//!
//! Screens are processed strictly one after another. The first failure stops
//! the run; pages already created stay in the wiki.

use crate::config::{HelpConfig, RunPaths, Settings};
use crate::confluence::{ConfluenceClient, PagePublisher};
use crate::error::HelpGenError;
use crate::output::{RunPlan, RunSummary, ScreenResult};
use crate::pipeline::encode;
use crate::pipeline::extract::{self, PageTextSource, PdfiumTextSource};
use crate::pipeline::input::{self, Screen};
use crate::pipeline::llm::{self, GroqClient, HelpRequestInput, VisionModel};
use crate::progress::{NoopProgressCallback, RunProgressCallback};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate and publish help pages for every screenshot.
///
/// Configuration, the PDF and the screenshot directory are all validated
/// before the first network call.
///
/// # Errors
/// - Missing Groq key, or missing Confluence settings unless publishing is skipped
/// - PDF absent or not a PDF, screenshot directory absent
/// - The first failing screen (encode, model call, empty completion, publish)
pub async fn run(
    paths: &RunPaths,
    settings: &Settings,
    config: &HelpConfig,
) -> Result<RunSummary, HelpGenError> {
    let total_start = Instant::now();
    let progress = progress_of(config);

    // ── Step 1: Validate prerequisites ───────────────────────────────────
    let model = resolve_model(settings, config)?;
    let publisher = if config.skip_publish {
        info!("Publishing disabled; help text will not be sent to Confluence");
        None
    } else {
        Some(resolve_publisher(settings, config)?)
    };
    let pdf_path = input::resolve_pdf(&paths.pdf_path)?;
    input::require_screenshot_dir(&paths.screenshots_dir)?;

    // ── Step 2: Read the FRD once ────────────────────────────────────────
    info!("Reading FRD from {}", pdf_path.display());
    let document = extract::extract_document(resolve_text_source(config), &pdf_path).await?;
    let frd_chars = document.text.chars().count();
    if frd_chars == 0 {
        warn!("FRD yielded no text; the model will only see the screenshots");
    }
    progress.on_document_loaded(&pdf_path, document.page_count, frd_chars);

    // ── Step 3: Enumerate screens ────────────────────────────────────────
    let screens = input::discover_screens(&paths.screenshots_dir)?;
    if screens.is_empty() {
        warn!(
            "No screenshots found in {}",
            paths.screenshots_dir.display()
        );
    } else {
        info!("Found {} screens", screens.len());
    }
    let shared_names = shared_screen_names(&screens);
    for name in &shared_names {
        warn!(
            "Several screenshots map to screen '{}'; each gets its own page",
            name
        );
    }
    progress.on_run_start(screens.len());

    // ── Step 4: One screen at a time ─────────────────────────────────────
    let total = screens.len();
    let mut results = Vec::with_capacity(total);
    for (idx, screen) in screens.iter().enumerate() {
        progress.on_screen_start(idx + 1, total, screen);
        let outcome = process_screen(
            screen,
            html_file_stem(screen, &shared_names),
            &document.text,
            model.as_ref(),
            publisher.as_deref(),
            config,
            progress.as_ref(),
        )
        .await;

        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                progress.on_screen_error(screen, &e.to_string());
                return Err(e);
            }
        }
    }

    let summary = RunSummary {
        pdf_path,
        frd_pages: document.page_count,
        frd_chars,
        screens: results,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Run complete: {} screens, {} pages published, {}ms",
        summary.screens.len(),
        summary.published_count(),
        summary.total_duration_ms
    );
    progress.on_run_complete(&summary);

    Ok(summary)
}

/// Read the FRD and list the screens without calling any service.
///
/// Does not require an API key or wiki credentials.
pub async fn inspect(paths: &RunPaths, config: &HelpConfig) -> Result<RunPlan, HelpGenError> {
    let pdf_path = input::resolve_pdf(&paths.pdf_path)?;
    input::require_screenshot_dir(&paths.screenshots_dir)?;

    let document = extract::extract_document(resolve_text_source(config), &pdf_path).await?;
    let screens = input::discover_screens(&paths.screenshots_dir)?;
    let frd_chars = document.text.chars().count();

    Ok(RunPlan {
        pdf_path,
        frd_pages: document.page_count,
        frd_chars,
        frd_empty_pages: document.empty_pages,
        forwarded_chars: frd_chars.min(config.max_frd_chars),
        screens,
    })
}

/// Write `html` to `<dir>/<file_stem>.html`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_html(
    dir: &Path,
    file_stem: &str,
    html: &str,
) -> Result<PathBuf, HelpGenError> {
    let path = dir.join(format!("{file_stem}.html"));
    let write_err = |e: std::io::Error| HelpGenError::OutputWriteFailed {
        path: path.clone(),
        source: e,
    };

    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

    let tmp_path = path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, html).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, &path).await.map_err(write_err)?;

    debug!("Saved help text to {}", path.display());
    Ok(path)
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn process_screen(
    screen: &Screen,
    html_stem: &str,
    frd_text: &str,
    model: &dyn VisionModel,
    publisher: Option<&dyn PagePublisher>,
    config: &HelpConfig,
    progress: &dyn RunProgressCallback,
) -> Result<ScreenResult, HelpGenError> {
    let start = Instant::now();
    info!("Processing screen '{}'", screen.name);

    let image = encode::encode_image(&screen.image_path, config.image_mime).await?;
    let input = HelpRequestInput {
        frd_text,
        image: &image,
        screen_name: &screen.name,
    };
    let html = llm::generate_help_text(model, &input, config).await?;
    let html_chars = html.chars().count();
    progress.on_help_generated(screen, html_chars);

    let html_path = match &config.html_output_dir {
        Some(dir) => Some(write_html(dir, html_stem, &html).await?),
        None => None,
    };

    let page = match publisher {
        Some(publisher) => {
            let page = publisher
                .create_page(&config.page_title(&screen.name), &html)
                .await?;
            progress.on_page_published(screen, &page);
            Some(page)
        }
        None => None,
    };

    Ok(ScreenResult {
        screen: screen.clone(),
        html_chars,
        page,
        html_path,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Screen names carried by more than one screenshot (`Login.png`, `Login.jpg`).
fn shared_screen_names(screens: &[Screen]) -> HashSet<String> {
    let mut seen = HashSet::new();
    screens
        .iter()
        .filter(|s| !seen.insert(s.name.as_str()))
        .map(|s| s.name.clone())
        .collect()
}

/// Saved HTML is named after the screen, or after the whole screenshot file
/// name when the screen name alone would collide.
fn html_file_stem<'a>(screen: &'a Screen, shared: &HashSet<String>) -> &'a str {
    if shared.contains(&screen.name) {
        screen
            .image_path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(&screen.name)
    } else {
        &screen.name
    }
}

fn progress_of(config: &HelpConfig) -> Arc<dyn RunProgressCallback> {
    match config.progress_callback {
        Some(ref cb) => Arc::clone(cb),
        None => Arc::new(NoopProgressCallback),
    }
}

/// Injected client first, then the Groq settings.
fn resolve_model(
    settings: &Settings,
    config: &HelpConfig,
) -> Result<Arc<dyn VisionModel>, HelpGenError> {
    if let Some(ref model) = config.model_client {
        return Ok(Arc::clone(model));
    }
    Ok(Arc::new(GroqClient::from_settings(settings, config)?))
}

/// Injected publisher first, then the Confluence settings.
fn resolve_publisher(
    settings: &Settings,
    config: &HelpConfig,
) -> Result<Arc<dyn PagePublisher>, HelpGenError> {
    if let Some(ref publisher) = config.publisher {
        return Ok(Arc::clone(publisher));
    }
    Ok(Arc::new(ConfluenceClient::from_settings(settings, config)?))
}

fn resolve_text_source(config: &HelpConfig) -> Arc<dyn PageTextSource> {
    match config.text_source {
        Some(ref source) => Arc::clone(source),
        None => Arc::new(PdfiumTextSource::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_html_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");

        let path = write_html(&dir, "Login", "<p>Login help</p>").await.unwrap();
        assert_eq!(path, dir.join("Login.html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>Login help</p>");
        assert!(!dir.join("Login.html.tmp").exists());
    }

    #[tokio::test]
    async fn write_html_overwrites_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        write_html(tmp.path(), "Login", "old").await.unwrap();
        let path = write_html(tmp.path(), "Login", "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[tokio::test]
    async fn write_html_reports_unwritable_target() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_html(&blocker, "Login", "<p/>").await.unwrap_err();
        assert!(matches!(err, HelpGenError::OutputWriteFailed { .. }));
    }

    #[test]
    fn shared_screen_names_keep_their_extension_in_html_name() {
        let screen = |file: &str| Screen {
            name: file.split('.').next().unwrap().to_string(),
            image_path: PathBuf::from("shots").join(file),
        };
        let screens = vec![screen("Login.jpg"), screen("Login.png"), screen("Transfer.png")];

        let shared = shared_screen_names(&screens);
        assert_eq!(shared, HashSet::from(["Login".to_string()]));
        assert_eq!(html_file_stem(&screens[0], &shared), "Login.jpg");
        assert_eq!(html_file_stem(&screens[1], &shared), "Login.png");
        assert_eq!(html_file_stem(&screens[2], &shared), "Transfer");
    }

    #[test]
    fn model_requires_key_without_injected_client() {
        let err = resolve_model(&Settings::default(), &HelpConfig::default())
            .err()
            .expect("no key configured");
        assert!(matches!(err, HelpGenError::MissingConfig { .. }));
    }

    #[test]
    fn publisher_requires_wiki_settings_without_injected_publisher() {
        let settings = Settings::from_lookup(|k| (k == "GROQ_API_KEY").then(|| "gsk".into()));
        let err = resolve_publisher(&settings, &HelpConfig::default())
            .err()
            .expect("no wiki configured");
        assert!(matches!(err, HelpGenError::MissingConfig { .. }));
    }
}
