//! Progress-callback trait for per-screen run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::HelpConfigBuilder::progress_callback`] to receive events
//! as the driver works through the screenshots. The library itself only
//! logs through `tracing`; user-facing progress lines are the callback's job.
//!
//! # Example
//!
//! ```rust
//! use frd2help::{HelpConfig, RunProgressCallback, Screen};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl RunProgressCallback for Counter {
//!     fn on_screen_start(&self, index: usize, total: usize, screen: &Screen) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{index}/{total}] {}", screen.name);
//!     }
//! }
//!
//! let config = HelpConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::confluence::CreatedPage;
use crate::output::RunSummary;
use crate::pipeline::input::Screen;
use std::path::Path;
use std::sync::Arc;

/// Called by the driver as it processes each screen.
///
/// Screens are handled one at a time, so events arrive in order. All methods
/// have default no-op implementations.
pub trait RunProgressCallback: Send + Sync {
    /// Called once the FRD has been read.
    fn on_document_loaded(&self, pdf_path: &Path, page_count: usize, chars: usize) {
        let _ = (pdf_path, page_count, chars);
    }

    /// Called once before the first screen.
    fn on_run_start(&self, total_screens: usize) {
        let _ = total_screens;
    }

    /// Called before a screen's screenshot is encoded.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position of the screen
    /// * `total` — number of screens in the run
    fn on_screen_start(&self, index: usize, total: usize, screen: &Screen) {
        let _ = (index, total, screen);
    }

    /// Called when the model has produced the help HTML for a screen.
    fn on_help_generated(&self, screen: &Screen, html_chars: usize) {
        let _ = (screen, html_chars);
    }

    /// Called after the wiki page for a screen was created.
    fn on_page_published(&self, screen: &Screen, page: &CreatedPage) {
        let _ = (screen, page);
    }

    /// Called when a screen fails. The run stops right after.
    fn on_screen_error(&self, screen: &Screen, error: &str) {
        let _ = (screen, error);
    }

    /// Called once after every screen succeeded.
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::HelpConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        generated: AtomicUsize,
        errors: AtomicUsize,
    }

    impl RunProgressCallback for TrackingCallback {
        fn on_screen_start(&self, _index: usize, _total: usize, _screen: &Screen) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_help_generated(&self, _screen: &Screen, _html_chars: usize) {
            self.generated.fetch_add(1, Ordering::SeqCst);
        }

        fn on_screen_error(&self, _screen: &Screen, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn screen(name: &str) -> Screen {
        Screen {
            name: name.to_string(),
            image_path: PathBuf::from(format!("{name}.png")),
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_document_loaded(Path::new("frd.pdf"), 3, 100);
        cb.on_run_start(2);
        cb.on_screen_start(1, 2, &screen("Login"));
        cb.on_help_generated(&screen("Login"), 42);
        cb.on_screen_error(&screen("Login"), "boom");
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_screen_start(1, 2, &screen("Login"));
        tracker.on_help_generated(&screen("Login"), 10);
        tracker.on_screen_start(2, 2, &screen("Transfer"));
        tracker.on_screen_error(&screen("Transfer"), "HTTP 500");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.generated.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }
}
