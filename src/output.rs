//! Results of a run.

use crate::confluence::CreatedPage;
use crate::pipeline::input::Screen;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome for one screen that went through the whole pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenResult {
    pub screen: Screen,
    /// Character count of the generated HTML.
    pub html_chars: usize,
    /// The created page; `None` when publishing was skipped.
    pub page: Option<CreatedPage>,
    /// Where the HTML was saved, when saving was requested.
    pub html_path: Option<PathBuf>,
    pub duration_ms: u64,
}

/// Summary of a completed run. Only produced when every screen succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub pdf_path: PathBuf,
    pub frd_pages: usize,
    pub frd_chars: usize,
    pub screens: Vec<ScreenResult>,
    pub total_duration_ms: u64,
}

impl RunSummary {
    /// Number of pages created in the wiki.
    pub fn published_count(&self) -> usize {
        self.screens.iter().filter(|s| s.page.is_some()).count()
    }
}

/// What a run would do, computed without credentials or network access.
#[derive(Debug, Clone, Serialize)]
pub struct RunPlan {
    pub pdf_path: PathBuf,
    pub frd_pages: usize,
    pub frd_chars: usize,
    pub frd_empty_pages: usize,
    /// FRD characters that fit under the truncation bound.
    pub forwarded_chars: usize,
    pub screens: Vec<Screen>,
}
