//! # frd2help
//!
//! Turn a functional requirements document (FRD) and a folder of UI
//! screenshots into end-user help pages in Confluence.
//!
//! Each screenshot names one screen. For every screen a vision model is shown
//! the screenshot together with the FRD text and asked for an HTML help
//! document; that document is then created as a new wiki page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! FRD.pdf ──▶ extract (pdfium, once)
//!                 │
//! screenshots/ ───┼─▶ for each screen, in name order:
//!                 │     ├─ 1. Encode   screenshot → base64 data URL
//!                 │     ├─ 2. Generate Groq chat completion → HTML
//!                 │     ├─ 3. Save     optional <dir>/<screen>.html
//!                 │     └─ 4. Publish  new Confluence page, timestamped title
//!                 ▼
//!             RunSummary
//! ```
//!
//! The first failure stops the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frd2help::{run, HelpConfig, RunPaths, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // GROQ_API_KEY and CONFLUENCE_* from the environment
//!     let settings = Settings::from_env();
//!     let summary = run(&RunPaths::default(), &settings, &HelpConfig::default()).await?;
//!     for result in &summary.screens {
//!         if let Some(page) = &result.page {
//!             println!("{} → {}", result.screen.name, page.url_or_na());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `frd2help` binary (clap, anyhow, tracing-subscriber, indicatif, dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod confluence;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;

#[cfg(test)]
mod test_support;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{HelpConfig, HelpConfigBuilder, ImageMimePolicy};
pub use config::{PublishTarget, RunPaths, Settings};
pub use confluence::{ConfluenceClient, CreatedPage, PagePublisher};
pub use error::HelpGenError;
pub use output::{RunPlan, RunSummary, ScreenResult};
pub use pipeline::extract::{PageTextSource, PdfiumTextSource};
pub use pipeline::input::Screen;
pub use pipeline::llm::{ChatRequest, GroqClient, VisionModel};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use run::{inspect, run, write_html};
