//! Page publishing to Confluence.
//!
//! Every call creates a new page; nothing is ever updated. Titles are made
//! unique with a timestamp (see [`title`]), and the body is sent in the
//! wiki's storage representation.
//!
//! [`PagePublisher`] is the seam the driver depends on; [`ConfluenceClient`]
//! is the REST implementation.

mod client;
pub mod title;
pub mod types;

pub use client::{ConfluenceClient, DEFAULT_TIMEOUT};
pub use title::TitleStamper;

use crate::error::HelpGenError;
use async_trait::async_trait;
use serde::Serialize;

/// A page created in the wiki.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPage {
    /// Opaque identifier assigned by the wiki.
    pub id: String,
    /// The unique, timestamped title the page was created with.
    pub title: String,
    /// Absolute page URL, when the response carried both link parts.
    pub url: Option<String>,
}

impl CreatedPage {
    /// The URL, or `N/A` when it is unavailable.
    pub fn url_or_na(&self) -> &str {
        self.url.as_deref().unwrap_or("N/A")
    }
}

/// Creates wiki pages.
#[async_trait]
pub trait PagePublisher: Send + Sync {
    /// Create a new page titled `title` plus a uniqueness timestamp.
    async fn create_page(&self, title: &str, html: &str) -> Result<CreatedPage, HelpGenError>;
}
