//! Confluence REST client: create pages with basic authentication.

use super::title::TitleStamper;
use super::types::{ContentResponse, CreatePageRequest};
use super::{CreatedPage, PagePublisher};
use crate::config::{HelpConfig, PublishTarget, Settings};
use crate::error::HelpGenError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{error, info};

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 60;

/// Confluence REST API client.
pub struct ConfluenceClient {
    http: reqwest::Client,
    target: PublishTarget,
    stamper: TitleStamper,
}

impl ConfluenceClient {
    /// Create a client for a validated target.
    pub fn new(target: PublishTarget, timeout: Duration) -> Result<Self, HelpGenError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HelpGenError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            target,
            stamper: TitleStamper::new(),
        })
    }

    /// Validate the wiki settings and build a client. No request is sent.
    pub fn from_settings(settings: &Settings, config: &HelpConfig) -> Result<Self, HelpGenError> {
        let target = settings.require_publishing()?;
        Self::new(target, Duration::from_secs(config.publish_timeout_secs))
    }

    fn content_url(&self) -> String {
        format!("{}/rest/api/content", self.target.base_url)
    }
}

#[async_trait]
impl PagePublisher for ConfluenceClient {
    async fn create_page(&self, title: &str, html: &str) -> Result<CreatedPage, HelpGenError> {
        let unique_title = self.stamper.stamp(title);
        let payload = CreatePageRequest::new(
            &unique_title,
            &self.target.space_key,
            html,
            self.target.parent_page_id.as_deref(),
        );

        info!(
            "Creating page '{}' in space {}",
            unique_title, self.target.space_key
        );

        let response = self
            .http
            .post(self.content_url())
            .basic_auth(&self.target.username, Some(&self.target.api_token))
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(HelpGenError::WikiRequest)?;

        let status = response.status();
        let body = response.text().await.map_err(HelpGenError::WikiRequest)?;

        if !status.is_success() {
            error!("Error creating Confluence page: HTTP {}", status);
            error!("Response body: {}", body);
            return Err(HelpGenError::WikiHttp {
                status: status.as_u16(),
                body,
            });
        }

        let content: ContentResponse = serde_json::from_str(&body)
            .map_err(|e| HelpGenError::WikiResponse(format!("{e}: {body}")))?;

        let id = content
            .id_string()
            .ok_or_else(|| HelpGenError::WikiResponse(format!("no page id in: {body}")))?;
        let url = content.absolute_url();

        info!(
            "Created page {} ({})",
            id,
            url.as_deref().unwrap_or("N/A")
        );

        Ok(CreatedPage {
            id,
            title: content.title.unwrap_or(unique_title),
            url,
        })
    }
}
