//! Configuration for a help-generation run.
//!
//! Three pieces, each passed explicitly to whatever needs it:
//!
//! * [`Settings`] — credentials and endpoints read from the environment once
//!   at process start. Tests build one with [`Settings::from_lookup`].
//! * [`HelpConfig`] — behavioural knobs (model, truncation bound, sampling,
//!   timeouts) plus optional injected collaborators, built via
//!   [`HelpConfigBuilder`].
//! * [`RunPaths`] — where the FRD and the screenshots live.
//!
//! The model path and the publishing path validate independently:
//! [`Settings::require_model_access`] needs only the API key, while
//! [`Settings::require_publishing`] needs every wiki field. Both fail before
//! any network I/O.

use crate::confluence::{PagePublisher, DEFAULT_TIMEOUT};
use crate::error::HelpGenError;
use crate::pipeline::extract::PageTextSource;
use crate::pipeline::llm::VisionModel;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_GROQ_BASE_URL: &str = "GROQ_BASE_URL";
pub const ENV_CONFLUENCE_BASE_URL: &str = "CONFLUENCE_BASE_URL";
pub const ENV_CONFLUENCE_USERNAME: &str = "CONFLUENCE_USERNAME";
pub const ENV_CONFLUENCE_API_TOKEN: &str = "CONFLUENCE_API_TOKEN";
pub const ENV_CONFLUENCE_SPACE_KEY: &str = "CONFLUENCE_SPACE_KEY";
pub const ENV_CONFLUENCE_PARENT_PAGE_ID: &str = "CONFLUENCE_PARENT_PAGE_ID";

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Vision model used when none is configured (accepts text + image input).
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

// ── Settings ─────────────────────────────────────────────────────────────

/// Credentials and endpoints loaded from the process environment.
///
/// Empty or whitespace-only values are treated as absent.
#[derive(Clone, Default)]
pub struct Settings {
    pub groq_api_key: Option<String>,
    pub groq_base_url: Option<String>,
    pub confluence_base_url: Option<String>,
    pub confluence_username: Option<String>,
    pub confluence_api_token: Option<String>,
    pub confluence_space_key: Option<String>,
    pub parent_page_id: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("groq_base_url", &self.groq_base_url)
            .field("confluence_base_url", &self.confluence_base_url)
            .field("confluence_username", &self.confluence_username)
            .field("confluence_api_token", &redact(&self.confluence_api_token))
            .field("confluence_space_key", &self.confluence_space_key)
            .field("parent_page_id", &self.parent_page_id)
            .finish()
    }
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl Settings {
    /// Read every setting from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read every setting through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            groq_api_key: get(ENV_GROQ_API_KEY),
            groq_base_url: get(ENV_GROQ_BASE_URL),
            confluence_base_url: get(ENV_CONFLUENCE_BASE_URL),
            confluence_username: get(ENV_CONFLUENCE_USERNAME),
            confluence_api_token: get(ENV_CONFLUENCE_API_TOKEN),
            confluence_space_key: get(ENV_CONFLUENCE_SPACE_KEY),
            parent_page_id: get(ENV_CONFLUENCE_PARENT_PAGE_ID),
        }
    }

    /// Model endpoint root, falling back to Groq's public API.
    pub fn groq_base_url(&self) -> &str {
        self.groq_base_url.as_deref().unwrap_or(DEFAULT_GROQ_BASE_URL)
    }

    /// Return the API key needed for model access, or fail without touching the network.
    pub fn require_model_access(&self) -> Result<&str, HelpGenError> {
        self.groq_api_key
            .as_deref()
            .ok_or_else(|| HelpGenError::MissingConfig {
                what: "Groq model access",
                vars: ENV_GROQ_API_KEY.to_string(),
            })
    }

    /// Return the complete publishing target, or name every missing wiki variable.
    pub fn require_publishing(&self) -> Result<PublishTarget, HelpGenError> {
        let required = [
            (ENV_CONFLUENCE_USERNAME, &self.confluence_username),
            (ENV_CONFLUENCE_API_TOKEN, &self.confluence_api_token),
            (ENV_CONFLUENCE_BASE_URL, &self.confluence_base_url),
            (ENV_CONFLUENCE_SPACE_KEY, &self.confluence_space_key),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();

        match (
            &self.confluence_base_url,
            &self.confluence_username,
            &self.confluence_api_token,
            &self.confluence_space_key,
        ) {
            (Some(base_url), Some(username), Some(api_token), Some(space_key)) => {
                Ok(PublishTarget {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    username: username.clone(),
                    api_token: api_token.clone(),
                    space_key: space_key.clone(),
                    parent_page_id: self.parent_page_id.clone(),
                })
            }
            _ => Err(HelpGenError::MissingConfig {
                what: "Confluence publishing",
                vars: missing.join(", "),
            }),
        }
    }
}

/// A validated set of wiki settings: every required field is present.
#[derive(Clone)]
pub struct PublishTarget {
    /// Wiki root, e.g. `https://your-domain.atlassian.net/wiki` (no trailing slash).
    pub base_url: String,
    pub username: String,
    pub api_token: String,
    pub space_key: String,
    /// When set, new pages are nested under this page.
    pub parent_page_id: Option<String>,
}

impl fmt::Debug for PublishTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishTarget")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .field("space_key", &self.space_key)
            .field("parent_page_id", &self.parent_page_id)
            .finish()
    }
}

// ── Paths ────────────────────────────────────────────────────────────────

/// Filesystem inputs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPaths {
    /// The functional requirements document.
    pub pdf_path: PathBuf,
    /// Directory holding one screenshot per screen.
    pub screenshots_dir: PathBuf,
}

impl Default for RunPaths {
    fn default() -> Self {
        Self {
            pdf_path: PathBuf::from("data/Complete_OLMS_FRD.pdf"),
            screenshots_dir: PathBuf::from("data/screenshots"),
        }
    }
}

// ── HelpConfig ───────────────────────────────────────────────────────────

/// Behaviour of a help-generation run.
///
/// Built via [`HelpConfig::builder()`] or [`HelpConfig::default()`].
///
/// # Example
/// ```rust
/// use frd2help::HelpConfig;
///
/// let config = HelpConfig::builder()
///     .max_frd_chars(4000)
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_frd_chars, 4000);
/// ```
#[derive(Clone)]
pub struct HelpConfig {
    /// Vision model identifier. Default: [`DEFAULT_VISION_MODEL`].
    pub model: String,

    /// Number of FRD characters forwarded to the model. Default: 8000.
    ///
    /// Plain prefix truncation on character boundaries.
    pub max_frd_chars: usize,

    /// Output-length ceiling for each completion. Default: 2048.
    pub max_tokens: u32,

    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,

    /// Per-model-call timeout. Default: none (client library default).
    pub api_timeout_secs: Option<u64>,

    /// Page-creation request timeout in seconds. Default: 60.
    pub publish_timeout_secs: u64,

    /// Label placed before the screen name in page titles. Default: "Help".
    pub title_prefix: String,

    /// How the inline image's MIME type is declared. Default: [`ImageMimePolicy::Detect`].
    pub image_mime: ImageMimePolicy,

    /// Custom system instruction. If None, uses [`crate::prompts::SYSTEM_INSTRUCTION`].
    pub system_prompt: Option<String>,

    /// Generate help text only; skip wiki validation and page creation. Default: false.
    pub skip_publish: bool,

    /// Also write each generated HTML document to `<dir>/<screen>.html`.
    pub html_output_dir: Option<PathBuf>,

    /// Pre-constructed model client. Takes precedence over the Groq settings.
    pub model_client: Option<Arc<dyn VisionModel>>,

    /// Pre-constructed publisher. Takes precedence over the Confluence settings.
    pub publisher: Option<Arc<dyn PagePublisher>>,

    /// Pre-constructed page-text source. Default: pdfium.
    pub text_source: Option<Arc<dyn PageTextSource>>,

    /// Progress events for each screen.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_VISION_MODEL.to_string(),
            max_frd_chars: 8000,
            max_tokens: 2048,
            temperature: 0.3,
            api_timeout_secs: None,
            publish_timeout_secs: DEFAULT_TIMEOUT,
            title_prefix: "Help".to_string(),
            image_mime: ImageMimePolicy::default(),
            system_prompt: None,
            skip_publish: false,
            html_output_dir: None,
            model_client: None,
            publisher: None,
            text_source: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for HelpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelpConfig")
            .field("model", &self.model)
            .field("max_frd_chars", &self.max_frd_chars)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("publish_timeout_secs", &self.publish_timeout_secs)
            .field("title_prefix", &self.title_prefix)
            .field("image_mime", &self.image_mime)
            .field("skip_publish", &self.skip_publish)
            .field("html_output_dir", &self.html_output_dir)
            .field("model_client", &self.model_client.as_ref().map(|_| "<dyn VisionModel>"))
            .field("publisher", &self.publisher.as_ref().map(|_| "<dyn PagePublisher>"))
            .field("text_source", &self.text_source.as_ref().map(|_| "<dyn PageTextSource>"))
            .finish()
    }
}

impl HelpConfig {
    /// Create a new builder for `HelpConfig`.
    pub fn builder() -> HelpConfigBuilder {
        HelpConfigBuilder {
            config: Self::default(),
        }
    }

    /// Page title for a screen, before the uniqueness timestamp is added.
    ///
    /// Underscores in the screen name read as spaces: `Customer_Profile`
    /// becomes `Help – Customer Profile`.
    pub fn page_title(&self, screen_name: &str) -> String {
        format!("{} – {}", self.title_prefix, screen_name.replace('_', " "))
    }
}

/// Builder for [`HelpConfig`].
#[derive(Debug)]
pub struct HelpConfigBuilder {
    config: HelpConfig,
}

impl HelpConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_frd_chars(mut self, n: usize) -> Self {
        self.config.max_frd_chars = n;
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn publish_timeout_secs(mut self, secs: u64) -> Self {
        self.config.publish_timeout_secs = secs;
        self
    }

    pub fn title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.title_prefix = prefix.into();
        self
    }

    pub fn image_mime(mut self, policy: ImageMimePolicy) -> Self {
        self.config.image_mime = policy;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn skip_publish(mut self, v: bool) -> Self {
        self.config.skip_publish = v;
        self
    }

    pub fn html_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.html_output_dir = Some(dir.into());
        self
    }

    pub fn model_client(mut self, client: Arc<dyn VisionModel>) -> Self {
        self.config.model_client = Some(client);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn PagePublisher>) -> Self {
        self.config.publisher = Some(publisher);
        self
    }

    pub fn text_source(mut self, source: Arc<dyn PageTextSource>) -> Self {
        self.config.text_source = Some(source);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<HelpConfig, HelpGenError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(HelpGenError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_frd_chars == 0 {
            return Err(HelpGenError::InvalidConfig("max_frd_chars must be ≥ 1".into()));
        }
        if c.max_tokens == 0 {
            return Err(HelpGenError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.publish_timeout_secs == 0 {
            return Err(HelpGenError::InvalidConfig("publish timeout must be ≥ 1 second".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// MIME type declared for the inline screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageMimePolicy {
    /// Declare the type implied by the file extension (`image/png`, `image/jpeg`). (default)
    #[default]
    Detect,
    /// Declare `image/png` for every screenshot, whatever its real format.
    AlwaysPng,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_wiki() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_CONFLUENCE_BASE_URL, "https://example.atlassian.net/wiki/"),
            (ENV_CONFLUENCE_USERNAME, "writer@example.com"),
            (ENV_CONFLUENCE_API_TOKEN, "token"),
            (ENV_CONFLUENCE_SPACE_KEY, "OLMS"),
        ]
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = HelpConfig::default();
        assert_eq!(c.model, DEFAULT_VISION_MODEL);
        assert_eq!(c.max_frd_chars, 8000);
        assert_eq!(c.max_tokens, 2048);
        assert!((c.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(c.publish_timeout_secs, DEFAULT_TIMEOUT);
        assert_eq!(c.api_timeout_secs, None);
        assert_eq!(c.image_mime, ImageMimePolicy::Detect);
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = HelpConfig::builder().temperature(5.0).build().unwrap();
        assert!((c.temperature - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_rejects_zero_truncation_bound() {
        let err = HelpConfig::builder().max_frd_chars(0).build().unwrap_err();
        assert!(matches!(err, HelpGenError::InvalidConfig(_)));
    }

    #[test]
    fn page_title_replaces_underscores() {
        let c = HelpConfig::default();
        assert_eq!(c.page_title("Customer_Profile"), "Help – Customer Profile");
        assert_eq!(c.page_title("Login"), "Help – Login");
    }

    #[test]
    fn empty_values_count_as_absent() {
        let s = Settings::from_lookup(lookup_from(&[(ENV_GROQ_API_KEY, "   ")]));
        assert!(s.groq_api_key.is_none());
        assert!(s.require_model_access().is_err());
    }

    #[test]
    fn model_access_needs_only_the_api_key() {
        let s = Settings::from_lookup(lookup_from(&[(ENV_GROQ_API_KEY, "gsk_test")]));
        assert_eq!(s.require_model_access().unwrap(), "gsk_test");
        assert!(s.require_publishing().is_err());
    }

    #[test]
    fn publishing_fails_when_any_wiki_field_is_missing() {
        for skip in 0..4 {
            let pairs: Vec<_> = full_wiki()
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| p)
                .collect();
            let missing_name = full_wiki()[skip].0;
            let s = Settings::from_lookup(lookup_from(&pairs));
            match s.require_publishing() {
                Err(HelpGenError::MissingConfig { vars, .. }) => {
                    assert_eq!(vars, missing_name);
                }
                other => panic!("expected MissingConfig for {missing_name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn publishing_target_trims_base_url_and_keeps_parent() {
        let mut pairs = full_wiki();
        pairs.push((ENV_CONFLUENCE_PARENT_PAGE_ID, "12345"));
        let target = Settings::from_lookup(lookup_from(&pairs))
            .require_publishing()
            .unwrap();
        assert_eq!(target.base_url, "https://example.atlassian.net/wiki");
        assert_eq!(target.parent_page_id.as_deref(), Some("12345"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut pairs = full_wiki();
        pairs.push((ENV_GROQ_API_KEY, "gsk_supersecret"));
        let s = Settings::from_lookup(lookup_from(&pairs));
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("gsk_supersecret"));
        assert!(!dbg.contains("\"token\""));
        let target = format!("{:?}", s.require_publishing().unwrap());
        assert!(target.contains("<redacted>"));
    }

    #[test]
    fn groq_base_url_defaults() {
        assert_eq!(Settings::default().groq_base_url(), DEFAULT_GROQ_BASE_URL);
    }
}
