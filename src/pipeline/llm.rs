//! Help-text generation: one vision-model call per screen.
//!
//! The request is assembled by [`build_request`], a pure function, so prompt
//! layout and truncation can be checked without a network. [`VisionModel`]
//! is the seam to the endpoint; [`GroqClient`] speaks Groq's
//! OpenAI-compatible `chat/completions` API.
//!
//! There is no retry: an auth failure, rate limit, or malformed request is
//! returned to the caller as-is.

use crate::config::{HelpConfig, Settings};
use crate::error::HelpGenError;
use crate::pipeline::encode::EncodedImage;
use crate::prompts::{screen_user_text, SYSTEM_INSTRUCTION};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ── Request types ────────────────────────────────────────────────────────

/// An OpenAI-style chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_completion_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Plain text, or a list of text/image parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// Text of the first user message's text part, if any.
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .find_map(|m| match &m.content {
                MessageContent::Text(t) => Some(t.as_str()),
                MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                }),
            })
    }
}

// ── Request assembly ─────────────────────────────────────────────────────

/// Everything the generator needs for one screen.
#[derive(Debug, Clone, Copy)]
pub struct HelpRequestInput<'a> {
    /// Full FRD text; truncated here, not by the caller.
    pub frd_text: &'a str,
    pub image: &'a EncodedImage,
    pub screen_name: &'a str,
}

/// The first `max_chars` characters of `text` (whole characters, not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the request for one screen.
///
/// Message layout:
/// 1. **System message** — the fixed instruction (or the configured override)
/// 2. **User message** — screen name and the truncated FRD framed by start/end
///    markers, followed by the screenshot as an inline data URL
pub fn build_request(input: &HelpRequestInput<'_>, config: &HelpConfig) -> ChatRequest {
    let system = config
        .system_prompt
        .as_deref()
        .unwrap_or(SYSTEM_INSTRUCTION);
    let frd = truncate_chars(input.frd_text, config.max_frd_chars);

    ChatRequest {
        model: config.model.clone(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: MessageContent::Text(system.to_string()),
            },
            ChatMessage {
                role: Role::User,
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: screen_user_text(input.screen_name, frd),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: input.image.data_url(),
                        },
                    },
                ]),
            },
        ],
        max_completion_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

// ── Model seam ───────────────────────────────────────────────────────────

/// A vision-capable chat model.
///
/// Returns the first choice's text, or `None` when the model produced none.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>, HelpGenError>;
}

/// Generate the HTML help text for one screen.
pub async fn generate_help_text(
    model: &dyn VisionModel,
    input: &HelpRequestInput<'_>,
    config: &HelpConfig,
) -> Result<String, HelpGenError> {
    let request = build_request(input, config);
    let start = Instant::now();

    info!(
        "Generating help text for '{}' with {}",
        input.screen_name, request.model
    );

    let html = model
        .complete(&request)
        .await?
        .ok_or_else(|| HelpGenError::EmptyCompletion {
            screen: input.screen_name.to_string(),
        })?;

    debug!(
        "Screen '{}': {} chars of help text in {:?}",
        input.screen_name,
        html.len(),
        start.elapsed()
    );
    Ok(html)
}

// ── Groq client ──────────────────────────────────────────────────────────

/// Client for Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GroqClient {
    /// Create a client for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    ///
    /// `timeout` of `None` keeps reqwest's default (no overall timeout).
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, HelpGenError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| HelpGenError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Validate model access and build a client from the environment settings.
    pub fn from_settings(settings: &Settings, config: &HelpConfig) -> Result<Self, HelpGenError> {
        let api_key = settings.require_model_access()?;
        debug!("Groq key loaded ({} chars)", api_key.len());
        Self::new(
            api_key,
            settings.groq_base_url(),
            config.api_timeout_secs.map(Duration::from_secs),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[async_trait]
impl VisionModel for GroqClient {
    async fn complete(&self, request: &ChatRequest) -> Result<Option<String>, HelpGenError> {
        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(HelpGenError::ModelRequest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HelpGenError::ModelApi {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion =
            response.json().await.map_err(HelpGenError::ModelRequest)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "{} input tokens, {} output tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content))
    }
}
