//! Upstream completion provider.
//!
//! One outbound call per portrait. Two wire formats are supported:
//!
//! - `"anthropic"` — Messages API, reply is a list of typed content blocks
//! - `"openai"` — Chat Completions API, reply is a list of choices
//!
//! Both replies are carried as [`UpstreamResponse`] so the rest of the
//! pipeline only ever asks for [`UpstreamResponse::first_text`].
//! No retries are attempted; a failed call surfaces directly.

pub mod anthropic;
pub mod openai;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, PortraitError, PortraitResult};

/// Outbound deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

const CREDENTIAL_PREFIX: &str = "sk-";

/// Supported completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
}

impl Provider {
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Provider::Anthropic => anthropic::MESSAGES_URL,
            Provider::OpenAi => openai::CHAT_COMPLETIONS_URL,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Anthropic => anthropic::DEFAULT_MODEL,
            Provider::OpenAi => openai::DEFAULT_MODEL,
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => f.write_str("anthropic"),
            Provider::OpenAi => f.write_str("openai"),
        }
    }
}

/// Check that a credential is present and has the expected prefix.
pub fn validate_api_key(provider: Provider, key: Option<&str>) -> Result<String, ConfigError> {
    let key = key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingCredential(provider.api_key_env()))?;
    if !key.starts_with(CREDENTIAL_PREFIX) {
        return Err(ConfigError::MalformedCredential(provider.api_key_env()));
    }
    Ok(key.to_string())
}

/// Mask a credential for logs: first 12 characters followed by `...`.
pub fn redact_api_key(key: &str) -> String {
    let visible: String = key.chars().take(12).collect();
    format!("{visible}...")
}

/// Settings for the outbound provider call.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub provider: Provider,
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Provider defaults for endpoint, model, output budget and timeout.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            endpoint: provider.default_endpoint().to_string(),
            model: provider.default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the endpoint; must be an absolute http(s) URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, ConfigError> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint(format!(
                "{endpoint}: scheme must be http or https"
            )));
        }
        self.endpoint = url.to_string();
        Ok(self)
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact_api_key(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Single user turn shared by both request formats.
#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Raw provider payload, one variant per wire shape.
#[derive(Debug, Clone)]
pub enum UpstreamResponse {
    Messages(anthropic::MessagesResponse),
    ChatCompletion(openai::ChatCompletionResponse),
}

impl UpstreamResponse {
    /// Decode a successful response body according to the provider's shape.
    pub fn decode(provider: Provider, body: &[u8]) -> PortraitResult<Self> {
        let decoded = match provider {
            Provider::Anthropic => serde_json::from_slice(body).map(UpstreamResponse::Messages),
            Provider::OpenAi => serde_json::from_slice(body).map(UpstreamResponse::ChatCompletion),
        };
        decoded.map_err(|e| PortraitError::Internal(format!("{provider} response decode error: {e}")))
    }

    /// First text segment of the reply, if any.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            UpstreamResponse::Messages(resp) => resp.first_text(),
            UpstreamResponse::ChatCompletion(resp) => resp.first_text(),
        }
    }
}

/// Seam between the request handlers and the completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> PortraitResult<UpstreamResponse>;
}

/// `reqwest`-backed client for the configured provider.
pub struct HttpCompletionClient {
    http: Client,
    config: UpstreamConfig,
}

impl HttpCompletionClient {
    pub fn new(config: UpstreamConfig) -> PortraitResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortraitError::Internal(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> PortraitResult<UpstreamResponse> {
        let cfg = &self.config;
        let messages = vec![ChatMessage {
            role: "user",
            content: prompt,
        }];

        let request = match cfg.provider {
            Provider::Anthropic => self
                .http
                .post(&cfg.endpoint)
                .header("x-api-key", &cfg.api_key)
                .header("anthropic-version", anthropic::API_VERSION)
                .json(&anthropic::MessagesRequest {
                    model: &cfg.model,
                    max_tokens: cfg.max_tokens,
                    messages,
                }),
            Provider::OpenAi => self
                .http
                .post(&cfg.endpoint)
                .bearer_auth(&cfg.api_key)
                .json(&openai::ChatCompletionRequest {
                    model: &cfg.model,
                    max_tokens: cfg.max_tokens,
                    messages,
                }),
        };

        debug!(provider = %cfg.provider, model = %cfg.model, prompt_len = prompt.len(), "calling upstream");

        let resp = request.send().await.map_err(|e| PortraitError::Upstream {
            status: None,
            detail: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PortraitError::Upstream {
                status: Some(status.as_u16()),
                detail: error_detail(status.as_u16(), &body),
            });
        }

        let body = resp.bytes().await.map_err(|e| PortraitError::Upstream {
            status: Some(status.as_u16()),
            detail: e.to_string(),
        })?;
        UpstreamResponse::decode(cfg.provider, &body)
    }
}

/// Provider error message from `{"error": {"message": ...}}`, else `HTTP <status>`.
fn error_detail(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| format!("HTTP {status}"))
}
