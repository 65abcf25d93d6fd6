//! OpenAI-compatible chat completions client
//!
//! A blocking client: the pipeline makes one call at a time and waits for
//! it, so there is no async runtime involved. Request timeouts are enforced
//! by the HTTP client and reported as [`ServiceErrorKind::Timeout`].

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceErrorKind};
use crate::service::GenerationService;

/// Known OpenAI-compatible providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Perplexity,
    Grok,
    /// Any other compatible endpoint; `base_url` and `model` must be set
    Custom,
}

impl Provider {
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Provider::Perplexity => Some("https://api.perplexity.ai"),
            Provider::Grok => Some("https://api.x.ai/v1"),
            Provider::Custom => None,
        }
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Provider::Perplexity => Some("sonar"),
            Provider::Grok => Some("grok-code-fast-1"),
            Provider::Custom => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Perplexity => write!(f, "perplexity"),
            Provider::Grok => write!(f, "grok"),
            Provider::Custom => write!(f, "custom"),
        }
    }
}

/// Connection settings for [`ChatCompletionsService`]
#[derive(Clone)]
pub struct ServiceConfig {
    pub provider: Provider,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ServiceConfig {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: None,
            model: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for `/chat/completions` endpoints
pub struct ChatCompletionsService {
    client: reqwest::blocking::Client,
    provider: Provider,
    api_key: String,
    endpoint: String,
    model: String,
}

impl fmt::Debug for ChatCompletionsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionsService")
            .field("client", &"<reqwest::blocking::Client>")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatCompletionsService {
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let mut base_url = config
            .base_url
            .clone()
            .or_else(|| config.provider.default_base_url().map(String::from))
            .ok_or_else(|| ServiceError::other("base_url is required for custom providers"))?;
        while base_url.ends_with('/') {
            base_url.pop();
        }

        let model = config
            .model
            .clone()
            .or_else(|| config.provider.default_model().map(String::from))
            .ok_or_else(|| ServiceError::other("model is required for custom providers"))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::other(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(provider = %config.provider, %model, "generation service configured");

        Ok(Self {
            client,
            provider: config.provider,
            api_key: config.api_key,
            endpoint: format!("{}/chat/completions", base_url),
            model,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl GenerationService for ChatCompletionsService {
    fn name(&self) -> &str {
        match self.provider {
            Provider::Perplexity => "perplexity",
            Provider::Grok => "grok",
            Provider::Custom => "custom",
        }
    }

    fn invoke(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().map_err(transport_error)?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "generation service rejected request");
            return Err(ServiceError::new(
                classify_status(status.as_u16()),
                format!("request failed with status {status}: {}", snippet(&text)),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ServiceError::other(format!("invalid response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ServiceError::other(format!("empty response from {}", self.name())))
    }
}

/// Map an HTTP status to a failure kind
pub fn classify_status(status: u16) -> ServiceErrorKind {
    match status {
        401 => ServiceErrorKind::AuthFailure,
        402 | 403 | 429 => ServiceErrorKind::QuotaExceeded,
        _ => ServiceErrorKind::Other,
    }
}

fn transport_error(error: reqwest::Error) -> ServiceError {
    if error.is_timeout() {
        ServiceError::timeout(error.to_string())
    } else {
        ServiceError::other(error.to_string())
    }
}

fn snippet(body: &str) -> String {
    crate::prompt::truncate_chars(body.trim().to_string(), 200)
}
