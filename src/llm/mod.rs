//! Chat-completion API access.
//!
//! [`CompletionApi`] hands back the upstream status and the raw body text
//! without interpreting either, because the provider does not always answer
//! with JSON. Parsing belongs to the relay.
//!
//! # Example
//! ```no_run
//! use persona_relay::llm::{CompletionApi, CompletionRequest, DeepSeekClient, PromptMessage};
//! use secrecy::SecretString;
//!
//! # async fn run() -> persona_relay::error::Result<()> {
//! let client = DeepSeekClient::new(
//!     SecretString::from("sk-..."),
//!     "https://api.deepseek.com",
//!     "deepseek-chat",
//! );
//! let request = CompletionRequest::new(client.model(), vec![PromptMessage::user("你好")], 0.3);
//! let raw = client.complete(&request).await?;
//! println!("{} {}", raw.status, raw.body);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use serde::Serialize;

use crate::config::CompletionConfig;
use crate::config::secrets::bearer;
use crate::error::Result;
use crate::model::{ChatTurn, Role};

/// One role-tagged message of the outbound prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl From<ChatTurn> for PromptMessage {
    fn from(turn: ChatTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content,
        }
    }
}

/// Body of an OpenAI-compatible `chat/completions` call.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<PromptMessage>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
        }
    }
}

/// Upstream status code and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompletion {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Provider name for telemetry.
    fn provider(&self) -> &str {
        "deepseek"
    }

    /// One attempt, no retry. Only transport failures are errors.
    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion>;
}

/// DeepSeek (OpenAI-compatible) chat-completion client.
pub struct DeepSeekClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl DeepSeekClient {
    pub fn new(api_key: SecretString, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Build a client from config; `None` when the credential is missing.
    pub fn from_config(config: &CompletionConfig) -> Option<Self> {
        let key = config.api_key.clone()?;
        Some(Self::new(key, config.base_url.clone(), config.model.clone()))
    }
}

#[async_trait]
impl CompletionApi for DeepSeekClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion> {
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", bearer(&self.api_key))
            .json(request)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawCompletion { status, body })
    }
}
