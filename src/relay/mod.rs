//! Chat relay: validate, load memory, prompt the completion API, reply.
//!
//! Every path ends in a [`RelayReply`] whose body is a [`ChatResponse`].
//! Errors never escape [`ChatRelay::answer`]; they are rendered into the
//! envelope together with the status class from [`Error::status`].

pub mod parse;
pub mod prompt;

use opentelemetry::KeyValue;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, warn};
use uuid::Uuid;

use crate::config::{COMPLETION_KEY_VAR, Config};
use crate::content::{ContentStore, DisabledStore, NotionStore};
use crate::error::{Error, Result};
use crate::llm::{CompletionApi, CompletionRequest, DeepSeekClient};
use crate::memory::{MemoryCache, MemoryLoader};
use crate::model::{ChatRequest, ChatResponse};
use crate::persona::Persona;
use crate::telemetry::{chat, genai, metrics};

/// Package name and version reported by health probes and debug payloads.
pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));

/// Tunables for prompt assembly and diagnostics.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Most recent history turns forwarded upstream.
    pub history_limit: usize,
    /// Per-turn content cap, in characters.
    pub turn_max_chars: usize,
    pub temperature: f32,
    /// Raw body characters echoed back when upstream is not JSON.
    pub raw_preview_chars: usize,
    /// Variable named in the missing-credential error.
    pub credential_var: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            history_limit: 20,
            turn_max_chars: 3000,
            temperature: 0.3,
            raw_preview_chars: 600,
            credential_var: COMPLETION_KEY_VAR.to_string(),
        }
    }
}

impl RelaySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            history_limit: config.history_limit,
            temperature: config.completion.temperature,
            ..Self::default()
        }
    }
}

/// HTTP status plus envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: u16,
    pub body: ChatResponse,
}

impl RelayReply {
    pub fn ok(body: ChatResponse) -> Self {
        Self { status: 200, body }
    }

    /// Envelope for a failure, with upstream diagnostics where available.
    pub fn from_error(err: &Error) -> Self {
        let body = ChatResponse::failure(err.to_string());
        let body = match err {
            Error::NonJsonUpstream { status, preview } => {
                body.with_debug(json!({ "httpStatus": status, "raw": preview }))
            }
            Error::UpstreamStatus { status, .. } => {
                body.with_debug(json!({ "httpStatus": status }))
            }
            _ => body,
        };
        Self {
            status: err.status(),
            body,
        }
    }

    fn outcome(&self) -> &'static str {
        match self.status {
            200..=299 => "ok",
            400..=499 => "invalid_input",
            502 => "upstream_error",
            _ => "internal_error",
        }
    }
}

pub struct ChatRelay {
    memory: Arc<MemoryLoader>,
    completion: Option<Arc<dyn CompletionApi>>,
    persona: Persona,
    settings: RelaySettings,
}

impl ChatRelay {
    /// A relay with no completion client; it answers every valid message
    /// with a missing-credential error until one is attached.
    pub fn new(memory: Arc<MemoryLoader>, persona: Persona, settings: RelaySettings) -> Self {
        Self {
            memory,
            completion: None,
            persona,
            settings,
        }
    }

    /// Wire the relay from configuration: Notion store (or a disabled one),
    /// cached loader, persona file, DeepSeek client when a key is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn ContentStore> = match NotionStore::from_config(&config.notion) {
            Some(store) => Arc::new(store),
            None => {
                warn!("NOTION_TOKEN not set, answering without memory");
                Arc::new(DisabledStore)
            }
        };
        let loader = MemoryLoader::new(
            store,
            config.memory.candidates(),
            config.memory.max_chars,
            MemoryCache::with_ttl_secs(config.memory.cache_ttl_secs),
        );
        let persona = Persona::load(config.persona_file.as_deref())?;

        let relay = Self::new(Arc::new(loader), persona, RelaySettings::from_config(config));
        Ok(match DeepSeekClient::from_config(&config.completion) {
            Some(client) => relay.with_completion(Arc::new(client)),
            None => {
                warn!("{COMPLETION_KEY_VAR} not set, chat requests will be rejected");
                relay
            }
        })
    }

    pub fn with_completion(mut self, completion: Arc<dyn CompletionApi>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn memory(&self) -> &MemoryLoader {
        &self.memory
    }

    /// Answer one chat request. Never fails; failures become envelopes.
    pub async fn answer(&self, request: ChatRequest) -> RelayReply {
        let request_id = Uuid::new_v4();
        let span = chat::start_request_span(&request_id);
        let start = Instant::now();

        let reply = match self
            .try_answer(request, request_id)
            .instrument(span.clone())
            .await
        {
            Ok(body) => RelayReply::ok(body),
            Err(e) => {
                span.in_scope(|| warn!(error = %e, status = e.status(), "chat request failed"));
                RelayReply::from_error(&e)
            }
        };

        let outcome = reply.outcome();
        chat::record_outcome(&span, outcome, reply.status);
        let labels = [KeyValue::new("outcome", outcome)];
        metrics::chat_requests().add(1, &labels);
        metrics::chat_duration_ms().record(start.elapsed().as_secs_f64() * 1000.0, &labels);

        reply
    }

    async fn try_answer(&self, request: ChatRequest, request_id: Uuid) -> Result<ChatResponse> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(Error::MissingMessage);
        }
        let completion = self
            .completion
            .as_ref()
            .ok_or_else(|| Error::MissingCredential(self.settings.credential_var.clone()))?;

        let memory = self.memory.load_cached().await;

        let history = prompt::trailing_window(
            &request.history,
            self.settings.history_limit,
            self.settings.turn_max_chars,
        );
        let history_forwarded = history.len();
        chat::record_prompt_shape(&tracing::Span::current(), history_forwarded, memory.found);

        let messages = prompt::build_messages(&self.persona, &memory, history, message);
        let outbound = CompletionRequest::new(
            completion.model(),
            messages,
            self.settings.temperature,
        );
        debug!(messages = outbound.messages.len(), "sending completion request");

        let chat_span = genai::start_chat_span(
            completion.model(),
            completion.provider(),
            self.settings.temperature,
        );
        let raw = completion
            .complete(&outbound)
            .instrument(chat_span.clone())
            .await?;
        let parsed = parse::parse_completion(&raw, self.settings.raw_preview_chars)?;

        if let Some(ref model) = parsed.model {
            genai::record_response_model(&chat_span, model);
        }
        if let Some((input, output)) = parsed.usage {
            genai::record_token_usage(
                &chat_span,
                completion.model(),
                completion.provider(),
                input,
                output,
            );
        }

        Ok(ChatResponse::answer(parsed.answer).with_debug(json!({
            "version": VERSION,
            "model": completion.model(),
            "requestId": request_id.to_string(),
            "memory": {
                "found": memory.found,
                "sourceId": memory.source_id,
                "chars": memory.chars(),
                "truncated": memory.truncated,
            },
            "historyForwarded": history_forwarded,
        })))
    }
}
