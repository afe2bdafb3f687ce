//! Widget-side logic: transcript bookkeeping and calling the relay.
//!
//! The relay client never fails on a bad reply. Whatever comes back is
//! turned into a line for the transcript, with failures rendered as
//! `【错误】...` strings the way the page widget shows them.

use reqwest::Client;
use serde_json::Value;

use crate::memory::text::truncate_chars;
use crate::model::{ChatRequest, ChatResponse, ChatTurn};
use crate::persona::Persona;

/// Turns sent as history with each question.
pub const WIDGET_HISTORY_TURNS: usize = 12;

const RAW_PREVIEW_CHARS: usize = 600;

/// Local conversation kept by the widget.
#[derive(Debug, Clone)]
pub struct Transcript {
    greeting: String,
    turns: Vec<ChatTurn>,
    window: usize,
}

impl Transcript {
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            turns: vec![ChatTurn::assistant(greeting.clone())],
            greeting,
            window: WIDGET_HISTORY_TURNS,
        }
    }

    pub fn for_persona(persona: &Persona) -> Self {
        Self::new(persona.greeting.clone())
    }

    pub fn window(mut self, turns: usize) -> Self {
        self.window = turns;
        self
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Request for `question` carrying the last turns *before* it.
    pub fn request_for(&self, question: &str) -> ChatRequest {
        let start = self.turns.len().saturating_sub(self.window);
        ChatRequest::new(question).with_history(self.turns[start..].to_vec())
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(content));
    }

    /// Back to just the greeting.
    pub fn clear(&mut self) {
        self.turns = vec![ChatTurn::assistant(self.greeting.clone())];
    }
}

/// Text shown for a relay reply, success or not.
pub fn render_reply(response: &ChatResponse) -> String {
    if response.ok {
        return response
            .answer
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "（无返回）".to_string());
    }

    let mut out = format!(
        "【错误】{}",
        response.error.as_deref().unwrap_or("unknown error")
    );
    let debug = response.debug.as_ref();
    if let Some(status) = debug.and_then(|d| d.get("httpStatus")).and_then(Value::as_u64) {
        out.push_str(&format!("\n上游 HTTP {status}"));
    }
    if let Some(raw) = debug.and_then(|d| d.get("raw")).and_then(Value::as_str) {
        out.push_str(&format!("\n(raw={})", truncate_chars(raw, RAW_PREVIEW_CHARS)));
    }
    out
}

/// Text shown when the relay's own body is not JSON.
pub fn render_non_json(status: u16, body: &str) -> String {
    let quoted = serde_json::to_string(body).unwrap_or_default();
    format!("【错误】API返回不是JSON\nHTTP {status}\n(body={quoted})")
}

/// HTTP client for the relay endpoint.
pub struct RelayClient {
    http: Client,
    url: String,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    /// POST the request and render whatever comes back.
    pub async fn send(&self, request: &ChatRequest) -> String {
        let resp = match self.http.post(&self.url).json(request).send().await {
            Ok(resp) => resp,
            Err(e) => return format!("【错误】{e}"),
        };
        let status = resp.status().as_u16();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return format!("【错误】{e}"),
        };
        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(reply) => render_reply(&reply),
            Err(_) => render_non_json(status, &body),
        }
    }

    /// Ask one question and record both sides in the transcript.
    ///
    /// Blank questions are ignored and return `None`.
    pub async fn ask(&self, transcript: &mut Transcript, question: &str) -> Option<String> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let request = transcript.request_for(question);
        transcript.push_user(question);
        let reply = self.send(&request).await;
        transcript.push_assistant(reply.clone());
        Some(reply)
    }
}
