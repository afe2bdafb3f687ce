//! Defensive parsing of the raw completion body.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::llm::RawCompletion;
use crate::memory::text::truncate_chars;

/// What the relay keeps from a successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCompletion {
    pub answer: String,
    pub model: Option<String>,
    /// `(input, output)` token counts when the provider reports them.
    pub usage: Option<(u64, u64)>,
}

/// Bounded diagnostic view of a raw body.
pub fn preview(body: &str, max_chars: usize) -> String {
    if body.is_empty() {
        "(empty)".to_string()
    } else {
        truncate_chars(body, max_chars).to_string()
    }
}

/// Interpret a raw completion: JSON first, then upstream status and error,
/// then the first choice's message content.
pub fn parse_completion(raw: &RawCompletion, preview_chars: usize) -> Result<ParsedCompletion> {
    let value: Value = serde_json::from_str(&raw.body).map_err(|_| Error::NonJsonUpstream {
        status: raw.status,
        preview: preview(&raw.body, preview_chars),
    })?;

    let has_error = value.get("error").is_some_and(|e| !e.is_null());
    if !(200..300).contains(&raw.status) || has_error {
        let message = upstream_error_message(&value)
            .unwrap_or_else(|| format!("Completion API HTTP {}", raw.status));
        return Err(Error::UpstreamStatus {
            status: raw.status,
            message,
        });
    }

    let answer = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or(Error::EmptyCompletion)?;

    let usage = match (
        value.pointer("/usage/prompt_tokens").and_then(Value::as_u64),
        value.pointer("/usage/completion_tokens").and_then(Value::as_u64),
    ) {
        (Some(input), Some(output)) => Some((input, output)),
        _ => None,
    };

    Ok(ParsedCompletion {
        answer: answer.to_string(),
        model: value.get("model").and_then(Value::as_str).map(str::to_string),
        usage,
    })
}

/// `error.message`, or `error` itself when it is a string.
fn upstream_error_message(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
