//! GenAI semantic convention span helpers for the completion call.
//!
//! Uses OpenTelemetry GenAI semantic conventions:
//! - `gen_ai.operation.name`
//! - `gen_ai.request.model`
//! - `gen_ai.request.temperature`
//! - `gen_ai.response.model`
//! - `gen_ai.provider.name`
//! - `gen_ai.usage.input_tokens`
//! - `gen_ai.usage.output_tokens`

use opentelemetry::KeyValue;
use tracing::Span;

use super::metrics;

/// Start a span for a chat completion.
///
/// Response model and token usage are declared empty and filled in by
/// [`record_response_model`] and [`record_token_usage`].
pub fn start_chat_span(model: &str, provider: &str, temperature: f32) -> Span {
    tracing::info_span!(
        "gen_ai.chat",
        "gen_ai.operation.name" = "chat",
        "gen_ai.request.model" = model,
        "gen_ai.request.temperature" = temperature as f64,
        "gen_ai.provider.name" = provider,
        "gen_ai.response.model" = tracing::field::Empty,
        "gen_ai.usage.input_tokens" = tracing::field::Empty,
        "gen_ai.usage.output_tokens" = tracing::field::Empty,
    )
}

pub fn record_response_model(span: &Span, model: &str) {
    span.record("gen_ai.response.model", model);
}

/// Record token usage on the span and in the token counter.
pub fn record_token_usage(span: &Span, model: &str, provider: &str, input: u64, output: u64) {
    span.record("gen_ai.usage.input_tokens", input);
    span.record("gen_ai.usage.output_tokens", output);

    let tokens = metrics::llm_tokens();
    tokens.add(
        input,
        &[
            KeyValue::new("model", model.to_string()),
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("direction", "input"),
        ],
    );
    tokens.add(
        output,
        &[
            KeyValue::new("model", model.to_string()),
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("direction", "output"),
        ],
    );
}
