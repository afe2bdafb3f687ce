//! Chat request span helpers.

use tracing::Span;
use uuid::Uuid;

/// Start a span for one chat request.
///
/// `chat.outcome` and `chat.status` are filled in by [`record_outcome`].
pub fn start_request_span(request_id: &Uuid) -> Span {
    tracing::info_span!(
        "chat.request",
        "chat.request_id" = %request_id,
        "chat.history_forwarded" = tracing::field::Empty,
        "chat.memory_found" = tracing::field::Empty,
        "chat.outcome" = tracing::field::Empty,
        "chat.status" = tracing::field::Empty,
    )
}

pub fn record_prompt_shape(span: &Span, history_forwarded: usize, memory_found: bool) {
    span.record("chat.history_forwarded", history_forwarded as u64);
    span.record("chat.memory_found", memory_found);
}

/// Record the final outcome and emit an `info` event in the span.
pub fn record_outcome(span: &Span, outcome: &str, status: u16) {
    span.record("chat.outcome", outcome);
    span.record("chat.status", status as u64);
    span.in_scope(|| {
        tracing::info!(outcome = outcome, status = status, "chat request finished");
    });
}
