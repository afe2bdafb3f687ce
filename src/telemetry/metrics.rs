//! Metric instrument factories for persona-relay.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments come from the `"persona-relay"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("persona-relay")
}

/// Counter: chat requests handled.
/// Labels: `outcome` ("ok" | "invalid_input" | "upstream_error" | "internal_error").
pub fn chat_requests() -> Counter<u64> {
    meter()
        .u64_counter("relay.chat.requests")
        .with_description("Number of chat requests handled")
        .build()
}

/// Histogram: chat request duration in milliseconds.
/// Labels: `outcome`.
pub fn chat_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("relay.chat.duration_ms")
        .with_description("Chat request duration in milliseconds")
        .with_unit("ms")
        .build()
}

/// Counter: memory candidate attempts.
/// Labels: `outcome` ("resolved" | "missing" | "empty" | "failed").
pub fn memory_loads() -> Counter<u64> {
    meter()
        .u64_counter("relay.memory.candidate_attempts")
        .with_description("Memory page candidate lookups")
        .build()
}

/// Counter: memory cache lookups.
/// Labels: `result` ("hit" | "miss").
pub fn memory_cache() -> Counter<u64> {
    meter()
        .u64_counter("relay.memory.cache")
        .with_description("Memory cache lookups")
        .build()
}

/// Counter: LLM token usage.
/// Labels: `model`, `provider`, `direction` ("input" | "output").
pub fn llm_tokens() -> Counter<u64> {
    meter()
        .u64_counter("relay.llm.tokens")
        .with_description("LLM token usage")
        .build()
}
