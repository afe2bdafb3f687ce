//! Memory loading: resolve the memory page from the content store.
//!
//! Candidates are tried in order and each attempt yields a
//! [`CandidateOutcome`]. The first `Resolved` outcome wins; failing
//! candidates are logged and skipped. Running out of candidates is a normal
//! "no memory" result, never an error.

pub mod cache;
pub mod text;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::content::ContentStore;
use crate::model::MemoryRecord;
use crate::telemetry::metrics;

pub use cache::{Clock, ManualClock, MemoryCache, SystemClock};
pub use text::{TRUNCATION_MARKER, clamp_text};

/// What happened when one candidate identifier was tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    Resolved { text: String, truncated: bool },
    /// The store has no page under this identifier.
    Missing,
    /// The page exists but yielded no text.
    Empty,
    Failed(String),
}

impl CandidateOutcome {
    fn label(&self) -> &'static str {
        match self {
            CandidateOutcome::Resolved { .. } => "resolved",
            CandidateOutcome::Missing => "missing",
            CandidateOutcome::Empty => "empty",
            CandidateOutcome::Failed(_) => "failed",
        }
    }
}

pub struct MemoryLoader {
    store: Arc<dyn ContentStore>,
    candidates: Vec<String>,
    max_chars: usize,
    cache: MemoryCache,
}

impl MemoryLoader {
    pub fn new(
        store: Arc<dyn ContentStore>,
        candidates: Vec<String>,
        max_chars: usize,
        cache: MemoryCache,
    ) -> Self {
        Self {
            store,
            candidates,
            max_chars,
            cache,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Configured candidates, served from the cache while it is fresh.
    ///
    /// Only found records are cached, so a missing page is retried on the
    /// next call.
    pub async fn load_cached(&self) -> MemoryRecord {
        if let Some(record) = self.cache.get_fresh() {
            metrics::memory_cache().add(1, &[opentelemetry::KeyValue::new("result", "hit")]);
            debug!(source_id = ?record.source_id, "memory served from cache");
            return record;
        }
        metrics::memory_cache().add(1, &[opentelemetry::KeyValue::new("result", "miss")]);

        let record = self.load(&self.candidates, self.max_chars).await;
        if record.found {
            self.cache.store(record.clone());
        }
        record
    }

    /// Try `candidates` in order and return the first page with text.
    pub async fn load(&self, candidates: &[String], max_chars: usize) -> MemoryRecord {
        for candidate in candidates {
            let outcome = self.attempt(candidate, max_chars).await;
            metrics::memory_loads().add(
                1,
                &[opentelemetry::KeyValue::new("outcome", outcome.label())],
            );
            match outcome {
                CandidateOutcome::Resolved { text, truncated } => {
                    info!(
                        candidate = %candidate,
                        chars = text.chars().count(),
                        truncated,
                        "memory resolved"
                    );
                    return MemoryRecord::found(candidate.clone(), text, truncated);
                }
                CandidateOutcome::Failed(reason) => {
                    warn!(candidate = %candidate, %reason, "memory candidate failed");
                }
                other => {
                    debug!(candidate = %candidate, outcome = other.label(), "memory candidate skipped");
                }
            }
        }

        info!(tried = candidates.len(), "no memory page resolved");
        MemoryRecord::missing()
    }

    async fn attempt(&self, candidate: &str, max_chars: usize) -> CandidateOutcome {
        let page = match self.store.get_page_by_identifier(candidate).await {
            Ok(Some(page)) => page,
            Ok(None) => return CandidateOutcome::Missing,
            Err(e) => return CandidateOutcome::Failed(e.to_string()),
        };

        // A failed body fetch degrades to title + summary.
        let body = match self.store.get_plain_text(&page).await {
            Ok(body) => body,
            Err(e) => {
                debug!(candidate = %candidate, error = %e, "page body unavailable, using summary");
                String::new()
            }
        };

        let merged = text::merge_page_text(page.title.as_deref(), &body, page.summary.as_deref());
        if merged.is_empty() {
            return CandidateOutcome::Empty;
        }

        let (text, truncated) = clamp_text(&merged, max_chars);
        CandidateOutcome::Resolved { text, truncated }
    }
}
