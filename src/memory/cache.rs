//! Process-wide TTL cache for the memory record.
//!
//! One entry, replaced wholesale on refresh. Concurrent refreshes are
//! allowed; the last writer wins.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, Mutex, RwLock};

use crate::model::MemoryRecord;

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    record: MemoryRecord,
    stored_at: DateTime<Utc>,
}

pub struct MemoryCache {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<CacheEntry>>,
}

impl MemoryCache {
    pub fn new(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
        }
    }

    /// Cache with a TTL in whole seconds on the system clock. Zero disables it.
    pub fn with_ttl_secs(secs: u64) -> Self {
        let ttl = TimeDelta::try_seconds(i64::try_from(secs).unwrap_or(i64::MAX))
            .unwrap_or(TimeDelta::MAX);
        Self::new(ttl, Arc::new(SystemClock))
    }

    /// The cached record while `now - stored_at < ttl`.
    pub fn get_fresh(&self) -> Option<MemoryRecord> {
        let guard = self.entry.read().unwrap_or_else(|e| e.into_inner());
        let entry = guard.as_ref()?;
        (self.clock.now() - entry.stored_at < self.ttl).then(|| entry.record.clone())
    }

    pub fn store(&self, record: MemoryRecord) {
        let entry = CacheEntry {
            record,
            stored_at: self.clock.now(),
        };
        *self.entry.write().unwrap_or_else(|e| e.into_inner()) = Some(entry);
    }

    pub fn clear(&self) {
        *self.entry.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
