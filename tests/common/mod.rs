//! In-process fakes for the relay's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use persona_relay::content::{ContentStore, Page};
use persona_relay::error::{Error, Result};
use persona_relay::llm::{CompletionApi, CompletionRequest, RawCompletion};
use persona_relay::memory::{MemoryCache, MemoryLoader};
use persona_relay::persona::Persona;
use persona_relay::relay::{ChatRelay, RelaySettings};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Content store backed by a map, recording every identifier looked up.
#[derive(Default)]
pub struct FakeStore {
    pages: HashMap<String, (Page, std::result::Result<String, String>)>,
    failing: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, id: &str, title: Option<&str>, body: &str) -> Self {
        self.page_full(id, title, None, Ok(body.to_string()))
    }

    pub fn page_full(
        mut self,
        id: &str,
        title: Option<&str>,
        summary: Option<&str>,
        body: std::result::Result<String, String>,
    ) -> Self {
        let page = Page {
            id: id.to_string(),
            title: title.map(str::to_string),
            summary: summary.map(str::to_string),
        };
        self.pages.insert(id.to_string(), (page, body));
        self
    }

    /// Lookups of `id` fail with a store error.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn get_page_by_identifier(&self, identifier: &str) -> Result<Option<Page>> {
        self.lookups.lock().unwrap().push(identifier.to_string());
        if self.failing.contains(identifier) {
            return Err(Error::ContentStore(format!("boom on {identifier}")));
        }
        Ok(self.pages.get(identifier).map(|(page, _)| page.clone()))
    }

    async fn get_plain_text(&self, page: &Page) -> Result<String> {
        match self.pages.get(&page.id) {
            Some((_, Ok(body))) => Ok(body.clone()),
            Some((_, Err(reason))) => Err(Error::ContentStore(reason.clone())),
            None => Ok(String::new()),
        }
    }
}

/// Completion API returning one scripted reply and capturing requests.
pub struct FakeCompletion {
    reply: std::result::Result<RawCompletion, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeCompletion {
    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            reply: Ok(RawCompletion {
                status,
                body: body.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A well-formed chat completion answering `text`.
    pub fn answering(text: &str) -> Self {
        let body = json!({
            "model": "deepseek-chat",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }],
            "usage": { "prompt_tokens": 42, "completion_tokens": 7 }
        });
        Self::raw(200, &body.to_string())
    }

    /// Every call fails before reaching the provider.
    pub fn unreachable(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no completion request captured")
    }
}

#[async_trait]
impl CompletionApi for FakeCompletion {
    fn model(&self) -> &str {
        "deepseek-chat"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<RawCompletion> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(Error::Other)
    }
}

pub fn loader(store: Arc<FakeStore>, candidates: &[&str]) -> MemoryLoader {
    MemoryLoader::new(
        store,
        candidates.iter().map(|c| c.to_string()).collect(),
        14_000,
        MemoryCache::with_ttl_secs(60),
    )
}

/// Relay over the fakes with default persona and settings.
pub fn relay(store: Arc<FakeStore>, completion: Option<Arc<FakeCompletion>>) -> ChatRelay {
    let relay = ChatRelay::new(
        Arc::new(loader(store, &["memory", "memory-core"])),
        Persona::default(),
        RelaySettings::default(),
    );
    match completion {
        Some(api) => relay.with_completion(api),
        None => relay,
    }
}
