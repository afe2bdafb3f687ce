//! Content store abstraction.
//!
//! The memory page lives in an external workspace. Everything the loader
//! needs from it goes through [`ContentStore`]; upstream API quirks stay in
//! the implementing adapter.

pub mod notion;

use async_trait::async_trait;

use crate::error::Result;

pub use notion::NotionStore;

/// A page resolved from the content store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    /// Store-native page key.
    pub id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolve a slug or page id. `Ok(None)` when nothing matches.
    async fn get_page_by_identifier(&self, identifier: &str) -> Result<Option<Page>>;

    /// Plain-text rendering of the page body.
    async fn get_plain_text(&self, page: &Page) -> Result<String>;
}

/// Store used when no content credentials are configured. Resolves nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStore;

#[async_trait]
impl ContentStore for DisabledStore {
    async fn get_page_by_identifier(&self, _identifier: &str) -> Result<Option<Page>> {
        Ok(None)
    }

    async fn get_plain_text(&self, _page: &Page) -> Result<String> {
        Ok(String::new())
    }
}
