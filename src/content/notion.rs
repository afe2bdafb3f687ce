//! Notion adapter for [`ContentStore`].
//!
//! Page ids are fetched directly; slugs are looked up through a database
//! query on a rich-text slug property. Block children are flattened into
//! markdown-ish plain text.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use super::{ContentStore, Page};
use crate::config::NotionConfig;
use crate::config::secrets::bearer;
use crate::error::{Error, Result};

const NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;
/// Nested block levels followed below the page itself.
const MAX_DEPTH: usize = 2;

pub struct NotionStore {
    http: Client,
    token: SecretString,
    api_base: String,
    database_id: Option<String>,
    slug_property: String,
}

#[derive(Debug, Deserialize)]
struct BlockList {
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResults {
    results: Vec<Value>,
}

impl NotionStore {
    pub fn new(token: SecretString, api_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            database_id: None,
            slug_property: "slug".to_string(),
        }
    }

    /// Build a store from config; `None` when no token is configured.
    pub fn from_config(config: &NotionConfig) -> Option<Self> {
        let token = config.token.clone()?;
        let mut store = Self::new(token, config.api_base.clone())
            .slug_property(config.slug_property.clone());
        if let Some(ref db) = config.database_id {
            store = store.database(db.clone());
        }
        Some(store)
    }

    pub fn database(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = Some(database_id.into());
        self
    }

    pub fn slug_property(mut self, name: impl Into<String>) -> Self {
        self.slug_property = name.into();
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{path}", self.api_base))
            .header("Authorization", bearer(&self.token))
            .header("Notion-Version", NOTION_VERSION)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{path}", self.api_base))
            .header("Authorization", bearer(&self.token))
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn fetch_page(&self, page_id: &str) -> Result<Option<Page>> {
        let resp = self.get(&format!("/pages/{page_id}")).send().await?;
        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            return Ok(None);
        }
        let resp = check(resp).await?;
        let value: Value = resp.json().await?;
        Ok(Some(page_from_value(&value)))
    }

    async fn query_slug(&self, database_id: &str, slug: &str) -> Result<Option<Page>> {
        let body = json!({
            "filter": {
                "property": self.slug_property,
                "rich_text": { "equals": slug }
            },
            "page_size": 1
        });
        let resp = self
            .post(&format!("/databases/{database_id}/query"))
            .json(&body)
            .send()
            .await?;
        let resp = check(resp).await?;
        let results: QueryResults = resp.json().await?;
        Ok(results.results.first().map(page_from_value))
    }

    async fn list_children(&self, block_id: &str) -> Result<Vec<Value>> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut req = self
                .get(&format!("/blocks/{block_id}/children"))
                .query(&[("page_size", PAGE_SIZE.to_string())]);
            if let Some(ref c) = cursor {
                req = req.query(&[("start_cursor", c.as_str())]);
            }
            let resp = check(req.send().await?).await?;
            let page: BlockList = resp.json().await?;
            blocks.extend(page.results);
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        Ok(blocks)
    }

    fn render_blocks<'a>(
        &'a self,
        block_id: &'a str,
        depth: usize,
        out: &'a mut Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let blocks = self.list_children(block_id).await?;
            for block in &blocks {
                if let Some(line) = render_block(block) {
                    out.push(format!("{}{line}", "  ".repeat(depth)));
                }
                let has_children = block.get("has_children").and_then(Value::as_bool) == Some(true);
                if has_children && depth < MAX_DEPTH {
                    if let Some(child_id) = block.get("id").and_then(Value::as_str) {
                        self.render_blocks(child_id, depth + 1, &mut *out).await?;
                    }
                }
            }
            Ok(())
        })
    }
}

#[async_trait]
impl ContentStore for NotionStore {
    async fn get_page_by_identifier(&self, identifier: &str) -> Result<Option<Page>> {
        if let Some(page_id) = normalize_page_id(identifier) {
            return self.fetch_page(&page_id).await;
        }
        match self.database_id {
            Some(ref db) => self.query_slug(db, identifier).await,
            None => {
                debug!(slug = identifier, "no database configured, slug unresolved");
                Ok(None)
            }
        }
    }

    async fn get_plain_text(&self, page: &Page) -> Result<String> {
        let mut lines = Vec::new();
        self.render_blocks(&page.id, 0, &mut lines).await?;
        Ok(lines.join("\n"))
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::ContentStore(format!(
        "Notion HTTP {}: {}",
        status.as_u16(),
        crate::memory::text::truncate_chars(&body, 300)
    )))
}

/// Canonical dashed form of a 32-hex Notion id, or `None` for slugs.
pub fn normalize_page_id(identifier: &str) -> Option<String> {
    let hex: String = identifier.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex = hex.to_ascii_lowercase();
    Some(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}

fn page_from_value(value: &Value) -> Page {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mut title = None;
    let mut summary = None;
    if let Some(props) = value.get("properties").and_then(Value::as_object) {
        for (name, prop) in props {
            match prop.get("type").and_then(Value::as_str) {
                Some("title") => title = rich_text(prop.get("title")),
                Some("rich_text") if name.eq_ignore_ascii_case("summary") => {
                    summary = rich_text(prop.get("rich_text"))
                }
                _ => {}
            }
        }
    }
    Page { id, title, summary }
}

/// Concatenated `plain_text` of a rich-text array; `None` when empty.
fn rich_text(value: Option<&Value>) -> Option<String> {
    let text: String = value?
        .as_array()?
        .iter()
        .filter_map(|span| span.get("plain_text").and_then(Value::as_str))
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

fn render_block(block: &Value) -> Option<String> {
    let kind = block.get("type")?.as_str()?;
    let data = block.get(kind)?;
    let text = rich_text(data.get("rich_text")).unwrap_or_default();
    let line = match kind {
        "heading_1" => format!("# {text}"),
        "heading_2" => format!("## {text}"),
        "heading_3" => format!("### {text}"),
        "bulleted_list_item" => format!("- {text}"),
        "numbered_list_item" => format!("1. {text}"),
        "to_do" => {
            let checked = data.get("checked").and_then(Value::as_bool) == Some(true);
            format!("[{}] {text}", if checked { "x" } else { " " })
        }
        "quote" | "callout" => format!("> {text}"),
        "paragraph" | "code" | "toggle" => text,
        _ => return None,
    };
    (!line.trim().is_empty()).then_some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_ids_are_normalized() {
        assert_eq!(
            normalize_page_id("0123456789ABCDEF0123456789abcdef").as_deref(),
            Some("01234567-89ab-cdef-0123-456789abcdef")
        );
        assert_eq!(normalize_page_id("memory-core"), None);
        assert_eq!(normalize_page_id("memory"), None);
    }

    #[test]
    fn blocks_render_to_lines() {
        let block = json!({
            "type": "to_do",
            "to_do": {"checked": true, "rich_text": [{"plain_text": "ship it"}]}
        });
        assert_eq!(render_block(&block).as_deref(), Some("[x] ship it"));

        let divider = json!({"type": "divider", "divider": {}});
        assert_eq!(render_block(&divider), None);

        let empty = json!({"type": "paragraph", "paragraph": {"rich_text": []}});
        assert_eq!(render_block(&empty), None);
    }

    #[test]
    fn page_properties_yield_title_and_summary() {
        let page = page_from_value(&json!({
            "id": "p1",
            "properties": {
                "Name": {"type": "title", "title": [{"plain_text": "Memory"}]},
                "Summary": {"type": "rich_text", "rich_text": [{"plain_text": "who I am"}]},
                "slug": {"type": "rich_text", "rich_text": [{"plain_text": "memory"}]}
            }
        }));
        assert_eq!(page.id, "p1");
        assert_eq!(page.title.as_deref(), Some("Memory"));
        assert_eq!(page.summary.as_deref(), Some("who I am"));
    }
}
