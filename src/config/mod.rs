//! Typed configuration from environment variables.
//!
//! Loads once at startup and fails fast on malformed values. The completion
//! credential is optional here: a relay without it still serves health
//! probes and answers chat requests with a `Missing DEEPSEEK_API_KEY` error.
//! Sensitive values are wrapped in secrecy::SecretString to prevent log leaks.

pub mod secrets;

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Name of the completion credential variable, also used in error messages.
pub const COMPLETION_KEY_VAR: &str = "DEEPSEEK_API_KEY";

#[derive(Debug)]
pub struct Config {
    pub completion: CompletionConfig,
    pub notion: NotionConfig,
    pub memory: MemoryConfig,
    pub persona_file: Option<PathBuf>,
    pub bind_addr: String,
    pub max_body_bytes: usize,
    pub history_limit: usize,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

#[derive(Debug)]
pub struct CompletionConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug)]
pub struct NotionConfig {
    pub token: Option<SecretString>,
    pub api_base: String,
    pub database_id: Option<String>,
    pub slug_property: String,
}

#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Preferred slug, tried before the built-in candidates.
    pub slug: Option<String>,
    /// Fixed page id, tried right after the preferred slug.
    pub page_id: Option<String>,
    pub cache_ttl_secs: u64,
    pub max_chars: usize,
}

/// Slugs the memory page has been published under over time.
pub const DEFAULT_MEMORY_SLUGS: &[&str] = &["memory", "memroy", "memory-core", "memort"];

impl MemoryConfig {
    /// Ordered, de-duplicated candidate identifiers for the memory page.
    pub fn candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let preferred = [self.slug.as_deref(), self.page_id.as_deref()];
        let all = preferred
            .into_iter()
            .flatten()
            .chain(DEFAULT_MEMORY_SLUGS.iter().copied());
        for candidate in all {
            let candidate = candidate.trim();
            if !candidate.is_empty() && !out.iter().any(|c| c == candidate) {
                out.push(candidate.to_string());
            }
        }
        out
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            completion: CompletionConfig {
                api_key: var(COMPLETION_KEY_VAR).map(SecretString::from),
                base_url: var("DEEPSEEK_BASE_URL")
                    .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
                model: var("DEEPSEEK_MODEL").unwrap_or_else(|| "deepseek-chat".to_string()),
                temperature: parse_var("CHAT_TEMPERATURE", var("CHAT_TEMPERATURE"), 0.3)?,
            },
            notion: NotionConfig {
                token: var("NOTION_TOKEN").map(SecretString::from),
                api_base: var("NOTION_API_BASE")
                    .unwrap_or_else(|| "https://api.notion.com/v1".to_string()),
                database_id: var("NOTION_DATABASE_ID"),
                slug_property: var("NOTION_SLUG_PROPERTY").unwrap_or_else(|| "slug".to_string()),
            },
            memory: MemoryConfig {
                slug: var("MEMORY_SLUG"),
                page_id: var("NOTION_MEMORY_PAGE_ID"),
                cache_ttl_secs: parse_var("MEMORY_CACHE_TTL_SECS", var("MEMORY_CACHE_TTL_SECS"), 60)?,
                max_chars: positive("MEMORY_MAX_CHARS", var("MEMORY_MAX_CHARS"), 14_000)?,
            },
            persona_file: var("PERSONA_FILE").map(PathBuf::from),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            max_body_bytes: positive("MAX_BODY_BYTES", var("MAX_BODY_BYTES"), 256 * 1024)?,
            history_limit: positive("HISTORY_LIMIT", var("HISTORY_LIMIT"), 20)?,
            otel_endpoint: var("OTEL_ENDPOINT"),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {value:?}"))),
        None => Ok(default),
    }
}

fn positive(name: &str, raw: Option<String>, default: usize) -> Result<usize> {
    let value = parse_var(name, raw, default)?;
    if value == 0 {
        return Err(Error::Config(format!("{name} must be greater than zero")));
    }
    Ok(value)
}
