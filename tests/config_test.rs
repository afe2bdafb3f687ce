use persona_relay::config::{Config, DEFAULT_MEMORY_SLUGS};
use persona_relay::error::Error;
use secrecy::ExposeSecret;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = Config::from_lookup(lookup(&[])).unwrap();

    assert!(config.completion.api_key.is_none());
    assert_eq!(config.completion.base_url, "https://api.deepseek.com");
    assert_eq!(config.completion.model, "deepseek-chat");
    assert!(config.notion.token.is_none());
    assert_eq!(config.notion.api_base, "https://api.notion.com/v1");
    assert_eq!(config.notion.slug_property, "slug");
    assert_eq!(config.memory.cache_ttl_secs, 60);
    assert_eq!(config.memory.max_chars, 14_000);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.max_body_bytes, 256 * 1024);
    assert_eq!(config.history_limit, 20);
    assert_eq!(config.log_level, "info");
    assert!(config.otel_endpoint.is_none());
}

#[test]
fn credentials_are_read_and_blank_values_ignored() {
    let config = Config::from_lookup(lookup(&[
        ("DEEPSEEK_API_KEY", "sk-test"),
        ("NOTION_TOKEN", "   "),
        ("HISTORY_LIMIT", "8"),
    ]))
    .unwrap();

    assert_eq!(
        config.completion.api_key.unwrap().expose_secret(),
        "sk-test"
    );
    assert!(config.notion.token.is_none());
    assert_eq!(config.history_limit, 8);
}

#[test]
fn malformed_number_is_a_config_error() {
    let err = Config::from_lookup(lookup(&[("MEMORY_MAX_CHARS", "lots")])).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("MEMORY_MAX_CHARS"));
}

#[test]
fn zero_history_limit_is_rejected() {
    let err = Config::from_lookup(lookup(&[("HISTORY_LIMIT", "0")])).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn zero_cache_ttl_is_allowed() {
    let config = Config::from_lookup(lookup(&[("MEMORY_CACHE_TTL_SECS", "0")])).unwrap();
    assert_eq!(config.memory.cache_ttl_secs, 0);
}

#[test]
fn candidates_put_overrides_first_and_dedupe() {
    let config = Config::from_lookup(lookup(&[
        ("MEMORY_SLUG", "memory-core"),
        ("NOTION_MEMORY_PAGE_ID", "0123456789abcdef0123456789abcdef"),
    ]))
    .unwrap();

    assert_eq!(
        config.memory.candidates(),
        vec![
            "memory-core",
            "0123456789abcdef0123456789abcdef",
            "memory",
            "memroy",
            "memort",
        ]
    );
}

#[test]
fn candidates_default_to_known_slugs() {
    let config = Config::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config.memory.candidates(), DEFAULT_MEMORY_SLUGS);
}
