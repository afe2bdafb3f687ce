//! Text shaping for memory and history content.

/// Appended to text cut by [`clamp_text`].
pub const TRUNCATION_MARKER: &str = "\n…(已截断)…";

/// Cut `text` to `max_chars` characters, appending [`TRUNCATION_MARKER`].
///
/// Returns the text and whether it was cut. Text of at most `max_chars`
/// characters comes back unchanged.
pub fn clamp_text(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (format!("{}{TRUNCATION_MARKER}", &text[..cut]), true),
        None => (text.to_string(), false),
    }
}

/// First `max_chars` characters of `text`, without a marker.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Title header, then body, falling back to the summary when the body is
/// empty. Blank parts are skipped and the result is trimmed.
pub fn merge_page_text(title: Option<&str>, body: &str, summary: Option<&str>) -> String {
    let title = title.map(str::trim).filter(|t| !t.is_empty());
    let body = body.trim();
    let summary = summary.map(str::trim).filter(|s| !s.is_empty());

    let mut parts: Vec<String> = Vec::new();
    if let Some(title) = title {
        parts.push(format!("# {title}"));
    }
    if !body.is_empty() {
        parts.push(body.to_string());
    } else if let Some(summary) = summary {
        parts.push(summary.to_string());
    }
    parts.join("\n").trim().to_string()
}
