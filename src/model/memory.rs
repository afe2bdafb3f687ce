//! Memory record types.

use serde::{Deserialize, Serialize};

/// The memory text retrieved for one request, with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    pub found: bool,
    /// The candidate identifier that resolved.
    pub source_id: Option<String>,
    pub text: String,
    pub truncated: bool,
}

impl MemoryRecord {
    /// No memory available. Not an error.
    pub fn missing() -> Self {
        Self {
            found: false,
            source_id: None,
            text: String::new(),
            truncated: false,
        }
    }

    pub fn found(source_id: impl Into<String>, text: String, truncated: bool) -> Self {
        Self {
            found: true,
            source_id: Some(source_id.into()),
            text,
            truncated,
        }
    }

    /// Length of the memory text in characters.
    pub fn chars(&self) -> usize {
        self.text.chars().count()
    }
}
