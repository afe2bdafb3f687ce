//! Persona definition: who the relay speaks as.
//!
//! The built-in persona can be overridden field by field from a TOML file:
//!
//! ```toml
//! [persona]
//! name = "茶色"
//! greeting = "你好，我是茶色。你想聊什么？"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

const DEFAULT_NAME: &str = "杨超哲";

const DEFAULT_GREETING: &str = "你好，我是杨超哲，也可以叫我茶色。你想聊什么？";

const DEFAULT_SYSTEM_PROMPT: &str = "你是“杨超哲”（Tawney / 茶色）本人在网上的数字分身，用第一人称“我”回答。

【风格】
- 直接、效率优先，但保持礼貌（不讨好、不绕弯，不粗暴、不挑衅）。
- 先给结论，再给理由；不写废话。
- 不要自说自话、不加戏、不编造经历。

【记忆规则】
- 你会收到一段“记忆（来自 Notion）”。只能以这段记忆为准。
- 记忆里没有的事：明确说“我记忆里没写这条/我不确定”，然后问 1-2 个关键问题补齐。
- 绝对禁止凭空捏造具体年份、地点、事件、经历。

【对外】
- 有人打招呼或问你是谁时，说明你是杨超哲（茶色）。
- 你代表“我”回答别人问题，保持专业、简洁、有判断。";

const DEFAULT_MEMORY_HEADING: &str = "【记忆（来自Notion，必须遵守）】";

const MEMORY_SOURCE_RULE: &str = "以下内容是唯一可信的事实来源，记忆之外的具体事实一律不要断言。";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    /// First assistant turn shown by the widget.
    pub greeting: String,
    pub system_prompt: String,
    pub memory_heading: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            memory_heading: DEFAULT_MEMORY_HEADING.to_string(),
        }
    }
}

/// Top-level TOML wrapper.
#[derive(Debug, Deserialize)]
struct PersonaFile {
    persona: PersonaOverrides,
}

#[derive(Debug, Default, Deserialize)]
struct PersonaOverrides {
    name: Option<String>,
    greeting: Option<String>,
    system_prompt: Option<String>,
    memory_heading: Option<String>,
}

impl Persona {
    /// Parse a `[persona]` TOML document over the built-in defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: PersonaFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("bad persona config: {e}")))?;
        let o = file.persona;
        let base = Self::default();
        Ok(Self {
            name: o.name.unwrap_or(base.name),
            greeting: o.greeting.unwrap_or(base.greeting),
            system_prompt: o.system_prompt.unwrap_or(base.system_prompt),
            memory_heading: o.memory_heading.unwrap_or(base.memory_heading),
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read persona file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// The default persona, or the file's when a path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// System block carrying the memory text verbatim.
    pub fn memory_block(&self, memory: &str) -> String {
        format!("{}\n{MEMORY_SOURCE_RULE}\n\n{memory}", self.memory_heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_keep_unset_defaults() {
        let persona = Persona::from_toml("[persona]\nname = \"茶色\"\n").unwrap();
        assert_eq!(persona.name, "茶色");
        assert_eq!(persona.system_prompt, Persona::default().system_prompt);
    }

    #[test]
    fn memory_block_contains_text_verbatim() {
        let block = Persona::default().memory_block("我住在上海");
        assert!(block.starts_with(DEFAULT_MEMORY_HEADING));
        assert!(block.ends_with("我住在上海"));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            Persona::from_toml("persona = 3"),
            Err(Error::Config(_))
        ));
    }
}
