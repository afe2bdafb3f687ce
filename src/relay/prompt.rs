//! Prompt assembly.

use crate::llm::PromptMessage;
use crate::memory::text::truncate_chars;
use crate::model::{ChatTurn, MemoryRecord};
use crate::persona::Persona;

/// The last `limit` turns, each cut to `max_chars` characters.
pub fn trailing_window(history: &[ChatTurn], limit: usize, max_chars: usize) -> Vec<ChatTurn> {
    let start = history.len().saturating_sub(limit);
    history[start..]
        .iter()
        .map(|turn| ChatTurn {
            role: turn.role,
            content: truncate_chars(&turn.content, max_chars).to_string(),
        })
        .collect()
}

/// Persona block, optional memory block, history window, new message.
pub fn build_messages(
    persona: &Persona,
    memory: &MemoryRecord,
    history: Vec<ChatTurn>,
    message: &str,
) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(PromptMessage::system(persona.system_prompt.clone()));
    if !memory.text.is_empty() {
        messages.push(PromptMessage::system(persona.memory_block(&memory.text)));
    }
    messages.extend(history.into_iter().map(PromptMessage::from));
    messages.push(PromptMessage::user(message));
    messages
}
