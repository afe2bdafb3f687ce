//! Core data model.
//!
//! Chat turns and envelopes exchanged with the widget, and the memory
//! record produced by the loader. Nothing here is persisted.

pub mod chat;
pub mod memory;

pub use chat::{ChatRequest, ChatResponse, ChatTurn, Role};
pub use memory::MemoryRecord;
