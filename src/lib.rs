//! # persona-relay
//!
//! Chat relay for a personal site: visitors ask questions, the relay answers
//! as the site owner, grounded in a memory page kept in Notion.
//!
//! Provides the memory loader (candidate fallback, truncation, TTL cache),
//! the chat relay (persona prompt, DeepSeek completion, defensive parsing),
//! the HTTP surface (axum), the widget-side transcript client, and
//! OpenTelemetry observability.

pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod llm;
pub mod memory;
pub mod model;
pub mod persona;
pub mod relay;
pub mod server;
pub mod telemetry;
