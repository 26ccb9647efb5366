//! Gemini assistant client — shared between TUI and CLI.
//!
//! This crate is the single source of truth for the assistant wire contract:
//! system instruction, conversation context window, generateContent call.
//!
//! No GUI concepts. No retries. No streaming.

mod chat;
mod client;

pub use chat::{ChatLog, ChatMessage, Role, Turn, CONTEXT_WINDOW};
pub use client::{AssistantClient, AssistantError, SYSTEM_INSTRUCTION};
