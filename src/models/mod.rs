//! Data models for the relay and the Gemini API.
//!
//! This module contains the type definitions for request bodies used by:
//! - The inbound browser-facing chat endpoint (`relay`)
//! - The upstream Google Gemini API (`gemini`)

// Author: kelexine (https://github.com/kelexine)

pub mod gemini;
pub mod relay;

pub use gemini::{Content, GenerateContentRequest, Part, Role, SystemInstruction, Tool};
pub use relay::{ChatMessage, ChatRequest, ChatRole, Conversation, RawChatRequest};
