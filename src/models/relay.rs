//! Inbound chat request schema.
//!
//! Browsers post a loosely shaped JSON body: either a single `userQuery` or a
//! `messages` history, plus the system prompt, model and search flag. The
//! body is first read into [`RawChatRequest`], where every field is optional,
//! and then checked into a [`ChatRequest`] so that nothing malformed reaches
//! the translation step.

// Author: kelexine (https://github.com/kelexine)

use crate::error::{RelayError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Model names end up in the upstream URL path; keep them to one segment.
static MODEL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid model name pattern"));

/// Chat request exactly as posted by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChatRequest {
    /// Single-turn prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_query: Option<String>,

    /// Multi-turn history, oldest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ChatMessage>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    /// Enable Google Search grounding. Absent means off.
    #[serde(default)]
    pub use_search: bool,
}

/// One turn of a client-side conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Speaker of a client-side turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// What the model is asked to continue.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversation {
    SingleTurn(String),
    MultiTurn(Vec<ChatMessage>),
}

/// A chat request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub conversation: Conversation,
    pub system_prompt: String,
    pub model_name: String,
    pub use_search: bool,
}

impl ChatRequest {
    /// Parse and validate a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let raw: RawChatRequest = serde_json::from_slice(body)
            .map_err(|e| RelayError::InvalidRequest(format!("JSON deserialization error: {}", e)))?;
        Self::try_from(raw)
    }

    /// Number of turns that will be sent upstream.
    pub fn turns(&self) -> usize {
        match &self.conversation {
            Conversation::SingleTurn(_) => 1,
            Conversation::MultiTurn(messages) => messages.len(),
        }
    }
}

impl TryFrom<RawChatRequest> for ChatRequest {
    type Error = RelayError;

    fn try_from(raw: RawChatRequest) -> Result<Self> {
        let model_name = raw
            .model_name
            .ok_or_else(|| RelayError::InvalidRequest("missing field `modelName`".to_string()))?;
        if !MODEL_NAME.is_match(&model_name) {
            return Err(RelayError::InvalidRequest(format!(
                "invalid modelName: {:?}",
                model_name
            )));
        }

        let system_prompt = raw
            .system_prompt
            .ok_or_else(|| RelayError::InvalidRequest("missing field `systemPrompt`".to_string()))?;

        // History wins when a client sends both shapes
        let conversation = match (raw.messages, raw.user_query) {
            (Some(messages), _) if messages.is_empty() => {
                return Err(RelayError::InvalidRequest(
                    "`messages` must contain at least one turn".to_string(),
                ))
            }
            (Some(messages), _) => Conversation::MultiTurn(messages),
            (None, Some(query)) => Conversation::SingleTurn(query),
            (None, None) => {
                return Err(RelayError::InvalidRequest(
                    "either `userQuery` or `messages` is required".to_string(),
                ))
            }
        };

        Ok(Self {
            conversation,
            system_prompt,
            model_name,
            use_search: raw.use_search,
        })
    }
}
