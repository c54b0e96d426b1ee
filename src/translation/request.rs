// Request translation (relay → Gemini)
// Author: kelexine (https://github.com/kelexine)

use crate::models::gemini::{Content, GenerateContentRequest, Part, Role, SystemInstruction, Tool};
use crate::models::relay::{ChatMessage, ChatRequest, ChatRole, Conversation};
use tracing::debug;

/// Translate a validated chat request into a Gemini `generateContent` body.
pub fn translate_request(req: &ChatRequest) -> GenerateContentRequest {
    let contents = match &req.conversation {
        Conversation::SingleTurn(query) => vec![Content::text(Role::User, query.as_str())],
        Conversation::MultiTurn(messages) => translate_messages(messages),
    };

    let system_instruction = SystemInstruction {
        parts: vec![Part {
            text: req.system_prompt.clone(),
        }],
    };

    // Only attach tools when search is wanted; an empty array is not the same
    let tools = req.use_search.then(|| vec![Tool::google_search()]);

    debug!(
        "Translated request: {} contents, search: {}",
        contents.len(),
        tools.is_some()
    );

    GenerateContentRequest {
        contents,
        system_instruction,
        tools,
    }
}

/// Translate a conversation history, keeping turn order.
pub fn translate_messages(messages: &[ChatMessage]) -> Vec<Content> {
    messages
        .iter()
        .map(|msg| Content::text(map_role(msg.role), msg.text.as_str()))
        .collect()
}

// Map role: "assistant" → "model", everything else → "user"
fn map_role(role: ChatRole) -> Role {
    match role {
        ChatRole::Assistant => Role::Model,
        ChatRole::User => Role::User,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn request(conversation: Conversation, use_search: bool) -> ChatRequest {
        ChatRequest {
            conversation,
            system_prompt: "You are terse.".to_string(),
            model_name: "gemini-2.5-flash".to_string(),
            use_search,
        }
    }

    #[test]
    fn test_history_translation() {
        let req = request(
            Conversation::MultiTurn(vec![
                ChatMessage::new(ChatRole::User, "hi"),
                ChatMessage::new(ChatRole::Assistant, "hello"),
            ]),
            false,
        );

        let value = serde_json::to_value(translate_request(&req)).unwrap();

        assert_eq!(
            value["contents"],
            json!([
                { "role": "user", "parts": [{ "text": "hi" }] },
                { "role": "model", "parts": [{ "text": "hello" }] },
            ])
        );
    }

    #[test]
    fn test_single_turn_wraps_query() {
        let req = request(Conversation::SingleTurn("what time is it".to_string()), false);
        let value = serde_json::to_value(translate_request(&req)).unwrap();

        assert_eq!(
            value["contents"],
            json!([{ "role": "user", "parts": [{ "text": "what time is it" }] }])
        );
        assert_eq!(
            value["systemInstruction"],
            json!({ "parts": [{ "text": "You are terse." }] })
        );
    }

    #[test]
    fn test_tools_omitted_without_search() {
        let req = request(Conversation::SingleTurn("q".to_string()), false);
        let value = serde_json::to_value(translate_request(&req)).unwrap();
        assert!(value.as_object().unwrap().get("tools").is_none());
    }

    #[test]
    fn test_search_tool_added() {
        let req = request(Conversation::SingleTurn("q".to_string()), true);
        let value = serde_json::to_value(translate_request(&req)).unwrap();
        assert_eq!(value["tools"], json!([{ "google_search": {} }]));
    }

    fn arb_message() -> impl Strategy<Value = ChatMessage> {
        (any::<bool>(), ".{0,24}").prop_map(|(assistant, text)| {
            let role = if assistant {
                ChatRole::Assistant
            } else {
                ChatRole::User
            };
            ChatMessage::new(role, text)
        })
    }

    proptest! {
        #[test]
        fn prop_order_and_roles_preserved(messages in prop::collection::vec(arb_message(), 1..16)) {
            let contents = translate_messages(&messages);

            prop_assert_eq!(contents.len(), messages.len());
            for (msg, content) in messages.iter().zip(&contents) {
                let expected = match msg.role {
                    ChatRole::Assistant => Role::Model,
                    ChatRole::User => Role::User,
                };
                prop_assert_eq!(content.role, expected);
                prop_assert_eq!(content.parts.len(), 1);
                prop_assert_eq!(&content.parts[0].text, &msg.text);
            }
        }
    }
}
