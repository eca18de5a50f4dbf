//! Turn request and outcome types.

use qcommon::ChatId;
use qprovider::{Message, StopReason, TokenUsage};
use serde::{Deserialize, Serialize};

/// Body of one chat request: the full client-side history plus the model the
/// user picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    #[serde(rename = "id")]
    pub chat_id: ChatId,
    pub messages: Vec<Message>,
    #[serde(rename = "selectedChatModel")]
    pub selected_model: String,
}

impl ChatTurnRequest {
    pub fn new(
        chat_id: impl Into<ChatId>,
        selected_model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            messages,
            selected_model: selected_model.into(),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// What the tool loop produced before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub steps: usize,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
    /// Assistant and tool messages in the order they were produced.
    pub response_messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use qprovider::Role;

    use super::*;

    #[test]
    fn request_reads_the_client_body() {
        let body = r#"{
            "id": "chat-9",
            "selectedChatModel": "chat-model-claude",
            "messages": [{ "role": "user", "content": "hi" }]
        }"#;

        let request: ChatTurnRequest = serde_json::from_str(body).expect("body should parse");
        assert_eq!(request.chat_id, ChatId::new("chat-9"));
        assert_eq!(request.selected_model, "chat-model-claude");
        assert_eq!(request.messages, vec![Message::new(Role::User, "hi")]);
    }
}
