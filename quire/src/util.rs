//! Small convenience constructors for common types.

use futures_util::{Stream, StreamExt};

use crate::{
    Attachment, ChatId, ChatTurnRequest, DrivenStream, Message, ProviderId, Role, SequencedPart,
};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

/// User message carrying file parts, e.g. a PDF that steers model routing.
pub fn user_message_with_attachments(
    content: impl Into<String>,
    attachments: impl IntoIterator<Item = Attachment>,
) -> Message {
    attachments
        .into_iter()
        .fold(user_message(content), Message::with_attachment)
}

/// Single-message turn on `chat_id` with the requested model.
pub fn turn(
    chat_id: impl Into<ChatId>,
    selected_model: impl Into<String>,
    user_input: impl Into<String>,
) -> ChatTurnRequest {
    ChatTurnRequest::new(chat_id, selected_model, vec![user_message(user_input)])
}

/// Renders each part of a turn as one newline-terminated JSON frame.
pub fn wire_lines<'a>(
    stream: DrivenStream<'a>,
) -> impl Stream<Item = Result<String, serde_json::Error>> + Send + 'a {
    stream.map(|part: SequencedPart| part.to_wire_line())
}

pub fn parse_provider_id(value: &str) -> Option<ProviderId> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(ProviderId::OpenAi),
        "claude" | "anthropic" => Some(ProviderId::Anthropic),
        "gemini" | "google" => Some(ProviderId::Google),
        "groq" => Some(ProviderId::Groq),
        "mistral" => Some(ProviderId::Mistral),
        "perplexity" => Some(ProviderId::Perplexity),
        "openrouter" | "open-router" => Some(ProviderId::OpenRouter),
        _ => None,
    }
}
