//! Chat title generation from the opening user message.

use qprovider::{Message, ModelHandle, OutputItem, Role};

use crate::prompts::TITLE_PROMPT;

pub const MAX_TITLE_CHARS: usize = 80;

/// Asks `model` for a short title; falls back to the message text when the
/// model is missing, fails, or answers with nothing usable.
pub async fn generate_title(model: Option<&ModelHandle>, message: &Message) -> String {
    let Some(model) = model else {
        return fallback_title(&message.content);
    };

    let request = model
        .request()
        .system(TITLE_PROMPT)
        .prompt(message.content.clone())
        .build();

    let response = match request {
        Ok(request) => model.complete(request).await,
        Err(error) => Err(error),
    };

    match response {
        Ok(response) => {
            let text: String = response
                .output
                .into_iter()
                .filter_map(|item| match item {
                    OutputItem::Message(message) if message.role == Role::Assistant => {
                        Some(message.content)
                    }
                    _ => None,
                })
                .collect();
            let title = clean_title(&text);
            if title.is_empty() {
                fallback_title(&message.content)
            } else {
                title
            }
        }
        Err(error) => {
            tracing::warn!(
                phase = "chat",
                event = "title_generation_failed",
                model = model.alias(),
                error = %error
            );
            fallback_title(&message.content)
        }
    }
}

pub fn fallback_title(content: &str) -> String {
    truncate_chars(content.trim(), MAX_TITLE_CHARS)
}

fn clean_title(raw: &str) -> String {
    let title = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .replace(':', "");
    truncate_chars(title.trim(), MAX_TITLE_CHARS)
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
