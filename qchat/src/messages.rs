//! Conversation helpers applied before a turn starts and before it is persisted.

use std::collections::HashSet;

use qprovider::{Message, Role};

pub fn most_recent_user_message(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
}

/// Cleans the messages a turn produced so only finished content is stored.
///
/// Tool calls that never got a result are dropped, blank text is cleared,
/// reasoning stays on its own field, and messages left with nothing in them
/// are removed.
pub fn sanitize_response_messages(messages: Vec<Message>) -> Vec<Message> {
    let answered: HashSet<String> = messages
        .iter()
        .filter(|message| message.role == Role::Tool)
        .filter_map(|message| message.tool_call_id.clone())
        .collect();

    messages
        .into_iter()
        .filter_map(|mut message| {
            if message.role == Role::Assistant {
                message
                    .tool_calls
                    .retain(|call| answered.contains(&call.id));
            }

            if message.content.trim().is_empty() {
                message.content.clear();
            }

            if message
                .reasoning
                .as_deref()
                .is_some_and(|reasoning| reasoning.trim().is_empty())
            {
                message.reasoning = None;
            }

            let is_empty = message.content.is_empty()
                && message.tool_calls.is_empty()
                && message.reasoning.is_none()
                && message.role != Role::Tool;
            (!is_empty).then_some(message)
        })
        .collect()
}
