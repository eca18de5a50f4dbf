/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use quire::{Role, q_msg};
///
/// let message = q_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! q_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use quire::{Role, q_messages};
///
/// let messages = q_messages![
///     user => "Write a haiku about rust.",
///     assistant => "Iron wakes to red",
///     user => "Now make it a document.",
/// ];
///
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[1].role, Role::Assistant);
/// ```
#[macro_export]
macro_rules! q_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::q_msg!($role => $content)),+]
    };
}

/// Builds a [`ChatTurnRequest`](crate::ChatTurnRequest) from a chat id, a
/// model shorthand and the conversation so far.
///
/// ```rust
/// use quire::q_turn;
///
/// let request = q_turn!("chat-1", reasoning, user => "Why is the sky blue?");
/// assert_eq!(request.selected_model, "chat-model-reasoning");
/// assert_eq!(request.messages.len(), 1);
/// ```
#[macro_export]
macro_rules! q_turn {
    ($chat_id:expr, $model:ident, $($role:ident => $content:expr),+ $(,)?) => {
        $crate::ChatTurnRequest::new(
            $chat_id,
            concat!("chat-model-", stringify!($model)),
            $crate::q_messages![$($role => $content),+],
        )
    };
}
