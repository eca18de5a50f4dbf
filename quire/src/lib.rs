//! Unified facade over the quire workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the core quire crates and provides runtime wiring plus
//! convenience helpers and macros for building turns.
//!
//! ```rust
//! use quire::{ChatPolicy, ModelCatalog, q_turn};
//!
//! let catalog = ModelCatalog::default();
//! let request = q_turn!("chat-1", openai, user => "hello");
//!
//! assert!(catalog.is_chat_model(&request.selected_model));
//! assert_eq!(ChatPolicy::default().max_steps, 5);
//! ```

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use qartifact;
pub use qchat;
pub use qcommon;
pub use qobserve;
pub use qprovider;
pub use qstore;
pub use qstream;
pub use qtooling;

pub use qartifact::{
    CreateDocumentTool, DocumentContext, DocumentHandler, DocumentHandlerRegistry,
    GetWeatherTool, RequestSuggestionsTool, SuggestionPolicy, UpdateDocumentTool,
};
pub use qchat::{
    AttachmentSignal, AuthProvider, ChatError, ChatErrorKind, ChatPolicy, ChatService,
    ChatServiceBuilder, ChatTurnRequest, GENERIC_ERROR_MESSAGE, ModelCatalog, NoopTurnHooks,
    Session, StaticAuthProvider, TurnHooks, TurnOutcome, select_model,
};
pub use qcommon::{BoxFuture, ChatId, DocumentId, DocumentKind, MetadataMap, SuggestionId, UserId};
pub use qobserve::{
    MetricsObservabilityHooks, SafeToolHooks, SafeTurnHooks, TracingObservabilityHooks,
};
pub use qprovider::{
    Attachment, BoxedEventStream, GeneratedImage, ImageModel, ImageRequest, Message,
    ModelEventStream, ModelHandle, ModelProvider, ModelRegistry, ModelRequest, ModelResponse,
    OutputItem, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, Role, StopReason,
    StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult, VecEventStream,
};
pub use qstore::{
    Chat, ChatStore, Document, InMemoryChatStore, SqliteChatStore, StoreConfig, StoreError,
    StoreErrorKind, StoredMessage, Suggestion, create_default_store, create_store,
};
pub use qstream::{DataEvent, DataStreamWriter, DrivenStream, SequencedPart, StreamPart};
pub use qtooling::{
    DefaultToolRuntime, NoopToolRuntimeHooks, Tool, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolExecutionResult, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
};

pub use runtime::{RuntimeBuilder, RuntimeBundle, build_runtime};
pub use util::{
    assistant_message, parse_provider_id, system_message, turn, user_message,
    user_message_with_attachments, wire_lines,
};

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn q_msg_macro_creates_expected_message() {
        let message = crate::q_msg!(user => "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "hello");
    }

    #[test]
    fn q_turn_macro_expands_model_shorthand() {
        let request = crate::q_turn!(
            "chat-1",
            claude,
            user => "Summarize this PDF",
            assistant => "Which part?",
            user => "All of it",
        );

        assert_eq!(request.selected_model, "chat-model-claude");
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].role, Role::User);
    }
}
