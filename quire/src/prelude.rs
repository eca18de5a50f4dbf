//! Common imports for most quire applications.

pub use crate::{
    assistant_message, build_runtime, parse_provider_id, system_message, turn, user_message,
    user_message_with_attachments, wire_lines,
};
pub use crate::{q_messages, q_msg, q_turn};
pub use crate::{
    Attachment, AuthProvider, ChatError, ChatErrorKind, ChatId, ChatPolicy, ChatService,
    ChatStore, ChatTurnRequest, DataEvent, DocumentId, DocumentKind, Message, ModelCatalog,
    ModelProvider, ModelRegistry, ProviderError, ProviderId, Role, RuntimeBuilder, RuntimeBundle,
    SequencedPart, Session, StaticAuthProvider, StoreConfig, StreamEvent, StreamPart, Tool,
    ToolError, ToolRegistry, UserId,
};
