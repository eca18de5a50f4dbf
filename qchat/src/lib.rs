//! Chat turn orchestration: authorization, model routing, a bounded tool loop
//! streamed over one ordered channel, and persistence at turn finish.
//!
//! ```rust
//! use qchat::{AttachmentSignal, ChatPolicy, ModelCatalog, select_model};
//!
//! let catalog = ModelCatalog::default();
//! let policy = ChatPolicy::default().with_max_steps(3);
//! assert!(policy.validate().is_ok());
//!
//! let pdf = AttachmentSignal {
//!     has_pdf: true,
//!     has_image: false,
//! };
//! let selected = select_model("chat-model-openai", pdf, &catalog).unwrap();
//! assert_eq!(selected, catalog.document_model);
//! ```

mod auth;
mod error;
mod hooks;
mod messages;
mod policy;
pub mod prompts;
mod routing;
mod service;
#[cfg(test)]
mod testing;
mod title;
mod types;

pub mod prelude {
    pub use crate::{
        AuthProvider, ChatError, ChatErrorKind, ChatPolicy, ChatService, ChatServiceBuilder,
        ChatTurnRequest, ModelCatalog, NoopTurnHooks, Session, StaticAuthProvider, TurnHooks,
        TurnOutcome,
    };
    pub use qcommon::{ChatId, UserId};
    pub use qstream::{SequencedPart, StreamPart};
}

pub use auth::{AuthProvider, Session, StaticAuthProvider};
pub use error::{ChatError, ChatErrorKind, GENERIC_ERROR_MESSAGE};
pub use hooks::{NoopTurnHooks, TurnHooks};
pub use messages::{most_recent_user_message, sanitize_response_messages};
pub use policy::{ChatPolicy, DEFAULT_ACTIVE_TOOLS, DEFAULT_MAX_STEPS, DEFAULT_TURN_TIMEOUT};
pub use routing::{AttachmentSignal, ModelCatalog, select_model};
pub use service::{ChatService, ChatServiceBuilder};
pub use title::{MAX_TITLE_CHARS, fallback_title, generate_title};
pub use types::{ChatTurnRequest, TurnOutcome};
