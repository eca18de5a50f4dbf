//! Persistence for chats, messages, versioned documents, and suggestions.
//!
//! ```rust
//! use qcommon::{ChatId, UserId};
//! use qstore::{Chat, ChatStore, InMemoryChatStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = InMemoryChatStore::new();
//! let chat = Chat::new(ChatId::new("chat-1"), UserId::new("user-1"), "Weather in Paris");
//! store.save_chat(chat).await.expect("chat should save");
//!
//! let loaded = store.get_chat(&ChatId::new("chat-1")).await.expect("load");
//! assert_eq!(loaded.map(|chat| chat.title), Some("Weather in Paris".to_string()));
//! # }
//! ```

mod backends;
mod error;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        Chat, ChatStore, Document, InMemoryChatStore, SqliteChatStore, StoreConfig, StoreError,
        StoreErrorKind, StoredMessage, Suggestion, create_default_store, create_store,
    };
}

pub use error::{StoreError, StoreErrorKind};
pub use store::{
    ChatStore, InMemoryChatStore, SqliteChatStore, StoreConfig, create_default_store,
    create_store,
};
pub use types::{Chat, Document, StoredMessage, Suggestion};
