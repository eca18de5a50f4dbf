//! Storage contract and in-memory backend implementation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use qcommon::{BoxFuture, ChatId, DocumentId, Timestamp, UserId};

use crate::backends::sqlite::default_sqlite_path;
use crate::error::StoreError;
use crate::types::{Chat, Document, StoredMessage, Suggestion};

pub use crate::backends::sqlite::SqliteChatStore;

/// Persistence sink for chats, messages, document versions, and suggestions.
///
/// Every method fails with a [`StoreError`]; callers decide whether a failure is
/// fatal (required reads) or only logged (writes at turn finish).
pub trait ChatStore: Send + Sync {
    fn get_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<Option<Chat>, StoreError>>;

    fn save_chat<'a>(&'a self, chat: Chat) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Chats owned by `user_id`, newest first.
    fn chats_by_user<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Chat>, StoreError>>;

    /// Removes the chat together with its messages.
    fn delete_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<Option<Chat>, StoreError>>;

    fn save_messages<'a>(
        &'a self,
        messages: Vec<StoredMessage>,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Messages of one chat, oldest first.
    fn messages_by_chat<'a>(
        &'a self,
        chat_id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Vec<StoredMessage>, StoreError>>;

    /// Latest version of a document.
    fn get_document<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Option<Document>, StoreError>>;

    /// All versions of a document, oldest first.
    fn documents_by_id<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Document>, StoreError>>;

    fn save_document<'a>(&'a self, document: Document) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Deletes versions created strictly after `timestamp` and the suggestions
    /// attached to them. Returns the number of versions removed.
    fn delete_documents_after<'a>(
        &'a self,
        id: &'a DocumentId,
        timestamp: Timestamp,
    ) -> BoxFuture<'a, Result<usize, StoreError>>;

    fn save_suggestions<'a>(
        &'a self,
        suggestions: Vec<Suggestion>,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn suggestions_by_document<'a>(
        &'a self,
        document_id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, StoreError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { path: PathBuf },
    InMemory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

pub fn create_store(config: StoreConfig) -> Result<Arc<dyn ChatStore>, StoreError> {
    match config {
        StoreConfig::Sqlite { path } => Ok(Arc::new(SqliteChatStore::new(path)?)),
        StoreConfig::InMemory => Ok(Arc::new(InMemoryChatStore::new())),
    }
}

pub fn create_default_store() -> Result<Arc<dyn ChatStore>, StoreError> {
    create_store(StoreConfig::default())
}

#[derive(Debug, Default)]
pub struct InMemoryChatStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    chats: HashMap<ChatId, Chat>,
    messages: Vec<StoredMessage>,
    documents: Vec<Document>,
    suggestions: Vec<Suggestion>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::storage("memory store lock poisoned"))
    }
}

impl ChatStore for InMemoryChatStore {
    fn get_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<Option<Chat>, StoreError>> {
        Box::pin(async move { Ok(self.state()?.chats.get(id).cloned()) })
    }

    fn save_chat<'a>(&'a self, chat: Chat) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.state()?.chats.insert(chat.id.clone(), chat);
            Ok(())
        })
    }

    fn chats_by_user<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Chat>, StoreError>> {
        Box::pin(async move {
            let state = self.state()?;
            let mut chats: Vec<Chat> = state
                .chats
                .values()
                .filter(|chat| chat.is_owned_by(user_id))
                .cloned()
                .collect();
            chats.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
            Ok(chats)
        })
    }

    fn delete_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Option<Chat>, StoreError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            state.messages.retain(|message| &message.chat_id != id);
            Ok(state.chats.remove(id))
        })
    }

    fn save_messages<'a>(
        &'a self,
        messages: Vec<StoredMessage>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.state()?.messages.extend(messages);
            Ok(())
        })
    }

    fn messages_by_chat<'a>(
        &'a self,
        chat_id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Vec<StoredMessage>, StoreError>> {
        Box::pin(async move {
            let state = self.state()?;
            let mut messages: Vec<StoredMessage> = state
                .messages
                .iter()
                .filter(|message| &message.chat_id == chat_id)
                .cloned()
                .collect();
            messages.sort_by_key(|message| message.created_at);
            Ok(messages)
        })
    }

    fn get_document<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Option<Document>, StoreError>> {
        Box::pin(async move {
            let state = self.state()?;
            Ok(state
                .documents
                .iter()
                .filter(|document| &document.id == id)
                .max_by_key(|document| document.created_at)
                .cloned())
        })
    }

    fn documents_by_id<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Document>, StoreError>> {
        Box::pin(async move {
            let state = self.state()?;
            let mut versions: Vec<Document> = state
                .documents
                .iter()
                .filter(|document| &document.id == id)
                .cloned()
                .collect();
            versions.sort_by_key(|document| document.created_at);
            Ok(versions)
        })
    }

    fn save_document<'a>(&'a self, document: Document) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            state.documents.retain(|existing| {
                !(existing.id == document.id && existing.created_at == document.created_at)
            });
            state.documents.push(document);
            Ok(())
        })
    }

    fn delete_documents_after<'a>(
        &'a self,
        id: &'a DocumentId,
        timestamp: Timestamp,
    ) -> BoxFuture<'a, Result<usize, StoreError>> {
        Box::pin(async move {
            let mut state = self.state()?;
            state.suggestions.retain(|suggestion| {
                !(&suggestion.document_id == id && suggestion.document_created_at > timestamp)
            });

            let before = state.documents.len();
            state
                .documents
                .retain(|document| !(&document.id == id && document.created_at > timestamp));
            Ok(before - state.documents.len())
        })
    }

    fn save_suggestions<'a>(
        &'a self,
        suggestions: Vec<Suggestion>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.state()?.suggestions.extend(suggestions);
            Ok(())
        })
    }

    fn suggestions_by_document<'a>(
        &'a self,
        document_id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, StoreError>> {
        Box::pin(async move {
            let state = self.state()?;
            Ok(state
                .suggestions
                .iter()
                .filter(|suggestion| &suggestion.document_id == document_id)
                .cloned()
                .collect())
        })
    }
}
