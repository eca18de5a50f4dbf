//! Persisted records.
//!
//! Documents are versioned: every save appends a row keyed by `(id, created_at)`
//! and the latest version is the current one.

use qcommon::{ChatId, DocumentId, DocumentKind, MessageId, SuggestionId, Timestamp, UserId};
use qprovider::{Message, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub user_id: UserId,
    pub title: String,
    pub created_at: Timestamp,
}

impl Chat {
    pub fn new(id: ChatId, user_id: UserId, title: impl Into<String>) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            created_at: qcommon::time::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub message: Message,
    pub created_at: Timestamp,
}

impl StoredMessage {
    pub fn new(chat_id: ChatId, message: Message) -> Self {
        Self {
            id: MessageId::generate(),
            chat_id,
            message,
            created_at: qcommon::time::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.message.role
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub created_at: Timestamp,
    pub title: String,
    pub kind: DocumentKind,
    pub content: Option<String>,
    pub user_id: UserId,
}

impl Document {
    /// A new version stamped with the current time.
    pub fn new_version(
        id: DocumentId,
        kind: DocumentKind,
        title: impl Into<String>,
        content: impl Into<String>,
        user_id: UserId,
    ) -> Self {
        Self {
            id,
            created_at: qcommon::time::now(),
            title: title.into(),
            kind,
            content: Some(content.into()),
            user_id,
        }
    }

    /// Content, treating an empty string as absent.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref().filter(|content| !content.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: SuggestionId,
    pub document_id: DocumentId,
    /// Creation time of the document version the suggestion targets.
    pub document_created_at: Timestamp,
    pub original_text: String,
    pub suggested_text: String,
    pub description: Option<String>,
    pub is_resolved: bool,
    pub user_id: UserId,
    pub created_at: Timestamp,
}
