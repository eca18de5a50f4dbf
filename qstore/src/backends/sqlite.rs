use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use qcommon::{
    BoxFuture, ChatId, DocumentId, DocumentKind, MessageId, SuggestionId, Timestamp, UserId, time,
};
use qprovider::Message;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StoreError;
use crate::store::ChatStore;
use crate::types::{Chat, Document, StoredMessage, Suggestion};

#[derive(Debug)]
pub struct SqliteChatStore {
    connection: Mutex<Connection>,
}

type DocumentRow = (String, i64, String, String, Option<String>, String);
type SuggestionRow = (
    String,
    String,
    i64,
    String,
    String,
    Option<String>,
    bool,
    String,
    i64,
);

impl SqliteChatStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                StoreError::storage(format!("failed to create sqlite parent directory: {error}"))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            StoreError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            StoreError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                StoreError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::storage("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS chats (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                chat_id TEXT NOT NULL,
                role TEXT NOT NULL,
                message_json TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chats_user_created
            ON chats(user_id, created_at);

            CREATE INDEX IF NOT EXISTS idx_messages_chat_created
            ON messages(chat_id, created_at);

            CREATE TABLE IF NOT EXISTS documents (
                id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                title TEXT NOT NULL,
                kind TEXT NOT NULL,
                content TEXT,
                user_id TEXT NOT NULL,
                PRIMARY KEY (id, created_at)
            );

            CREATE TABLE IF NOT EXISTS suggestions (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                document_created_at INTEGER NOT NULL,
                original_text TEXT NOT NULL,
                suggested_text TEXT NOT NULL,
                description TEXT,
                is_resolved INTEGER NOT NULL,
                user_id TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_suggestions_document
            ON suggestions(document_id, document_created_at);
            ",
        )
        .map_err(|error| {
            StoreError::storage(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }

    fn query_documents(
        conn: &Connection,
        id: &DocumentId,
        sql: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let mut stmt = conn.prepare(sql).map_err(|error| {
            StoreError::storage(format!("failed to prepare document query: {error}"))
        })?;
        let rows = stmt
            .query_map(params![id.as_str()], |row| {
                Ok::<DocumentRow, rusqlite::Error>((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })
            .map_err(|error| {
                StoreError::storage(format!("failed to query document rows: {error}"))
            })?;

        let mut documents = Vec::new();
        for row in rows {
            let row = row.map_err(|error| {
                StoreError::storage(format!("failed to read document row: {error}"))
            })?;
            documents.push(document_from_row(row)?);
        }
        Ok(documents)
    }
}

impl ChatStore for SqliteChatStore {
    fn get_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<Option<Chat>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let row = conn
                .query_row(
                    "SELECT id, user_id, title, created_at FROM chats WHERE id = ?1",
                    params![id.as_str()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, i64>(3)?,
                        ))
                    },
                )
                .optional()
                .map_err(|error| StoreError::storage(format!("failed to load chat: {error}")))?;

            row.map(|(id, user_id, title, created_at)| {
                Ok(Chat {
                    id: ChatId::from(id),
                    user_id: UserId::from(user_id),
                    title,
                    created_at: decode_timestamp(created_at)?,
                })
            })
            .transpose()
        })
    }

    fn save_chat<'a>(&'a self, chat: Chat) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.execute(
                "
                INSERT INTO chats (id, user_id, title, created_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    title = excluded.title
                ",
                params![
                    chat.id.as_str(),
                    chat.user_id.as_str(),
                    &chat.title,
                    time::to_micros(&chat.created_at),
                ],
            )
            .map_err(|error| StoreError::storage(format!("failed to save chat: {error}")))?;
            Ok(())
        })
    }

    fn delete_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Option<Chat>, StoreError>> {
        Box::pin(async move {
            let existing = self.get_chat(id).await?;
            if existing.is_none() {
                return Ok(None);
            }

            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                StoreError::storage(format!("failed to begin chat deletion: {error}"))
            })?;
            tx.execute("DELETE FROM messages WHERE chat_id = ?1", params![id.as_str()])
                .map_err(|error| {
                    StoreError::storage(format!("failed to delete chat messages: {error}"))
                })?;
            tx.execute("DELETE FROM chats WHERE id = ?1", params![id.as_str()])
                .map_err(|error| StoreError::storage(format!("failed to delete chat: {error}")))?;
            tx.commit().map_err(|error| {
                StoreError::storage(format!("failed to commit chat deletion: {error}"))
            })?;
            Ok(existing)
        })
    }

    fn save_messages<'a>(
        &'a self,
        messages: Vec<StoredMessage>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                StoreError::storage(format!("failed to begin message batch: {error}"))
            })?;
            for message in &messages {
                let message_json = serde_json::to_string(&message.message)?;
                tx.execute(
                    "
                    INSERT INTO messages (id, chat_id, role, message_json, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ",
                    params![
                        message.id.as_str(),
                        message.chat_id.as_str(),
                        message.role().as_str(),
                        message_json,
                        time::to_micros(&message.created_at),
                    ],
                )
                .map_err(|error| StoreError::storage(format!("failed to save message: {error}")))?;
            }
            tx.commit().map_err(|error| {
                StoreError::storage(format!("failed to commit message batch: {error}"))
            })?;
            Ok(())
        })
    }

    fn chats_by_user<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Chat>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT id, title, created_at
                    FROM chats
                    WHERE user_id = ?1
                    ORDER BY created_at DESC, id ASC
                    ",
                )
                .map_err(|error| {
                    StoreError::storage(format!("failed to prepare chat history query: {error}"))
                })?;
            let rows = stmt
                .query_map(params![user_id.as_str()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })
                .map_err(|error| {
                    StoreError::storage(format!("failed to query chat rows: {error}"))
                })?;

            let mut chats = Vec::new();
            for row in rows {
                let (id, title, created_at) = row.map_err(|error| {
                    StoreError::storage(format!("failed to read chat row: {error}"))
                })?;
                chats.push(Chat {
                    id: ChatId::from(id),
                    user_id: user_id.clone(),
                    title,
                    created_at: decode_timestamp(created_at)?,
                });
            }
            Ok(chats)
        })
    }

    fn messages_by_chat<'a>(
        &'a self,
        chat_id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Vec<StoredMessage>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT id, message_json, created_at
                    FROM messages
                    WHERE chat_id = ?1
                    ORDER BY created_at ASC, rowid ASC
                    ",
                )
                .map_err(|error| {
                    StoreError::storage(format!("failed to prepare message query: {error}"))
                })?;
            let rows = stmt
                .query_map(params![chat_id.as_str()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                })
                .map_err(|error| {
                    StoreError::storage(format!("failed to query message rows: {error}"))
                })?;

            let mut messages = Vec::new();
            for row in rows {
                let (id, message_json, created_at) = row.map_err(|error| {
                    StoreError::storage(format!("failed to read message row: {error}"))
                })?;
                messages.push(StoredMessage {
                    id: MessageId::from(id),
                    chat_id: chat_id.clone(),
                    message: serde_json::from_str::<Message>(&message_json)?,
                    created_at: decode_timestamp(created_at)?,
                });
            }
            Ok(messages)
        })
    }

    fn get_document<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Option<Document>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut latest = Self::query_documents(
                &conn,
                id,
                "
                SELECT id, created_at, title, kind, content, user_id
                FROM documents
                WHERE id = ?1
                ORDER BY created_at DESC
                LIMIT 1
                ",
            )?;
            Ok(latest.pop())
        })
    }

    fn documents_by_id<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Document>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            Self::query_documents(
                &conn,
                id,
                "
                SELECT id, created_at, title, kind, content, user_id
                FROM documents
                WHERE id = ?1
                ORDER BY created_at ASC
                ",
            )
        })
    }

    fn save_document<'a>(&'a self, document: Document) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.execute(
                "
                INSERT OR REPLACE INTO documents (id, created_at, title, kind, content, user_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    document.id.as_str(),
                    time::to_micros(&document.created_at),
                    &document.title,
                    document.kind.as_str(),
                    document.content.as_deref(),
                    document.user_id.as_str(),
                ],
            )
            .map_err(|error| StoreError::storage(format!("failed to save document: {error}")))?;
            Ok(())
        })
    }

    fn delete_documents_after<'a>(
        &'a self,
        id: &'a DocumentId,
        timestamp: Timestamp,
    ) -> BoxFuture<'a, Result<usize, StoreError>> {
        Box::pin(async move {
            let micros = time::to_micros(&timestamp);
            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                StoreError::storage(format!("failed to begin document deletion: {error}"))
            })?;
            tx.execute(
                "DELETE FROM suggestions WHERE document_id = ?1 AND document_created_at > ?2",
                params![id.as_str(), micros],
            )
            .map_err(|error| {
                StoreError::storage(format!("failed to delete document suggestions: {error}"))
            })?;
            let deleted = tx
                .execute(
                    "DELETE FROM documents WHERE id = ?1 AND created_at > ?2",
                    params![id.as_str(), micros],
                )
                .map_err(|error| {
                    StoreError::storage(format!("failed to delete document versions: {error}"))
                })?;
            tx.commit().map_err(|error| {
                StoreError::storage(format!("failed to commit document deletion: {error}"))
            })?;
            Ok(deleted)
        })
    }

    fn save_suggestions<'a>(
        &'a self,
        suggestions: Vec<Suggestion>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                StoreError::storage(format!("failed to begin suggestion batch: {error}"))
            })?;
            for suggestion in &suggestions {
                tx.execute(
                    "
                    INSERT INTO suggestions (
                        id,
                        document_id,
                        document_created_at,
                        original_text,
                        suggested_text,
                        description,
                        is_resolved,
                        user_id,
                        created_at
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ",
                    params![
                        suggestion.id.as_str(),
                        suggestion.document_id.as_str(),
                        time::to_micros(&suggestion.document_created_at),
                        &suggestion.original_text,
                        &suggestion.suggested_text,
                        suggestion.description.as_deref(),
                        suggestion.is_resolved,
                        suggestion.user_id.as_str(),
                        time::to_micros(&suggestion.created_at),
                    ],
                )
                .map_err(|error| {
                    StoreError::storage(format!("failed to save suggestion: {error}"))
                })?;
            }
            tx.commit().map_err(|error| {
                StoreError::storage(format!("failed to commit suggestion batch: {error}"))
            })?;
            Ok(())
        })
    }

    fn suggestions_by_document<'a>(
        &'a self,
        document_id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare(
                    "
                    SELECT id, document_id, document_created_at, original_text, suggested_text,
                           description, is_resolved, user_id, created_at
                    FROM suggestions
                    WHERE document_id = ?1
                    ORDER BY created_at ASC, rowid ASC
                    ",
                )
                .map_err(|error| {
                    StoreError::storage(format!("failed to prepare suggestion query: {error}"))
                })?;
            let rows = stmt
                .query_map(params![document_id.as_str()], |row| {
                    Ok::<SuggestionRow, rusqlite::Error>((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                        row.get(8)?,
                    ))
                })
                .map_err(|error| {
                    StoreError::storage(format!("failed to query suggestion rows: {error}"))
                })?;

            let mut suggestions = Vec::new();
            for row in rows {
                let (
                    id,
                    document_id,
                    document_created_at,
                    original_text,
                    suggested_text,
                    description,
                    is_resolved,
                    user_id,
                    created_at,
                ) = row.map_err(|error| {
                    StoreError::storage(format!("failed to read suggestion row: {error}"))
                })?;
                suggestions.push(Suggestion {
                    id: SuggestionId::from(id),
                    document_id: DocumentId::from(document_id),
                    document_created_at: decode_timestamp(document_created_at)?,
                    original_text,
                    suggested_text,
                    description,
                    is_resolved,
                    user_id: UserId::from(user_id),
                    created_at: decode_timestamp(created_at)?,
                });
            }
            Ok(suggestions)
        })
    }
}

fn document_from_row(row: DocumentRow) -> Result<Document, StoreError> {
    let (id, created_at, title, kind, content, user_id) = row;
    let kind = kind
        .parse::<DocumentKind>()
        .map_err(StoreError::storage)?;

    Ok(Document {
        id: DocumentId::from(id),
        created_at: decode_timestamp(created_at)?,
        title,
        kind,
        content,
        user_id: UserId::from(user_id),
    })
}

fn decode_timestamp(micros: i64) -> Result<Timestamp, StoreError> {
    time::from_micros(micros)
        .ok_or_else(|| StoreError::storage(format!("invalid stored timestamp '{micros}'")))
}

pub(crate) fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("QUIRE_DB_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".quire").join("quire.sqlite3");
    }

    PathBuf::from("quire.sqlite3")
}
