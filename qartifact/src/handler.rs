//! Document handler capability shared by every document kind.

use qcommon::{BoxFuture, DocumentId, DocumentKind, UserId};
use qstream::DataStreamWriter;
use qtooling::ToolError;

/// Explicit identity and sink handed to a handler call.
///
/// Handlers attribute everything they emit to this context and never read
/// ambient state.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub document_id: DocumentId,
    pub kind: DocumentKind,
    pub title: String,
    pub user_id: UserId,
    pub writer: DataStreamWriter,
}

impl DocumentContext {
    pub fn new(
        document_id: DocumentId,
        kind: DocumentKind,
        title: impl Into<String>,
        user_id: UserId,
        writer: DataStreamWriter,
    ) -> Self {
        Self {
            document_id,
            kind,
            title: title.into(),
            user_id,
            writer,
        }
    }
}

/// Kind-specific generation strategy.
///
/// Both operations stream `<kind>-delta` events through the context writer and
/// return the final document content. Framing events (`kind`, `id`, `title`,
/// `clear`, `finish`) belong to the calling tool, not the handler.
pub trait DocumentHandler: Send + Sync {
    fn kind(&self) -> DocumentKind;

    fn on_create_document<'a>(
        &'a self,
        context: &'a DocumentContext,
    ) -> BoxFuture<'a, Result<String, ToolError>>;

    fn on_update_document<'a>(
        &'a self,
        context: &'a DocumentContext,
        existing_content: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, Result<String, ToolError>>;
}
