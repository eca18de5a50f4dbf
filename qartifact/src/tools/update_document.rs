use std::sync::Arc;

use qcommon::DocumentId;
use qprovider::ToolDefinition;
use qstore::{ChatStore, Document};
use qstream::DataEvent;
use qtooling::{Tool, ToolError, ToolExecutionContext, ToolFuture, parse_args};
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;

use super::{UPDATE_DOCUMENT, document_not_found, read_failed};
use crate::{DocumentContext, DocumentHandlerRegistry};

#[derive(Debug, Deserialize)]
struct UpdateDocumentArgs {
    id: DocumentId,
    description: String,
}

/// Revises the latest version of a document and saves the result as a new version.
pub struct UpdateDocumentTool {
    handlers: Arc<DocumentHandlerRegistry>,
    store: Arc<dyn ChatStore>,
}

impl UpdateDocumentTool {
    pub fn new(handlers: Arc<DocumentHandlerRegistry>, store: Arc<dyn ChatStore>) -> Self {
        Self { handlers, store }
    }

    async fn update(
        &self,
        args: UpdateDocumentArgs,
        context: &ToolExecutionContext,
    ) -> Result<String, ToolError> {
        let Some(existing) = self.store.get_document(&args.id).await.map_err(read_failed)? else {
            return Ok(document_not_found());
        };

        let handler = self.handlers.get(existing.kind)?;
        let writer = &context.writer;
        writer.write_data(DataEvent::Clear).await?;

        let document_context = DocumentContext::new(
            existing.id.clone(),
            existing.kind,
            existing.title.clone(),
            context.user_id.clone(),
            writer.clone(),
        );
        let span = tracing::info_span!(
            "document.update",
            document_id = %existing.id,
            document_kind = %existing.kind,
            user_id = %context.user_id,
        );
        let content = handler
            .on_update_document(
                &document_context,
                existing.content.as_deref().unwrap_or_default(),
                &args.description,
            )
            .instrument(span)
            .await?;

        writer.write_data(DataEvent::Finish).await?;

        let revised = Document::new_version(
            existing.id.clone(),
            existing.kind,
            existing.title.clone(),
            content,
            context.user_id.clone(),
        );
        if let Err(error) = self.store.save_document(revised).await {
            tracing::warn!(
                phase = "document",
                event = "save_failed",
                document_id = %existing.id,
                error = %error,
            );
        }

        Ok(json!({
            "id": existing.id,
            "title": existing.title,
            "kind": existing.kind,
            "content": "The document has been updated successfully.",
        })
        .to_string())
    }
}

impl Tool for UpdateDocumentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: UPDATE_DOCUMENT.to_string(),
            description: "Update a document with the given description.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "The ID of the document to update" },
                    "description": {
                        "type": "string",
                        "description": "The description of changes that need to be made",
                    },
                },
                "required": ["id", "description"],
            })
            .to_string(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_args::<UpdateDocumentArgs>(args_json)?;
            self.update(args, context).await
        })
    }
}

#[cfg(test)]
mod tests {
    use qcommon::{DocumentKind, UserId, time};
    use qprovider::StreamEvent;
    use qstore::InMemoryChatStore;
    use serde_json::Value;

    use super::*;
    use crate::handlers::TextDocumentHandler;
    use crate::testing::{ScriptedProvider, run_tool};

    fn tool(provider: &ScriptedProvider, store: Arc<InMemoryChatStore>) -> UpdateDocumentTool {
        let mut handlers = DocumentHandlerRegistry::new();
        handlers.register(TextDocumentHandler::new(provider.handle("artifact-model")));
        UpdateDocumentTool::new(Arc::new(handlers), store)
    }

    #[tokio::test]
    async fn missing_document_is_a_structured_result() {
        let store = Arc::new(InMemoryChatStore::new());
        let tool = tool(&ScriptedProvider::default(), store);

        let (result, events) =
            run_tool(&tool, r#"{"id":"missing","description":"shorter"}"#).await;

        let result: Value = serde_json::from_str(&result.expect("tool should not fail"))
            .expect("json result");
        assert_eq!(result, json!({ "error": "Document not found" }));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn update_clears_streams_and_saves_new_version() {
        let provider =
            ScriptedProvider::new(vec![vec![StreamEvent::TextDelta("Shorter.".to_string())]]);
        let store = Arc::new(InMemoryChatStore::new());
        let mut original = Document::new_version(
            DocumentId::new("doc-1"),
            DocumentKind::Text,
            "Intro",
            "A long introduction.",
            UserId::new("user-1"),
        );
        original.created_at = time::now() - chrono::TimeDelta::seconds(60);
        store.save_document(original.clone()).await.expect("save");
        let tool = tool(&provider, store.clone());

        let (result, events) =
            run_tool(&tool, r#"{"id":"doc-1","description":"make it shorter"}"#).await;

        assert!(result.is_ok());
        assert_eq!(
            events,
            vec![
                DataEvent::Clear,
                DataEvent::TextDelta("Shorter.".to_string()),
                DataEvent::Finish,
            ]
        );

        let versions = store
            .documents_by_id(&DocumentId::new("doc-1"))
            .await
            .expect("load");
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0], original);
        assert_eq!(versions[1].content(), Some("Shorter."));
        assert!(provider.requests()[0].messages[0]
            .content
            .contains("A long introduction."));
    }
}
