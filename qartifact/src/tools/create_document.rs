use std::sync::Arc;

use qcommon::{DocumentId, DocumentKind};
use qprovider::ToolDefinition;
use qstore::{ChatStore, Document};
use qstream::DataEvent;
use qtooling::{Tool, ToolError, ToolExecutionContext, ToolFuture, parse_args};
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;

use super::CREATE_DOCUMENT;
use crate::{DocumentContext, DocumentHandlerRegistry};

#[derive(Debug, Deserialize)]
struct CreateDocumentArgs {
    title: String,
    kind: DocumentKind,
}

/// Creates a document and streams its generation.
///
/// Emits `kind`, `id`, `title`, `clear`, the handler's deltas, then exactly one
/// `finish`, and saves the first version once the handler returns.
pub struct CreateDocumentTool {
    handlers: Arc<DocumentHandlerRegistry>,
    store: Arc<dyn ChatStore>,
}

impl CreateDocumentTool {
    pub fn new(handlers: Arc<DocumentHandlerRegistry>, store: Arc<dyn ChatStore>) -> Self {
        Self { handlers, store }
    }

    async fn create(
        &self,
        args: CreateDocumentArgs,
        context: &ToolExecutionContext,
    ) -> Result<String, ToolError> {
        let handler = self.handlers.get(args.kind)?;
        let id = DocumentId::generate();
        let writer = &context.writer;

        writer.write_data(DataEvent::Kind(args.kind)).await?;
        writer.write_data(DataEvent::Id(id.clone())).await?;
        writer.write_data(DataEvent::Title(args.title.clone())).await?;
        writer.write_data(DataEvent::Clear).await?;

        let document_context = DocumentContext::new(
            id.clone(),
            args.kind,
            args.title.clone(),
            context.user_id.clone(),
            writer.clone(),
        );
        let span = tracing::info_span!(
            "document.create",
            document_id = %id,
            document_kind = %args.kind,
            user_id = %context.user_id,
        );
        let content = handler
            .on_create_document(&document_context)
            .instrument(span)
            .await?;

        writer.write_data(DataEvent::Finish).await?;

        let document = Document::new_version(
            id.clone(),
            args.kind,
            args.title.clone(),
            content,
            context.user_id.clone(),
        );
        if let Err(error) = self.store.save_document(document).await {
            tracing::warn!(
                phase = "document",
                event = "save_failed",
                document_id = %id,
                error = %error,
            );
        }

        Ok(json!({
            "id": id,
            "title": args.title,
            "kind": args.kind,
            "content": "A document was created and is now visible to the user.",
        })
        .to_string())
    }
}

impl Tool for CreateDocumentTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: CREATE_DOCUMENT.to_string(),
            description: "Create a document for a writing or content creation activities. \
                This tool will call other functions that will generate the contents of the \
                document based on the title and kind."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "kind": { "type": "string", "enum": ["text", "code", "sheet", "image"] },
                },
                "required": ["title", "kind"],
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
            let args = parse_args::<CreateDocumentArgs>(args_json)?;
            self.create(args, context).await
        })
    }
}

#[cfg(test)]
mod tests {
    use qprovider::StreamEvent;
    use qstore::InMemoryChatStore;
    use qtooling::ToolErrorKind;
    use serde_json::Value;

    use super::*;
    use crate::handlers::TextDocumentHandler;
    use crate::testing::{ScriptedProvider, run_tool};

    fn tool_with_text_handler(
        provider: &ScriptedProvider,
        store: Arc<InMemoryChatStore>,
    ) -> CreateDocumentTool {
        let mut handlers = DocumentHandlerRegistry::new();
        handlers.register(TextDocumentHandler::new(provider.handle("artifact-model")));
        CreateDocumentTool::new(Arc::new(handlers), store)
    }

    #[tokio::test]
    async fn intro_document_streams_framed_sequence_and_saves_content() {
        let provider = ScriptedProvider::new(vec![vec![
            StreamEvent::TextDelta("Hello".to_string()),
            StreamEvent::TextDelta(" world".to_string()),
        ]]);
        let store = Arc::new(InMemoryChatStore::new());
        let tool = tool_with_text_handler(&provider, store.clone());

        let (result, events) = run_tool(&tool, r#"{"title":"Intro","kind":"text"}"#).await;

        let result: Value =
            serde_json::from_str(&result.expect("tool should succeed")).expect("json result");
        let id = DocumentId::new(result["id"].as_str().expect("id"));
        assert_eq!(
            events,
            vec![
                DataEvent::Kind(DocumentKind::Text),
                DataEvent::Id(id.clone()),
                DataEvent::Title("Intro".to_string()),
                DataEvent::Clear,
                DataEvent::TextDelta("Hello".to_string()),
                DataEvent::TextDelta(" world".to_string()),
                DataEvent::Finish,
            ]
        );

        let saved = store.get_document(&id).await.expect("load").expect("saved");
        assert_eq!(saved.content(), Some("Hello world"));
        assert_eq!(saved.title, "Intro");
        assert_eq!(saved.user_id.as_str(), "user-1");
    }

    #[tokio::test]
    async fn unregistered_kind_fails_before_any_event() {
        let store = Arc::new(InMemoryChatStore::new());
        let tool = tool_with_text_handler(&ScriptedProvider::default(), store);

        let (result, events) = run_tool(&tool, r#"{"title":"Budget","kind":"sheet"}"#).await;

        let error = result.expect_err("sheet handler is missing");
        assert_eq!(error.kind, ToolErrorKind::Configuration);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_as_invalid_arguments() {
        let tool = tool_with_text_handler(
            &ScriptedProvider::default(),
            Arc::new(InMemoryChatStore::new()),
        );

        let (result, _) = run_tool(&tool, r#"{"title":"Deck","kind":"slides"}"#).await;

        assert_eq!(
            result.expect_err("kind is unknown").kind,
            ToolErrorKind::InvalidArguments
        );
    }

    #[tokio::test]
    async fn backend_failure_propagates_without_saving() {
        let provider = ScriptedProvider::with_results(vec![vec![
            Ok(StreamEvent::TextDelta("Hello".to_string())),
            Err(qprovider::ProviderError::unavailable("backend down")),
        ]]);
        let store = Arc::new(InMemoryChatStore::new());
        let tool = tool_with_text_handler(&provider, store.clone());

        let (result, events) = run_tool(&tool, r#"{"title":"Intro","kind":"text"}"#).await;

        assert_eq!(result.expect_err("backend failed").kind, ToolErrorKind::Execution);
        assert_eq!(events.len(), 5);
        assert!(!events.contains(&DataEvent::Finish));
        let DataEvent::Id(id) = &events[1] else {
            panic!("second event should be the document id");
        };
        assert!(store.get_document(id).await.expect("load").is_none());
    }
}
