use qcommon::{BoxFuture, DocumentKind};
use qprovider::ModelHandle;
use qtooling::ToolError;

use crate::prompts::{SHEET_PROMPT, SHEET_SCHEMA, update_document_prompt};
use crate::{DocumentContext, DocumentHandler, GenerationStreamAdapter};

const CSV_FIELD: &str = "csv";

/// CSV regenerated per increment like code.
///
/// Creation re-emits the final draft once after the stream ends so the client
/// always receives a terminal full-content delta. Clients treat the repeat as an
/// idempotent overwrite.
#[derive(Debug, Clone)]
pub struct SheetDocumentHandler {
    model: ModelHandle,
}

impl SheetDocumentHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    async fn generate(
        &self,
        context: &DocumentContext,
        system: String,
        prompt: &str,
        terminal_emit: bool,
    ) -> Result<String, ToolError> {
        let request = self
            .model
            .request()
            .system(system)
            .prompt(prompt)
            .object_output(SHEET_SCHEMA)
            .build()?;
        let stream = self.model.stream(request).await?;

        let adapter = GenerationStreamAdapter::new(&context.writer, DocumentKind::Sheet);
        let draft = adapter.replace_with_field(stream, CSV_FIELD).await?;
        if terminal_emit {
            adapter.emit(draft.clone()).await?;
        }

        Ok(draft)
    }
}

impl DocumentHandler for SheetDocumentHandler {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Sheet
    }

    fn on_create_document<'a>(
        &'a self,
        context: &'a DocumentContext,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(context, SHEET_PROMPT.to_string(), &context.title, true))
    }

    fn on_update_document<'a>(
        &'a self,
        context: &'a DocumentContext,
        existing_content: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(
            context,
            update_document_prompt(existing_content, DocumentKind::Sheet),
            description,
            false,
        ))
    }
}

#[cfg(test)]
mod tests {
    use qprovider::StreamEvent;
    use qstream::DataEvent;
    use serde_json::json;

    use super::*;
    use crate::testing::{ScriptedProvider, run_handler};

    #[tokio::test]
    async fn create_re_emits_last_non_empty_value_after_trailing_empty_increment() {
        let provider = ScriptedProvider::new(vec![vec![
            StreamEvent::PartialObject(json!({ "csv": "a,b" })),
            StreamEvent::PartialObject(json!({ "csv": "a,b\n1,2" })),
            StreamEvent::PartialObject(json!({ "csv": "" })),
        ]]);
        let handler = SheetDocumentHandler::new(provider.handle("artifact-model"));

        let (content, events) =
            run_handler(DocumentKind::Sheet, "Budget", |context| async move {
                handler.on_create_document(&context).await
            })
            .await;

        assert_eq!(content.expect("generation should succeed"), "a,b\n1,2");
        assert_eq!(
            events,
            vec![
                DataEvent::SheetDelta("a,b".to_string()),
                DataEvent::SheetDelta("a,b\n1,2".to_string()),
                DataEvent::SheetDelta("a,b\n1,2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn update_does_not_repeat_terminal_delta() {
        let provider =
            ScriptedProvider::new(vec![vec![StreamEvent::PartialObject(json!({ "csv": "x" }))]]);
        let handler = SheetDocumentHandler::new(provider.handle("artifact-model"));

        let (content, events) =
            run_handler(DocumentKind::Sheet, "Budget", |context| async move {
                handler.on_update_document(&context, "a,b", "shorter").await
            })
            .await;

        assert_eq!(content.expect("update should succeed"), "x");
        assert_eq!(events, vec![DataEvent::SheetDelta("x".to_string())]);
    }
}
