use qcommon::{BoxFuture, DocumentKind};
use qprovider::ModelHandle;
use qtooling::ToolError;

use crate::prompts::{TEXT_PROMPT, update_document_prompt};
use crate::{DocumentContext, DocumentHandler, GenerationStreamAdapter};

/// Prose generated token by token and appended.
#[derive(Debug, Clone)]
pub struct TextDocumentHandler {
    model: ModelHandle,
}

impl TextDocumentHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    async fn generate(
        &self,
        context: &DocumentContext,
        system: String,
        prompt: &str,
    ) -> Result<String, ToolError> {
        let request = self.model.request().system(system).prompt(prompt).build()?;
        let stream = self.model.stream(request).await?;

        GenerationStreamAdapter::new(&context.writer, DocumentKind::Text)
            .append_text(stream)
            .await
    }
}

impl DocumentHandler for TextDocumentHandler {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Text
    }

    fn on_create_document<'a>(
        &'a self,
        context: &'a DocumentContext,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(context, TEXT_PROMPT.to_string(), &context.title))
    }

    fn on_update_document<'a>(
        &'a self,
        context: &'a DocumentContext,
        existing_content: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(
            context,
            update_document_prompt(existing_content, DocumentKind::Text),
            description,
        ))
    }
}
