use qcommon::{BoxFuture, DocumentKind};
use qprovider::ModelHandle;
use qtooling::ToolError;

use crate::prompts::{CODE_PROMPT, CODE_SCHEMA, update_document_prompt};
use crate::{DocumentContext, DocumentHandler, GenerationStreamAdapter};

const CODE_FIELD: &str = "code";

/// Code regenerated as a whole object per increment; the latest snapshot wins.
#[derive(Debug, Clone)]
pub struct CodeDocumentHandler {
    model: ModelHandle,
}

impl CodeDocumentHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    async fn generate(
        &self,
        context: &DocumentContext,
        system: String,
        prompt: &str,
    ) -> Result<String, ToolError> {
        let request = self
            .model
            .request()
            .system(system)
            .prompt(prompt)
            .object_output(CODE_SCHEMA)
            .build()?;
        let stream = self.model.stream(request).await?;

        GenerationStreamAdapter::new(&context.writer, DocumentKind::Code)
            .replace_with_field(stream, CODE_FIELD)
            .await
    }
}

impl DocumentHandler for CodeDocumentHandler {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Code
    }

    fn on_create_document<'a>(
        &'a self,
        context: &'a DocumentContext,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(context, CODE_PROMPT.to_string(), &context.title))
    }

    fn on_update_document<'a>(
        &'a self,
        context: &'a DocumentContext,
        existing_content: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(
            context,
            update_document_prompt(existing_content, DocumentKind::Code),
            description,
        ))
    }
}
