use qcommon::{BoxFuture, DocumentKind};
use qprovider::ImageHandle;
use qtooling::ToolError;

use crate::{DocumentContext, DocumentHandler, GenerationStreamAdapter};

/// Single-shot image generation: one call, one delta with the full payload.
#[derive(Debug, Clone)]
pub struct ImageDocumentHandler {
    model: ImageHandle,
}

impl ImageDocumentHandler {
    pub fn new(model: ImageHandle) -> Self {
        Self { model }
    }

    async fn generate(&self, context: &DocumentContext, prompt: &str) -> Result<String, ToolError> {
        let image = self.model.generate(prompt).await?;

        GenerationStreamAdapter::new(&context.writer, DocumentKind::Image)
            .emit(image.base64.clone())
            .await?;

        Ok(image.base64)
    }
}

impl DocumentHandler for ImageDocumentHandler {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Image
    }

    fn on_create_document<'a>(
        &'a self,
        context: &'a DocumentContext,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(context, &context.title))
    }

    fn on_update_document<'a>(
        &'a self,
        context: &'a DocumentContext,
        _existing_content: &'a str,
        description: &'a str,
    ) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(self.generate(context, description))
    }
}
