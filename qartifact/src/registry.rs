//! Handler lookup keyed by document kind.

use std::sync::Arc;

use qcommon::{DocumentKind, Registry};
use qprovider::ModelRegistry;
use qtooling::ToolError;

use crate::DocumentHandler;
use crate::handlers::{
    CodeDocumentHandler, ImageDocumentHandler, SheetDocumentHandler, TextDocumentHandler,
};

#[derive(Default, Clone)]
pub struct DocumentHandlerRegistry {
    handlers: Registry<DocumentKind, Arc<dyn DocumentHandler>>,
}

impl DocumentHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the four built-in handlers against the given model aliases.
    ///
    /// Fails with a configuration error when either alias is not registered.
    pub fn with_default_handlers(
        models: &ModelRegistry,
        artifact_model: &str,
        image_model: &str,
    ) -> Result<Self, ToolError> {
        let language = models.language_model(artifact_model).ok_or_else(|| {
            ToolError::configuration(format!("unknown artifact model '{artifact_model}'"))
        })?;
        let image = models.image_model(image_model).ok_or_else(|| {
            ToolError::configuration(format!("unknown image model '{image_model}'"))
        })?;

        let mut registry = Self::new();
        registry.register(TextDocumentHandler::new(language.clone()));
        registry.register(CodeDocumentHandler::new(language.clone()));
        registry.register(SheetDocumentHandler::new(language));
        registry.register(ImageDocumentHandler::new(image));
        Ok(registry)
    }

    /// Registers `handler` under its own kind, replacing any previous one.
    pub fn register<H>(&mut self, handler: H)
    where
        H: DocumentHandler + 'static,
    {
        self.register_shared(Arc::new(handler));
    }

    pub fn register_shared(&mut self, handler: Arc<dyn DocumentHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn get(&self, kind: DocumentKind) -> Result<Arc<dyn DocumentHandler>, ToolError> {
        self.handlers
            .get(&kind)
            .cloned()
            .ok_or_else(|| ToolError::configuration(format!("No handler for kind: {kind}")))
    }

    pub fn kinds(&self) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .into_iter()
            .filter(|kind| self.handlers.contains_key(kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
