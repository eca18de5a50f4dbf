//! Content-aware model routing.
//!
//! The classifier reduces a conversation to an [`AttachmentSignal`]; the selector
//! maps `(requested model, signal)` to the model that serves the turn. Selection
//! is pure: it reads only its arguments.
//!
//! ```rust
//! use qchat::{AttachmentSignal, ModelCatalog, select_model};
//!
//! let catalog = ModelCatalog::default();
//! let signal = AttachmentSignal { has_pdf: true, has_image: false };
//!
//! let selected = select_model("chat-model-gemini", signal, &catalog).unwrap();
//! assert_eq!(selected, "chat-model-claude");
//!
//! let reasoning = select_model("chat-model-reasoning", signal, &catalog).unwrap();
//! assert_eq!(reasoning, "chat-model-reasoning");
//! ```

use qprovider::{Message, ModelRegistry};

use crate::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttachmentSignal {
    pub has_pdf: bool,
    pub has_image: bool,
}

impl AttachmentSignal {
    /// Scans every attachment of every message in the conversation.
    pub fn from_messages(messages: &[Message]) -> Self {
        let attachments = messages.iter().flat_map(|message| &message.attachments);

        let mut signal = Self::default();
        for attachment in attachments {
            signal.has_pdf |= attachment.is_pdf();
            signal.has_image |= attachment.is_image();
        }
        signal
    }
}

/// Deployment model ids and the roles they play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub chat_models: Vec<String>,
    pub default_chat_model: String,
    /// Answers directly; never sees tools and is never rerouted.
    pub reasoning_model: String,
    /// Preferred when any attachment is a PDF.
    pub document_model: String,
    /// Fallback for image attachments when the requested model cannot take them.
    pub image_capable_model: String,
    pub title_model: String,
    pub artifact_model: String,
    pub image_model: String,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            chat_models: [
                "chat-model-openai",
                "chat-model-gemini",
                "chat-model-claude",
                "chat-model-groq",
                "chat-model-mistral",
                "chat-model-perplexity",
                "chat-model-reasoning",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            default_chat_model: "chat-model-openai".to_string(),
            reasoning_model: "chat-model-reasoning".to_string(),
            document_model: "chat-model-claude".to_string(),
            image_capable_model: "chat-model-openai".to_string(),
            title_model: "title-model".to_string(),
            artifact_model: "artifact-model".to_string(),
            image_model: "small-model".to_string(),
        }
    }
}

impl ModelCatalog {
    pub fn with_chat_model(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.is_chat_model(&id) {
            self.chat_models.push(id);
        }
        self
    }

    pub fn with_reasoning_model(mut self, id: impl Into<String>) -> Self {
        self.reasoning_model = id.into();
        self
    }

    pub fn with_document_model(mut self, id: impl Into<String>) -> Self {
        self.document_model = id.into();
        self
    }

    pub fn with_image_capable_model(mut self, id: impl Into<String>) -> Self {
        self.image_capable_model = id.into();
        self
    }

    pub fn is_chat_model(&self, id: &str) -> bool {
        self.chat_models.iter().any(|model| model == id)
    }

    pub fn is_reasoning_model(&self, id: &str) -> bool {
        self.reasoning_model == id
    }

    /// Every routed and auxiliary language model must resolve in `registry`.
    pub fn validate(&self, registry: &ModelRegistry) -> Result<(), ChatError> {
        let routed = [
            &self.reasoning_model,
            &self.document_model,
            &self.image_capable_model,
        ];
        for id in routed {
            if !self.is_chat_model(id) {
                return Err(ChatError::configuration(format!(
                    "routing target '{id}' is not a chat model"
                )));
            }
        }

        let language_models = self
            .chat_models
            .iter()
            .chain([&self.title_model, &self.artifact_model]);
        for id in language_models {
            if !registry.contains_language_model(id) {
                return Err(ChatError::configuration(format!(
                    "language model '{id}' is not registered"
                )));
            }
        }

        if registry.image_model(&self.image_model).is_none() {
            return Err(ChatError::configuration(format!(
                "image model '{}' is not registered",
                self.image_model
            )));
        }

        Ok(())
    }
}

/// Picks the model for one turn. First match wins:
///
/// 1. the reasoning model is returned verbatim, whatever is attached;
/// 2. any PDF routes to the document model;
/// 3. any image keeps the requested model (the image-capable model if the
///    request was the reasoning model);
/// 4. otherwise the requested model.
///
/// An id outside the catalog is a configuration error.
pub fn select_model<'c>(
    requested: &str,
    signal: AttachmentSignal,
    catalog: &'c ModelCatalog,
) -> Result<&'c str, ChatError> {
    let Some(requested) = catalog.chat_models.iter().find(|model| *model == requested) else {
        return Err(ChatError::configuration(format!(
            "unknown chat model: '{requested}'"
        )));
    };

    if catalog.is_reasoning_model(requested) {
        return Ok(requested);
    }

    if signal.has_pdf {
        return Ok(&catalog.document_model);
    }

    if signal.has_image && catalog.is_reasoning_model(requested) {
        return Ok(&catalog.image_capable_model);
    }

    Ok(requested)
}
