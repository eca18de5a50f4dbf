//! Model registry mapping deployment aliases to concrete backends.
//!
//! Aliases such as `chat-model-claude` or `artifact-model` are what the rest of the
//! workspace speaks; the registry resolves them to a backend plus its upstream
//! model name.
//!
//! ```rust
//! use qprovider::ModelRegistry;
//!
//! let registry = ModelRegistry::new();
//! assert!(registry.is_empty());
//! assert!(registry.language_model("chat-model-openai").is_none());
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use qcommon::Registry;

use crate::{
    BoxedEventStream, GeneratedImage, ImageModel, ImageRequest, ModelProvider, ModelRequest,
    ModelRequestBuilder, ModelResponse, ProviderError, ProviderId,
};

/// An opaque, read-only reference to a resolved language backend.
///
/// Cloning is cheap; a handle is shared across all steps of a turn.
#[derive(Clone)]
pub struct ModelHandle {
    alias: String,
    upstream_model: String,
    provider: Arc<dyn ModelProvider>,
}

impl ModelHandle {
    pub fn new(
        alias: impl Into<String>,
        upstream_model: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        Self {
            alias: alias.into(),
            upstream_model: upstream_model.into(),
            provider,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn upstream_model(&self) -> &str {
        &self.upstream_model
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    /// Starts a request already addressed to this handle's upstream model.
    pub fn request(&self) -> ModelRequestBuilder {
        ModelRequest::builder(self.upstream_model.clone())
    }

    pub async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        self.provider
            .complete(request)
            .await
            .map_err(|error| error.for_model(&self.alias))
    }

    pub async fn stream(
        &self,
        request: ModelRequest,
    ) -> Result<BoxedEventStream<'_>, ProviderError> {
        self.provider
            .stream(request)
            .await
            .map_err(|error| error.for_model(&self.alias))
    }
}

impl Debug for ModelHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("alias", &self.alias)
            .field("upstream_model", &self.upstream_model)
            .field("provider", &self.provider.id())
            .finish()
    }
}

#[derive(Clone)]
pub struct ImageHandle {
    alias: String,
    upstream_model: String,
    model: Arc<dyn ImageModel>,
}

impl ImageHandle {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub async fn generate(
        &self,
        prompt: impl Into<String>,
    ) -> Result<GeneratedImage, ProviderError> {
        let request = ImageRequest::new(self.upstream_model.clone(), prompt);
        request
            .validate()
            .map_err(|error| error.for_model(&self.alias))?;
        self.model
            .generate(request)
            .await
            .map_err(|error| error.for_model(&self.alias))
    }
}

impl Debug for ImageHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("alias", &self.alias)
            .field("upstream_model", &self.upstream_model)
            .field("provider", &self.model.id())
            .finish()
    }
}

#[derive(Default, Clone)]
pub struct ModelRegistry {
    language_models: Registry<String, ModelHandle>,
    image_models: Registry<String, ImageHandle>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_language_model(
        &mut self,
        alias: impl Into<String>,
        upstream_model: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
    ) {
        let alias = alias.into();
        let handle = ModelHandle::new(alias.clone(), upstream_model, provider);
        self.language_models.insert(alias, handle);
    }

    pub fn register_image_model(
        &mut self,
        alias: impl Into<String>,
        upstream_model: impl Into<String>,
        model: Arc<dyn ImageModel>,
    ) {
        let alias = alias.into();
        self.image_models.insert(
            alias.clone(),
            ImageHandle {
                alias,
                upstream_model: upstream_model.into(),
                model,
            },
        );
    }

    pub fn language_model(&self, alias: &str) -> Option<ModelHandle> {
        self.language_models.get(alias).cloned()
    }

    pub fn image_model(&self, alias: &str) -> Option<ImageHandle> {
        self.image_models.get(alias).cloned()
    }

    pub fn contains_language_model(&self, alias: &str) -> bool {
        self.language_models.contains_key(alias)
    }

    pub fn language_model_aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.language_models.keys().cloned().collect();
        aliases.sort();
        aliases
    }

    pub fn len(&self) -> usize {
        self.language_models.len() + self.image_models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.language_models.is_empty() && self.image_models.is_empty()
    }
}
