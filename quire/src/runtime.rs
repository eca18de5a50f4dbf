//! Runtime wiring: one call from a model registry to a ready chat service with
//! the document and weather tools installed.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    AuthProvider, ChatError, ChatPolicy, ChatService, ChatStore, CreateDocumentTool,
    DefaultToolRuntime, DocumentHandlerRegistry, GetWeatherTool, MetricsObservabilityHooks,
    ModelCatalog, ModelRegistry, RequestSuggestionsTool, SafeToolHooks, SafeTurnHooks,
    StaticAuthProvider, StoreConfig, SuggestionPolicy, ToolRegistry, ToolRuntimeHooks, TurnHooks,
    UpdateDocumentTool, create_store,
};

#[derive(Clone)]
pub struct RuntimeBundle {
    pub models: Arc<ModelRegistry>,
    pub store: Arc<dyn ChatStore>,
    pub handlers: Arc<DocumentHandlerRegistry>,
    pub tools: Arc<ToolRegistry>,
    pub chat: ChatService,
}

pub struct RuntimeBuilder {
    models: ModelRegistry,
    catalog: ModelCatalog,
    store: Option<Arc<dyn ChatStore>>,
    store_config: StoreConfig,
    auth: Arc<dyn AuthProvider>,
    policy: ChatPolicy,
    suggestion_policy: SuggestionPolicy,
    weather: Option<GetWeatherTool>,
    tool_timeout: Option<Duration>,
    turn_hooks: Arc<dyn TurnHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
}

impl RuntimeBuilder {
    pub fn new(models: ModelRegistry) -> Self {
        Self {
            models,
            catalog: ModelCatalog::default(),
            store: None,
            store_config: StoreConfig::InMemory,
            auth: Arc::new(StaticAuthProvider::anonymous()),
            policy: ChatPolicy::default(),
            suggestion_policy: SuggestionPolicy::default(),
            weather: Some(GetWeatherTool::default()),
            tool_timeout: None,
            turn_hooks: Arc::new(SafeTurnHooks::new(MetricsObservabilityHooks)),
            tool_hooks: Arc::new(SafeToolHooks::new(MetricsObservabilityHooks)),
        }
    }

    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Uses an already opened store; takes precedence over [`Self::store_config`].
    pub fn store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn store_config(mut self, store_config: StoreConfig) -> Self {
        self.store_config = store_config;
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn suggestion_policy(mut self, suggestion_policy: SuggestionPolicy) -> Self {
        self.suggestion_policy = suggestion_policy;
        self
    }

    pub fn weather_tool(mut self, weather: GetWeatherTool) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn without_weather_tool(mut self) -> Self {
        self.weather = None;
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    pub fn turn_hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.turn_hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    /// Validates the catalog against the registry before anything is opened.
    pub fn build(self) -> Result<RuntimeBundle, ChatError> {
        self.catalog.validate(&self.models)?;

        let store = match self.store {
            Some(store) => store,
            None => create_store(self.store_config)?,
        };

        let handlers = Arc::new(DocumentHandlerRegistry::with_default_handlers(
            &self.models,
            &self.catalog.artifact_model,
            &self.catalog.image_model,
        )?);
        let artifact_model = self
            .models
            .language_model(&self.catalog.artifact_model)
            .ok_or_else(|| {
                ChatError::configuration(format!(
                    "artifact model '{}' is not registered",
                    self.catalog.artifact_model
                ))
            })?;

        let mut tools = ToolRegistry::new();
        tools.register(CreateDocumentTool::new(
            Arc::clone(&handlers),
            Arc::clone(&store),
        ));
        tools.register(UpdateDocumentTool::new(
            Arc::clone(&handlers),
            Arc::clone(&store),
        ));
        tools.register(
            RequestSuggestionsTool::new(artifact_model, Arc::clone(&store))
                .with_policy(self.suggestion_policy),
        );
        if let Some(weather) = self.weather {
            tools.register(weather);
        }
        let tools = Arc::new(tools);

        let mut tool_runtime =
            DefaultToolRuntime::new(Arc::clone(&tools)).with_hooks(self.tool_hooks);
        if let Some(timeout) = self.tool_timeout {
            tool_runtime = tool_runtime.with_timeout(timeout);
        }

        let models = Arc::new(self.models);
        let chat = ChatService::builder(Arc::clone(&models))
            .catalog(self.catalog)
            .store(Arc::clone(&store))
            .auth(self.auth)
            .tool_runtime(Arc::new(tool_runtime))
            .hooks(self.turn_hooks)
            .policy(self.policy)
            .build()?;

        tracing::info!(
            phase = "runtime",
            event = "built",
            tools = tools.len(),
            max_steps = chat.policy().max_steps
        );

        Ok(RuntimeBundle {
            models,
            store,
            handlers,
            tools,
            chat,
        })
    }
}

/// In-memory runtime with default catalog, policy and tools.
pub fn build_runtime(
    models: ModelRegistry,
    auth: Arc<dyn AuthProvider>,
) -> Result<RuntimeBundle, ChatError> {
    RuntimeBuilder::new(models).auth(auth).build()
}
