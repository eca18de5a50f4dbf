//! Scripted model backend and recording store for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::{StreamExt, stream};
use qcommon::{BoxFuture, ChatId, DocumentId, Timestamp, UserId};
use qprovider::{
    BoxedEventStream, Message, ModelProvider, ModelRegistry, ModelRequest, ModelResponse,
    OutputItem, ProviderError, ProviderFuture, ProviderId, Role, StopReason, StreamEvent,
    TokenUsage,
};
use qstore::{Chat, ChatStore, Document, InMemoryChatStore, StoreError, StoredMessage, Suggestion};

use crate::ModelCatalog;

#[derive(Debug, Clone)]
pub(crate) struct Script {
    events: Vec<Result<StreamEvent, ProviderError>>,
    stall: bool,
}

impl Script {
    pub(crate) fn events(events: Vec<StreamEvent>) -> Self {
        Self::results(events.into_iter().map(Ok).collect())
    }

    pub(crate) fn results(events: Vec<Result<StreamEvent, ProviderError>>) -> Self {
        Self {
            events,
            stall: false,
        }
    }

    /// Yields `events`, then never ends.
    pub(crate) fn stalled(events: Vec<StreamEvent>) -> Self {
        Self {
            stall: true,
            ..Self::events(events)
        }
    }
}

#[derive(Default)]
struct ProviderState {
    scripts: VecDeque<Script>,
    last: Option<Script>,
    repeat_last: bool,
    requests: Vec<ModelRequest>,
    completion: Option<String>,
}

/// Streams one script per request, in order.
#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl ScriptedProvider {
    pub(crate) fn new(scripts: Vec<Vec<StreamEvent>>) -> Self {
        let provider = Self::default();
        for events in scripts {
            provider.push(Script::events(events));
        }
        provider
    }

    pub(crate) fn then(self, script: Script) -> Self {
        self.push(script);
        self
    }

    /// Once the queue is empty, every request replays the last script.
    pub(crate) fn repeat_last(self) -> Self {
        self.state.lock().expect("state lock").repeat_last = true;
        self
    }

    pub(crate) fn with_completion(self, text: impl Into<String>) -> Self {
        self.state.lock().expect("state lock").completion = Some(text.into());
        self
    }

    /// Stream requests only; completions are not recorded.
    pub(crate) fn requests(&self) -> Vec<ModelRequest> {
        self.state.lock().expect("state lock").requests.clone()
    }

    fn push(&self, script: Script) {
        self.state
            .lock()
            .expect("state lock")
            .scripts
            .push_back(script);
    }

    fn next_script(&self, request: ModelRequest) -> Script {
        let mut state = self.state.lock().expect("state lock");
        state.requests.push(request);
        match state.scripts.pop_front() {
            Some(script) => {
                state.last = Some(script.clone());
                script
            }
            None if state.repeat_last => state.last.clone().unwrap_or(Script::events(Vec::new())),
            None => Script::events(Vec::new()),
        }
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let completion = self.state.lock().expect("state lock").completion.clone();
            let text = completion.ok_or_else(|| ProviderError::other("completion not scripted"))?;
            Ok(ModelResponse {
                provider: ProviderId::OpenAi,
                model: request.model,
                output: vec![OutputItem::Message(Message::new(Role::Assistant, text))],
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let script = self.next_script(request);
            let events = stream::iter(script.events);
            if script.stall {
                Ok(Box::pin(events.chain(stream::pending())) as BoxedEventStream<'a>)
            } else {
                Ok(Box::pin(events) as BoxedEventStream<'a>)
            }
        })
    }
}

/// Every catalog model, plus title and artifact aliases, served by `provider`
/// under the upstream name `upstream-<alias>`.
pub(crate) fn registry_with(provider: ScriptedProvider) -> ModelRegistry {
    let catalog = ModelCatalog::default();
    let provider = Arc::new(provider);
    let mut registry = ModelRegistry::new();
    let aliases = catalog
        .chat_models
        .iter()
        .chain([&catalog.title_model, &catalog.artifact_model]);
    for alias in aliases {
        registry.register_language_model(
            alias.clone(),
            format!("upstream-{alias}"),
            provider.clone(),
        );
    }
    registry
}

#[derive(Default)]
struct StoreLog {
    message_batches: Vec<Vec<StoredMessage>>,
    writes: usize,
    failed_writes: usize,
}

/// In-memory store that records message batches and can refuse assistant writes.
#[derive(Default)]
pub(crate) struct RecordingStore {
    inner: InMemoryChatStore,
    log: Mutex<StoreLog>,
    fail_responses: bool,
}

impl RecordingStore {
    pub(crate) fn failing_responses(mut self) -> Self {
        self.fail_responses = true;
        self
    }

    /// Successfully saved message batches, in call order.
    pub(crate) fn message_batches(&self) -> Vec<Vec<StoredMessage>> {
        self.log.lock().expect("log lock").message_batches.clone()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.log.lock().expect("log lock").writes
    }

    pub(crate) fn failed_writes(&self) -> usize {
        self.log.lock().expect("log lock").failed_writes
    }

    fn record_write(&self) {
        self.log.lock().expect("log lock").writes += 1;
    }
}

impl ChatStore for RecordingStore {
    fn get_chat<'a>(&'a self, id: &'a ChatId) -> BoxFuture<'a, Result<Option<Chat>, StoreError>> {
        self.inner.get_chat(id)
    }

    fn save_chat<'a>(&'a self, chat: Chat) -> BoxFuture<'a, Result<(), StoreError>> {
        self.record_write();
        self.inner.save_chat(chat)
    }

    fn chats_by_user<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Chat>, StoreError>> {
        self.inner.chats_by_user(user_id)
    }

    fn delete_chat<'a>(
        &'a self,
        id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Option<Chat>, StoreError>> {
        self.record_write();
        self.inner.delete_chat(id)
    }

    fn save_messages<'a>(
        &'a self,
        messages: Vec<StoredMessage>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.record_write();
            let is_response = messages.iter().any(|message| message.role() != Role::User);
            if self.fail_responses && is_response {
                self.log.lock().expect("log lock").failed_writes += 1;
                return Err(StoreError::storage("disk full"));
            }

            self.inner.save_messages(messages.clone()).await?;
            self.log
                .lock()
                .expect("log lock")
                .message_batches
                .push(messages);
            Ok(())
        })
    }

    fn messages_by_chat<'a>(
        &'a self,
        chat_id: &'a ChatId,
    ) -> BoxFuture<'a, Result<Vec<StoredMessage>, StoreError>> {
        self.inner.messages_by_chat(chat_id)
    }

    fn get_document<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Option<Document>, StoreError>> {
        self.inner.get_document(id)
    }

    fn documents_by_id<'a>(
        &'a self,
        id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Document>, StoreError>> {
        self.inner.documents_by_id(id)
    }

    fn save_document<'a>(&'a self, document: Document) -> BoxFuture<'a, Result<(), StoreError>> {
        self.record_write();
        self.inner.save_document(document)
    }

    fn delete_documents_after<'a>(
        &'a self,
        id: &'a DocumentId,
        timestamp: Timestamp,
    ) -> BoxFuture<'a, Result<usize, StoreError>> {
        self.record_write();
        self.inner.delete_documents_after(id, timestamp)
    }

    fn save_suggestions<'a>(
        &'a self,
        suggestions: Vec<Suggestion>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        self.record_write();
        self.inner.save_suggestions(suggestions)
    }

    fn suggestions_by_document<'a>(
        &'a self,
        document_id: &'a DocumentId,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, StoreError>> {
        self.inner.suggestions_by_document(document_id)
    }
}
