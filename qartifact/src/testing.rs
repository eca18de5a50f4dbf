//! Scripted backends and channel helpers for unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use qcommon::{DocumentId, DocumentKind, UserId};
use qprovider::{
    BoxedEventStream, GeneratedImage, ImageHandle, ImageModel, ImageRequest, ModelHandle,
    ModelProvider, ModelRegistry, ModelRequest, ModelResponse, ProviderError, ProviderFuture,
    ProviderId, StreamEvent, VecEventStream,
};
use qstream::{DataEvent, DataStreamReader, channel};
use qtooling::{Tool, ToolError, ToolExecutionContext};

use crate::DocumentContext;

type Script = Vec<Result<StreamEvent, ProviderError>>;

#[derive(Clone, Default)]
pub(crate) struct ScriptedProvider {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    pub(crate) fn new(scripts: Vec<Vec<StreamEvent>>) -> Self {
        Self::with_results(
            scripts
                .into_iter()
                .map(|events| events.into_iter().map(Ok).collect())
                .collect(),
        )
    }

    pub(crate) fn with_results(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            requests: Arc::default(),
        }
    }

    pub(crate) fn handle(&self, alias: &str) -> ModelHandle {
        ModelHandle::new(alias, alias, Arc::new(self.clone()))
    }

    pub(crate) fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn complete<'a>(
        &'a self,
        _request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move { Err(ProviderError::other("completion is not scripted")) })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            let script = self
                .scripts
                .lock()
                .expect("scripts lock")
                .pop_front()
                .unwrap_or_default();
            Ok(Box::pin(VecEventStream::new(script)) as BoxedEventStream<'a>)
        })
    }
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedImageModel {
    calls: Arc<AtomicUsize>,
}

impl ScriptedImageModel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn handle(&self, alias: &str) -> ImageHandle {
        let mut registry = ModelRegistry::new();
        registry.register_image_model(alias, alias, Arc::new(self.clone()));
        registry.image_model(alias).expect("image alias registered")
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageModel for ScriptedImageModel {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn generate<'a>(
        &'a self,
        request: ImageRequest,
    ) -> ProviderFuture<'a, Result<GeneratedImage, ProviderError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GeneratedImage {
                base64: format!("b64:{}", request.prompt),
                media_type: "image/png".to_string(),
            })
        })
    }
}

pub(crate) async fn data_events(reader: DataStreamReader) -> Vec<DataEvent> {
    reader
        .filter_map(|part| async move { part.part.as_data().cloned() })
        .collect()
        .await
}

pub(crate) async fn run_handler<F, Fut>(
    kind: DocumentKind,
    title: &str,
    run: F,
) -> (Result<String, ToolError>, Vec<DataEvent>)
where
    F: FnOnce(DocumentContext) -> Fut,
    Fut: Future<Output = Result<String, ToolError>>,
{
    let (writer, reader) = channel();
    let context = DocumentContext::new(
        DocumentId::new("doc-1"),
        kind,
        title,
        UserId::new("user-1"),
        writer,
    );
    tokio::join!(run(context), data_events(reader))
}

pub(crate) async fn run_tool(
    tool: &dyn Tool,
    args: &str,
) -> (Result<String, ToolError>, Vec<DataEvent>) {
    let (writer, reader) = channel();
    let producer = async move {
        let context = ToolExecutionContext::new("user-1", "chat-1", writer);
        tool.invoke(args, &context).await
    };
    tokio::join!(producer, data_events(reader))
}
