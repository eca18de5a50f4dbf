use std::future::Future;
use std::pin::Pin;

use crate::{
    BoxedEventStream, GeneratedImage, ImageRequest, ModelRequest, ModelResponse, ProviderError,
    ProviderId,
};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Language model backend.
///
/// `stream` serves every output mode of [`ModelRequest`]: text requests yield text,
/// reasoning and tool-call deltas; object requests yield partial snapshots; array
/// requests yield completed elements.
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>>;
}

/// Image generation backend. Generation is single-shot; there are no partial images.
pub trait ImageModel: Send + Sync {
    fn id(&self) -> ProviderId;

    fn generate<'a>(
        &'a self,
        request: ImageRequest,
    ) -> ProviderFuture<'a, Result<GeneratedImage, ProviderError>>;
}
