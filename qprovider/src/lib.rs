//! Model backend contracts: language model streams (text, object, array) and
//! single-shot image generation, plus the alias registry that resolves
//! deployment model names to backends.

mod error;
mod model;
mod provider;
mod registry;
mod stream;

pub mod prelude;

pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    ALLOWED_ATTACHMENT_TYPES, Attachment, GeneratedImage, ImageRequest, MAX_ATTACHMENT_BYTES,
    Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem, OutputMode, ProviderId,
    Role, StopReason, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
pub use provider::{ImageModel, ModelProvider, ProviderFuture};
pub use registry::{ImageHandle, ModelHandle, ModelRegistry};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};
