//! Common `qprovider` imports for downstream crates.

pub use crate::{
    Attachment, BoxedEventStream, ImageModel, Message, ModelEventStream, ModelHandle,
    ModelProvider, ModelRegistry, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem,
    OutputMode, ProviderError, ProviderErrorKind, ProviderId, Role, StopReason, StreamEvent,
    TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
pub use qcommon::{BoxFuture, MetadataMap};
