//! Provider-agnostic request, response, and message model types.
//!
//! ```rust
//! use qprovider::{Message, ModelRequest, ProviderErrorKind, Role};
//!
//! let ok = ModelRequest::new_validated(
//!     "o3-mini",
//!     vec![Message::new(Role::User, "Write an intro paragraph")],
//! );
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::new_validated("", vec![Message::new(Role::User, "hi")])
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use qcommon::{GenerationOptions, MetadataMap};
use serde::{Deserialize, Serialize};

use crate::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenAi,
    Anthropic,
    Google,
    Groq,
    Mistral,
    Perplexity,
    OpenRouter,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Groq => "groq",
            Self::Mistral => "mistral",
            Self::Perplexity => "perplexity",
            Self::OpenRouter => "openrouter",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// Content types a user may attach to a message.
pub const ALLOWED_ATTACHMENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "application/pdf"];

pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// A user-supplied file reference. Attachments are referenced by a turn, never owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == "application/pdf"
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Upload-time check: content type must be allowed and the payload at most 10 MiB.
    pub fn validate(&self, size_bytes: u64) -> Result<(), ProviderError> {
        if size_bytes > MAX_ATTACHMENT_BYTES {
            return Err(ProviderError::invalid_request(
                "File size should be less than 10MB",
            ));
        }

        if !ALLOWED_ATTACHMENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(ProviderError::invalid_request(
                "File type should be JPEG, PNG, WebP, or PDF",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            reasoning: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
            attachments: Vec::new(),
        }
    }

    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.tool_call_id),
            ..Self::new(Role::Tool, result.output)
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Message(Message),
    ToolCall(ToolCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    Cancelled,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub provider: ProviderId,
    pub model: String,
    pub output: Vec<OutputItem>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

/// Shape of the output the backend is asked to produce.
///
/// `Object` streams successive partial snapshots of one JSON object; `Array`
/// streams each completed element of a JSON array as it closes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Object {
        schema: String,
    },
    Array {
        schema: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    pub output: OutputMode,
    pub metadata: MetadataMap,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
            tools: Vec::new(),
            output: OutputMode::Text,
            metadata: MetadataMap::new(),
        }
    }

    pub fn new_validated(
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<Self, ProviderError> {
        let request = Self::new(model, messages);
        request.validate()?;
        Ok(request)
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.options.stream = true;
        self
    }

    /// Most recent tool outputs, in the order they were appended to the context.
    pub fn tool_results(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|message| message.role == Role::Tool)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidRequest,
                "temperature must be in the inclusive range 0.0..=2.0",
                false,
            ));
        }

        if !self.tools.is_empty() && self.output != OutputMode::Text {
            return Err(ProviderError::invalid_request(
                "tools are only supported for text output",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    model: String,
    messages: Vec<Message>,
    options: GenerationOptions,
    tools: Vec<ToolDefinition>,
    output: OutputMode,
    metadata: MetadataMap,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: GenerationOptions::default(),
            tools: Vec::new(),
            output: OutputMode::Text,
            metadata: MetadataMap::new(),
        }
    }

    pub fn system(self, prompt: impl Into<String>) -> Self {
        self.message(Message::new(Role::System, prompt))
    }

    pub fn prompt(self, prompt: impl Into<String>) -> Self {
        self.message(Message::new(Role::User, prompt))
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn object_output(mut self, schema: impl Into<String>) -> Self {
        self.output = OutputMode::Object {
            schema: schema.into(),
        };
        self
    }

    pub fn array_output(mut self, schema: impl Into<String>) -> Self {
        self.output = OutputMode::Array {
            schema: schema.into(),
        };
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.options.stream = stream;
        self
    }

    pub fn enable_streaming(self) -> Self {
        self.streaming(true)
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        let request = ModelRequest {
            model: self.model,
            messages: self.messages,
            options: self.options,
            tools: self.tools,
            output: self.output,
            metadata: self.metadata,
        };

        request.validate()?;
        Ok(request)
    }
}

/// Single-shot image generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub count: u32,
}

impl ImageRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            count: 1,
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.prompt.trim().is_empty() {
            return Err(ProviderError::invalid_request("image prompt must not be empty"));
        }

        if self.count == 0 {
            return Err(ProviderError::invalid_request(
                "image count must be greater than zero",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub base64: String,
    pub media_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_system_and_prompt_messages() {
        let request = ModelRequest::builder("o3-mini")
            .system("be terse")
            .prompt("Intro")
            .object_output("{\"type\":\"object\"}")
            .build()
            .expect("request should build");

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1], Message::new(Role::User, "Intro"));
        assert!(matches!(request.output, OutputMode::Object { .. }));
    }

    #[test]
    fn tools_are_rejected_for_structured_output() {
        let error = ModelRequest::builder("o3-mini")
            .prompt("x")
            .array_output("{}")
            .tools(vec![ToolDefinition {
                name: "t".to_string(),
                description: "d".to_string(),
                input_schema: "{}".to_string(),
            }])
            .build()
            .expect_err("tools plus array output should fail");

        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn attachment_classification_and_validation() {
        let pdf = Attachment::new("https://blob/a.pdf", "application/pdf");
        let png = Attachment::new("https://blob/a.png", "image/png");
        let gif = Attachment::new("https://blob/a.gif", "image/gif");

        assert!(pdf.is_pdf());
        assert!(!pdf.is_image());
        assert!(png.is_image());
        assert!(png.validate(1024).is_ok());
        assert!(png.validate(MAX_ATTACHMENT_BYTES + 1).is_err());
        assert!(gif.is_image());
        assert!(gif.validate(10).is_err());
    }

    #[test]
    fn message_serializes_with_camel_case_and_skips_empty_fields() {
        let message = Message::tool_result(ToolResult {
            tool_call_id: "call-1".to_string(),
            output: "ok".to_string(),
        });
        let json = serde_json::to_value(&message).expect("message should serialize");

        assert_eq!(json["role"], "tool");
        assert_eq!(json["toolCallId"], "call-1");
        assert!(json.get("attachments").is_none());
    }

    #[test]
    fn usage_accumulates_across_steps() {
        let mut usage = TokenUsage::default();
        usage.accumulate(TokenUsage {
            input_tokens: 3,
            output_tokens: 2,
            total_tokens: 5,
        });
        usage.accumulate(TokenUsage {
            input_tokens: 1,
            output_tokens: 1,
            total_tokens: 2,
        });
        assert_eq!(usage.total_tokens, 7);
    }
}
