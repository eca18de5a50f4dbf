//! Tool runtime context and execution result types.

use qcommon::{ChatId, MetadataMap, UserId};
use qprovider::{ToolCall, ToolResult};
use qstream::DataStreamWriter;
use serde_json::Value;

/// Explicit identity and sink capability handed to every tool call.
///
/// Tools never reach for ambient state: whatever they attribute or stream goes
/// through this context.
#[derive(Debug, Clone)]
pub struct ToolExecutionContext {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub writer: DataStreamWriter,
    pub step: usize,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(
        user_id: impl Into<UserId>,
        chat_id: impl Into<ChatId>,
        writer: DataStreamWriter,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            chat_id: chat_id.into(),
            writer,
            step: 0,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub output: String,
}

impl ToolExecutionResult {
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }

    pub fn from_call(call: &ToolCall, output: impl Into<String>) -> Self {
        Self::new(call.id.clone(), output)
    }

    /// Output as JSON; plain-text outputs become JSON strings.
    pub fn output_json(&self) -> Value {
        serde_json::from_str(&self.output).unwrap_or_else(|_| Value::String(self.output.clone()))
    }

    pub fn into_tool_result(self) -> ToolResult {
        ToolResult {
            tool_call_id: self.tool_call_id,
            output: self.output,
        }
    }
}
