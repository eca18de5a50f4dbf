//! Tracing-based observability hooks for chat turns and tool execution.
//!
//! ```rust
//! use qchat::TurnHooks;
//! use qobserve::TracingObservabilityHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn TurnHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use std::time::Duration;

use qchat::{ChatError, TurnHooks};
use qcommon::ChatId;
use qprovider::{ProviderId, StopReason, TokenUsage, ToolCall};
use qstore::StoreError;
use qtooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl TurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, chat_id: &ChatId, model: &str) {
        tracing::info!(phase = "turn", event = "start", chat_id = %chat_id, model);
    }

    fn on_step_finish(
        &self,
        chat_id: &ChatId,
        provider: ProviderId,
        step: usize,
        stop_reason: StopReason,
        usage: TokenUsage,
    ) {
        tracing::info!(
            phase = "turn",
            event = "step_finish",
            chat_id = %chat_id,
            provider = %provider,
            step,
            stop_reason = ?stop_reason,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens
        );
    }

    fn on_turn_success(&self, chat_id: &ChatId, steps: usize, elapsed: Duration) {
        tracing::info!(
            phase = "turn",
            event = "success",
            chat_id = %chat_id,
            steps,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_cancelled(&self, chat_id: &ChatId, error: &ChatError, elapsed: Duration) {
        tracing::info!(
            phase = "turn",
            event = "cancelled",
            chat_id = %chat_id,
            error_kind = ?error.kind,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, chat_id: &ChatId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "turn",
            event = "failure",
            chat_id = %chat_id,
            error_kind = ?error.kind,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }

    fn on_persistence_failure(&self, chat_id: &ChatId, error: &StoreError) {
        tracing::error!(
            phase = "turn",
            event = "persistence_failure",
            chat_id = %chat_id,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            chat_id = %context.chat_id,
            user_id = %context.user_id,
            step = context.step
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            chat_id = %context.chat_id,
            step = context.step,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            chat_id = %context.chat_id,
            step = context.step,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}
