//! Metrics-based observability hooks for chat turns and tool execution.
//!
//! ```rust
//! use qobserve::MetricsObservabilityHooks;
//! use qtooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use qchat::{ChatError, TurnHooks};
use qcommon::ChatId;
use qprovider::{ProviderId, StopReason, TokenUsage, ToolCall};
use qstore::StoreError;
use qtooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl TurnHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, _chat_id: &ChatId, model: &str) {
        metrics::counter!("quire_turn_start_total", "model" => model.to_string()).increment(1);
    }

    fn on_step_finish(
        &self,
        _chat_id: &ChatId,
        provider: ProviderId,
        _step: usize,
        stop_reason: StopReason,
        usage: TokenUsage,
    ) {
        metrics::counter!(
            "quire_provider_step_total",
            "provider" => provider.to_string(),
            "stop_reason" => format!("{:?}", stop_reason)
        )
        .increment(1);
        metrics::counter!(
            "quire_provider_tokens_total",
            "provider" => provider.to_string(),
            "direction" => "input"
        )
        .increment(u64::from(usage.input_tokens));
        metrics::counter!(
            "quire_provider_tokens_total",
            "provider" => provider.to_string(),
            "direction" => "output"
        )
        .increment(u64::from(usage.output_tokens));
    }

    fn on_turn_success(&self, _chat_id: &ChatId, steps: usize, elapsed: Duration) {
        metrics::counter!("quire_turn_success_total").increment(1);
        metrics::histogram!("quire_turn_steps").record(steps as f64);
        metrics::histogram!("quire_turn_duration_seconds", "status" => "success")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_cancelled(&self, _chat_id: &ChatId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "quire_turn_cancelled_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("quire_turn_duration_seconds", "status" => "cancelled")
            .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(&self, _chat_id: &ChatId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "quire_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!("quire_turn_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }

    fn on_persistence_failure(&self, _chat_id: &ChatId, error: &StoreError) {
        metrics::counter!(
            "quire_turn_persistence_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "quire_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "quire_tool_execution_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "quire_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "quire_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "quire_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
