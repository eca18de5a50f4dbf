use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use qchat::{ChatError, TurnHooks};
use qcommon::ChatId;
use qprovider::{ProviderId, StopReason, TokenUsage, ToolCall};
use qstore::StoreError;
use qtooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

/// Turn hooks whose panics never reach the turn.
pub struct SafeTurnHooks<H> {
    inner: H,
}

impl<H> SafeTurnHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> TurnHooks for SafeTurnHooks<H>
where
    H: TurnHooks,
{
    fn on_turn_start(&self, chat_id: &ChatId, model: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_turn_start(chat_id, model)));
    }

    fn on_step_finish(
        &self,
        chat_id: &ChatId,
        provider: ProviderId,
        step: usize,
        stop_reason: StopReason,
        usage: TokenUsage,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_step_finish(chat_id, provider, step, stop_reason, usage)
        }));
    }

    fn on_turn_success(&self, chat_id: &ChatId, steps: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_success(chat_id, steps, elapsed)
        }));
    }

    fn on_turn_cancelled(&self, chat_id: &ChatId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_cancelled(chat_id, error, elapsed)
        }));
    }

    fn on_turn_failure(&self, chat_id: &ChatId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(chat_id, error, elapsed)
        }));
    }

    fn on_persistence_failure(&self, chat_id: &ChatId, error: &StoreError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_persistence_failure(chat_id, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_call, context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        }));
    }
}
