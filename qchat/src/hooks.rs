//! Lifecycle hooks for chat turns.
//!
//! ```rust
//! use qchat::{NoopTurnHooks, TurnHooks};
//!
//! fn accepts_turn_hooks(_hooks: &dyn TurnHooks) {}
//!
//! accepts_turn_hooks(&NoopTurnHooks);
//! ```

use std::time::Duration;

use qcommon::ChatId;
use qprovider::{ProviderId, StopReason, TokenUsage};
use qstore::StoreError;

use crate::ChatError;

pub trait TurnHooks: Send + Sync {
    fn on_turn_start(&self, _chat_id: &ChatId, _model: &str) {}

    fn on_step_finish(
        &self,
        _chat_id: &ChatId,
        _provider: ProviderId,
        _step: usize,
        _stop_reason: StopReason,
        _usage: TokenUsage,
    ) {
    }

    fn on_turn_success(&self, _chat_id: &ChatId, _steps: usize, _elapsed: Duration) {}

    fn on_turn_cancelled(&self, _chat_id: &ChatId, _error: &ChatError, _elapsed: Duration) {}

    fn on_turn_failure(&self, _chat_id: &ChatId, _error: &ChatError, _elapsed: Duration) {}

    /// Persistence at turn finish failed; the client already has the content.
    fn on_persistence_failure(&self, _chat_id: &ChatId, _error: &StoreError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTurnHooks;

impl TurnHooks for NoopTurnHooks {}
