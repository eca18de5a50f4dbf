//! Per-deployment limits for a turn.

use std::time::Duration;

use crate::{ChatError, GENERIC_ERROR_MESSAGE};

pub const DEFAULT_MAX_STEPS: usize = 5;
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(60);

/// Tools exposed to every non-reasoning model unless configured otherwise.
pub const DEFAULT_ACTIVE_TOOLS: [&str; 4] = [
    "getWeather",
    "createDocument",
    "updateDocument",
    "requestSuggestions",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPolicy {
    /// Upper bound on model calls in one turn. Reaching it truncates, never fails.
    pub max_steps: usize,
    /// Wall-clock ceiling; hitting it ends the turn like a client cancellation.
    pub turn_timeout: Option<Duration>,
    pub active_tools: Vec<String>,
    pub error_message: String,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
            active_tools: DEFAULT_ACTIVE_TOOLS.into_iter().map(str::to_string).collect(),
            error_message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl ChatPolicy {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = Some(timeout);
        self
    }

    pub fn without_turn_timeout(mut self) -> Self {
        self.turn_timeout = None;
        self
    }

    pub fn with_active_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.max_steps == 0 {
            return Err(ChatError::configuration("max_steps must be at least 1"));
        }

        if self.turn_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ChatError::configuration("turn_timeout must be non-zero"));
        }

        if self.error_message.trim().is_empty() {
            return Err(ChatError::configuration("error_message must not be empty"));
        }

        Ok(())
    }
}
