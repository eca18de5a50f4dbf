//! Model backend failures.
//!
//! Any backend failure aborts the current turn step: the orchestrator stops
//! looping and the client only sees a generic error part, never the message
//! carried here. `retryable` is advisory. Nothing in the engine retries a
//! model call; it is reported through hooks and logs so operators can tell
//! a saturated backend from a malformed request.
//!
//! ```rust
//! use qprovider::{ProviderError, ProviderErrorKind};
//!
//! let error = ProviderError::unavailable("529 overloaded").for_model("chat-model-claude");
//! assert!(error.retryable);
//! assert_eq!(error.model.as_deref(), Some("chat-model-claude"));
//! assert_eq!(error.to_string(), "Unavailable [chat-model-claude]: 529 overloaded");
//!
//! let invalid = ProviderError::invalid_request("model must not be empty");
//! assert_eq!(invalid.kind, ProviderErrorKind::InvalidRequest);
//! assert!(!invalid.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The request, attachment, or image prompt failed validation before any
    /// backend was contacted.
    InvalidRequest,
    /// Backend quota or rate limit.
    RateLimited,
    /// Backend down, overloaded, or the stream broke mid-generation.
    Unavailable,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
    /// Deployment alias of the model the call was addressed to, when known.
    pub model: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            model: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message, true)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message, false)
    }

    /// Attributes the failure to a model alias. An alias set closer to the
    /// backend wins.
    pub fn for_model(mut self, alias: impl Into<String>) -> Self {
        if self.model.is_none() {
            self.model = Some(alias.into());
        }
        self
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.model {
            Some(model) => write!(f, "{:?} [{}]: {}", self.kind, model, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_saturation_is_retryable_and_validation_is_not() {
        assert!(ProviderError::rate_limited("quota").retryable);
        assert!(ProviderError::unavailable("down").retryable);
        assert!(!ProviderError::invalid_request("empty prompt").retryable);
        assert!(!ProviderError::other("unknown").retryable);
    }

    #[test]
    fn first_model_attribution_is_kept() {
        let error = ProviderError::other("boom")
            .for_model("artifact-model")
            .for_model("chat-model-openai");

        assert_eq!(error.model.as_deref(), Some("artifact-model"));
        assert_eq!(error.to_string(), "Other [artifact-model]: boom");
    }
}
