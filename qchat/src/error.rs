//! Chat-layer errors and classification.
//!
//! ```rust
//! use qchat::{ChatError, ChatErrorKind, GENERIC_ERROR_MESSAGE};
//!
//! let error = ChatError::model("upstream returned 529 overloaded");
//! assert_eq!(error.kind, ChatErrorKind::Model);
//! assert_eq!(error.client_message(), GENERIC_ERROR_MESSAGE);
//! assert_eq!(ChatError::unauthorized("no session").http_status(), 401);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use qprovider::ProviderError;
use qstore::StoreError;
use qstream::ChannelClosed;
use qtooling::{ToolError, ToolErrorKind};

/// Text shown to the client when a turn fails mid-stream.
pub const GENERIC_ERROR_MESSAGE: &str = "Oops, an error occured!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// No session, or the chat belongs to someone else.
    Unauthorized,
    BadRequest,
    NotFound,
    /// Model backend failure while a turn was looping.
    Model,
    /// Deployment defect: unknown model id, missing handler, invalid policy.
    Configuration,
    Store,
    Tooling,
    /// The reader went away; the turn was cancelled by the client.
    Channel,
    /// The turn exceeded its wall-clock ceiling.
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Unauthorized, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::NotFound, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Model, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Configuration, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message)
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Channel, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Timeout, message)
    }

    /// Client-initiated cancellation and forced termination end a turn the same way.
    pub fn is_cancellation(&self) -> bool {
        matches!(self.kind, ChatErrorKind::Channel | ChatErrorKind::Timeout)
    }

    /// Text that is safe to show the client. Backend detail stays in the logs.
    pub fn client_message(&self) -> &str {
        match self.kind {
            ChatErrorKind::Unauthorized => "Unauthorized",
            ChatErrorKind::BadRequest => &self.message,
            ChatErrorKind::NotFound => "Not Found",
            _ => GENERIC_ERROR_MESSAGE,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self.kind {
            ChatErrorKind::Unauthorized => 401,
            ChatErrorKind::BadRequest => 400,
            ChatErrorKind::NotFound => 404,
            ChatErrorKind::Timeout => 504,
            _ => 500,
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        ChatError::model(value.to_string())
    }
}

impl From<StoreError> for ChatError {
    fn from(value: StoreError) -> Self {
        ChatError::store(value.to_string())
    }
}

impl From<ChannelClosed> for ChatError {
    fn from(value: ChannelClosed) -> Self {
        ChatError::channel(value.to_string())
    }
}

impl From<ToolError> for ChatError {
    fn from(value: ToolError) -> Self {
        match value.kind {
            ToolErrorKind::Aborted => ChatError::channel(value.to_string()),
            ToolErrorKind::Configuration => ChatError::configuration(value.to_string()),
            ToolErrorKind::NotFound => ChatError::not_found(value.to_string()),
            _ => ChatError::tooling(value.to_string()),
        }
    }
}
