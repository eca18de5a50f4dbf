//! Observation points around each tool call of a turn.
//!
//! Document tools stream their own `kind`/`id`/`title`/`clear`/delta/`finish`
//! events through the context writer while they run, so `elapsed` on success
//! covers the whole nested generation, not just the tool's bookkeeping.
//! Hooks only observe: they cannot veto a call or rewrite its result.
//!
//! ```rust
//! use std::sync::Mutex;
//! use std::time::Duration;
//!
//! use qprovider::ToolCall;
//! use qtooling::{ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};
//!
//! /// Counts documents created per turn step.
//! #[derive(Default)]
//! struct DocumentsCreated(Mutex<Vec<usize>>);
//!
//! impl ToolRuntimeHooks for DocumentsCreated {
//!     fn on_execution_success(
//!         &self,
//!         tool_call: &ToolCall,
//!         context: &ToolExecutionContext,
//!         _result: &ToolExecutionResult,
//!         _elapsed: Duration,
//!     ) {
//!         if tool_call.name == "createDocument" {
//!             self.0.lock().unwrap().push(context.step);
//!         }
//!     }
//! }
//!
//! let hooks = DocumentsCreated::default();
//! let (writer, _reader) = qstream::channel();
//! let context = ToolExecutionContext::new("user-1", "chat-1", writer).with_step(1);
//! let call = ToolCall {
//!     id: "call-1".to_string(),
//!     name: "createDocument".to_string(),
//!     arguments: r#"{"title":"Intro","kind":"text"}"#.to_string(),
//! };
//!
//! hooks.on_execution_start(&call, &context);
//! hooks.on_execution_success(
//!     &call,
//!     &context,
//!     &ToolExecutionResult::new("call-1", r#"{"id":"doc-1"}"#),
//!     Duration::from_millis(900),
//! );
//! assert_eq!(*hooks.0.lock().unwrap(), vec![1]);
//! ```

use std::time::Duration;

use qprovider::ToolCall;

use crate::{ToolError, ToolExecutionContext, ToolExecutionResult};

/// Callbacks invoked by [`crate::DefaultToolRuntime`]. Every method defaults to
/// a no-op.
pub trait ToolRuntimeHooks: Send + Sync {
    /// Called before the tool is looked up, so unknown tools are observed too.
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
    }

    /// `error` already carries the tool name and call id. A `NotFound` here may
    /// still reach the model as a structured result rather than ending the turn.
    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
