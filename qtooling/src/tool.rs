//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use qprovider::ToolDefinition;
//! use qtooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition {
//!         name: "getWeather".to_string(),
//!         description: "Get the current weather at a location".to_string(),
//!         input_schema: r#"{"type":"object"}"#.to_string(),
//!     },
//!     |args, _ctx| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.definition().name, "getWeather");
//! ```

use std::future::Future;
use std::sync::Arc;

use qcommon::BoxFuture;
use qprovider::ToolDefinition;

use crate::{ToolError, ToolExecutionContext};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// A model-callable capability.
///
/// `invoke` receives the raw JSON arguments emitted by the model and returns the
/// tool result as a string (JSON for structured results). Structured "soft"
/// failures such as a missing document belong in the returned value; `Err` is for
/// failures the turn itself must react to.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn name(&self) -> String {
        self.definition().name
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>>;
}

type ToolHandler = dyn Fn(String, ToolExecutionContext) -> ToolFuture<'static, Result<String, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(String, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |args_json, context| Box::pin(handler(args_json, context)));

        Self {
            definition,
            handler,
        }
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        let args_json = args_json.to_string();
        let context = context.clone();
        (self.handler)(args_json, context)
    }
}
