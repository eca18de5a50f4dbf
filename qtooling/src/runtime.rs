//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::{Either, select};
use qprovider::ToolCall;

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntimeHooks,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;

    /// Names of the tools this runtime can execute.
    fn definitions(&self) -> Vec<qprovider::ToolDefinition>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    async fn invoke(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let tool = self.registry.get(&tool_call.name).ok_or_else(|| {
            ToolError::not_found(format!("tool '{}' is not registered", tool_call.name))
        })?;

        let invocation = tool.invoke(&tool_call.arguments, context);
        let output = match self.timeout {
            Some(limit) => {
                let delay = futures_timer::Delay::new(limit);
                match select(invocation, delay).await {
                    Either::Left((output, _)) => output?,
                    Either::Right(_) => {
                        return Err(ToolError::timeout(format!(
                            "tool '{}' exceeded {}ms",
                            tool_call.name,
                            limit.as_millis()
                        )));
                    }
                }
            }
            None => invocation.await?,
        };

        Ok(ToolExecutionResult::from_call(tool_call, output))
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            match self.invoke(&tool_call, &context).await {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&tool_call, &context, &result, started.elapsed());
                    Ok(result)
                }
                Err(error) => {
                    let error = error
                        .with_tool_name(tool_call.name.clone())
                        .with_tool_call_id(tool_call.id.clone());
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                    Err(error)
                }
            }
        })
    }

    fn definitions(&self) -> Vec<qprovider::ToolDefinition> {
        self.registry.definitions()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use qprovider::{ToolCall, ToolDefinition};
    use qstream::{DataStreamReader, channel};

    use super::*;
    use crate::{Tool, ToolErrorKind};

    fn context() -> (ToolExecutionContext, DataStreamReader) {
        let (writer, reader) = channel();
        (ToolExecutionContext::new("user-1", "chat-1", writer), reader)
    }

    #[derive(Debug)]
    struct EchoTool;

    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".to_string(),
                description: "Echoes arguments".to_string(),
                input_schema: "{\"type\":\"string\"}".to_string(),
            }
        }

        fn invoke<'a>(
            &'a self,
            args_json: &'a str,
            context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async move { Ok(format!("user={} args={}", context.user_id, args_json)) })
        }
    }

    #[derive(Debug)]
    struct BrokenTool;

    impl Tool for BrokenTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "broken".to_string(),
                description: "Always fails".to_string(),
                input_schema: "{\"type\":\"object\"}".to_string(),
            }
        }

        fn invoke<'a>(
            &'a self,
            _args_json: &'a str,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async move { Err(ToolError::execution("tool exploded")) })
        }
    }

    #[derive(Debug)]
    struct StalledTool;

    impl Tool for StalledTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "stalled".to_string(),
                description: "Never completes".to_string(),
                input_schema: "{}".to_string(),
            }
        }

        fn invoke<'a>(
            &'a self,
            _args_json: &'a str,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(std::future::pending())
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.name));
        }

        fn on_execution_failure(
            &self,
            _tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{:?}", error.kind));
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let runtime = DefaultToolRuntime::new(Arc::new(registry));
        let (context, _reader) = context();

        let result = runtime
            .execute(call("call_1", "echo", "hello"), context)
            .await
            .expect("execution should succeed");

        assert_eq!(result.tool_call_id, "call_1");
        assert_eq!(result.output, "user=user-1 args=hello");
        assert_eq!(result.output_json(), serde_json::json!("user=user-1 args=hello"));
    }

    #[tokio::test]
    async fn runtime_returns_not_found_for_unknown_tool() {
        let runtime = DefaultToolRuntime::new(Arc::new(ToolRegistry::new()));
        let (context, _reader) = context();

        let error = runtime
            .execute(call("call_2", "missing", "{}"), context)
            .await
            .expect_err("execution should fail");

        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert_eq!(error.tool_call_id.as_deref(), Some("call_2"));
    }

    #[tokio::test]
    async fn runtime_propagates_tool_execution_error_and_notifies_hooks() {
        let mut registry = ToolRegistry::new();
        registry.register(BrokenTool);
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(registry)).with_hooks(hooks.clone());
        let (context, _reader) = context();

        let error = runtime
            .execute(call("call_3", "broken", "{}"), context)
            .await
            .expect_err("execution should fail");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.message, "tool exploded");
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec!["start:broken".to_string(), "failure:Execution".to_string()]
        );
    }

    #[tokio::test]
    async fn runtime_times_out_stalled_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(StalledTool);
        let runtime =
            DefaultToolRuntime::new(Arc::new(registry)).with_timeout(Duration::from_millis(10));
        let (context, _reader) = context();

        let error = runtime
            .execute(call("call_4", "stalled", "{}"), context)
            .await
            .expect_err("execution should time out");

        assert_eq!(error.kind, ToolErrorKind::Timeout);
    }

    #[test]
    fn registry_filters_definitions_by_allow_list() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(EchoTool);
        registry.register(BrokenTool);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("echo"));

        let names: Vec<String> = registry
            .definitions_for(&["echo", "unknown"])
            .into_iter()
            .map(|definition| definition.name)
            .collect();
        assert_eq!(names, vec!["echo"]);
        assert!(registry.definitions_for::<&str>(&[]).is_empty());

        let removed = registry.remove("echo");
        assert!(removed.is_some());
        assert_eq!(registry.len(), 1);
    }
}
