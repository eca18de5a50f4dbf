//! Turn orchestration: authorization, model routing, the bounded tool loop, and
//! persistence at turn finish.
//!
//! A turn moves through `received -> authorized -> model selected -> looping ->
//! finishing -> persisted | failed`. Everything up to model selection happens in
//! [`ChatService::stream_turn`] before any event is produced, so rejected
//! requests never open a stream. The loop itself runs inside the returned
//! [`DrivenStream`]; dropping the stream cancels it.

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use futures_util::future::{Either, select};
use qcommon::{ChatId, UserId};
use qprovider::{
    Message, ModelHandle, ModelRegistry, OutputItem, Role, StopReason, StreamEvent, TokenUsage,
    ToolCall, ToolDefinition, ToolResult,
};
use qstore::{Chat, ChatStore, InMemoryChatStore, StoredMessage};
use qstream::{DataStreamWriter, DrivenStream, StreamPart, drive};
use qtooling::{
    DefaultToolRuntime, ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult,
    ToolRuntime,
};
use serde_json::json;
use tracing::Instrument;

use crate::messages::{most_recent_user_message, sanitize_response_messages};
use crate::prompts::system_prompt;
use crate::title::generate_title;
use crate::{
    AttachmentSignal, AuthProvider, ChatError, ChatPolicy, ChatTurnRequest, ModelCatalog,
    NoopTurnHooks, Session, StaticAuthProvider, TurnHooks, TurnOutcome, select_model,
};

#[derive(Clone)]
pub struct ChatService {
    models: Arc<ModelRegistry>,
    catalog: ModelCatalog,
    store: Arc<dyn ChatStore>,
    auth: Arc<dyn AuthProvider>,
    tool_runtime: Arc<dyn ToolRuntime>,
    hooks: Arc<dyn TurnHooks>,
    policy: ChatPolicy,
}

pub struct ChatServiceBuilder {
    models: Arc<ModelRegistry>,
    catalog: ModelCatalog,
    store: Arc<dyn ChatStore>,
    auth: Arc<dyn AuthProvider>,
    tool_runtime: Arc<dyn ToolRuntime>,
    hooks: Arc<dyn TurnHooks>,
    policy: ChatPolicy,
}

impl ChatServiceBuilder {
    pub fn new(models: Arc<ModelRegistry>) -> Self {
        Self {
            models,
            catalog: ModelCatalog::default(),
            store: Arc::new(InMemoryChatStore::new()),
            auth: Arc::new(StaticAuthProvider::anonymous()),
            tool_runtime: Arc::new(DefaultToolRuntime::default()),
            hooks: Arc::new(NoopTurnHooks),
            policy: ChatPolicy::default(),
        }
    }

    pub fn catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.store = store;
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }

    pub fn tool_runtime(mut self, tool_runtime: Arc<dyn ToolRuntime>) -> Self {
        self.tool_runtime = tool_runtime;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<ChatService, ChatError> {
        self.policy.validate()?;

        Ok(ChatService {
            models: self.models,
            catalog: self.catalog,
            store: self.store,
            auth: self.auth,
            tool_runtime: self.tool_runtime,
            hooks: self.hooks,
            policy: self.policy,
        })
    }
}

/// Everything frozen for the duration of one turn.
struct Turn {
    chat_id: ChatId,
    user_id: UserId,
    model: ModelHandle,
    system: String,
    tools: Vec<ToolDefinition>,
    messages: Vec<Message>,
}

impl Turn {
    fn exposes(&self, tool_name: &str) -> bool {
        self.tools.iter().any(|tool| tool.name == tool_name)
    }
}

struct StepOutput {
    message: Message,
    stop_reason: StopReason,
    usage: TokenUsage,
}

impl ChatService {
    pub fn builder(models: Arc<ModelRegistry>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(models)
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn store(&self) -> Arc<dyn ChatStore> {
        Arc::clone(&self.store)
    }

    /// Authorizes and prepares a turn, then hands back its event stream.
    ///
    /// Fails before streaming with `Unauthorized` (no session, or the chat has
    /// another owner), `BadRequest` (no user message) or `Configuration` (the
    /// model cannot be resolved). A new chat is created and titled here, and the
    /// user message is stored before the first event.
    pub async fn stream_turn(
        &self,
        request: ChatTurnRequest,
    ) -> Result<DrivenStream<'_>, ChatError> {
        let session = self.session().await?;
        let ChatTurnRequest {
            chat_id,
            messages,
            selected_model,
        } = request;

        let user_message = most_recent_user_message(&messages)
            .cloned()
            .ok_or_else(|| ChatError::bad_request("No user message found"))?;

        let existing = self.store.get_chat(&chat_id).await?;
        if let Some(chat) = &existing
            && !chat.is_owned_by(&session.user_id)
        {
            return Err(ChatError::unauthorized(format!(
                "chat '{chat_id}' belongs to another user"
            )));
        }

        let signal = AttachmentSignal::from_messages(&messages);
        let selected = select_model(&selected_model, signal, &self.catalog)?;
        let model = self.models.language_model(selected).ok_or_else(|| {
            ChatError::configuration(format!("language model '{selected}' is not registered"))
        })?;

        let tools = if self.catalog.is_reasoning_model(selected) {
            Vec::new()
        } else {
            self.active_tool_definitions()
        };

        if existing.is_none() {
            let title_model = self.models.language_model(&self.catalog.title_model);
            let title = generate_title(title_model.as_ref(), &user_message).await;
            self.store
                .save_chat(Chat::new(chat_id.clone(), session.user_id.clone(), title))
                .await?;
        }

        self.store
            .save_messages(vec![StoredMessage::new(chat_id.clone(), user_message)])
            .await?;

        let chat_action = if existing.is_some() {
            "continued_existing"
        } else {
            "created_new"
        };
        tracing::info!(
            phase = "chat",
            event = "turn_accepted",
            chat_id = %chat_id,
            requested_model = %selected_model,
            selected_model = selected,
            message_count = messages.len(),
            has_pdf = signal.has_pdf,
            has_image = signal.has_image,
            chat_action
        );

        let turn = Turn {
            chat_id,
            user_id: session.user_id,
            system: system_prompt(selected, &self.catalog),
            model,
            tools,
            messages,
        };
        let span = tracing::info_span!(
            "chat.turn",
            chat_id = %turn.chat_id,
            model = turn.model.alias()
        );

        Ok(drive(move |writer| self.run_turn(turn, writer).instrument(span)))
    }

    /// Deletes a chat the caller owns, returning the removed record.
    pub async fn delete_chat(&self, chat_id: &ChatId) -> Result<Chat, ChatError> {
        let session = self.session().await?;
        let chat = self
            .store
            .get_chat(chat_id)
            .await?
            .ok_or_else(|| ChatError::not_found(format!("chat '{chat_id}' does not exist")))?;

        if !chat.is_owned_by(&session.user_id) {
            return Err(ChatError::unauthorized(format!(
                "chat '{chat_id}' belongs to another user"
            )));
        }

        self.store.delete_chat(chat_id).await?;
        Ok(chat)
    }

    /// The caller's chats, newest first.
    pub async fn history(&self) -> Result<Vec<Chat>, ChatError> {
        let session = self.session().await?;
        let chats = self.store.chats_by_user(&session.user_id).await?;
        tracing::debug!(
            phase = "chat",
            event = "history_loaded",
            user_id = %session.user_id,
            chat_count = chats.len()
        );
        Ok(chats)
    }

    async fn session(&self) -> Result<Session, ChatError> {
        self.auth
            .get_session()
            .await
            .ok_or_else(|| ChatError::unauthorized("no active session"))
    }

    fn active_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_runtime
            .definitions()
            .into_iter()
            .filter(|definition| {
                self.policy
                    .active_tools
                    .iter()
                    .any(|name| *name == definition.name)
            })
            .collect()
    }

    async fn run_turn(&self, turn: Turn, writer: DataStreamWriter) {
        let started = Instant::now();
        self.hooks.on_turn_start(&turn.chat_id, turn.model.alias());

        let result = self.within_turn_timeout(self.tool_loop(&turn, &writer)).await;
        let elapsed = started.elapsed();

        match result {
            Ok(outcome) => {
                self.persist(&turn.chat_id, outcome.response_messages).await;
                self.hooks
                    .on_turn_success(&turn.chat_id, outcome.steps, elapsed);
            }
            Err(error) if error.is_cancellation() => {
                tracing::info!(
                    phase = "chat",
                    event = "turn_cancelled",
                    chat_id = %turn.chat_id,
                    reason = %error
                );
                self.hooks.on_turn_cancelled(&turn.chat_id, &error, elapsed);
            }
            Err(error) => {
                tracing::error!(
                    phase = "chat",
                    event = "turn_failed",
                    chat_id = %turn.chat_id,
                    error_kind = ?error.kind,
                    error = %error
                );
                self.hooks.on_turn_failure(&turn.chat_id, &error, elapsed);
                let _ = writer
                    .write(StreamPart::Error(self.policy.error_message.clone()))
                    .await;
            }
        }
    }

    async fn within_turn_timeout<F>(&self, turn: F) -> Result<TurnOutcome, ChatError>
    where
        F: Future<Output = Result<TurnOutcome, ChatError>>,
    {
        let Some(limit) = self.policy.turn_timeout else {
            return turn.await;
        };

        match select(pin!(turn), futures_timer::Delay::new(limit)).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(ChatError::timeout(format!(
                "turn exceeded {}ms",
                limit.as_millis()
            ))),
        }
    }

    async fn tool_loop(
        &self,
        turn: &Turn,
        writer: &DataStreamWriter,
    ) -> Result<TurnOutcome, ChatError> {
        let mut context = turn.messages.clone();
        let mut response_messages = Vec::new();
        let mut usage = TokenUsage::default();
        let mut stop_reason = StopReason::EndTurn;
        let mut steps = 0;

        for step in 0..self.policy.max_steps {
            let output = self.model_step(turn, &context, writer).await?;
            steps = step + 1;
            stop_reason = output.stop_reason;
            usage.accumulate(output.usage);
            self.hooks.on_step_finish(
                &turn.chat_id,
                turn.model.provider_id(),
                step,
                output.stop_reason,
                output.usage,
            );

            let calls = output.message.tool_calls.clone();
            context.push(output.message.clone());
            response_messages.push(output.message);

            for call in &calls {
                let result = self.execute_tool(turn, call, step, writer).await?;
                let message = Message::tool_result(result);
                context.push(message.clone());
                response_messages.push(message);
            }

            writer
                .write(StreamPart::StepFinish { step, stop_reason })
                .await?;

            if calls.is_empty() {
                break;
            }

            if steps == self.policy.max_steps {
                tracing::info!(
                    phase = "chat",
                    event = "step_limit_reached",
                    chat_id = %turn.chat_id,
                    max_steps = self.policy.max_steps
                );
            }
        }

        writer.write(StreamPart::Finish { stop_reason, usage }).await?;

        Ok(TurnOutcome {
            steps,
            stop_reason,
            usage,
            response_messages,
        })
    }

    /// One model call: streams text and reasoning to the client as it arrives
    /// and gathers the tool calls the model asks for.
    async fn model_step(
        &self,
        turn: &Turn,
        context: &[Message],
        writer: &DataStreamWriter,
    ) -> Result<StepOutput, ChatError> {
        let request = turn
            .model
            .request()
            .system(turn.system.clone())
            .messages(context.to_vec())
            .tools(turn.tools.clone())
            .enable_streaming()
            .build()?;

        let mut stream = turn.model.stream(request).await?;
        let mut text = String::new();
        let mut reasoning = String::new();
        let mut completed_text = None;
        let mut tool_calls = Vec::new();
        let mut stop_reason = None;
        let mut usage = TokenUsage::default();

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::TextDelta(delta) => {
                    text.push_str(&delta);
                    writer.write(StreamPart::Text(delta)).await?;
                }
                StreamEvent::ReasoningDelta(delta) => {
                    reasoning.push_str(&delta);
                    writer.write(StreamPart::Reasoning(delta)).await?;
                }
                StreamEvent::ToolCallDelta(call) => merge_tool_call(&mut tool_calls, call),
                StreamEvent::MessageComplete(message) => {
                    if message.role == Role::Assistant {
                        completed_text = Some(message.content);
                    }
                }
                StreamEvent::ResponseComplete(response) => {
                    for item in response.output {
                        match item {
                            OutputItem::Message(message) if message.role == Role::Assistant => {
                                completed_text = Some(message.content);
                            }
                            OutputItem::ToolCall(call) => merge_tool_call(&mut tool_calls, call),
                            OutputItem::Message(_) => {}
                        }
                    }
                    stop_reason = Some(response.stop_reason);
                    usage = response.usage;
                }
                StreamEvent::PartialObject(_) | StreamEvent::ArrayElement(_) => {}
            }
        }

        // Backends that only report the final message still reach the client.
        if text.is_empty()
            && let Some(content) = completed_text.filter(|content| !content.is_empty())
        {
            writer.write(StreamPart::Text(content.clone())).await?;
            text = content;
        }

        let stop_reason = stop_reason.unwrap_or(if tool_calls.is_empty() {
            StopReason::EndTurn
        } else {
            StopReason::ToolUse
        });

        let mut message = Message::assistant_tool_calls(text, tool_calls);
        if !reasoning.is_empty() {
            message = message.with_reasoning(reasoning);
        }

        Ok(StepOutput {
            message,
            stop_reason,
            usage,
        })
    }

    async fn execute_tool(
        &self,
        turn: &Turn,
        call: &ToolCall,
        step: usize,
        writer: &DataStreamWriter,
    ) -> Result<ToolResult, ChatError> {
        writer.write(StreamPart::ToolCall(call.clone())).await?;

        let result = if turn.exposes(&call.name) {
            let context = ToolExecutionContext::new(
                turn.user_id.clone(),
                turn.chat_id.clone(),
                writer.clone(),
            )
            .with_step(step);
            let span = tracing::info_span!("tool.execute", tool = %call.name, step);
            match self
                .tool_runtime
                .execute(call.clone(), context)
                .instrument(span)
                .await
            {
                Ok(result) => result,
                Err(error) => recover_tool_error(call, error)?,
            }
        } else {
            recover_tool_error(
                call,
                ToolError::not_found(format!("tool '{}' is not available", call.name)),
            )?
        };

        writer
            .write(StreamPart::ToolResult {
                tool_call_id: call.id.clone(),
                result: result.output_json(),
            })
            .await?;

        Ok(result.into_tool_result())
    }

    async fn persist(&self, chat_id: &ChatId, messages: Vec<Message>) {
        let records: Vec<StoredMessage> = sanitize_response_messages(messages)
            .into_iter()
            .map(|message| StoredMessage::new(chat_id.clone(), message))
            .collect();

        if records.is_empty() {
            return;
        }

        let span = tracing::info_span!("chat.persist", chat_id = %chat_id);
        if let Err(error) = self.store.save_messages(records).instrument(span).await {
            tracing::error!(
                phase = "chat",
                event = "persist_failed",
                chat_id = %chat_id,
                error = %error
            );
            self.hooks.on_persistence_failure(chat_id, &error);
        }
    }
}

fn merge_tool_call(calls: &mut Vec<ToolCall>, call: ToolCall) {
    match calls.iter_mut().find(|existing| existing.id == call.id) {
        Some(existing) => *existing = call,
        None => calls.push(call),
    }
}

/// Bad calls become a structured result the model can react to; everything
/// else ends the turn.
fn recover_tool_error(
    call: &ToolCall,
    error: ToolError,
) -> Result<ToolExecutionResult, ChatError> {
    match error.kind {
        ToolErrorKind::NotFound | ToolErrorKind::InvalidArguments => {
            tracing::warn!(
                phase = "chat",
                event = "tool_call_rejected",
                tool_name = call.name,
                tool_call_id = call.id,
                error_kind = ?error.kind,
                error = %error
            );
            let output = json!({ "error": error.message }).to_string();
            Ok(ToolExecutionResult::from_call(call, output))
        }
        _ => Err(ChatError::from(error)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::StreamExt;
    use qprovider::{Attachment, ProviderError, ToolDefinition};
    use qstore::ChatStore;
    use qstream::{SequencedPart, StreamPart};
    use qtooling::ToolRegistry;

    use super::*;
    use crate::testing::{RecordingStore, Script, ScriptedProvider, registry_with};
    use crate::{ChatErrorKind, GENERIC_ERROR_MESSAGE, prompts};

    fn echo_runtime() -> Arc<dyn ToolRuntime> {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDefinition {
                name: "getWeather".to_string(),
                description: "Current weather".to_string(),
                input_schema: "{\"type\":\"object\"}".to_string(),
            },
            |args, _context| Ok(format!("{{\"echo\":{args}}}")),
        );
        Arc::new(DefaultToolRuntime::new(Arc::new(registry)))
    }

    fn weather_call(id: &str) -> StreamEvent {
        StreamEvent::ToolCallDelta(ToolCall {
            id: id.to_string(),
            name: "getWeather".to_string(),
            arguments: "{\"latitude\":1}".to_string(),
        })
    }

    fn service(
        provider: ScriptedProvider,
        store: Arc<RecordingStore>,
        user: Option<&str>,
    ) -> ChatService {
        let auth = match user {
            Some(user) => StaticAuthProvider::authenticated(user),
            None => StaticAuthProvider::anonymous(),
        };
        ChatService::builder(Arc::new(registry_with(provider)))
            .store(store)
            .auth(Arc::new(auth))
            .tool_runtime(echo_runtime())
            .build()
            .expect("service should build")
    }

    fn request(model: &str) -> ChatTurnRequest {
        ChatTurnRequest::new(
            "chat-1",
            model,
            vec![Message::new(Role::User, "what's the weather?")],
        )
    }

    async fn collect(stream: DrivenStream<'_>) -> Vec<StreamPart> {
        stream.map(|part: SequencedPart| part.part).collect().await
    }

    #[tokio::test]
    async fn text_turn_streams_and_persists_once() {
        let provider = ScriptedProvider::new(vec![vec![
            StreamEvent::TextDelta("Sunny".to_string()),
            StreamEvent::TextDelta(" today".to_string()),
        ]])
        .with_completion("Weather today");
        let store = Arc::new(RecordingStore::default());
        let service = service(provider.clone(), store.clone(), Some("user-1"));

        let stream = service
            .stream_turn(request("chat-model-openai"))
            .await
            .expect("turn should start");
        let parts = collect(stream).await;

        assert_eq!(
            parts[..3],
            [
                StreamPart::Text("Sunny".to_string()),
                StreamPart::Text(" today".to_string()),
                StreamPart::StepFinish {
                    step: 0,
                    stop_reason: StopReason::EndTurn
                },
            ]
        );
        assert!(matches!(parts.last(), Some(StreamPart::Finish { .. })));

        let chat = store
            .get_chat(&ChatId::new("chat-1"))
            .await
            .expect("load")
            .expect("chat should exist");
        assert_eq!(chat.title, "Weather today");
        assert_eq!(chat.user_id, UserId::new("user-1"));

        let batches = store.message_batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0][0].role(), Role::User);
        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[1][0].message.content, "Sunny today");
    }

    #[tokio::test]
    async fn anonymous_caller_is_rejected_without_side_effects() {
        let provider = ScriptedProvider::new(vec![vec![StreamEvent::TextDelta("x".into())]]);
        let store = Arc::new(RecordingStore::default());
        let service = service(provider.clone(), store.clone(), None);

        let error = service
            .stream_turn(request("chat-model-openai"))
            .await
            .err()
            .expect("anonymous turn should fail");

        assert_eq!(error.kind, ChatErrorKind::Unauthorized);
        assert_eq!(store.write_count(), 0);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn another_users_chat_is_rejected_without_side_effects() {
        let provider = ScriptedProvider::new(vec![vec![StreamEvent::TextDelta("x".into())]]);
        let store = Arc::new(RecordingStore::default());
        store
            .save_chat(Chat::new(ChatId::new("chat-1"), UserId::new("owner"), "Mine"))
            .await
            .expect("seed chat");
        let baseline = store.write_count();
        let service = service(provider.clone(), store.clone(), Some("intruder"));

        let error = service
            .stream_turn(request("chat-model-openai"))
            .await
            .err()
            .expect("foreign chat should fail");

        assert_eq!(error.kind, ChatErrorKind::Unauthorized);
        assert_eq!(store.write_count(), baseline);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_user_message_is_a_bad_request() {
        let store = Arc::new(RecordingStore::default());
        let service = service(ScriptedProvider::new(Vec::new()), store.clone(), Some("u"));
        let request = ChatTurnRequest::new(
            "chat-1",
            "chat-model-openai",
            vec![Message::new(Role::Assistant, "hello")],
        );

        let error = service
            .stream_turn(request)
            .await
            .err()
            .expect("turn should fail");
        assert_eq!(error.kind, ChatErrorKind::BadRequest);
        assert_eq!(error.client_message(), "No user message found");
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn tool_loop_stops_at_the_step_bound() {
        let provider = ScriptedProvider::new(Vec::new())
            .then(Script::events(vec![weather_call("call-n")]))
            .repeat_last();
        let store = Arc::new(RecordingStore::default());
        let service = service(provider.clone(), store.clone(), Some("user-1"));

        let stream = service
            .stream_turn(request("chat-model-openai"))
            .await
            .expect("turn should start");
        let parts = collect(stream).await;

        assert_eq!(provider.requests().len(), 5);
        let results = parts
            .iter()
            .filter(|part| matches!(part, StreamPart::ToolResult { .. }))
            .count();
        assert_eq!(results, 5);
        assert_eq!(
            parts.last(),
            Some(&StreamPart::Finish {
                stop_reason: StopReason::ToolUse,
                usage: TokenUsage::default(),
            })
        );

        let batches = store.message_batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].len(), 10);
    }

    #[tokio::test]
    async fn tool_results_feed_the_next_step() {
        let provider = ScriptedProvider::new(vec![
            vec![weather_call("call-1")],
            vec![StreamEvent::TextDelta("It is sunny.".to_string())],
        ]);
        let store = Arc::new(RecordingStore::default());
        let service = service(provider.clone(), store.clone(), Some("user-1"));

        let stream = service
            .stream_turn(request("chat-model-gemini"))
            .await
            .expect("turn should start");
        let parts = collect(stream).await;

        assert!(parts.contains(&StreamPart::ToolResult {
            tool_call_id: "call-1".to_string(),
            result: json!({ "echo": { "latitude": 1 } }),
        }));

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        let tool_messages: Vec<&Message> = requests[1].tool_results().collect();
        assert_eq!(tool_messages.len(), 1);
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("call-1"));
    }

    #[tokio::test]
    async fn unknown_tool_returns_structured_error_and_continues() {
        let provider = ScriptedProvider::new(vec![
            vec![StreamEvent::ToolCallDelta(ToolCall {
                id: "call-x".to_string(),
                name: "searchWeb".to_string(),
                arguments: "{}".to_string(),
            })],
            vec![StreamEvent::TextDelta("Sorry.".to_string())],
        ]);
        let service = service(
            provider.clone(),
            Arc::new(RecordingStore::default()),
            Some("user-1"),
        );

        let parts = collect(
            service
                .stream_turn(request("chat-model-openai"))
                .await
                .expect("turn should start"),
        )
        .await;

        assert!(parts.contains(&StreamPart::ToolResult {
            tool_call_id: "call-x".to_string(),
            result: json!({ "error": "tool 'searchWeb' is not available" }),
        }));
        assert!(parts.contains(&StreamPart::Text("Sorry.".to_string())));
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn reasoning_model_gets_no_tools_and_no_artifact_prompt() {
        let provider = ScriptedProvider::new(vec![vec![
            StreamEvent::ReasoningDelta("thinking".to_string()),
            StreamEvent::TextDelta("42".to_string()),
        ]]);
        let store = Arc::new(RecordingStore::default());
        let service = service(provider.clone(), store.clone(), Some("user-1"));
        let request = request("chat-model-reasoning").with_message(
            Message::new(Role::User, "and this pdf?")
                .with_attachment(Attachment::new("https://blob/a.pdf", "application/pdf")),
        );

        let parts = collect(service.stream_turn(request).await.expect("start")).await;

        let requests = provider.requests();
        assert_eq!(requests[0].model, "upstream-chat-model-reasoning");
        assert!(requests[0].tools.is_empty());
        assert_eq!(requests[0].messages[0].content, prompts::REGULAR_PROMPT);
        assert_eq!(parts[0], StreamPart::Reasoning("thinking".to_string()));

        let batches = store.message_batches();
        let stored = &batches[1][0].message;
        assert_eq!(stored.content, "42");
        assert_eq!(stored.reasoning.as_deref(), Some("thinking"));
    }

    #[tokio::test]
    async fn pdf_attachment_routes_to_document_model_with_tools() {
        let provider = ScriptedProvider::new(vec![vec![StreamEvent::TextDelta("ok".into())]]);
        let service = service(
            provider.clone(),
            Arc::new(RecordingStore::default()),
            Some("user-1"),
        );
        let request = ChatTurnRequest::new(
            "chat-1",
            "chat-model-groq",
            vec![
                Message::new(Role::User, "summarize")
                    .with_attachment(Attachment::new("https://blob/a.pdf", "application/pdf")),
            ],
        );

        let _ = collect(service.stream_turn(request).await.expect("start")).await;

        let requests = provider.requests();
        assert_eq!(requests[0].model, "upstream-chat-model-claude");
        assert_eq!(requests[0].tools.len(), 1);
        assert!(requests[0].messages[0].content.contains(prompts::ARTIFACTS_PROMPT));
    }

    #[tokio::test]
    async fn model_error_surfaces_generic_message_only() {
        let provider = ScriptedProvider::new(Vec::new()).then(Script::results(vec![
            Ok(StreamEvent::TextDelta("Partial".to_string())),
            Err(ProviderError::unavailable("cluster eu-west-2 overloaded")),
        ]));
        let store = Arc::new(RecordingStore::default());
        let service = service(provider, store.clone(), Some("user-1"));

        let parts = collect(
            service
                .stream_turn(request("chat-model-openai"))
                .await
                .expect("start"),
        )
        .await;

        assert_eq!(
            parts,
            vec![
                StreamPart::Text("Partial".to_string()),
                StreamPart::Error(GENERIC_ERROR_MESSAGE.to_string()),
            ]
        );
        assert_eq!(store.message_batches().len(), 1);
    }

    #[tokio::test]
    async fn persistence_failure_is_swallowed() {
        let provider = ScriptedProvider::new(vec![vec![StreamEvent::TextDelta("Hi".into())]]);
        let store = Arc::new(RecordingStore::default().failing_responses());
        let service = service(provider, store.clone(), Some("user-1"));

        let parts = collect(
            service
                .stream_turn(request("chat-model-openai"))
                .await
                .expect("start"),
        )
        .await;

        assert!(matches!(parts.last(), Some(StreamPart::Finish { .. })));
        assert!(
            !parts
                .iter()
                .any(|part| matches!(part, StreamPart::Error(_)))
        );
        assert_eq!(store.message_batches().len(), 1);
        assert_eq!(store.failed_writes(), 1);
    }

    #[tokio::test]
    async fn dropped_stream_skips_persistence() {
        let provider = ScriptedProvider::new(Vec::new()).then(Script::stalled(vec![
            StreamEvent::TextDelta("Once upon".to_string()),
        ]));
        let store = Arc::new(RecordingStore::default());
        let service = service(provider, store.clone(), Some("user-1"));

        let mut stream = service
            .stream_turn(request("chat-model-openai"))
            .await
            .expect("start");
        let first = stream.next().await.expect("first part");
        assert_eq!(first.part, StreamPart::Text("Once upon".to_string()));
        drop(stream);

        assert_eq!(store.message_batches().len(), 1);
    }

    #[tokio::test]
    async fn turn_timeout_ends_like_a_cancellation() {
        let provider = ScriptedProvider::new(Vec::new()).then(Script::stalled(vec![
            StreamEvent::TextDelta("Once upon".to_string()),
        ]));
        let store = Arc::new(RecordingStore::default());
        let service = ChatService::builder(Arc::new(registry_with(provider)))
            .store(store.clone())
            .auth(Arc::new(StaticAuthProvider::authenticated("user-1")))
            .policy(ChatPolicy::default().with_turn_timeout(Duration::from_millis(50)))
            .build()
            .expect("service should build");

        let parts = collect(
            service
                .stream_turn(request("chat-model-openai"))
                .await
                .expect("start"),
        )
        .await;

        assert_eq!(parts, vec![StreamPart::Text("Once upon".to_string())]);
        assert_eq!(store.message_batches().len(), 1);
    }

    #[tokio::test]
    async fn delete_chat_checks_ownership() {
        let store = Arc::new(RecordingStore::default());
        store
            .save_chat(Chat::new(ChatId::new("chat-1"), UserId::new("owner"), "Mine"))
            .await
            .expect("seed chat");
        let intruder = service(ScriptedProvider::new(Vec::new()), store.clone(), Some("other"));
        let owner = service(ScriptedProvider::new(Vec::new()), store.clone(), Some("owner"));

        let error = intruder
            .delete_chat(&ChatId::new("chat-1"))
            .await
            .expect_err("intruder cannot delete");
        assert_eq!(error.kind, ChatErrorKind::Unauthorized);

        let deleted = owner
            .delete_chat(&ChatId::new("chat-1"))
            .await
            .expect("owner can delete");
        assert_eq!(deleted.title, "Mine");

        let missing = owner
            .delete_chat(&ChatId::new("chat-1"))
            .await
            .expect_err("already gone");
        assert_eq!(missing.kind, ChatErrorKind::NotFound);
    }

    #[tokio::test]
    async fn history_requires_a_session_and_lists_only_own_chats() {
        let store = Arc::new(RecordingStore::default());
        store
            .save_chat(Chat::new(ChatId::new("chat-a"), UserId::new("owner"), "Mine"))
            .await
            .expect("seed chat");
        store
            .save_chat(Chat::new(ChatId::new("chat-b"), UserId::new("other"), "Theirs"))
            .await
            .expect("seed chat");

        let anonymous = service(ScriptedProvider::new(Vec::new()), store.clone(), None);
        let error = anonymous.history().await.expect_err("no session");
        assert_eq!(error.kind, ChatErrorKind::Unauthorized);

        let owner = service(ScriptedProvider::new(Vec::new()), store.clone(), Some("owner"));
        let history = owner.history().await.expect("history loads");
        let ids: Vec<&str> = history.iter().map(|chat| chat.id.as_str()).collect();
        assert_eq!(ids, vec!["chat-a"]);
    }

    #[tokio::test]
    async fn unregistered_selected_model_is_a_configuration_error() {
        let service = ChatService::builder(Arc::new(ModelRegistry::new()))
            .auth(Arc::new(StaticAuthProvider::authenticated("user-1")))
            .build()
            .expect("service should build");

        let error = service
            .stream_turn(request("chat-model-openai"))
            .await
            .err()
            .expect("turn should fail");
        assert_eq!(error.kind, ChatErrorKind::Configuration);
    }
}
