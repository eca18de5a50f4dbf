use std::sync::Arc;

use futures_util::StreamExt;
use qcommon::{DocumentId, SuggestionId, time};
use qprovider::{ModelHandle, StreamEvent, ToolDefinition};
use qstore::{ChatStore, Document, Suggestion};
use qstream::{DataEvent, SuggestionPayload};
use qtooling::{Tool, ToolError, ToolExecutionContext, ToolFuture, parse_args};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::Instrument;

use super::{REQUEST_SUGGESTIONS, document_not_found, read_failed};
use crate::prompts::{SUGGESTION_SCHEMA, suggestions_prompt};

/// Bounds applied to one suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionPolicy {
    pub max_suggestions: usize,
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        Self { max_suggestions: 8 }
    }
}

impl SuggestionPolicy {
    pub fn with_max_suggestions(mut self, max_suggestions: usize) -> Self {
        self.max_suggestions = max_suggestions;
        self
    }

    pub fn validate(&self) -> Result<(), ToolError> {
        if self.max_suggestions == 0 {
            return Err(ToolError::configuration(
                "max_suggestions must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestSuggestionsArgs {
    document_id: DocumentId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionElement {
    original_sentence: String,
    suggested_sentence: String,
    description: String,
}

/// Streams proposed edits for a document and persists them as one batch.
pub struct RequestSuggestionsTool {
    model: ModelHandle,
    store: Arc<dyn ChatStore>,
    policy: SuggestionPolicy,
}

impl RequestSuggestionsTool {
    pub fn new(model: ModelHandle, store: Arc<dyn ChatStore>) -> Self {
        Self {
            model,
            store,
            policy: SuggestionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SuggestionPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn suggest(
        &self,
        args: RequestSuggestionsArgs,
        context: &ToolExecutionContext,
    ) -> Result<String, ToolError> {
        let document = self
            .store
            .get_document(&args.document_id)
            .await
            .map_err(read_failed)?;
        let Some((document, content)) = document.and_then(|document| {
            let content = document.content()?.to_string();
            Some((document, content))
        }) else {
            return Ok(document_not_found());
        };

        let request = self
            .model
            .request()
            .system(suggestions_prompt(self.policy.max_suggestions))
            .prompt(content)
            .array_output(SUGGESTION_SCHEMA)
            .build()?;
        let mut stream = self.model.stream(request).await?;

        let mut suggestions = Vec::new();
        while suggestions.len() < self.policy.max_suggestions {
            let Some(event) = stream.next().await else {
                break;
            };
            let StreamEvent::ArrayElement(element) = event? else {
                continue;
            };
            let Some(payload) = to_payload(element, &document) else {
                continue;
            };

            context
                .writer
                .write_data(DataEvent::Suggestion(payload.clone()))
                .await?;
            suggestions.push(payload);
        }
        drop(stream);

        let count = suggestions.len();
        let batch = suggestions
            .into_iter()
            .map(|payload| Suggestion {
                id: payload.id,
                document_id: payload.document_id,
                document_created_at: document.created_at,
                original_text: payload.original_text,
                suggested_text: payload.suggested_text,
                description: Some(payload.description),
                is_resolved: payload.is_resolved,
                user_id: context.user_id.clone(),
                created_at: time::now(),
            })
            .collect();
        if let Err(error) = self.store.save_suggestions(batch).await {
            tracing::warn!(
                phase = "suggestions",
                event = "save_failed",
                document_id = %document.id,
                error = %error,
            );
        }
        tracing::info!(
            phase = "suggestions",
            event = "completed",
            document_id = %document.id,
            suggestion_count = count,
        );

        Ok(json!({
            "id": document.id,
            "title": document.title,
            "kind": document.kind,
            "message": "Suggestions have been added to the document",
        })
        .to_string())
    }
}

fn to_payload(element: Value, document: &Document) -> Option<SuggestionPayload> {
    match serde_json::from_value::<SuggestionElement>(element) {
        Ok(element) => Some(SuggestionPayload {
            original_text: element.original_sentence,
            suggested_text: element.suggested_sentence,
            description: element.description,
            id: SuggestionId::generate(),
            document_id: document.id.clone(),
            is_resolved: false,
        }),
        Err(error) => {
            tracing::warn!(
                phase = "suggestions",
                event = "malformed_element",
                document_id = %document.id,
                error = %error,
            );
            None
        }
    }
}

impl Tool for RequestSuggestionsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: REQUEST_SUGGESTIONS.to_string(),
            description: "Request suggestions for a document".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "documentId": {
                        "type": "string",
                        "description": "The ID of the document to request edits",
                    },
                },
                "required": ["documentId"],
            })
            .to_string(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_args::<RequestSuggestionsArgs>(args_json)?;
            let span = tracing::info_span!(
                "tool.request_suggestions",
                document_id = %args.document_id,
                user_id = %context.user_id,
            );
            self.suggest(args, context).instrument(span).await
        })
    }
}
