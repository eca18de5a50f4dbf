//! Wire events multiplexed onto a turn's channel.
//!
//! Data events serialize to the `{ "type": ..., "content": ... }` frame shape
//! clients consume:
//!
//! ```rust
//! use qcommon::DocumentKind;
//! use qstream::DataEvent;
//!
//! let frame = serde_json::to_value(DataEvent::Kind(DocumentKind::Text)).unwrap();
//! assert_eq!(frame, serde_json::json!({ "type": "kind", "content": "text" }));
//!
//! let finish = serde_json::to_value(DataEvent::Finish).unwrap();
//! assert_eq!(finish, serde_json::json!({ "type": "finish", "content": "" }));
//! ```

use qcommon::{DocumentId, DocumentKind, SuggestionId};
use qprovider::{StopReason, TokenUsage, ToolCall};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Suggestion as it is shown to the client while generation is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPayload {
    pub original_text: String,
    pub suggested_text: String,
    pub description: String,
    pub id: SuggestionId,
    pub document_id: DocumentId,
    pub is_resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    Kind(DocumentKind),
    Id(DocumentId),
    Title(String),
    Clear,
    TextDelta(String),
    CodeDelta(String),
    SheetDelta(String),
    ImageDelta(String),
    Suggestion(SuggestionPayload),
    Finish,
}

impl DataEvent {
    /// Delta event for the given document kind.
    pub fn delta(kind: DocumentKind, content: impl Into<String>) -> Self {
        let content = content.into();
        match kind {
            DocumentKind::Text => Self::TextDelta(content),
            DocumentKind::Code => Self::CodeDelta(content),
            DocumentKind::Sheet => Self::SheetDelta(content),
            DocumentKind::Image => Self::ImageDelta(content),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Kind(_) => "kind",
            Self::Id(_) => "id",
            Self::Title(_) => "title",
            Self::Clear => "clear",
            Self::TextDelta(_) => DocumentKind::Text.delta_event_type(),
            Self::CodeDelta(_) => DocumentKind::Code.delta_event_type(),
            Self::SheetDelta(_) => DocumentKind::Sheet.delta_event_type(),
            Self::ImageDelta(_) => DocumentKind::Image.delta_event_type(),
            Self::Suggestion(_) => "suggestion",
            Self::Finish => "finish",
        }
    }

    pub fn is_delta(&self) -> bool {
        matches!(
            self,
            Self::TextDelta(_) | Self::CodeDelta(_) | Self::SheetDelta(_) | Self::ImageDelta(_)
        )
    }

    /// String content for every event except `suggestion`.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::Kind(kind) => Some(kind.as_str()),
            Self::Id(id) => Some(id.as_str()),
            Self::Title(value)
            | Self::TextDelta(value)
            | Self::CodeDelta(value)
            | Self::SheetDelta(value)
            | Self::ImageDelta(value) => Some(value.as_str()),
            Self::Clear | Self::Finish => Some(""),
            Self::Suggestion(_) => None,
        }
    }
}

#[derive(Serialize)]
struct DataFrame<'a> {
    #[serde(rename = "type")]
    event_type: &'static str,
    content: FrameContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum FrameContent<'a> {
    Text(&'a str),
    Suggestion(&'a SuggestionPayload),
}

impl Serialize for DataEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let content = match self {
            Self::Suggestion(payload) => FrameContent::Suggestion(payload),
            other => FrameContent::Text(other.text_content().unwrap_or_default()),
        };

        DataFrame {
            event_type: self.event_type(),
            content,
        }
        .serialize(serializer)
    }
}

/// Every unit a turn can put on its channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "part", content = "value", rename_all = "kebab-case")]
pub enum StreamPart {
    /// Assistant text from the conversational model.
    Text(String),
    Reasoning(String),
    /// Document-generation and suggestion events.
    Data(DataEvent),
    ToolCall(ToolCall),
    #[serde(rename_all = "camelCase")]
    ToolResult { tool_call_id: String, result: Value },
    #[serde(rename_all = "camelCase")]
    StepFinish { step: usize, stop_reason: StopReason },
    /// Generic, client-safe error text. Never backend detail.
    Error(String),
    #[serde(rename_all = "camelCase")]
    Finish {
        stop_reason: StopReason,
        usage: TokenUsage,
    },
}

impl StreamPart {
    pub fn as_data(&self) -> Option<&DataEvent> {
        match self {
            Self::Data(event) => Some(event),
            _ => None,
        }
    }
}

/// A part stamped with its position in the turn's total order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequencedPart {
    pub sequence: u64,
    #[serde(flatten)]
    pub part: StreamPart,
}

impl SequencedPart {
    /// One JSON frame, newline-terminated.
    pub fn to_wire_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
