//! Converts one model output stream into typed delta events.
//!
//! Two accumulation styles exist. Prose is appended: every text increment is
//! re-emitted verbatim and the result is the concatenation. Structured kinds are
//! replaced: each partial object snapshot carries the whole field so far, and only
//! the latest non-empty value is kept.
//!
//! ```rust
//! use futures_util::StreamExt;
//! use qartifact::GenerationStreamAdapter;
//! use qcommon::DocumentKind;
//! use qprovider::{BoxedEventStream, VecEventStream};
//! use qstream::{DataEvent, channel};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (writer, reader) = channel();
//! let producer = async move {
//!     let stream: BoxedEventStream<'static> =
//!         Box::pin(VecEventStream::text_deltas(["Hello", " world"]));
//!     GenerationStreamAdapter::new(&writer, DocumentKind::Text)
//!         .append_text(stream)
//!         .await
//! };
//! let (content, parts) = tokio::join!(producer, reader.collect::<Vec<_>>());
//!
//! assert_eq!(content.unwrap(), "Hello world");
//! assert_eq!(parts[0].part.as_data(), Some(&DataEvent::TextDelta("Hello".into())));
//! # }
//! ```

use futures_util::StreamExt;
use qcommon::DocumentKind;
use qprovider::{BoxedEventStream, StreamEvent};
use qstream::{DataEvent, DataStreamWriter};
use qtooling::ToolError;
use serde_json::Value;

pub struct GenerationStreamAdapter<'w> {
    writer: &'w DataStreamWriter,
    kind: DocumentKind,
}

impl<'w> GenerationStreamAdapter<'w> {
    pub fn new(writer: &'w DataStreamWriter, kind: DocumentKind) -> Self {
        Self { writer, kind }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Appends each text increment and emits it as a delta.
    pub async fn append_text(&self, mut stream: BoxedEventStream<'_>) -> Result<String, ToolError> {
        let mut draft = String::new();

        while let Some(event) = stream.next().await {
            if let StreamEvent::TextDelta(delta) = event? {
                if delta.is_empty() {
                    continue;
                }
                draft.push_str(&delta);
                self.emit(delta).await?;
            }
        }

        Ok(draft)
    }

    /// Tracks `field` across partial object snapshots, emitting each new non-empty
    /// value and keeping the latest one as the draft. A snapshot repeating the
    /// current draft emits nothing.
    pub async fn replace_with_field(
        &self,
        mut stream: BoxedEventStream<'_>,
        field: &str,
    ) -> Result<String, ToolError> {
        let mut draft = String::new();

        while let Some(event) = stream.next().await {
            let StreamEvent::PartialObject(object) = event? else {
                continue;
            };

            let Some(value) = object.get(field).and_then(Value::as_str) else {
                continue;
            };

            if value.is_empty() || value == draft {
                continue;
            }

            draft = value.to_string();
            self.emit(draft.clone()).await?;
        }

        Ok(draft)
    }

    /// Emits one delta carrying `content` in full.
    pub async fn emit(&self, content: impl Into<String>) -> Result<(), ToolError> {
        self.writer
            .write_data(DataEvent::delta(self.kind, content))
            .await?;
        Ok(())
    }
}
