//! Streaming document generation and the tools that drive it.
//!
//! A document tool call nests a generation stream inside the conversational
//! turn: the tool frames the document (`kind`, `id`, `title`, `clear`), the
//! kind's [`DocumentHandler`] streams deltas through the same turn channel, and
//! the tool closes with `finish` before saving the result.
//!
//! ```rust
//! use qartifact::{DocumentHandlerRegistry, prompts};
//! use qcommon::DocumentKind;
//!
//! let registry = DocumentHandlerRegistry::new();
//! assert!(registry.get(DocumentKind::Text).is_err());
//! assert!(prompts::update_document_prompt("x", DocumentKind::Code).contains("code snippet"));
//! ```

mod adapter;
mod handler;
mod handlers;
mod registry;
mod tools;

pub mod prompts;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::{
        CreateDocumentTool, DocumentContext, DocumentHandler, DocumentHandlerRegistry,
        GetWeatherTool, RequestSuggestionsTool, SuggestionPolicy, UpdateDocumentTool,
    };
}

pub use adapter::GenerationStreamAdapter;
pub use handler::{DocumentContext, DocumentHandler};
pub use handlers::{
    CodeDocumentHandler, ImageDocumentHandler, SheetDocumentHandler, TextDocumentHandler,
};
pub use registry::DocumentHandlerRegistry;
pub use tools::{
    CREATE_DOCUMENT, CreateDocumentTool, GET_WEATHER, GetWeatherTool, OPEN_METEO_BASE_URL,
    REQUEST_SUGGESTIONS, RequestSuggestionsTool, SuggestionPolicy, UPDATE_DOCUMENT,
    UpdateDocumentTool,
};
