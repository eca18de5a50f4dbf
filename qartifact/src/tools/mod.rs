//! Model-callable tools: document creation, revision, suggestions, and weather.

mod create_document;
mod get_weather;
mod request_suggestions;
mod update_document;

use qstore::StoreError;
use qtooling::ToolError;
use serde_json::json;

pub use create_document::CreateDocumentTool;
pub use get_weather::{GetWeatherTool, OPEN_METEO_BASE_URL};
pub use request_suggestions::{RequestSuggestionsTool, SuggestionPolicy};
pub use update_document::UpdateDocumentTool;

pub const CREATE_DOCUMENT: &str = "createDocument";
pub const UPDATE_DOCUMENT: &str = "updateDocument";
pub const REQUEST_SUGGESTIONS: &str = "requestSuggestions";
pub const GET_WEATHER: &str = "getWeather";

/// Structured result returned to the model when a document lookup misses.
pub(crate) fn document_not_found() -> String {
    json!({ "error": "Document not found" }).to_string()
}

/// A failed required read cannot be recovered inside the tool.
pub(crate) fn read_failed(error: StoreError) -> ToolError {
    ToolError::execution(format!("document lookup failed: {error}"))
}
