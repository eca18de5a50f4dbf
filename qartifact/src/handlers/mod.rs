//! Built-in handlers, one per document kind.

mod code;
mod image;
mod sheet;
mod text;

pub use code::CodeDocumentHandler;
pub use image::ImageDocumentHandler;
pub use sheet::SheetDocumentHandler;
pub use text::TextDocumentHandler;
