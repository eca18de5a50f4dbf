//! Prompts and output schemas for document generation.
//!
//! ```rust
//! use qartifact::prompts::update_document_prompt;
//! use qcommon::DocumentKind;
//!
//! let prompt = update_document_prompt("a,b\n1,2", DocumentKind::Sheet);
//! assert!(prompt.starts_with("Improve the following spreadsheet"));
//! assert!(update_document_prompt("ignored", DocumentKind::Image).is_empty());
//! ```

use qcommon::DocumentKind;

pub const TEXT_PROMPT: &str =
    "Write about the given topic. Markdown is supported. Use headings wherever appropriate.";

pub const CODE_PROMPT: &str = "\
You are a Python code generator that creates self-contained, executable code snippets. When writing code:

1. Each snippet should be complete and runnable on its own
2. Prefer using print() statements to display outputs
3. Include helpful comments explaining the code
4. Keep snippets concise (generally under 15 lines)
5. Avoid external dependencies - use Python standard library
6. Handle potential errors gracefully
7. Return meaningful output that demonstrates the code's functionality
8. Don't use input() or other interactive functions
9. Don't access files or network resources
10. Don't use infinite loops
";

pub const SHEET_PROMPT: &str = "\
You are a spreadsheet creation assistant. Create a spreadsheet in csv format based on the given prompt. \
The spreadsheet should contain meaningful column headers and data.
";

pub const SUGGESTIONS_PROMPT: &str = "\
You are an expert proofreader and writing assistant. Given a piece of writing, please offer your expert \
suggestions to improve the piece of writing and describe why you think the change will improve the writing. \
It is very important for the edits you propose to contain full sentences instead of just words.";

pub const CODE_SCHEMA: &str =
    r#"{"type":"object","properties":{"code":{"type":"string"}},"required":["code"]}"#;

pub const SHEET_SCHEMA: &str = r#"{"type":"object","properties":{"csv":{"type":"string","description":"CSV data"}},"required":["csv"]}"#;

pub const SUGGESTION_SCHEMA: &str = r#"{"type":"object","properties":{"originalSentence":{"type":"string","description":"The original sentence"},"suggestedSentence":{"type":"string","description":"The suggested sentence"},"description":{"type":"string","description":"The description of the suggestion"}},"required":["originalSentence","suggestedSentence","description"]}"#;

/// System prompt used when revising an existing document. Images are regenerated
/// from the description alone, so they get no prompt.
pub fn update_document_prompt(current_content: &str, kind: DocumentKind) -> String {
    let subject = match kind {
        DocumentKind::Text => "contents of the document",
        DocumentKind::Code => "code snippet",
        DocumentKind::Sheet => "spreadsheet",
        DocumentKind::Image => return String::new(),
    };

    format!("Improve the following {subject} based on the given prompt.\n\n{current_content}\n")
}

/// Suggestion prompt with the per-call cap spelled out for the model.
pub fn suggestions_prompt(max_suggestions: usize) -> String {
    format!("{SUGGESTIONS_PROMPT} Max {max_suggestions} suggestions.")
}
