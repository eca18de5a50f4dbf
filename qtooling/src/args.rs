//! JSON argument parsing helpers for function and trait-based tools.
//!
//! ```rust
//! use qtooling::{parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"documentId":"doc-1"}"#).expect("object should parse");
//! let id = required_string(&args, "documentId").expect("id should be present");
//! assert_eq!(id, "doc-1");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    let value = parse_json_value(args_json)?;
    value
        .as_object()
        .cloned()
        .ok_or_else(|| ToolError::invalid_arguments("expected JSON object arguments"))
}

/// Deserializes arguments straight into a typed parameter struct.
pub fn parse_args<T>(args_json: &str) -> Result<T, ToolError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid arguments: {err}")))
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn required_f64(args: &Map<String, Value>, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required number: '{key}'")))
}
