//! Token set parsing

use crate::{Result, TemplateError, TemplateToken};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct RawToken {
    placeholder: String,
    #[serde(default)]
    value: Value,
}

/// Parse tokens from a JSON string
///
/// Accepts either a list of `{"placeholder": ..., "value": ...}` objects or
/// a data object whose leaves become `{{path.to.key}}` tokens:
///
/// ```ignore
/// let tokens = parse_tokens(r#"{"customer": {"name": "Ada"}}"#)?;
/// assert_eq!(tokens[0].placeholder, "{{customer.name}}");
/// ```
pub fn parse_tokens(json: &str) -> Result<Vec<TemplateToken>> {
    let value: Value = serde_json::from_str(json)?;
    tokens_from_value(&value)
}

/// Build tokens from an already parsed JSON value
pub fn tokens_from_value(value: &Value) -> Result<Vec<TemplateToken>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let raw = RawToken::deserialize(item)
                    .map_err(|e| TemplateError::ParseError(e.to_string()))?;
                Ok(TemplateToken::new(raw.placeholder, value_to_string(&raw.value)))
            })
            .collect(),
        Value::Object(_) => {
            let mut tokens = Vec::new();
            flatten(value, String::new(), &mut tokens);
            Ok(tokens)
        }
        other => Err(TemplateError::ParseError(format!(
            "expected a token list or a data object, got {other}"
        ))),
    }
}

/// Walk nested objects and arrays, emitting one token per leaf
///
/// Paths use the binding syntax of the data: `a.b` for fields, `a[0]` for
/// array elements.
fn flatten(value: &Value, path: String, tokens: &mut Vec<TemplateToken>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten(child, child_path, tokens);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(child, format!("{path}[{index}]"), tokens);
            }
        }
        leaf => tokens.push(TemplateToken::new(
            format!("{{{{{path}}}}}"),
            value_to_string(leaf),
        )),
    }
}

/// Convert a JSON value to string for rendering
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => value.to_string(),
    }
}
