//! Response formatting

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("valid placeholder pattern"));

/// Decoded response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Json(Value),
    Text(String),
}

impl ToolOutput {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ToolOutput::Json(v) => Some(v),
            ToolOutput::Text(_) => None,
        }
    }

    /// Whole result as text: strings unquoted, structures as JSON
    pub fn stringify(&self) -> String {
        match self {
            ToolOutput::Text(s) => s.clone(),
            ToolOutput::Json(Value::String(s)) => s.clone(),
            ToolOutput::Json(v) => v.to_string(),
        }
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render an output through an optional `{field}` template
///
/// The template applies to JSON objects only; missing fields become empty
/// strings. Anything else is stringified whole.
pub fn render(template: Option<&str>, output: &ToolOutput) -> String {
    match (template, output) {
        (Some(template), ToolOutput::Json(Value::Object(fields))) => PLACEHOLDER
            .replace_all(template, |caps: &Captures| field_text(fields.get(caps[1].trim())))
            .into_owned(),
        _ => output.stringify(),
    }
}
