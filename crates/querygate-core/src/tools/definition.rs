//! Declarative tool definitions
//!
//! Wire shape (as persisted and as accepted by `register_json`):
//!
//! ```json
//! {
//!   "name": "weather",
//!   "type": "API",
//!   "url": "http://127.0.0.1:5000/weather",
//!   "method": "GET",
//!   "description": "Current weather for a city",
//!   "input_schema": { "city": { "type": "string", "required": true } },
//!   "response_format": "Temp: {temp}"
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::types::Tool;

/// Kind of backend a tool fronts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    #[serde(rename = "SQL")]
    Sql,
    #[serde(rename = "API")]
    Api,
}

impl ToolKind {
    pub const ALL: [&'static str; 2] = ["SQL", "API"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Sql => "SQL",
            ToolKind::Api => "API",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SQL" => Some(ToolKind::Sql),
            "API" => Some(ToolKind::Api),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP verb used to reach the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [&'static str; 5] = ["GET", "POST", "PUT", "DELETE", "PATCH"];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    /// GET carries arguments in the query string, everything else in a JSON body
    pub fn uses_query_string(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared parameter type. Several spellings map onto one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    /// `number`: integer when integral, float otherwise
    Number,
    /// `int` / `integer`
    Integer,
    Float,
    Boolean,
    Object,
    Array,
    Any,
}

impl ParamType {
    /// Every spelling accepted in `input_schema.*.type`
    pub const SPELLINGS: [&'static str; 14] = [
        "string", "number", "int", "integer", "float", "boolean", "bool", "object", "dict",
        "array", "list", "any", "str", "double",
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "string" | "str" => Some(ParamType::String),
            "number" => Some(ParamType::Number),
            "int" | "integer" => Some(ParamType::Integer),
            "float" | "double" => Some(ParamType::Float),
            "boolean" | "bool" => Some(ParamType::Boolean),
            "object" | "dict" => Some(ParamType::Object),
            "array" | "list" => Some(ParamType::Array),
            "any" => Some(ParamType::Any),
            _ => None,
        }
    }

    /// JSON Schema type keyword advertised to agents
    pub fn json_schema_type(&self) -> Option<&'static str> {
        match self {
            ParamType::String => Some("string"),
            ParamType::Number | ParamType::Float => Some("number"),
            ParamType::Integer => Some("integer"),
            ParamType::Boolean => Some("boolean"),
            ParamType::Object => Some("object"),
            ParamType::Array => Some("array"),
            ParamType::Any => None,
        }
    }
}

/// One entry of `input_schema`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Type tag as written by the author (kept verbatim for round-trips)
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
}

impl ParamSpec {
    pub fn new(type_name: impl Into<String>, required: bool) -> Self {
        Self {
            type_name: type_name.into(),
            required,
        }
    }

    /// Parsed tag; unknown spellings never get past the validator, `Any` is the fallback
    pub fn param_type(&self) -> ParamType {
        ParamType::parse(&self.type_name).unwrap_or(ParamType::Any)
    }
}

/// A validated, declarative HTTP tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub description: String,
    /// Parameters in declaration order; literal queries bind positionally
    pub input_schema: IndexMap<String, ParamSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        kind: ToolKind,
        method: HttpMethod,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            url: url.into(),
            method,
            description: String::new(),
            input_schema: IndexMap::new(),
            response_format: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, type_name: &str, required: bool) -> Self {
        self.input_schema
            .insert(name.into(), ParamSpec::new(type_name, required));
        self
    }

    pub fn with_response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = Some(format.into());
        self
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.input_schema.keys().map(String::as_str)
    }

    /// Wire-shape JSON
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// JSON Schema object describing the parameters, for agent-side tool selection
    pub fn parameters_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, spec) in &self.input_schema {
            let property = match spec.param_type().json_schema_type() {
                Some(t) => json!({ "type": t }),
                None => json!({}),
            };
            properties.insert(name.clone(), property);
            if spec.required {
                required.push(Value::String(name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        schema.insert("required".to_string(), Value::Array(required));
        schema
    }

    /// Usage hint shown when a tool is named without arguments
    pub fn usage_hint(&self) -> String {
        let placeholders: Vec<String> = self.param_names().map(|p| format!("<{}>", p)).collect();
        let mut lines = vec![
            format!("Please provide arguments, pattern: {}:{}", self.name, placeholders.join(",")),
            "Parameters:".to_string(),
        ];
        for (name, spec) in &self.input_schema {
            lines.push(format!(
                "- {} ({}, {})",
                name,
                spec.type_name,
                if spec.required { "required" } else { "optional" }
            ));
        }
        lines.join("\n")
    }

    /// Full description shown for a tool detail query
    pub fn detail(&self) -> String {
        let mut lines = vec![
            format!("Tool {} configuration:", self.name),
            format!("- description: {}", self.description),
            format!("- method: {}", self.method),
            format!("- type: {}", self.kind),
            format!("- url: {}", self.url),
            "- input schema:".to_string(),
        ];
        for (name, spec) in &self.input_schema {
            lines.push(format!(
                "  - {} (type: {}, {})",
                name,
                spec.type_name,
                if spec.required { "required" } else { "optional" }
            ));
        }
        if let Some(format) = &self.response_format {
            lines.push(format!("- response format: {}", format));
        }
        lines.join("\n")
    }
}

impl From<&ToolDefinition> for Tool {
    fn from(def: &ToolDefinition) -> Self {
        Tool::new(&def.name, &def.description).with_schema(Value::Object(def.parameters_schema()))
    }
}
