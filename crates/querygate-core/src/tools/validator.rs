//! Schema validation for tool definitions
//!
//! Pure functions. Every violation found is reported, not just the first.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::definition::{HttpMethod, ParamType, ToolDefinition, ToolKind};
use super::error::ValidationError;

/// Tool names: letters/digits/underscore first, no separators or whitespace
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}_][\p{L}\p{N}_.\-]{0,63}$").expect("valid name pattern"));

/// Parameter names: identifier-like
static PARAM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]{0,63}$").expect("valid param pattern"));

/// How strict the parameter checks are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// `required` may be omitted and defaults to false
    #[default]
    Lenient,
    /// every parameter must carry an explicit `required` boolean
    Strict,
}

impl ValidationMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }
}

pub fn is_valid_tool_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

pub fn is_valid_param_name(name: &str) -> bool {
    PARAM_PATTERN.is_match(name)
}

/// Validate a wire-shape definition and produce the typed form
pub fn validate(raw: &Value, mode: ValidationMode) -> Result<ToolDefinition, ValidationError> {
    let mut violations = Vec::new();

    let Some(obj) = raw.as_object() else {
        return Err(ValidationError::new(vec![
            "definition must be a JSON object".to_string(),
        ]));
    };

    match obj.get("name") {
        Some(Value::String(name)) if is_valid_tool_name(name) => {}
        Some(Value::String(name)) => violations.push(format!(
            "name '{}' must start with a letter, digit or '_' and contain no separators or whitespace (max 64 chars)",
            name
        )),
        Some(_) => violations.push("name must be a string".to_string()),
        None => violations.push("name is required".to_string()),
    }

    match obj.get("type") {
        Some(Value::String(kind)) if ToolKind::parse(kind).is_some() => {}
        Some(other) => violations.push(format!(
            "type {} is not one of {:?}",
            other,
            ToolKind::ALL
        )),
        None => violations.push("type is required".to_string()),
    }

    match obj.get("url") {
        Some(Value::String(url)) => {
            if let Err(reason) = check_url(url) {
                violations.push(reason);
            }
        }
        Some(_) => violations.push("url must be a string".to_string()),
        None => violations.push("url is required".to_string()),
    }

    match obj.get("method") {
        Some(Value::String(method)) if HttpMethod::parse(method).is_some() => {}
        Some(other) => violations.push(format!(
            "method {} is not one of {:?}",
            other,
            HttpMethod::ALL
        )),
        None => violations.push("method is required".to_string()),
    }

    match obj.get("description") {
        None | Some(Value::String(_)) => {}
        Some(_) => violations.push("description must be a string".to_string()),
    }
    if mode == ValidationMode::Strict && !obj.contains_key("description") {
        violations.push("description is required".to_string());
    }

    match obj.get("input_schema") {
        Some(Value::Object(params)) if params.is_empty() => {
            violations.push("input_schema must declare at least one parameter".to_string())
        }
        Some(Value::Object(params)) => {
            for (param, spec) in params {
                check_param(param, spec, mode, &mut violations);
            }
        }
        Some(_) => violations.push("input_schema must be an object".to_string()),
        None => violations.push("input_schema is required".to_string()),
    }

    match obj.get("response_format") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => violations.push("response_format must be a string".to_string()),
    }

    if !violations.is_empty() {
        return Err(ValidationError::new(violations));
    }

    serde_json::from_value(raw.clone())
        .map_err(|e| ValidationError::new(vec![format!("definition could not be decoded: {}", e)]))
}

/// Re-check an already typed definition (it may have been built in code)
pub fn validate_definition(
    def: &ToolDefinition,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    validate(&def.to_value(), mode).map(|_| ())
}

fn check_url(url: &str) -> Result<(), String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| format!("url '{}' is not a valid URI: {}", url, e))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("url scheme '{}' is not http or https", other)),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(format!("url '{}' has no host", url));
    }
    Ok(())
}

fn check_param(name: &str, spec: &Value, mode: ValidationMode, violations: &mut Vec<String>) {
    if !is_valid_param_name(name) {
        violations.push(format!(
            "parameter name '{}' must be an identifier (letters, digits, '_')",
            name
        ));
    }

    let Some(spec) = spec.as_object() else {
        violations.push(format!("parameter '{}' must be an object", name));
        return;
    };

    match spec.get("type") {
        Some(Value::String(t)) if ParamType::parse(t).is_some() => {}
        Some(other) => violations.push(format!(
            "parameter '{}' has unsupported type {}",
            name, other
        )),
        None => violations.push(format!("parameter '{}' is missing a type", name)),
    }

    match spec.get("required") {
        Some(Value::Bool(_)) => {}
        Some(_) => violations.push(format!("parameter '{}' required flag must be a boolean", name)),
        None if mode == ValidationMode::Strict => {
            violations.push(format!("parameter '{}' must declare required: true|false", name))
        }
        None => {}
    }
}
