//! Table-driven argument coercion
//!
//! Each declared type tag maps to one coercion function. Inputs are either raw
//! strings (literal queries) or already typed JSON values (agent calls).

use serde_json::{Map, Number, Value};

use super::error::{InvokeError, InvokeResult};
use crate::tools::{ParamType, ToolDefinition};

/// Argument mapping handed to the invoker
pub type Arguments = Map<String, Value>;

type Coercion = fn(&Value) -> Option<Value>;

fn coercion_for(param_type: ParamType) -> Coercion {
    match param_type {
        ParamType::String => to_string,
        ParamType::Number => to_number,
        ParamType::Integer => to_integer,
        ParamType::Float => to_float,
        ParamType::Boolean => to_boolean,
        ParamType::Object => to_object,
        ParamType::Array => to_array,
        ParamType::Any => passthrough,
    }
}

fn to_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        other => Some(Value::String(other.to_string())),
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| Value::from(f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Number::from_f64(f).map(Value::Number)
}

/// Integral values stay integers, everything else becomes a float
fn to_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Some(Value::from(i)),
            Err(_) => to_float(value),
        },
        _ => None,
    }
}

fn to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(Value::Bool(true)),
            "false" | "0" | "no" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn to_object(value: &Value) -> Option<Value> {
    match value {
        Value::Object(_) => Some(value.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
            Ok(parsed @ Value::Object(_)) => Some(parsed),
            _ => None,
        },
        _ => None,
    }
}

fn to_array(value: &Value) -> Option<Value> {
    match value {
        Value::Array(_) => Some(value.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
            Ok(parsed @ Value::Array(_)) => Some(parsed),
            _ => None,
        },
        _ => None,
    }
}

fn passthrough(value: &Value) -> Option<Value> {
    Some(value.clone())
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce one value to a declared type
pub fn coerce_value(param: &str, type_name: &str, value: &Value) -> InvokeResult<Value> {
    let param_type = ParamType::parse(type_name).unwrap_or(ParamType::Any);
    let value = match value {
        Value::String(s) if param_type != ParamType::String => Value::String(s.trim().to_string()),
        other => other.clone(),
    };
    coercion_for(param_type)(&value)
        .ok_or_else(|| InvokeError::parameter_type(param, type_name, describe(&value)))
}

/// Coerce a whole argument mapping against a definition's schema
///
/// Output follows declaration order. Missing optional arguments are omitted,
/// missing required ones fail. Arguments the schema does not declare are dropped.
pub fn coerce_arguments(def: &ToolDefinition, args: &Arguments) -> InvokeResult<Arguments> {
    let mut coerced = Map::new();
    for (name, spec) in &def.input_schema {
        let raw = args.get(name);
        if is_absent(raw) {
            if spec.required {
                return Err(InvokeError::missing(name));
            }
            continue;
        }
        if let Some(raw) = raw {
            coerced.insert(name.clone(), coerce_value(name, &spec.type_name, raw)?);
        }
    }
    Ok(coerced)
}

/// Bind positional raw strings to the schema's parameters in declaration order
pub fn bind_positional(def: &ToolDefinition, raw: &[&str]) -> Arguments {
    def.param_names()
        .zip(raw.iter())
        .map(|(name, value)| (name.to_string(), Value::String(value.trim().to_string())))
        .collect()
}
