//! DynamicInvoker against real HTTP endpoints

mod common;

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Map, Value};

use querygate_core::invoker::{DynamicInvoker, InvokeError, InvokerSettings, ToolOutput};
use querygate_core::logging::NoOpLogger;
use querygate_core::tools::{HttpMethod, ToolDefinition, ToolKind};

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn get_decodes_json() {
    let server = common::serve().await;
    let invoker = DynamicInvoker::new(InvokerSettings::default(), Arc::new(NoOpLogger::new())).unwrap();
    let def = ToolDefinition::new("weather", ToolKind::Api, HttpMethod::Get, server.url("/weather"))
        .with_param("city", "string", true);

    let output = invoker.invoke(&def, &args(json!({"city": "Oslo"}))).await.unwrap();
    assert_eq!(output, ToolOutput::Json(json!({"temp": 20, "city": "Oslo"})));
}

#[tokio::test]
async fn missing_required_argument_makes_no_call() {
    let server = common::serve().await;
    let invoker = DynamicInvoker::new(InvokerSettings::default(), Arc::new(NoOpLogger::new())).unwrap();
    let def = ToolDefinition::new("weather", ToolKind::Api, HttpMethod::Get, server.url("/weather"))
        .with_param("city", "string", true);

    let err = invoker.invoke(&def, &Map::new()).await.unwrap_err();
    assert_eq!(err, InvokeError::missing("city"));
    assert_eq!(server.hits.count(), 0);
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = common::serve().await;
    let settings = InvokerSettings {
        connect_timeout_ms: 200,
        read_timeout_ms: 200,
        write_timeout_ms: 100,
        acquire_timeout_ms: 100,
    };
    let invoker = DynamicInvoker::new(settings, Arc::new(NoOpLogger::new())).unwrap();
    let def = ToolDefinition::new("slow", ToolKind::Api, HttpMethod::Get, server.url("/slow"))
        .with_param("q", "string", false);

    let started = Instant::now();
    let err = invoker.invoke(&def, &Map::new()).await.unwrap_err();
    assert!(matches!(err, InvokeError::Timeout(_)), "got {:?}", err);
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
}
