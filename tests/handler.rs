// Handler tests
#![allow(clippy::unwrap_used, clippy::panic)]

use anyhow::{Result, bail};
use gateway_bridge::app::Chunk;
use gateway_bridge::config::BridgeConfig;
use gateway_bridge::environ::Environ;
use gateway_bridge::handler::{function_handler, respond};
use gateway_bridge::models::{BridgeError, GatewayEvent};
use gateway_bridge::start_response::StartResponse;
use lambda_runtime::{Context, LambdaEvent};
use serde_json::{Value, json};
use std::cell::Cell;
use std::io::Read;

fn hello(environ: Environ, start_response: &mut StartResponse) -> Result<Vec<Chunk>> {
    start_response.start("200 OK", [("Content-Type", "text/plain")]);
    Ok(vec![Chunk::Text(format!("hello from {}", environ.path()))])
}

fn silent(_environ: Environ, _start_response: &mut StartResponse) -> Result<Vec<Chunk>> {
    Ok(vec![Chunk::from("hi")])
}

fn failing(_environ: Environ, _start_response: &mut StartResponse) -> Result<Vec<Chunk>> {
    bail!("database unavailable")
}

fn upper_body(mut environ: Environ, start_response: &mut StartResponse) -> Result<Vec<Chunk>> {
    let mut body = String::new();
    environ.input().read_to_string(&mut body)?;
    start_response.start("200 OK", [("Content-Type", "text/plain")]);
    Ok(vec![Chunk::Text(body.to_uppercase())])
}

fn lambda_event(payload: Value) -> LambdaEvent<Value> {
    LambdaEvent {
        payload,
        context: Context::default(),
    }
}

#[test]
fn test_respond_runs_application() {
    let event: GatewayEvent = serde_json::from_value(json!({
        "httpMethod": "GET",
        "path": "/greet",
        "isBase64Encoded": false
    }))
    .unwrap();

    let response = respond(&hello, &BridgeConfig::default(), &event).unwrap();

    assert_eq!(response.status_code, "200");
    assert_eq!(response.body, "hello from /greet");
    assert_eq!(response.headers["Content-Type"], "text/plain");
}

#[test]
fn test_respond_without_start_response() {
    let event: GatewayEvent = serde_json::from_value(json!({
        "httpMethod": "GET",
        "path": "/",
        "isBase64Encoded": false
    }))
    .unwrap();

    let response = respond(&silent, &BridgeConfig::default(), &event).unwrap();

    assert_eq!(response.status_code, "500");
    assert_eq!(response.body, "hi");
}

#[test]
fn test_malformed_event_skips_application() {
    let calls = Cell::new(0);
    let counting = |_environ: Environ, _start: &mut StartResponse| -> Result<Vec<Chunk>> {
        calls.set(calls.get() + 1);
        Ok(Vec::new())
    };
    let event: GatewayEvent =
        serde_json::from_value(json!({"path": "/", "isBase64Encoded": false})).unwrap();

    let result = respond(&counting, &BridgeConfig::default(), &event);

    assert!(matches!(result, Err(BridgeError::MalformedEvent(_))));
    assert_eq!(calls.get(), 0);
}

#[tokio::test]
async fn test_function_handler_success() {
    let event = lambda_event(json!({
        "httpMethod": "POST",
        "path": "/shout",
        "body": "quiet please",
        "isBase64Encoded": false
    }));

    let response = function_handler(&upper_body, &BridgeConfig::default(), event)
        .await
        .unwrap();

    assert_eq!(response.status_code, "200");
    assert_eq!(response.body, "QUIET PLEASE");
}

#[tokio::test]
async fn test_function_handler_invalid_event() {
    let event = lambda_event(json!({"httpMethod": 42, "path": "/"}));

    let result = function_handler(&hello, &BridgeConfig::default(), event).await;
    assert!(result.is_err(), "Expected error for invalid event");

    if let Err(err) = result {
        assert_eq!(err.error_type, "InvalidEvent");
    }
}

#[tokio::test]
async fn test_function_handler_malformed_event() {
    let event = lambda_event(json!({"path": "/", "isBase64Encoded": false}));

    let result = function_handler(&hello, &BridgeConfig::default(), event).await;

    if let Err(err) = result {
        assert_eq!(err.error_type, "MalformedEvent");
        assert!(err.error_message.contains("httpMethod"));
    } else {
        panic!("Expected MalformedEvent");
    }
}

#[tokio::test]
async fn test_function_handler_decode_failure() {
    let event = lambda_event(json!({
        "httpMethod": "POST",
        "path": "/",
        "body": "%%%",
        "isBase64Encoded": true
    }));

    let result = function_handler(&hello, &BridgeConfig::default(), event).await;

    assert_eq!(result.unwrap_err().error_type, "DecodeFailure");
}

#[tokio::test]
async fn test_function_handler_application_error() {
    let event = lambda_event(json!({
        "httpMethod": "GET",
        "path": "/",
        "isBase64Encoded": false
    }));

    let result = function_handler(&failing, &BridgeConfig::default(), event).await;

    let err = result.unwrap_err();
    assert_eq!(err.error_type, "ApplicationError");
    assert!(err.error_message.contains("database unavailable"));
}
