use anyhow::{Context, Result};
use gateway_bridge::app::Chunk;
use gateway_bridge::config::BridgeConfig;
use gateway_bridge::environ::Environ;
use gateway_bridge::handler::function_handler;
use gateway_bridge::start_response::StartResponse;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::{Value, json};
use std::io::Read;

/// Echoes the request back as JSON.
fn echo(mut environ: Environ, start_response: &mut StartResponse) -> Result<Vec<Chunk>> {
    let mut body = String::new();
    environ
        .input()
        .read_to_string(&mut body)
        .context("Failed to read request body")?;

    let payload = json!({
        "method": environ.method(),
        "path": environ.path(),
        "query": environ.query_string(),
        "remoteAddr": environ.get("REMOTE_ADDR"),
        "scheme": environ.url_scheme(),
        "body": body,
    });

    start_response.start("200 OK", [("Content-Type", "application/json")]);
    Ok(vec![Chunk::Text(payload.to_string())])
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Use Lambda runtime's built-in tracing subscriber for CloudWatch Logs
    lambda_runtime::tracing::init_default_subscriber();

    let config = BridgeConfig::from_env()?;
    let config = &config;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(&echo, config, event).await
    }))
    .await
}
