use crate::app::Application;
use crate::config::BridgeConfig;
use crate::environ::build_environ;
use crate::models::{BridgeError, GatewayEvent, GatewayResponse};
use crate::start_response::StartResponse;
use lambda_runtime::tracing::{debug, error, info};
use lambda_runtime::{Diagnostic, LambdaEvent};
use serde_json::Value;

/// Runs one request through `app`.
///
/// Builds the environ, calls the application with a fresh
/// [`StartResponse`], then renders the captured output. Nothing is shared
/// between invocations.
///
/// # Errors
///
/// Returns `MalformedEvent` or `DecodeFailure` before the application is
/// called if the event cannot be translated, and `Application` if the
/// application itself fails.
pub fn respond<A: Application>(
    app: &A,
    config: &BridgeConfig,
    event: &GatewayEvent,
) -> Result<GatewayResponse, BridgeError> {
    let environ = build_environ(event, config)?;

    let mut start_response = StartResponse::new();
    let output = app.call(environ, &mut start_response)?;
    let response = start_response.finish(output, config);

    info!(
        status = %response.status_code,
        is_base64_encoded = response.is_base64_encoded,
        "Rendered response"
    );

    Ok(response)
}

/// Lambda event handler. Decodes the raw payload as a gateway event and
/// hands it to [`respond`].
/// Logs the full event when `RUST_LOG=debug/trace`, only the request id in
/// production.
///
/// # Errors
///
/// Returns a `Diagnostic` whose `error_type` is one of:
///
/// - `InvalidEvent`: the payload is not shaped like a gateway event
/// - `MalformedEvent`: a required field is missing
/// - `DecodeFailure`: the base64 request body does not decode
/// - `ApplicationError`: the application returned an error
pub async fn function_handler<A: Application>(
    app: &A,
    config: &BridgeConfig,
    event: LambdaEvent<Value>,
) -> Result<GatewayResponse, Diagnostic> {
    let (payload, context) = event.into_parts();

    info!(request_id = %context.request_id, "Handling gateway event");
    debug!("Received event: {:?}", payload);

    let result = serde_json::from_value::<GatewayEvent>(payload)
        .map_err(BridgeError::from)
        .and_then(|event| respond(app, config, &event));

    result.map_err(|e| {
        error!(error = %e, error_type = e.kind(), "Invocation failed");
        Diagnostic::from(e)
    })
}
