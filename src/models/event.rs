//! API Gateway proxy event model.
//!
//! Only the fields the bridge reads are modeled. Both the proxy integration
//! names (`httpMethod`, `queryStringParameters`, `isBase64Encoded`) and the
//! shorter neutral names are accepted.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Request event handed to the function by the gateway.
///
/// `method` and `path` are required, but they are modeled as options so a
/// missing field surfaces as a `MalformedEvent` naming the field instead of a
/// generic deserialization failure.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[serde(rename = "httpMethod", alias = "method")]
    pub method: Option<String>,
    pub path: Option<String>,
    #[serde(rename = "queryStringParameters", alias = "queryParameters")]
    pub query_parameters: Option<HashMap<String, String>>,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<String>,
    #[serde(rename = "isBase64Encoded", alias = "isBodyBase64Encoded")]
    pub is_base64_encoded: Option<bool>,
    pub request_context: Option<Value>,
}

impl GatewayEvent {
    /// Looks up `requestContext.authorizer.config`.
    ///
    /// Absent at any level yields `None`. String values are returned as-is,
    /// any other JSON value is returned in its serialized form.
    #[must_use]
    pub fn authorizer_config(&self) -> Option<String> {
        let config = self
            .request_context
            .as_ref()?
            .get("authorizer")?
            .get("config")?;

        match config {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
