use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response value returned to the gateway.
///
/// `is_base64_encoded` always describes how `body` was produced; it is never
/// set on its own.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}
