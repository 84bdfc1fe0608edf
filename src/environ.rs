//! Builds the synchronous-interface request environ from a gateway event.

use crate::config::{Base64Flag, BridgeConfig, HeaderValuePolicy};
use crate::models::{BridgeError, GatewayEvent};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lambda_runtime::tracing::{debug, warn};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Cursor};

/// Interface version advertised to applications
pub const VERSION: (u8, u8) = (1, 0);

const DEFAULT_REMOTE_ADDR: &str = "127.0.0.1";
const SERVER_PROTOCOL: &str = "HTTP/1.1";

/// The request as the application sees it.
///
/// CGI-style variables live in a flat map. A key that is present with no
/// value (for example the authorizer config when the event has none) is
/// distinct from a key that was never set.
#[derive(Debug)]
pub struct Environ {
    vars: BTreeMap<String, Option<String>>,
    input: Cursor<Vec<u8>>,
    url_scheme: String,
}

impl Environ {
    /// Value of a variable, `None` when unset or set to no value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(Option::as_deref)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// All variables in key order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    #[must_use]
    pub fn method(&self) -> &str {
        self.get("REQUEST_METHOD").unwrap_or_default()
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.get("PATH_INFO").unwrap_or_default()
    }

    #[must_use]
    pub fn query_string(&self) -> &str {
        self.get("QUERY_STRING").unwrap_or_default()
    }

    /// Length of the decoded request body in bytes.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.input.get_ref().len()
    }

    /// Readable request body, positioned at the start on construction.
    pub const fn input(&mut self) -> &mut Cursor<Vec<u8>> {
        &mut self.input
    }

    #[must_use]
    pub fn url_scheme(&self) -> &str {
        &self.url_scheme
    }

    #[must_use]
    pub fn errors(&self) -> io::Stderr {
        io::stderr()
    }

    #[must_use]
    pub const fn version(&self) -> (u8, u8) {
        VERSION
    }

    #[must_use]
    pub const fn multithread(&self) -> bool {
        false
    }

    #[must_use]
    pub const fn multiprocess(&self) -> bool {
        false
    }

    #[must_use]
    pub const fn run_once(&self) -> bool {
        false
    }

    fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), Some(value.into()));
    }
}

/// Translates a gateway event into an [`Environ`].
///
/// # Errors
///
/// - `MalformedEvent` if `httpMethod` or `path` is missing, or if the
///   base64 flag is missing and the config requires it
/// - `DecodeFailure` if a body flagged as base64 does not decode
pub fn build_environ(event: &GatewayEvent, config: &BridgeConfig) -> Result<Environ, BridgeError> {
    let method = event
        .method
        .as_deref()
        .ok_or(BridgeError::MalformedEvent("httpMethod"))?;
    let path = event
        .path
        .as_deref()
        .ok_or(BridgeError::MalformedEvent("path"))?;

    let body = decode_body(event, config.base64_flag)?;

    let mut environ = Environ {
        vars: BTreeMap::new(),
        input: Cursor::new(Vec::new()),
        url_scheme: "http".to_string(),
    };

    environ.set("REQUEST_METHOD", method);
    environ.set("SCRIPT_NAME", "");
    environ.set("PATH_INFO", path);
    environ.set("QUERY_STRING", encode_query(event.query_parameters.as_ref()));
    environ.set("REMOTE_ADDR", DEFAULT_REMOTE_ADDR);
    environ.set("CONTENT_LENGTH", body.len().to_string());
    environ.set("SERVER_PROTOCOL", SERVER_PROTOCOL);
    environ.input = Cursor::new(body);

    // Sorted so names that only differ in case resolve the same way every time
    if let Some(headers) = &event.headers {
        let mut headers: Vec<_> = headers.iter().collect();
        headers.sort_unstable();
        for (name, value) in headers {
            project_header(&mut environ, name, value, config.header_values);
        }
    }

    environ.vars.insert(
        config.authorizer_config_key.clone(),
        event.authorizer_config(),
    );

    debug!(
        method = %environ.method(),
        path = %environ.path(),
        content_length = environ.content_length(),
        "Built environ"
    );

    Ok(environ)
}

/// Normalizes a header name into its environ form: ASCII uppercase with
/// every other character replaced by `_`.
#[must_use]
pub fn normalize_header_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Encodes query parameters as `k=v` pairs joined by `&`, sorted by key.
///
/// Each parameter holds exactly one value; multi-value parameters are not
/// expanded.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn encode_query(params: Option<&HashMap<String, String>>) -> String {
    let Some(params) = params else {
        return String::new();
    };

    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_unstable();

    pairs
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_body(event: &GatewayEvent, flag: Base64Flag) -> Result<Vec<u8>, BridgeError> {
    let is_base64 = match (event.is_base64_encoded, flag) {
        (Some(is_base64), _) => is_base64,
        (None, Base64Flag::Optional) => false,
        (None, Base64Flag::Required) => {
            return Err(BridgeError::MalformedEvent("isBase64Encoded"));
        }
    };

    let body = event.body.as_deref().unwrap_or_default();
    if is_base64 {
        Ok(STANDARD.decode(body)?)
    } else {
        Ok(body.as_bytes().to_vec())
    }
}

fn project_header(environ: &mut Environ, name: &str, value: &str, policy: HeaderValuePolicy) {
    let key = normalize_header_name(name);

    match key.as_str() {
        "CONTENT_TYPE" => environ.set("CONTENT_TYPE", value),
        "HOST" => environ.set("SERVER_NAME", value),
        "X_FORWARDED_FOR" => {
            let client = value.split(',').next().unwrap_or_default().trim();
            environ.set("REMOTE_ADDR", client);
        }
        "X_FORWARDED_PROTO" => environ.url_scheme = value.to_string(),
        "X_FORWARDED_PORT" => environ.set("SERVER_PORT", value),
        _ => {}
    }

    let value = match policy {
        HeaderValuePolicy::Raw => value.to_string(),
        HeaderValuePolicy::AsciiReplace => {
            let sanitized = to_ascii_lossy(value);
            if sanitized != value {
                warn!(header = %name, "Replaced non-ASCII characters in header value");
            }
            sanitized
        }
    };

    environ.set(format!("HTTP_{key}"), value);
}

fn to_ascii_lossy(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}
