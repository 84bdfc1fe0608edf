//! Captures the application's status, headers and body, and renders them as
//! a gateway response.

use crate::app::Chunk;
use crate::config::BridgeConfig;
use crate::models::GatewayResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lambda_runtime::tracing::warn;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;

/// Status reported when the application never registers one
pub const DEFAULT_STATUS: &str = "500";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Unset,
    Registered {
        status: String,
        headers: Vec<(String, String)>,
    },
}

/// Response collector handed to the application.
///
/// Starts out unset. [`StartResponse::start`] moves it to registered and
/// hands back a [`BodyWriter`]; there is no way to write body bytes before
/// registering. [`StartResponse::finish`] consumes the collector, so nothing
/// can change after the response is rendered.
///
/// The read accessors (`status`, `headers`, `written`, `is_registered`) and
/// `render` are public so frameworks can inspect what they registered, but
/// none of them mutate the collector; `start` and the returned writer are
/// the only way to change the response.
#[derive(Debug, Default)]
pub struct StartResponse {
    phase: Phase,
    body: Vec<u8>,
}

/// Streaming writer over the response body buffer.
#[derive(Debug)]
pub struct BodyWriter<'a> {
    buffer: &'a mut Vec<u8>,
}

impl io::Write for BodyWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StartResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the status line and response headers.
    ///
    /// Only the leading token of `status` is kept (`"404 Not Found"` becomes
    /// `"404"`). Calling this again replaces both the status and the whole
    /// header list; headers are never merged across calls.
    pub fn start<I, K, V>(&mut self, status: &str, headers: I) -> BodyWriter<'_>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let status = status.split_whitespace().next().map_or_else(
            || {
                warn!("Empty status line registered, keeping default status");
                DEFAULT_STATUS.to_string()
            },
            str::to_string,
        );

        self.phase = Phase::Registered {
            status,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        };

        BodyWriter {
            buffer: &mut self.body,
        }
    }

    #[must_use]
    pub const fn is_registered(&self) -> bool {
        matches!(self.phase, Phase::Registered { .. })
    }

    /// Registered status code, or [`DEFAULT_STATUS`].
    #[must_use]
    pub fn status(&self) -> &str {
        match &self.phase {
            Phase::Unset => DEFAULT_STATUS,
            Phase::Registered { status, .. } => status,
        }
    }

    /// Registered header list in registration order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        match &self.phase {
            Phase::Unset => &[],
            Phase::Registered { headers, .. } => headers,
        }
    }

    /// Bytes written so far through the [`BodyWriter`].
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.body
    }

    /// Renders the captured state plus `output` into a gateway response.
    ///
    /// Does not modify the collector, so rendering twice with the same
    /// output gives the same response.
    pub fn render<I>(&self, output: I, config: &BridgeConfig) -> GatewayResponse
    where
        I: IntoIterator<Item = Chunk>,
    {
        if !self.is_registered() {
            warn!("Application never called start_response, responding with {DEFAULT_STATUS}");
        }

        let headers: BTreeMap<String, String> = self.headers().iter().cloned().collect();

        let is_base64_encoded = is_binary_response(
            header_value(&headers, "Content-Encoding"),
            header_value(&headers, "Content-Type"),
            config,
        );

        // Chunks may split a UTF-8 sequence, so decode only after joining
        let mut raw = self.body.clone();
        for chunk in output {
            raw.extend_from_slice(chunk.as_bytes());
        }

        let body = if is_base64_encoded {
            STANDARD.encode(raw)
        } else {
            bytes_to_text(&raw).into_owned()
        };

        GatewayResponse {
            status_code: self.status().to_string(),
            headers,
            body,
            is_base64_encoded,
        }
    }

    /// Renders and consumes the collector.
    pub fn finish<I>(self, output: I, config: &BridgeConfig) -> GatewayResponse
    where
        I: IntoIterator<Item = Chunk>,
    {
        self.render(output, config)
    }
}

/// Decides whether a response body must be base64 encoded.
///
/// True when the content encoding or the content type (media type only,
/// parameters ignored) is in the configured binary sets. Missing or unknown
/// values classify as text.
#[must_use]
pub fn is_binary_response(
    content_encoding: Option<&str>,
    content_type: Option<&str>,
    config: &BridgeConfig,
) -> bool {
    let binary_encoding = content_encoding.is_some_and(|encoding| {
        config
            .binary_encodings
            .contains(&encoding.trim().to_ascii_lowercase())
    });

    let binary_type = content_type.is_some_and(|content_type| {
        let media_type = content_type.split(';').next().unwrap_or_default();
        config
            .binary_content_types
            .contains(&media_type.trim().to_ascii_lowercase())
    });

    binary_encoding || binary_type
}

/// Exact-name lookup with a case-insensitive fallback.
fn header_value<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}

fn bytes_to_text(bytes: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        warn!("Response body is not valid UTF-8, invalid sequences replaced");
    }
    text
}
