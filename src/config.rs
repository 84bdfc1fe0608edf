//! Bridge configuration.
//!
//! Deployments disagree on a few details of the event contract: which
//! responses count as binary, whether `isBase64Encoded` must be present, and
//! whether header values are forced to ASCII. These are settings here rather
//! than hard-coded choices.

use anyhow::{Result, bail};
use std::collections::BTreeSet;

/// Content encodings whose payload is binary by default
pub const DEFAULT_BINARY_ENCODINGS: &[&str] = &["gzip"];

/// Content types whose payload is binary by default
pub const DEFAULT_BINARY_CONTENT_TYPES: &[&str] = &["application/font-woff"];

/// Environ key that receives `requestContext.authorizer.config` by default
pub const DEFAULT_AUTHORIZER_CONFIG_KEY: &str = "HTTP_X_AUTHORIZER_CONFIG";

/// Whether the event must carry the `isBase64Encoded` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Base64Flag {
    /// A missing flag is a malformed event
    #[default]
    Required,
    /// A missing flag means the body is plain text
    Optional,
}

/// How header values are written into `HTTP_*` environ entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderValuePolicy {
    /// Non-ASCII characters are replaced with `?`
    #[default]
    AsciiReplace,
    /// Values are copied unchanged
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub binary_encodings: BTreeSet<String>,
    pub binary_content_types: BTreeSet<String>,
    pub base64_flag: Base64Flag,
    pub header_values: HeaderValuePolicy,
    pub authorizer_config_key: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            binary_encodings: to_set(DEFAULT_BINARY_ENCODINGS.iter().copied()),
            binary_content_types: to_set(DEFAULT_BINARY_CONTENT_TYPES.iter().copied()),
            base64_flag: Base64Flag::default(),
            header_values: HeaderValuePolicy::default(),
            authorizer_config_key: DEFAULT_AUTHORIZER_CONFIG_KEY.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Builds a config from `BRIDGE_*` environment variables, falling back to
    /// the defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `BRIDGE_BASE64_FLAG` or `BRIDGE_HEADER_VALUES`
    /// holds an unrecognized value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BridgeConfig::from_env`] but reads variables through
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a policy variable holds an unrecognized value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(list) = lookup("BRIDGE_BINARY_ENCODINGS") {
            config.binary_encodings = to_set(split_list(&list));
        }
        if let Some(list) = lookup("BRIDGE_BINARY_CONTENT_TYPES") {
            config.binary_content_types = to_set(split_list(&list));
        }
        if let Some(flag) = lookup("BRIDGE_BASE64_FLAG") {
            config.base64_flag = match flag.trim().to_ascii_lowercase().as_str() {
                "required" => Base64Flag::Required,
                "optional" => Base64Flag::Optional,
                other => bail!("Unknown BRIDGE_BASE64_FLAG value: {other}"),
            };
        }
        if let Some(policy) = lookup("BRIDGE_HEADER_VALUES") {
            config.header_values = match policy.trim().to_ascii_lowercase().as_str() {
                "ascii" => HeaderValuePolicy::AsciiReplace,
                "raw" => HeaderValuePolicy::Raw,
                other => bail!("Unknown BRIDGE_HEADER_VALUES value: {other}"),
            };
        }
        if let Some(key) = lookup("BRIDGE_AUTHORIZER_CONFIG_KEY")
            && !key.trim().is_empty()
        {
            config.authorizer_config_key = key.trim().to_string();
        }

        Ok(config)
    }

    /// Adds a content type to the binary set.
    #[must_use]
    pub fn with_binary_content_type(mut self, content_type: &str) -> Self {
        self.binary_content_types
            .insert(content_type.trim().to_ascii_lowercase());
        self
    }

    /// Adds a content encoding to the binary set.
    #[must_use]
    pub fn with_binary_encoding(mut self, encoding: &str) -> Self {
        self.binary_encodings
            .insert(encoding.trim().to_ascii_lowercase());
        self
    }

    #[must_use]
    pub const fn with_base64_flag(mut self, flag: Base64Flag) -> Self {
        self.base64_flag = flag;
        self
    }

    #[must_use]
    pub const fn with_header_values(mut self, policy: HeaderValuePolicy) -> Self {
        self.header_values = policy;
        self
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn to_set<'a>(items: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    items.map(str::to_ascii_lowercase).collect()
}
