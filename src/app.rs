//! Calling convention for the hosted application.
//!
//! An application receives the request [`Environ`] and a [`StartResponse`]
//! handle. It registers a status line and headers through `start_response`,
//! may stream bytes through the returned writer, and returns the remaining
//! body as a sequence of chunks.

use crate::environ::Environ;
use crate::start_response::StartResponse;
use anyhow::Result;

/// One piece of response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Bytes(Vec<u8>),
    Text(String),
}

impl Chunk {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Chunk {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A synchronous application the bridge can host.
///
/// Implemented for any `Fn(Environ, &mut StartResponse) -> Result<I>` where
/// `I` yields [`Chunk`]s, so plain closures work.
pub trait Application {
    type Output: IntoIterator<Item = Chunk>;

    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Any error is surfaced to the gateway runtime as an invocation failure.
    fn call(&self, environ: Environ, start_response: &mut StartResponse) -> Result<Self::Output>;
}

impl<F, I> Application for F
where
    F: Fn(Environ, &mut StartResponse) -> Result<I>,
    I: IntoIterator<Item = Chunk>,
{
    type Output = I;

    fn call(&self, environ: Environ, start_response: &mut StartResponse) -> Result<I> {
        self(environ, start_response)
    }
}
