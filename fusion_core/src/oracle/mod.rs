//! Oracle boundary - the asynchronous service that decides what two elements make.
//!
//! The session treats the oracle as opaque: it hands over two elements and
//! gets back a [`FusionResult`] or an [`OracleError`]. [`Fallback`] turns
//! every error into the glitch sentinel for callers that would rather show a
//! joke element than a failure.

mod gemini;
mod prompt;

pub use gemini::*;
pub use prompt::*;

use alchemy_rules::Element;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// What the oracle says two elements combine into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionResult {
    pub name: String,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FusionResult {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The sentinel answered in place of a failed call.
    pub fn glitch() -> Self {
        Self::new("Glitch", "👾").with_description("The universe blinked.")
    }
}

/// Ways an oracle call can fail.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("no API key configured (set oracle.api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no response from oracle")]
    EmptyResponse,

    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

/// An asynchronous fusion oracle.
pub trait Oracle: Send + Sync {
    /// Decide what `first` and `second` combine into.
    fn fuse(
        &self,
        first: &Element,
        second: &Element,
    ) -> impl Future<Output = Result<FusionResult, OracleError>> + Send;
}

impl<O: Oracle> Oracle for Arc<O> {
    fn fuse(
        &self,
        first: &Element,
        second: &Element,
    ) -> impl Future<Output = Result<FusionResult, OracleError>> + Send {
        (**self).fuse(first, second)
    }
}

/// Wraps an oracle so failures come back as [`FusionResult::glitch`].
#[derive(Debug, Clone)]
pub struct Fallback<O> {
    inner: O,
}

impl<O> Fallback<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }
}

impl<O: Oracle> Oracle for Fallback<O> {
    async fn fuse(&self, first: &Element, second: &Element) -> Result<FusionResult, OracleError> {
        match self.inner.fuse(first, second).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::warn!(error = %err, %first, %second, "fusion failed, answering with glitch");
                Ok(FusionResult::glitch())
            }
        }
    }
}
