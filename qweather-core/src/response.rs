//! Outcome classification for single upstream calls.
//!
//! [`classify`] wraps exactly one pending request and folds every way it can
//! go wrong into [`Outcome::Error`]; nothing here retries, caches, or panics
//! past the boundary. Cache behavior is a request-parameter concern owned by
//! the repo layer.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Classified result of one network exchange.
///
/// `Success(None)` means the upstream answered 2xx with no content (HTTP 204
/// or an empty body); the distinction from `Error` matters here but is
/// collapsed by the repo layer.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(Option<T>),
    Error(FetchError),
}

impl<T> Outcome<T> {
    /// Payload if present, otherwise the given fallback. Both the error path
    /// and the empty-success path take the fallback.
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            Outcome::Success(Some(payload)) => payload,
            Outcome::Success(None) | Outcome::Error(_) => fallback,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unsupported forecast horizon: {0} days (expected 3, 7 or 15)")]
    InvalidHorizon(u8),
}

/// Observes classified failures before the repo layer swallows them.
pub trait ErrorHook: Send + Sync {
    fn on_error(&self, cause: &FetchError);
}

/// Execute one call and classify its outcome.
pub async fn classify<T: DeserializeOwned>(pending: RequestBuilder) -> Outcome<T> {
    classify_with(pending, None).await
}

/// Like [`classify`], with an optional hook that sees the cause of any
/// failure. Failures are also logged here, since callers discard them.
pub async fn classify_with<T: DeserializeOwned>(
    pending: RequestBuilder,
    hook: Option<&dyn ErrorHook>,
) -> Outcome<T> {
    let outcome = dispatch(pending).await;
    if let Outcome::Error(cause) = &outcome {
        tracing::warn!(%cause, "upstream call failed");
        if let Some(hook) = hook {
            hook.on_error(cause);
        }
    }
    outcome
}

async fn dispatch<T: DeserializeOwned>(pending: RequestBuilder) -> Outcome<T> {
    let response = match pending.send().await {
        Ok(response) => response,
        Err(err) => return Outcome::Error(err.into()),
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return Outcome::Error(err.into()),
    };

    classify_parts(status, &body)
}

/// Status/body classification, split out so it is testable without a socket.
fn classify_parts<T: DeserializeOwned>(status: StatusCode, body: &str) -> Outcome<T> {
    if !status.is_success() {
        return Outcome::Error(FetchError::Status {
            status,
            body: truncate_body(body),
        });
    }

    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Outcome::Success(None);
    }

    match serde_json::from_str(body) {
        Ok(payload) => Outcome::Success(Some(payload)),
        Err(err) => Outcome::Error(FetchError::Decode(err)),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        // Floor the cut to a char boundary; upstream error bodies are often
        // Chinese-language text.
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX)
            .last()
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
