//! HTTP client for the remote minimization service.
//!
//! One `POST` carrying the raw automaton text, one JSON response. Pure
//! parsing lives in `parse_response` for testability.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::config::MinimizerConfig;
use super::types::{MinimizeResponse, MinimizerError};

const UNKNOWN_ERROR: &str = "unknown error";

// =============================================================================
// CLIENT
// =============================================================================

pub struct MinimizerClient {
    http: reqwest::Client,
    url: String,
}

impl MinimizerClient {
    /// Build a client for the configured service URL.
    ///
    /// # Errors
    ///
    /// Returns [`MinimizerError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &MinimizerConfig) -> Result<Self, MinimizerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| MinimizerError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: config.url.clone() })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the automaton source text and wait for both descriptions.
    ///
    /// The text is forwarded untouched; validating it is the service's job.
    /// Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`MinimizerError::Unreachable`] or
    /// [`MinimizerError::MalformedResponse`] when the exchange fails, and
    /// [`MinimizerError::Service`] when the service reports an error.
    pub async fn submit(&self, source: &str) -> Result<MinimizeResponse, MinimizerError> {
        tracing::info!(url = %self.url, bytes = source.len(), "submitting automaton");

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain")
            .body(source.to_owned())
            .send()
            .await
            .map_err(|e| self.unreachable(&e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.unreachable(&e))?;
        tracing::debug!(status, bytes = text.len(), "minimization service responded");

        parse_response(status, &text).inspect_err(|e| {
            tracing::warn!(code = e.error_code(), error = %e, "minimization failed");
        })
    }

    fn unreachable(&self, error: &reqwest::Error) -> MinimizerError {
        tracing::warn!(url = %self.url, error = %error, "minimization service unreachable");
        MinimizerError::Unreachable { url: self.url.clone(), reason: error.to_string() }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Deserialize)]
struct ApiResponse {
    #[serde(default)]
    original: Value,
    #[serde(default, alias = "minimizado")]
    minimized: Value,
    #[serde(default)]
    log: Option<Value>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Interpret a status code and body from the service.
///
/// The body must be JSON whatever the status.
///
/// # Errors
///
/// Returns [`MinimizerError::MalformedResponse`] for non-JSON bodies, and
/// otherwise whatever [`interpret_response`] returns.
pub fn parse_response(status: u16, body: &str) -> Result<MinimizeResponse, MinimizerError> {
    let value: Value = serde_json::from_str(body).map_err(|e| MinimizerError::MalformedResponse(e.to_string()))?;
    interpret_response(status, value)
}

/// Interpret a status code and an already parsed JSON body.
///
/// A non-success status surfaces the body's `error` field. A success must be
/// a JSON object; the descriptions inside it are not checked here.
///
/// # Errors
///
/// Returns [`MinimizerError::MalformedResponse`] when a success body is not an
/// object, and [`MinimizerError::Service`] for non-success statuses.
pub fn interpret_response(status: u16, value: Value) -> Result<MinimizeResponse, MinimizerError> {
    if !(200..300).contains(&status) {
        return Err(MinimizerError::Service { status, message: error_message(&value) });
    }
    if !value.is_object() {
        return Err(MinimizerError::MalformedResponse("expected a JSON object".to_owned()));
    }

    let api: ApiResponse = serde_json::from_value(value).map_err(|e| MinimizerError::MalformedResponse(e.to_string()))?;
    let log = api
        .log
        .as_ref()
        .and_then(Value::as_str)
        .filter(|log| !log.is_empty())
        .map(ToOwned::to_owned);

    Ok(MinimizeResponse { original: api.original, minimized: api.minimized, log })
}

fn error_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        None | Some(Value::Null | Value::Bool(false) | Value::String(_)) => UNKNOWN_ERROR.to_owned(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
