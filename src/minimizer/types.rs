//! Minimizer types — response payload and error taxonomy.

use serde_json::Value;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by minimization service operations.
#[derive(Debug, thiserror::Error)]
pub enum MinimizerError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never completed (refused, timed out, body unreadable).
    #[error("could not reach the minimization service at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// The exchange completed but the body was not the expected JSON payload.
    #[error("malformed response from the minimization service: {0}")]
    MalformedResponse(String),

    /// The service answered with a non-success status and an error message.
    #[error("service error: {message}")]
    Service { status: u16, message: String },
}

impl MinimizerError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Unreachable { .. } => "E_UNREACHABLE",
            Self::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
            Self::Service { .. } => "E_SERVICE",
        }
    }

    /// Whether the failure belongs to the "service unreachable" class rather
    /// than an application error reported by the service.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::MalformedResponse(_))
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// A successful minimization: the submitted automaton, its minimized
/// counterpart and the optional execution log.
///
/// The two descriptions stay raw JSON (`Null` when absent) so each one is
/// converted on its own and a bad one only affects its own pane.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinimizeResponse {
    pub original: Value,
    pub minimized: Value,
    /// Free-text log; `None` when absent, empty or not a string.
    pub log: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
