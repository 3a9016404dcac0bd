//! Minimization service configuration parsed from environment variables.

use super::types::MinimizerError;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimizerTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for MinimizerTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimizerConfig {
    pub url: String,
    pub timeouts: MinimizerTimeouts,
}

impl MinimizerConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `MINIMIZER_URL`: default `http://localhost:8080`
    /// - `MINIMIZER_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MINIMIZER_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns [`MinimizerError::ConfigParse`] if the URL is empty or not http(s).
    pub fn from_env() -> Result<Self, MinimizerError> {
        let raw_url = std::env::var("MINIMIZER_URL").unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
        let url = normalize_url(&raw_url)?;
        let timeouts = MinimizerTimeouts {
            request_secs: env_parse_u64("MINIMIZER_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("MINIMIZER_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { url, timeouts })
    }

    /// Replace the service URL, e.g. from a command-line flag.
    ///
    /// # Errors
    ///
    /// Returns [`MinimizerError::ConfigParse`] if the URL is empty or not http(s).
    pub fn with_url(self, raw_url: &str) -> Result<Self, MinimizerError> {
        Ok(Self { url: normalize_url(raw_url)?, ..self })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_url(raw: &str) -> Result<String, MinimizerError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(MinimizerError::ConfigParse("MINIMIZER_URL must not be empty".into()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(MinimizerError::ConfigParse(format!(
            "unsupported service URL '{raw}' (expected http:// or https://)"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
