//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services as
//! `Arc<ClientConfig>`. Nothing reads environment variables while a request is being handled;
//! the `*_from_env_value` helpers take the raw value so callers (and tests) decide where it
//! comes from.

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_EVENT_RETRY_ATTEMPTS, DEFAULT_EVENT_RETRY_DELAY_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::error::{IntakeError, IntakeResult};
use crate::event::RetryPolicy;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_base_url: String,
    request_timeout: Duration,
    session_cookie: Option<String>,
    event_retry: RetryPolicy,
}

impl ClientConfig {
    /// Create a new `ClientConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Config`] if the base URL is not an `http(s)` URL, the timeout is
    /// zero, or the session cookie contains characters that cannot appear in a header.
    pub fn new(
        api_base_url: impl Into<String>,
        request_timeout: Duration,
        session_cookie: Option<String>,
        event_retry: RetryPolicy,
    ) -> IntakeResult<Self> {
        let api_base_url = api_base_url.into().trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(IntakeError::Config(format!(
                "api base url must start with http:// or https://, got '{api_base_url}'"
            )));
        }
        if request_timeout.is_zero() {
            return Err(IntakeError::Config(
                "request timeout must be greater than zero".into(),
            ));
        }

        let session_cookie = session_cookie
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if session_cookie
            .as_deref()
            .is_some_and(|cookie| cookie.chars().any(char::is_control))
        {
            return Err(IntakeError::Config(
                "session cookie must not contain control characters".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            request_timeout,
            session_cookie,
            event_retry,
        })
    }

    /// Base URL without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Joins `path` (which starts with `/`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn session_cookie(&self) -> Option<&str> {
        self.session_cookie.as_deref()
    }

    pub fn event_retry(&self) -> RetryPolicy {
        self.event_retry
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            session_cookie: None,
            event_retry: RetryPolicy::default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Base URL from an optional raw value, falling back to the default.
pub fn api_base_url_from_env_value(value: Option<String>) -> String {
    non_empty(value).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

/// Parse the request timeout (whole seconds) from an optional raw value.
pub fn request_timeout_from_env_value(value: Option<String>) -> IntakeResult<Duration> {
    let secs = match non_empty(value) {
        Some(v) => v.parse::<u64>().map_err(|_| {
            IntakeError::Config(format!("request timeout must be whole seconds, got '{v}'"))
        })?,
        None => DEFAULT_REQUEST_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}

/// Parse the event retry policy from optional attempt-count and delay (milliseconds) values.
pub fn event_retry_from_env_values(
    attempts: Option<String>,
    delay_ms: Option<String>,
) -> IntakeResult<RetryPolicy> {
    let max_retries = match non_empty(attempts) {
        Some(v) => v.parse::<u32>().map_err(|_| {
            IntakeError::Config(format!("event retry attempts must be a number, got '{v}'"))
        })?,
        None => DEFAULT_EVENT_RETRY_ATTEMPTS,
    };
    let delay_ms = match non_empty(delay_ms) {
        Some(v) => v.parse::<u64>().map_err(|_| {
            IntakeError::Config(format!("event retry delay must be milliseconds, got '{v}'"))
        })?,
        None => DEFAULT_EVENT_RETRY_DELAY_MS,
    };
    Ok(RetryPolicy {
        max_retries,
        delay: Duration::from_millis(delay_ms),
    })
}
