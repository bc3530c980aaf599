use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Client-wide defaults applied to every request.
///
/// `timeout_ms` doubles as the per-attempt transport timeout and the default
/// delay between retries.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL that root-relative request paths are appended to.
    pub base_url: String,
    /// Default headers merged under each request's own headers.
    pub headers: HeaderMap,
    /// Bearer token injected as `Authorization` when set.
    pub token: Option<String>,
    /// Default retry ceiling for requests that opt into retries.
    pub retry: u32,
    /// Transport timeout and default retry delay in milliseconds.
    ///
    /// `0` means no transport timeout and retries without delay.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            headers: HeaderMap::new(),
            token: None,
            retry: 3,
            timeout_ms: 1_000,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("retry", &self.retry)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Adds a default header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                #[cfg(feature = "tracing")]
                tracing::warn!("ignoring invalid default header '{name}'");
            }
        }
        self
    }

    /// Sets the bearer token. Blank tokens clear it.
    pub fn with_token(mut self, token: impl AsRef<str>) -> Self {
        let trimmed = token.as_ref().trim();
        self.token = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Creates a config from environment variables.
    ///
    /// Reads:
    /// - `HTTP_BASE_URL` — base URL, required
    /// - `HTTP_TOKEN` — bearer token, optional
    /// - `HTTP_RETRY` — retry ceiling, optional
    /// - `HTTP_TIMEOUT_MS` — timeout and retry delay, optional
    ///
    /// **Not available on `wasm32` targets.**
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        let base_url = std::env::var("HTTP_BASE_URL")
            .map_err(|_| "missing HTTP_BASE_URL environment variable".to_owned())?;
        if base_url.trim().is_empty() {
            return Err("HTTP_BASE_URL is set but empty".to_owned());
        }

        let mut config = Self::new(base_url.trim());
        if let Ok(token) = std::env::var("HTTP_TOKEN") {
            config = config.with_token(token);
        }
        if let Some(retry) = env_number::<u32>("HTTP_RETRY")? {
            config.retry = retry;
        }
        if let Some(timeout_ms) = env_number::<u64>("HTTP_TIMEOUT_MS")? {
            config.timeout_ms = timeout_ms;
        }
        Ok(config)
    }

    /// Joins the base URL with a root-relative path.
    pub(crate) fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn env_number<T: std::str::FromStr>(key: &str) -> std::result::Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{key} must be a non-negative integer, got '{raw}'")),
        Err(_) => Ok(None),
    }
}
