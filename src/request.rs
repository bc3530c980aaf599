use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};

use crate::{HttpError, Result};

/// Per-call overrides passed to the dispatcher methods.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConfig {
    /// Headers for this call. Keys set here win over client defaults.
    pub headers: HeaderMap,
    /// Whether failed attempts may be re-issued.
    pub relink: bool,
    /// Retry ceiling override.
    pub retry: Option<u32>,
    /// Delay between retries override, in milliseconds.
    pub retry_delay_ms: Option<u64>,
}

impl RequestConfig {
    /// Config with retries enabled using the client defaults.
    pub fn relink() -> Self {
        Self {
            relink: true,
            ..Self::default()
        }
    }

    /// Adds a header. Invalid names or values are ignored.
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
                tracing::warn!("ignoring invalid request header '{name}'");
            }
        }
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = Some(delay_ms);
        self
    }
}

/// A file packaged into a multipart upload under the `file` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Reads a file from disk, naming the upload after the path's file name.
    ///
    /// **Not available on `wasm32` targets.**
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_owned());
        Ok(Self::new(file_name, bytes))
    }
}

/// Request body as it is re-issued on each attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(UploadFile),
}

/// Fully resolved request: the transport inputs plus the retry policy.
///
/// Built once per logical request by the request interceptor and re-issued
/// unchanged on every retry.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub base_url: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    pub headers: HeaderMap,
    pub relink: bool,
    pub retry: u32,
    pub retry_delay_ms: u64,
}

/// Rejects paths that are not root-relative.
pub(crate) fn validate_path(path: &str) -> Result<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(HttpError::InvalidPath {
            path: path.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_path, RequestConfig};
    use crate::HttpError;

    #[test]
    fn root_relative_paths_are_accepted() {
        assert!(validate_path("/").is_ok());
        assert!(validate_path("/widgets/1").is_ok());
    }

    #[test]
    fn relative_and_absolute_urls_are_rejected() {
        for path in ["widgets", "", "https://api.example.com/widgets"] {
            match validate_path(path) {
                Err(HttpError::InvalidPath { path: rejected }) => assert_eq!(rejected, path),
                other => panic!("expected invalid path for {path:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_request_header_is_ignored() {
        let config = RequestConfig::default()
            .with_header("accept-language", "fr")
            .with_header("x-bad", "line\nbreak")
            .with_header("", "value");
        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.headers["accept-language"], "fr");
    }

    #[test]
    fn relink_constructor_enables_retries_only() {
        let config = RequestConfig::relink();
        assert!(config.relink);
        assert_eq!(config.retry, None);
        assert_eq!(config.retry_delay_ms, None);
        assert!(config.headers.is_empty());
    }
}
