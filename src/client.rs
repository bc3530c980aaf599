use std::fmt;
use std::time::Duration;

use reqwest::{multipart, Method};
use serde::Serialize;

use crate::{
    encode::{encode_json_body, encode_query},
    interceptor::{intercept_request, intercept_response},
    request::{validate_path, Body},
    retry::{evaluate, reject, wait_before_retry, RetryAttempt, RetryDecision},
    ClientConfig, Failure, HttpError, PreparedRequest, RequestConfig, Response, Result,
    UploadFile,
};

#[derive(Clone)]
/// HTTP client that runs every request through the interceptors and the
/// retry policy.
pub struct HttpClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl HttpClient {
    /// Creates a client with its own transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    /// Creates a client on top of an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Creates a client from environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use relink_http::HttpClient;
    ///
    /// let client = HttpClient::from_env().expect("missing HTTP_* env vars");
    /// ```
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> std::result::Result<Self, String> {
        ClientConfig::from_env().map(Self::new)
    }

    /// Replaces the client defaults, keeping the transport.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a GET request with `params` as the query string.
    ///
    /// Pass `&()` for no parameters.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run() -> relink_http::Result<()> {
    /// use relink_http::{ClientConfig, HttpClient, RequestConfig};
    ///
    /// let client = HttpClient::new(ClientConfig::new("https://api.example.com"));
    /// let response = client
    ///     .get("/widgets", &serde_json::json!({ "page": 2 }), RequestConfig::relink())
    ///     .await?;
    /// println!("{}", response.text());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<Q>(&self, path: &str, params: &Q, config: RequestConfig) -> Result<Response>
    where
        Q: Serialize + ?Sized,
    {
        validate_path(path)?;
        let query = encode_query(params)?;
        self.dispatch(Method::GET, path, query, Body::Empty, config)
            .await
    }

    /// Sends a POST request with `data` as the JSON body.
    ///
    /// Pass `&()` to send no body.
    pub async fn post<T>(&self, path: &str, data: &T, config: RequestConfig) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        validate_path(path)?;
        let body = encode_json_body(data)?;
        self.dispatch(Method::POST, path, Vec::new(), body, config)
            .await
    }

    /// Uploads `file` as a multipart body under the `file` field.
    ///
    /// The content type is always `multipart/form-data`, whatever the caller
    /// or the client defaults set.
    pub async fn upload_file(
        &self,
        path: &str,
        file: UploadFile,
        config: RequestConfig,
    ) -> Result<Response> {
        validate_path(path)?;
        self.dispatch(Method::POST, path, Vec::new(), Body::Multipart(file), config)
            .await
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Body,
        config: RequestConfig,
    ) -> Result<Response> {
        let request = intercept_request(&self.config, method, path, query, body, config);
        self.send_with_retry(request).await
    }

    async fn send_with_retry(&self, request: PreparedRequest) -> Result<Response> {
        let mut attempt = RetryAttempt::initial();
        loop {
            let failure = match self.send_once(&request).await? {
                Ok(response) => return Ok(intercept_response(response)),
                Err(failure) => failure,
            };

            match evaluate(&request, failure.status(), attempt) {
                RetryDecision::Retry { next, delay } => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        path = %request.path,
                        retry = next.count(),
                        ceiling = request.retry,
                        "attempt failed: {failure}"
                    );

                    wait_before_retry(delay).await;
                    attempt = next;
                }
                RetryDecision::Terminal => {
                    let result = reject(request, attempt, failure);

                    #[cfg(feature = "tracing")]
                    tracing::warn!("request rejected: {}", result.message);

                    return Err(HttpError::Rejected(Box::new(result)));
                }
            }
        }
    }

    /// Issues one attempt. The outer `Result` is for local build errors,
    /// the inner one for failures the retry policy evaluates.
    async fn send_once(
        &self,
        request: &PreparedRequest,
    ) -> Result<std::result::Result<Response, Failure>> {
        #[cfg(feature = "tracing")]
        tracing::debug!("{} {}", request.method, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), self.config.url_for(&request.path))
            .headers(request.headers.clone());

        // Zero disables the transport timeout. On WASM, reqwest uses
        // AbortController for timeout.
        if self.config.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(self.config.timeout_ms));
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(file) => builder.multipart(build_form(file)?),
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Ok(Err(Failure::Transport(err))),
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return Ok(Err(Failure::Transport(err))),
        };

        if status.is_client_error() || status.is_server_error() {
            return Ok(Err(Failure::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            }));
        }

        Ok(Ok(Response {
            status,
            headers,
            body,
        }))
    }
}

fn build_form(file: &UploadFile) -> Result<multipart::Form> {
    let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    if let Some(mime) = &file.mime {
        part = part
            .mime_str(mime)
            .map_err(|err| HttpError::Encode(format!("invalid upload MIME type '{mime}': {err}")))?;
    }
    Ok(multipart::Form::new().part("file", part))
}
