//! `relink-http` is an async HTTP client wrapper with request interceptors
//! and a retry-with-delay policy.
//!
//! Every call goes through the same pipeline:
//! - [`HttpClient::get`], [`HttpClient::post`], [`HttpClient::upload_file`]
//! - default headers, bearer token and retry defaults from [`ClientConfig`]
//! - re-dispatch after a delay for requests that opt in with
//!   [`RequestConfig::relink`], or rejection with an [`ErrorResult`]

mod client;
mod encode;
mod error;
mod interceptor;
mod options;
mod request;
mod response;
pub mod retry;

pub use client::HttpClient;
pub use error::{ErrorResult, Failure, HttpError};
pub use options::ClientConfig;
pub use request::{Body, PreparedRequest, RequestConfig, UploadFile};
pub use response::Response;
pub use retry::{RetryAttempt, RetryDecision};

pub use reqwest::{header, Method, StatusCode};

pub type Result<T> = std::result::Result<T, HttpError>;
