use reqwest::{header::HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::{HttpError, Result};

/// Successful transport response, passed through unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    /// Body as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|err| {
            HttpError::Decode(format!(
                "invalid response JSON: {err}; body: {}",
                self.text()
            ))
        })
    }
}
