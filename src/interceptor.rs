use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Method,
};

use crate::{
    request::{Body, PreparedRequest},
    ClientConfig, RequestConfig, Response,
};

/// Resolves a caller's request into the request that is dispatched.
///
/// Default headers fill keys the caller left unset. Unset retry fields take
/// the client defaults. A configured token always wins the `Authorization`
/// header, and multipart bodies drop any `Content-Type` so the transport
/// writes `multipart/form-data` with its boundary.
pub(crate) fn intercept_request(
    client: &ClientConfig,
    method: Method,
    path: &str,
    query: Vec<(String, String)>,
    body: Body,
    request: RequestConfig,
) -> PreparedRequest {
    let mut headers = merge_headers(&client.headers, request.headers);

    if let Some(token) = client.token.as_deref() {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, value);
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("configured token is not a valid header value; skipping");
            }
        }
    }

    if matches!(body, Body::Multipart(_)) {
        headers.remove(header::CONTENT_TYPE);
    }

    PreparedRequest {
        method,
        base_url: client.base_url.clone(),
        path: path.to_owned(),
        query,
        body,
        headers,
        relink: request.relink,
        retry: request.retry.unwrap_or(client.retry),
        retry_delay_ms: request.retry_delay_ms.unwrap_or(client.timeout_ms),
    }
}

/// Success responses pass through unchanged.
pub(crate) fn intercept_response(response: Response) -> Response {
    response
}

fn merge_headers(defaults: &HeaderMap, overrides: HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    let mut current = None;
    for (name, value) in overrides {
        // `None` names continue the previous key's values.
        if let Some(name) = name {
            merged.remove(&name);
            current = Some(name);
        }
        if let Some(name) = &current {
            merged.append(name.clone(), value);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use reqwest::{header, Method};

    use super::intercept_request;
    use crate::{
        request::{Body, UploadFile},
        ClientConfig, RequestConfig,
    };

    fn client() -> ClientConfig {
        ClientConfig::new("https://api.example.com")
            .with_header("x-app", "web")
            .with_header("accept-language", "en")
            .with_retry(4)
            .with_timeout_ms(250)
    }

    #[test]
    fn caller_headers_win_and_defaults_fill_the_rest() {
        let request = RequestConfig::default().with_header("accept-language", "fr");
        let prepared = intercept_request(
            &client(),
            Method::GET,
            "/widgets",
            Vec::new(),
            Body::Empty,
            request,
        );

        assert_eq!(prepared.headers["accept-language"], "fr");
        assert_eq!(prepared.headers["x-app"], "web");
        assert_eq!(prepared.headers.get_all("accept-language").iter().count(), 1);
    }

    #[test]
    fn token_overrides_caller_authorization() {
        let request = RequestConfig::default().with_header("authorization", "Basic abc");
        let prepared = intercept_request(
            &client().with_token("t0ken"),
            Method::GET,
            "/widgets",
            Vec::new(),
            Body::Empty,
            request,
        );

        assert_eq!(prepared.headers[header::AUTHORIZATION], "Bearer t0ken");
        assert_eq!(
            prepared.headers.get_all(header::AUTHORIZATION).iter().count(),
            1
        );
    }

    #[test]
    fn without_token_caller_authorization_is_kept() {
        let request = RequestConfig::default().with_header("authorization", "Basic abc");
        let prepared = intercept_request(
            &client(),
            Method::GET,
            "/widgets",
            Vec::new(),
            Body::Empty,
            request,
        );

        assert_eq!(prepared.headers[header::AUTHORIZATION], "Basic abc");
    }

    #[test]
    fn retry_fields_default_from_client() {
        let prepared = intercept_request(
            &client(),
            Method::POST,
            "/widgets",
            Vec::new(),
            Body::Empty,
            RequestConfig::relink(),
        );
        assert!(prepared.relink);
        assert_eq!(prepared.retry, 4);
        assert_eq!(prepared.retry_delay_ms, 250);

        let prepared = intercept_request(
            &client(),
            Method::POST,
            "/widgets",
            Vec::new(),
            Body::Empty,
            RequestConfig::relink().with_retry(1).with_retry_delay_ms(5),
        );
        assert_eq!(prepared.retry, 1);
        assert_eq!(prepared.retry_delay_ms, 5);
    }

    #[test]
    fn multipart_drops_caller_content_type() {
        let request = RequestConfig::default().with_header("content-type", "application/json");
        let prepared = intercept_request(
            &client().with_header("content-type", "text/plain"),
            Method::POST,
            "/upload",
            Vec::new(),
            Body::Multipart(UploadFile::new("report.pdf", b"%PDF".to_vec())),
            request,
        );

        assert!(prepared.headers.get(header::CONTENT_TYPE).is_none());
    }
}
