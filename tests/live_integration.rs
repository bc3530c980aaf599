use relink_http::{HttpClient, HttpError, RequestConfig};

fn live_path() -> String {
    std::env::var("HTTP_LIVE_PATH")
        .ok()
        .filter(|path| path.starts_with('/'))
        .unwrap_or_else(|| "/".to_owned())
}

#[tokio::test]
async fn live_get_resolves_or_rejects_with_normalized_error() {
    let client = match HttpClient::from_env() {
        Ok(client) => client,
        Err(_) => {
            eprintln!("skipping live test: HTTP_BASE_URL not set");
            return;
        }
    };

    let path = live_path();
    match client
        .get(&path, &(), RequestConfig::relink().with_retry(1))
        .await
    {
        Ok(response) => assert!(response.status.is_success() || response.status.is_redirection()),
        Err(HttpError::Rejected(result)) => {
            assert!(result.message.contains(&client.config().base_url));
            assert!(result.message.contains(&path));
            assert!(result.retries <= 1);
        }
        Err(other) => panic!("unexpected error kind: {other:?}"),
    }
}
