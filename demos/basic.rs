use relink_http::{HttpClient, HttpError, RequestConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = HttpClient::from_env().map_err(anyhow::Error::msg)?;

    let response = client
        .get("/widgets", &json!({ "page": 1 }), RequestConfig::relink())
        .await?;
    println!("{} {}", response.status, response.text());

    let created = client
        .post(
            "/widgets",
            &json!({ "name": "Kit" }),
            RequestConfig::relink().with_retry(1),
        )
        .await;

    match created {
        Ok(response) => println!("created: {}", response.text()),
        Err(HttpError::Rejected(result)) => eprintln!("{}", result.message),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
