use relink_http::{HttpClient, RequestConfig, UploadFile};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: upload <file>"))?;

    let client = HttpClient::from_env().map_err(anyhow::Error::msg)?;
    let file = UploadFile::from_path(&path).await?;

    let response = client
        .upload_file("/upload", file, RequestConfig::relink())
        .await?;
    println!("{} {}", response.status, response.text());

    Ok(())
}
