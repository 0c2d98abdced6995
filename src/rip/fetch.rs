use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::io::AsyncReadExt;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn http_timeout() -> Duration {
    let secs = std::env::var("MMS_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

pub fn client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(http_timeout())
        .build()?;
    Ok(client)
}

pub async fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    let text = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

// saved pages may carry a legacy charset; invalid bytes become U+FFFD
pub async fn read_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read html from {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn read_stdin() -> Result<String> {
    let mut buf = Vec::new();
    tokio::io::stdin().read_to_end(&mut buf).await.context("read html from stdin")?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
