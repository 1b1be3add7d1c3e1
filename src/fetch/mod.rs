mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Issues a GET for `url` and returns the body.
///
/// # Errors
///
/// Fails on transport errors and on any non-success status, carrying the
/// status and response body in the message.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("invalid url '{url}'"))?,
    );

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("request returned status {}: {}", status, body));
    }

    let bytes = resp.bytes().await?.to_vec();
    debug!(bytes = bytes.len(), "Response received");
    Ok(bytes)
}
