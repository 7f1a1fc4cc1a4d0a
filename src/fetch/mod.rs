//! Upstream access: the [`BatchReader`] seam and its HTTP implementation.

mod basic;
mod client;
mod http_reader;
mod reader;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use http_reader::HttpBatchReader;
pub use reader::{BatchReader, OrderBy};

use crate::error::UpstreamError;

/// Sends a GET through `client` and returns the body of a successful response.
///
/// Non-2xx statuses become [`UpstreamError::Status`] carrying the response body.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: reqwest::Url,
) -> Result<Vec<u8>, UpstreamError> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.bytes().await?.to_vec())
}
