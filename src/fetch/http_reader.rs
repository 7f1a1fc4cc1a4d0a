use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::client::HttpClient;
use super::fetch_bytes;
use super::reader::{BatchReader, OrderBy};
use crate::error::UpstreamError;
use crate::rows::DtakoRow;

/// The row store answers either with a bare array or with a list envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchBody {
    Envelope { items: Vec<DtakoRow> },
    Bare(Vec<DtakoRow>),
}

/// [`BatchReader`] over the row store's HTTP list endpoint:
/// `GET {base}/dtako_rows?offset=..&limit=..[&order_by=..]`.
pub struct HttpBatchReader<C> {
    client: C,
    endpoint: Url,
}

impl<C: HttpClient> HttpBatchReader<C> {
    pub fn new(client: C, base_url: &str) -> Result<Self, UpstreamError> {
        let endpoint = rows_endpoint(base_url)?;
        Ok(Self { client, endpoint })
    }

    fn batch_url(&self, offset: usize, limit: usize, order_by: &OrderBy) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("offset", &offset.to_string())
                .append_pair("limit", &limit.to_string());
            if let Some(clause) = order_by.as_param() {
                pairs.append_pair("order_by", clause);
            }
        }
        url
    }
}

fn rows_endpoint(base_url: &str) -> Result<Url, UpstreamError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join("dtako_rows"))
        .map_err(|e| UpstreamError::Other(format!("invalid upstream url '{base_url}': {e}")))
}

fn decode_batch(bytes: &[u8]) -> Result<Vec<DtakoRow>, UpstreamError> {
    let body: BatchBody =
        serde_json::from_slice(bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?;
    Ok(match body {
        BatchBody::Envelope { items } => items,
        BatchBody::Bare(items) => items,
    })
}

#[async_trait]
impl<C: HttpClient> BatchReader for HttpBatchReader<C> {
    async fn read_batch(
        &self,
        offset: usize,
        limit: usize,
        order_by: &OrderBy,
    ) -> Result<Vec<DtakoRow>, UpstreamError> {
        let url = self.batch_url(offset, limit, order_by);
        let bytes = fetch_bytes(&self.client, url).await?;
        let rows = decode_batch(&bytes)?;
        debug!(offset, limit, received = rows.len(), "Batch received");
        Ok(rows)
    }
}
