use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::rows::DtakoRow;

/// Ordering key passed to the upstream store on every batch read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OrderBy {
    /// The store's own default order.
    #[default]
    Natural,
    /// An explicit order clause, e.g. `"read_date DESC"`.
    Column(String),
}

impl OrderBy {
    /// Empty or blank strings fall back to [`OrderBy::Natural`].
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            OrderBy::Natural
        } else {
            OrderBy::Column(value.to_string())
        }
    }

    pub fn as_param(&self) -> Option<&str> {
        match self {
            OrderBy::Natural => None,
            OrderBy::Column(clause) => Some(clause),
        }
    }
}

/// Ordered offset/limit access to the upstream row store.
///
/// For a fixed `offset`, `limit` and `order_by` against unchanged data the
/// result must be the same every time. A batch shorter than `limit` means the
/// store has no more rows.
#[async_trait]
pub trait BatchReader: Send + Sync {
    async fn read_batch(
        &self,
        offset: usize,
        limit: usize,
        order_by: &OrderBy,
    ) -> Result<Vec<DtakoRow>, UpstreamError>;
}

#[async_trait]
impl<R: BatchReader + ?Sized> BatchReader for std::sync::Arc<R> {
    async fn read_batch(
        &self,
        offset: usize,
        limit: usize,
        order_by: &OrderBy,
    ) -> Result<Vec<DtakoRow>, UpstreamError> {
        (**self).read_batch(offset, limit, order_by).await
    }
}
