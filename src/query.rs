//! Filtered, globally paginated queries over the unfiltered row store.
//!
//! The upstream store can only page through rows in a fixed order, so every
//! query scans it batch by batch from offset 0, keeps the rows that pass
//! [`matches`], and slices the requested [`Window`] out of the matches.
//!
//! A bounded window lets the scan stop as soon as enough matches exist to fill
//! it. In that case [`Page::match_count_at_stop`] counts the matches seen so
//! far, not every match in the store. Callers that need the exact total must
//! ask for [`Window::all`].

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::QueryError;
use crate::fetch::{BatchReader, OrderBy};
use crate::filter::{FilterCriteria, Window, matches};
use crate::rows::{DtakoRow, parse_boundary_date};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// One window of filtered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<DtakoRow>,
    /// Matches collected when the scan stopped. Only the true total when
    /// [`Page::is_exact_total`] holds.
    pub match_count_at_stop: usize,
    /// `false` when the scan ended early because the window was already full.
    pub scanned_to_end: bool,
}

impl Page {
    pub fn is_exact_total(&self) -> bool {
        self.scanned_to_end
    }
}

/// Filter-and-paginate engine over a [`BatchReader`].
///
/// Holds no per-call state, so one instance can serve concurrent queries.
pub struct RowQuery<R> {
    reader: R,
    batch_size: usize,
    order_by: OrderBy,
}

impl<R: BatchReader> RowQuery<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            batch_size: DEFAULT_BATCH_SIZE,
            order_by: OrderBy::Natural,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Runs `criteria` over the whole store and returns `window` of the matches.
    pub async fn query(&self, criteria: &FilterCriteria, window: Window) -> Result<Page, QueryError> {
        self.query_with_cancel(criteria, window, &CancellationToken::new())
            .await
    }

    /// Like [`RowQuery::query`], checking `cancel` before every batch read.
    ///
    /// On cancellation or upstream failure nothing collected so far is returned.
    #[tracing::instrument(skip(self, criteria, window, cancel), fields(offset = window.offset, limit = window.limit))]
    pub async fn query_with_cancel(
        &self,
        criteria: &FilterCriteria,
        window: Window,
        cancel: &CancellationToken,
    ) -> Result<Page, QueryError> {
        let required = window.required_matches();
        let mut matched: Vec<DtakoRow> = Vec::new();
        let mut upstream_offset = 0usize;
        let mut fetched = 0usize;

        let scanned_to_end = loop {
            if cancel.is_cancelled() {
                debug!(fetched, matched = matched.len(), "Scan cancelled");
                return Err(QueryError::Cancelled);
            }

            let batch = self
                .reader
                .read_batch(upstream_offset, self.batch_size, &self.order_by)
                .await?;
            let batch_len = batch.len();
            fetched += batch_len;

            matched.extend(batch.into_iter().filter(|row| matches(row, criteria)));
            debug!(
                upstream_offset,
                batch_len,
                matched = matched.len(),
                "Batch filtered"
            );

            if batch_len < self.batch_size {
                break true;
            }
            upstream_offset += self.batch_size;

            if required.is_some_and(|needed| matched.len() >= needed) {
                break false;
            }
        };

        let match_count_at_stop = matched.len();
        info!(
            fetched,
            match_count_at_stop, scanned_to_end, "Filtered scan finished"
        );

        let (start, end) = window.bounds(match_count_at_stop);
        matched.truncate(end);
        let rows = matched.split_off(start);

        Ok(Page {
            rows,
            match_count_at_stop,
            scanned_to_end,
        })
    }

    /// Rows of one vehicle, first `limit` of them (`0` for all).
    pub async fn list_by_car_cc(&self, car_cc: &str, limit: usize) -> Result<Vec<DtakoRow>, QueryError> {
        let criteria = FilterCriteria::default().car_cc(car_cc);
        Ok(self.query(&criteria, Window::first(limit)).await?.rows)
    }

    /// Rows whose operation date lies in `[start_date, end_date]`, both `YYYY-MM-DD`.
    pub async fn list_by_date_range(
        &self,
        start_date: &str,
        end_date: &str,
        limit: usize,
    ) -> Result<Vec<DtakoRow>, QueryError> {
        let criteria = date_range_criteria(start_date, end_date)?;
        Ok(self.query(&criteria, Window::first(limit)).await?.rows)
    }

    pub async fn list_by_car_cc_and_date_range(
        &self,
        car_cc: &str,
        start_date: &str,
        end_date: &str,
        limit: usize,
    ) -> Result<Vec<DtakoRow>, QueryError> {
        let criteria = date_range_criteria(start_date, end_date)?.car_cc(car_cc);
        Ok(self.query(&criteria, Window::first(limit)).await?.rows)
    }

    /// Rows whose operation number is any of `operation_nos`.
    pub async fn list_by_operation_nos(
        &self,
        operation_nos: &[String],
        limit: usize,
    ) -> Result<Vec<DtakoRow>, QueryError> {
        if operation_nos.is_empty() {
            return Err(QueryError::invalid_input("operation_nos must not be empty"));
        }
        let criteria = FilterCriteria::default().operation_nos(operation_nos.iter().cloned());
        Ok(self.query(&criteria, Window::first(limit)).await?.rows)
    }

    /// Rows with a nonzero distance, i.e. operations where the vehicle moved.
    pub async fn list_moving(&self, window: Window) -> Result<Page, QueryError> {
        let criteria = FilterCriteria::default().exclude_zero_distance();
        self.query(&criteria, window).await
    }
}

/// Builds a date-range clause from caller `YYYY-MM-DD` strings.
pub fn date_range_criteria(start_date: &str, end_date: &str) -> Result<FilterCriteria, QueryError> {
    let start = parse_boundary_date(start_date)
        .map_err(|e| QueryError::invalid_input(format!("invalid start_date '{start_date}': {e}")))?;
    let end = parse_boundary_date(end_date)
        .map_err(|e| QueryError::invalid_input(format!("invalid end_date '{end_date}': {e}")))?;
    Ok(FilterCriteria::default().date_range(start, end))
}
