//! Row predicate and request windows.

use chrono::NaiveDate;
use tracing::debug;

use crate::rows::DtakoRow;

/// Optional filter clauses, combined with AND.
///
/// An empty `FilterCriteria` accepts every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub car_cc: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_distance: Option<f64>,
    /// Accepts a row whose operation number is any of these. Empty means unused.
    pub operation_nos: Vec<String>,
    pub exclude_zero_distance: bool,
}

impl FilterCriteria {
    pub fn car_cc(mut self, car_cc: impl Into<String>) -> Self {
        self.car_cc = Some(car_cc.into());
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn min_distance(mut self, km: f64) -> Self {
        self.min_distance = Some(km);
        self
    }

    pub fn operation_nos<I, S>(mut self, nos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operation_nos = nos.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_zero_distance(mut self) -> Self {
        self.exclude_zero_distance = true;
        self
    }

    fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Page of the filtered result. `limit == 0` means everything from `offset` on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Unbounded window; forces a full scan and an exact match count.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit == 0
    }

    /// Number of matches after which more matches cannot change this window.
    pub fn required_matches(&self) -> Option<usize> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.offset.saturating_add(self.limit))
        }
    }

    /// Clamped `[offset, offset + limit)` bounds within a sequence of `len` items.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        if self.offset > len {
            return (len, len);
        }
        let end = match self.required_matches() {
            Some(end) => end.min(len),
            None => len,
        };
        (self.offset, end)
    }
}

/// Returns `true` when `row` satisfies every clause present in `criteria`.
///
/// A row whose operation date cannot be parsed never matches a date clause;
/// one malformed row must not abort a scan.
pub fn matches(row: &DtakoRow, criteria: &FilterCriteria) -> bool {
    if let Some(car_cc) = &criteria.car_cc {
        if row.car_cc != *car_cc {
            return false;
        }
    }

    if !criteria.operation_nos.is_empty()
        && !criteria.operation_nos.iter().any(|no| *no == row.operation_no)
    {
        return false;
    }

    if criteria.has_date_bounds() {
        let Some(day) = row.operation_day() else {
            debug!(row_id = %row.id, operation_date = %row.operation_date, "Unparseable operation date, row rejected");
            return false;
        };
        if criteria.start_date.is_some_and(|start| day < start) {
            return false;
        }
        if criteria.end_date.is_some_and(|end| day > end) {
            return false;
        }
    }

    if let Some(min) = criteria.min_distance {
        if row.total_distance < min {
            return false;
        }
    }

    if criteria.exclude_zero_distance && row.total_distance == 0.0 {
        return false;
    }

    true
}
