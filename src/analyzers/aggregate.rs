use crate::analyzers::types::{Granularity, PeriodSummary};
use crate::rows::DtakoRow;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Buckets `rows` by period, treating them as one vehicle.
///
/// Rows with an unparseable operation date are skipped. The result is sorted
/// by period; each summary carries the `car_cc` of the first row in its bucket.
pub fn summarize(rows: &[DtakoRow], granularity: Granularity) -> Vec<PeriodSummary> {
    let mut buckets: HashMap<String, PeriodSummary> = HashMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let Some(day) = row.operation_day() else {
            skipped += 1;
            continue;
        };
        let period = granularity.bucket_key(day);

        buckets
            .entry(period.clone())
            .or_insert_with(|| PeriodSummary::empty(&row.car_cc, period))
            .record(row.total_distance);
    }

    if skipped > 0 {
        debug!(skipped, "Rows without a valid operation date left out of summary");
    }

    sorted(buckets.into_values().collect())
}

/// Buckets `rows` by vehicle, then by period.
///
/// Every vehicle's summaries are sorted by period.
pub fn summarize_by_car(
    rows: &[DtakoRow],
    granularity: Granularity,
) -> BTreeMap<String, Vec<PeriodSummary>> {
    let mut vehicles: HashMap<&str, HashMap<String, PeriodSummary>> = HashMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let Some(day) = row.operation_day() else {
            skipped += 1;
            continue;
        };
        let period = granularity.bucket_key(day);

        vehicles
            .entry(row.car_cc.as_str())
            .or_default()
            .entry(period.clone())
            .or_insert_with(|| PeriodSummary::empty(&row.car_cc, period))
            .record(row.total_distance);
    }

    if skipped > 0 {
        debug!(skipped, "Rows without a valid operation date left out of summary");
    }

    vehicles
        .into_iter()
        .map(|(car_cc, buckets)| (car_cc.to_string(), sorted(buckets.into_values().collect())))
        .collect()
}

fn sorted(mut summaries: Vec<PeriodSummary>) -> Vec<PeriodSummary> {
    summaries.sort_by(|a, b| a.period.cmp(&b.period));
    summaries
}
