use async_trait::async_trait;
use dtako_rows::analyzers::report::Reports;
use dtako_rows::error::{QueryError, UpstreamError};
use dtako_rows::fetch::{BatchReader, OrderBy};
use dtako_rows::filter::{FilterCriteria, Window};
use dtako_rows::output::summaries_to_csv;
use dtako_rows::query::RowQuery;
use dtako_rows::rows::DtakoRow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves rows from memory and counts reads.
struct MemoryStore {
    rows: Vec<DtakoRow>,
    reads: AtomicUsize,
}

impl MemoryStore {
    fn new(rows: Vec<DtakoRow>) -> Self {
        Self {
            rows,
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BatchReader for MemoryStore {
    async fn read_batch(
        &self,
        offset: usize,
        limit: usize,
        _order_by: &OrderBy,
    ) -> Result<Vec<DtakoRow>, UpstreamError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
    }
}

struct BrokenStore;

#[async_trait]
impl BatchReader for BrokenStore {
    async fn read_batch(&self, _: usize, _: usize, _: &OrderBy) -> Result<Vec<DtakoRow>, UpstreamError> {
        Err(UpstreamError::Status {
            status: 503,
            body: "db_service unavailable".into(),
        })
    }
}

fn row(id: &str, car: &str, date: &str, dist: f64) -> DtakoRow {
    DtakoRow {
        id: id.to_string(),
        operation_no: format!("op-{id}"),
        car_cc: car.to_string(),
        driver_cd: "D01".to_string(),
        operation_date: date.to_string(),
        total_distance: dist,
        ..Default::default()
    }
}

fn fleet() -> Vec<DtakoRow> {
    vec![
        row("1", "A", "2024-01-05T08:00:00+09:00", 100.0),
        row("2", "A", "2024-01-20T09:30:00+09:00", 50.0),
        row("3", "B", "2024-02-01T07:00:00+09:00", 30.0),
        row("4", "A", "2024-02-03T07:00:00+09:00", 0.0),
        row("5", "B", "2024-02-14", 70.0),
        row("6", "A", "corrupted", 999.0),
        row("7", "C", "2024-03-01", 12.0),
    ]
}

fn reports(rows: Vec<DtakoRow>, batch_size: usize) -> Reports<Arc<MemoryStore>> {
    let store = Arc::new(MemoryStore::new(rows));
    Reports::new(RowQuery::new(store).with_batch_size(batch_size))
}

#[tokio::test]
async fn test_monthly_report_for_one_vehicle() {
    let reports = reports(fleet(), 2);

    let report = reports
        .monthly_fuel_consumption("A", "2024-01-01", "2024-02-29")
        .await
        .unwrap();

    assert_eq!(report.car_cc, "A");
    assert_eq!(report.period, "2024-01-01 ~ 2024-02-29");
    assert_eq!(report.summaries.len(), 2);

    let jan = &report.summaries[0];
    assert_eq!(jan.period, "2024-01");
    assert_eq!(jan.total_distance, 150.0);
    assert_eq!(jan.total_fuel, 15.0);
    assert_eq!(jan.trip_count, 2);
    assert_eq!(jan.avg_fuel_efficiency, 10.0);

    let feb = &report.summaries[1];
    assert_eq!(feb.period, "2024-02");
    assert_eq!(feb.trip_count, 1);
    assert_eq!(feb.avg_fuel_efficiency, 0.0);
}

#[tokio::test]
async fn test_fleet_report_groups_every_vehicle() {
    let reports = reports(fleet(), 3);

    let report = reports
        .vehicle_monthly_summary("2024-01-01", "2024-03-31")
        .await
        .unwrap();

    assert_eq!(report.total_vehicles, 3);
    let cars: Vec<_> = report.vehicles.iter().map(|v| v.car_cc.as_str()).collect();
    assert_eq!(cars, vec!["A", "B", "C"]);

    let b = &report.vehicles[1];
    assert_eq!(b.summaries.len(), 1);
    assert_eq!(b.summaries[0].total_distance, 100.0);
    assert_eq!(b.summaries[0].trip_count, 2);

    // the corrupted row never reaches a summary
    let a_total: f64 = report.vehicles[0].summaries.iter().map(|s| s.total_distance).sum();
    assert_eq!(a_total, 150.0);
}

#[tokio::test]
async fn test_daily_report_and_csv() {
    let reports = reports(fleet(), 1000);

    let report = reports
        .daily_summary("B", "2024-02-01", "2024-02-29")
        .await
        .unwrap();

    let days: Vec<_> = report.summaries.iter().map(|s| s.period.as_str()).collect();
    assert_eq!(days, vec!["2024-02-01", "2024-02-14"]);

    let csv = summaries_to_csv(&report.summaries).unwrap();
    assert_eq!(
        csv,
        "period,car_cc,total_distance_km,total_fuel_l,trip_count\n\
         2024-02-01,B,30.0,3.0,1\n\
         2024-02-14,B,70.0,7.0,1\n"
    );
}

#[tokio::test]
async fn test_export_monthly_csv() {
    let reports = reports(fleet(), 4);

    let export = reports
        .export_monthly_fuel_csv("A", "2024-01-01", "2024-01-31")
        .await
        .unwrap();

    assert_eq!(export.filename, "monthly_fuel_A_2024-01-01_2024-01-31.csv");
    assert_eq!(
        export.csv_data,
        "period,car_cc,total_distance_km,total_fuel_l,trip_count,avg_fuel_efficiency_km_l\n\
         2024-01,A,150.0,15.0,2,10.00\n"
    );
}

#[tokio::test]
async fn test_missing_car_cc_is_rejected_before_upstream() {
    let store = Arc::new(MemoryStore::new(fleet()));
    let reports = Reports::new(RowQuery::new(store.clone()));

    let err = reports
        .monthly_fuel_consumption("", "2024-01-01", "2024-01-31")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidInput(_)));

    let err = reports
        .daily_summary("A", "2024-01-01", "31/01/2024")
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::InvalidInput(_)));

    assert_eq!(store.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_failure_surfaces_as_retryable() {
    let reports = Reports::new(RowQuery::new(BrokenStore));

    let err = reports
        .vehicle_monthly_summary("2024-01-01", "2024-01-31")
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(matches!(err, QueryError::Upstream(UpstreamError::Status { status: 503, .. })));
}

#[tokio::test]
async fn test_period_without_rows_is_empty_not_error() {
    let reports = reports(fleet(), 2);

    let report = reports
        .monthly_fuel_consumption("A", "2030-01-01", "2030-12-31")
        .await
        .unwrap();
    assert!(report.summaries.is_empty());

    let fleet_report = reports
        .vehicle_monthly_summary("2030-01-01", "2030-12-31")
        .await
        .unwrap();
    assert_eq!(fleet_report.total_vehicles, 0);
}

#[tokio::test]
async fn test_early_stop_count_versus_exact_total() {
    let store = Arc::new(MemoryStore::new(fleet()));
    let query = RowQuery::new(store.clone()).with_batch_size(2);
    let criteria = FilterCriteria::default().exclude_zero_distance();

    let first = query.query(&criteria, Window::first(1)).await.unwrap();
    assert_eq!(first.rows.len(), 1);
    assert_eq!(first.match_count_at_stop, 2);
    assert!(!first.is_exact_total());
    assert_eq!(store.reads.load(Ordering::SeqCst), 1);

    let all = query.query(&criteria, Window::all()).await.unwrap();
    assert_eq!(all.match_count_at_stop, 6);
    assert!(all.is_exact_total());
}
