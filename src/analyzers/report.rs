use crate::analyzers::aggregate::{summarize, summarize_by_car};
use crate::analyzers::types::{
    CsvExport, DailyReport, Granularity, MonthlyFuelReport, ReportSummary, VehicleMonthlyReport,
    VehicleSummaries,
};
use crate::error::QueryError;
use crate::fetch::BatchReader;
use crate::output::report_to_csv;
use crate::query::RowQuery;
use tracing::info;

/// Fuel and distance reports built from full filtered scans.
///
/// Nothing is cached: each call scans the upstream store again.
pub struct Reports<R> {
    query: RowQuery<R>,
}

impl<R: BatchReader> Reports<R> {
    pub fn new(query: RowQuery<R>) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &RowQuery<R> {
        &self.query
    }

    /// Monthly distance, estimated fuel and efficiency for one vehicle.
    #[tracing::instrument(skip(self))]
    pub async fn monthly_fuel_consumption(
        &self,
        car_cc: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<MonthlyFuelReport, QueryError> {
        require_car_cc(car_cc)?;

        let rows = self
            .query
            .list_by_car_cc_and_date_range(car_cc, start_date, end_date, 0)
            .await?;
        info!(rows = rows.len(), "Rows selected for monthly summary");

        let summaries: Vec<ReportSummary> = summarize(&rows, Granularity::Month)
            .into_iter()
            .map(ReportSummary::from)
            .collect();
        info!(months = summaries.len(), "Monthly summary aggregated");

        Ok(MonthlyFuelReport {
            car_cc: car_cc.to_string(),
            period: period_label(start_date, end_date),
            summaries,
        })
    }

    /// Monthly summaries for every vehicle with operations in the period,
    /// ordered by vehicle code.
    #[tracing::instrument(skip(self))]
    pub async fn vehicle_monthly_summary(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<VehicleMonthlyReport, QueryError> {
        let rows = self
            .query
            .list_by_date_range(start_date, end_date, 0)
            .await?;
        info!(rows = rows.len(), "Rows selected for fleet summary");

        let vehicles: Vec<VehicleSummaries> = summarize_by_car(&rows, Granularity::Month)
            .into_iter()
            .map(|(car_cc, summaries)| VehicleSummaries {
                car_cc,
                summaries: summaries.into_iter().map(ReportSummary::from).collect(),
            })
            .collect();
        info!(vehicles = vehicles.len(), "Fleet summary aggregated");

        Ok(VehicleMonthlyReport {
            period: period_label(start_date, end_date),
            total_vehicles: vehicles.len(),
            vehicles,
        })
    }

    /// Daily distance and estimated fuel for one vehicle.
    #[tracing::instrument(skip(self))]
    pub async fn daily_summary(
        &self,
        car_cc: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<DailyReport, QueryError> {
        require_car_cc(car_cc)?;

        let rows = self
            .query
            .list_by_car_cc_and_date_range(car_cc, start_date, end_date, 0)
            .await?;

        let summaries = summarize(&rows, Granularity::Day);
        info!(days = summaries.len(), "Daily summary aggregated");

        Ok(DailyReport {
            car_cc: car_cc.to_string(),
            period: period_label(start_date, end_date),
            summaries,
        })
    }

    /// The monthly report as CSV, including the efficiency column.
    pub async fn export_monthly_fuel_csv(
        &self,
        car_cc: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<CsvExport, QueryError> {
        let report = self
            .monthly_fuel_consumption(car_cc, start_date, end_date)
            .await?;

        let csv_data = report_to_csv(&report.summaries)
            .map_err(|e| QueryError::Export(e.to_string()))?;

        Ok(CsvExport {
            filename: format!("monthly_fuel_{car_cc}_{start_date}_{end_date}.csv"),
            csv_data,
        })
    }
}

fn require_car_cc(car_cc: &str) -> Result<(), QueryError> {
    if car_cc.trim().is_empty() {
        return Err(QueryError::invalid_input("car_cc is required"));
    }
    Ok(())
}

fn period_label(start_date: &str, end_date: &str) -> String {
    format!("{start_date} ~ {end_date}")
}
