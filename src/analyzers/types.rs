//! Data types produced by the aggregation pipeline.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::analyzers::utility::{estimate_fuel, fuel_efficiency};

/// Width of an aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Day,
}

impl Granularity {
    /// `YYYY-MM` or `YYYY-MM-DD`. Both are zero-padded and big-endian, so
    /// string order equals chronological order.
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Day => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Distance, estimated fuel and trip count of one vehicle over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub car_cc: String,
    pub period: String,
    pub total_distance: f64,
    pub total_fuel: f64,
    pub trip_count: u32,
}

impl PeriodSummary {
    pub(crate) fn empty(car_cc: &str, period: String) -> Self {
        Self {
            car_cc: car_cc.to_string(),
            period,
            total_distance: 0.0,
            total_fuel: 0.0,
            trip_count: 0,
        }
    }

    /// Adds one operation. Fuel is derived from the running distance rather
    /// than summed per row.
    pub(crate) fn record(&mut self, distance: f64) {
        self.total_distance += distance;
        self.trip_count += 1;
        self.total_fuel = estimate_fuel(self.total_distance);
    }
}

/// [`PeriodSummary`] with the average efficiency shown in reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub car_cc: String,
    pub period: String,
    pub total_distance: f64,
    pub total_fuel: f64,
    pub trip_count: u32,
    /// km per litre; 0 when no fuel was used.
    pub avg_fuel_efficiency: f64,
}

impl From<PeriodSummary> for ReportSummary {
    fn from(s: PeriodSummary) -> Self {
        let avg_fuel_efficiency = fuel_efficiency(s.total_distance, s.total_fuel);
        Self {
            car_cc: s.car_cc,
            period: s.period,
            total_distance: s.total_distance,
            total_fuel: s.total_fuel,
            trip_count: s.trip_count,
            avg_fuel_efficiency,
        }
    }
}

/// Monthly report for one vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyFuelReport {
    pub car_cc: String,
    pub period: String,
    pub summaries: Vec<ReportSummary>,
}

/// Monthly summaries of one vehicle inside a fleet report.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleSummaries {
    pub car_cc: String,
    pub summaries: Vec<ReportSummary>,
}

/// Monthly report for every vehicle with operations in the period.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleMonthlyReport {
    pub period: String,
    pub total_vehicles: usize,
    pub vehicles: Vec<VehicleSummaries>,
}

/// Daily report for one vehicle, sorted by date.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub car_cc: String,
    pub period: String,
    pub summaries: Vec<PeriodSummary>,
}

/// CSV text ready to be saved under `filename`.
#[derive(Debug, Clone, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub csv_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_keys_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(987, 3, 7).unwrap();
        assert_eq!(Granularity::Month.bucket_key(date), "0987-03");
        assert_eq!(Granularity::Day.bucket_key(date), "0987-03-07");
    }

    #[test]
    fn test_record_recomputes_fuel() {
        let mut s = PeriodSummary::empty("A", "2024-01".into());
        s.record(100.0);
        s.record(50.0);
        assert_eq!(s.total_distance, 150.0);
        assert_eq!(s.total_fuel, 15.0);
        assert_eq!(s.trip_count, 2);
    }

    #[test]
    fn test_report_summary_efficiency() {
        let mut s = PeriodSummary::empty("A", "2024-01".into());
        s.record(150.0);
        assert_eq!(ReportSummary::from(s).avg_fuel_efficiency, 10.0);

        let idle = PeriodSummary::empty("A", "2024-02".into());
        assert_eq!(ReportSummary::from(idle).avg_fuel_efficiency, 0.0);
    }
}
