//! Output formatting and persistence for summaries.
//!
//! Supports pretty-printing, JSON logging, CSV rendering and writing exports
//! to disk with optional gzip compression.

use anyhow::Result;
use csv::{Terminator, WriterBuilder};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{PeriodSummary, ReportSummary};

const SUMMARY_HEADER: [&str; 5] = [
    "period",
    "car_cc",
    "total_distance_km",
    "total_fuel_l",
    "trip_count",
];

const EFFICIENCY_HEADER: &str = "avg_fuel_efficiency_km_l";

/// Logs any value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Renders summaries as CSV: a header, then one line per summary in input order.
///
/// Distance and fuel are written with one decimal.
pub fn summaries_to_csv(summaries: &[PeriodSummary]) -> Result<String> {
    render(&SUMMARY_HEADER, summaries.iter().map(|s| {
        vec![
            s.period.clone(),
            s.car_cc.clone(),
            format!("{:.1}", s.total_distance),
            format!("{:.1}", s.total_fuel),
            s.trip_count.to_string(),
        ]
    }))
}

/// Like [`summaries_to_csv`] with a trailing efficiency column at two decimals.
pub fn report_to_csv(summaries: &[ReportSummary]) -> Result<String> {
    let mut header = SUMMARY_HEADER.to_vec();
    header.push(EFFICIENCY_HEADER);

    render(&header, summaries.iter().map(|s| {
        vec![
            s.period.clone(),
            s.car_cc.clone(),
            format!("{:.1}", s.total_distance),
            format!("{:.1}", s.total_fuel),
            s.trip_count.to_string(),
            format!("{:.2}", s.avg_fuel_efficiency),
        ]
    }))
}

fn render(header: &[&str], records: impl Iterator<Item = Vec<String>>) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for record in records {
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Writes `text` to `path`, gzip-compressed with a `.gz` suffix when `gzip` is set.
///
/// Returns the path actually written.
pub fn write_export(path: &Path, text: &str, gzip: bool) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let target = if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };

    let mut file = File::create(&target)?;
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(text.as_bytes())?;
        encoder.finish()?.flush()?;
    } else {
        file.write_all(text.as_bytes())?;
        file.flush()?;
    }

    info!(path = %target.display(), bytes = text.len(), gzip, "Export written");
    Ok(target)
}
