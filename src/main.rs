//! CLI entry point for the dtako_rows query tool.
//!
//! Lists filtered operation rows from the upstream row store and builds the
//! monthly, fleet and daily fuel reports, optionally exporting them as CSV.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dtako_rows::analyzers::report::Reports;
use dtako_rows::{
    config::UpstreamConfig,
    fetch::{BasicClient, BatchReader, HttpBatchReader, auth::ApiKey},
    filter::{FilterCriteria, Window},
    output::{print_json, print_pretty, summaries_to_csv, write_export},
    query::RowQuery,
    rows::parse_boundary_date,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "dtako_rows")]
#[command(about = "Filtered queries and fuel reports over vehicle operation rows", long_about = None)]
struct Cli {
    /// Base URL of the row store (overrides DTAKO_UPSTREAM_URL)
    #[arg(long, global = true)]
    upstream_url: Option<String>,

    /// Rows per upstream read (overrides DTAKO_BATCH_SIZE)
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Period {
    /// First operation date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// Last operation date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List rows matching the given filters
    List {
        /// Vehicle code
        #[arg(long)]
        car_cc: Option<String>,

        /// First operation date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Last operation date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Minimum distance in km
        #[arg(long)]
        min_distance: Option<f64>,

        /// Operation number; repeat to accept several
        #[arg(long = "operation-no")]
        operation_nos: Vec<String>,

        /// Skip operations with zero distance
        #[arg(long, default_value_t = false)]
        exclude_zero: bool,

        /// Matches to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Matches to return (0 = all, exact total)
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },
    /// Monthly distance and estimated fuel for one vehicle
    Monthly {
        #[arg(long)]
        car_cc: String,

        #[command(flatten)]
        period: Period,
    },
    /// Monthly summaries for every vehicle
    Vehicles {
        #[command(flatten)]
        period: Period,
    },
    /// Daily distance and estimated fuel for one vehicle
    Daily {
        #[arg(long)]
        car_cc: String,

        #[command(flatten)]
        period: Period,

        /// Optional: also write the daily summaries to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the monthly report of one vehicle as CSV
    Export {
        #[arg(long)]
        car_cc: String,

        #[command(flatten)]
        period: Period,

        /// Directory to write the CSV file into
        #[arg(short = 'd', long, default_value = "exports")]
        output_dir: PathBuf,

        /// Gzip compress the CSV file
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/dtako_rows.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("dtako_rows.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let query = build_query(&cli)?;

    match cli.command {
        Commands::List {
            car_cc,
            start,
            end,
            min_distance,
            operation_nos,
            exclude_zero,
            offset,
            limit,
        } => {
            let mut criteria = FilterCriteria {
                car_cc,
                min_distance,
                operation_nos,
                exclude_zero_distance: exclude_zero,
                ..Default::default()
            };
            if let Some(start) = start {
                criteria.start_date = Some(
                    parse_boundary_date(&start).with_context(|| format!("invalid --start '{start}'"))?,
                );
            }
            if let Some(end) = end {
                criteria.end_date =
                    Some(parse_boundary_date(&end).with_context(|| format!("invalid --end '{end}'"))?);
            }

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling scan");
                    on_interrupt.cancel();
                }
            });

            let page = query
                .query_with_cancel(&criteria, Window::new(offset, limit), &cancel)
                .await?;

            info!(
                returned = page.rows.len(),
                match_count_at_stop = page.match_count_at_stop,
                exact_total = page.is_exact_total(),
                "Rows listed"
            );
            if !page.is_exact_total() {
                info!("Scan stopped once the window was full; pass --limit 0 for the exact total");
            }
            print_json(&page.rows)?;
        }
        Commands::Monthly { car_cc, period } => {
            let reports = Reports::new(query);
            let report = reports
                .monthly_fuel_consumption(&car_cc, &period.start, &period.end)
                .await?;
            print_pretty(&report);
            print_json(&report)?;
        }
        Commands::Vehicles { period } => {
            let reports = Reports::new(query);
            let report = reports
                .vehicle_monthly_summary(&period.start, &period.end)
                .await?;
            info!(total_vehicles = report.total_vehicles, period = %report.period, "Fleet summary");
            print_json(&report)?;
        }
        Commands::Daily {
            car_cc,
            period,
            output,
        } => {
            let reports = Reports::new(query);
            let report = reports
                .daily_summary(&car_cc, &period.start, &period.end)
                .await?;
            print_json(&report)?;

            if let Some(path) = output {
                let csv = summaries_to_csv(&report.summaries)?;
                write_export(&path, &csv, false)?;
            }
        }
        Commands::Export {
            car_cc,
            period,
            output_dir,
            gzip,
        } => {
            let reports = Reports::new(query);
            let export = reports
                .export_monthly_fuel_csv(&car_cc, &period.start, &period.end)
                .await?;
            let written = write_export(&output_dir.join(&export.filename), &export.csv_data, gzip)?;
            info!(path = %written.display(), "Monthly fuel CSV exported");
        }
    }

    Ok(())
}

/// Wires the HTTP reader, with bearer auth when a token is configured.
fn build_query(cli: &Cli) -> Result<RowQuery<Arc<dyn BatchReader>>> {
    let mut config = match &cli.upstream_url {
        Some(url) => UpstreamConfig::from_lookup(|key| match key {
            "DTAKO_UPSTREAM_URL" => Some(url.clone()),
            _ => std::env::var(key).ok(),
        })?,
        None => UpstreamConfig::from_env()?,
    };
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }

    info!(
        upstream = %config.base_url,
        batch_size = config.batch_size,
        authenticated = config.token.is_some(),
        "Upstream configured"
    );

    let client = BasicClient::with_timeout(config.timeout)?;
    let reader: Arc<dyn BatchReader> = match &config.token {
        Some(token) => Arc::new(HttpBatchReader::new(ApiKey::bearer(client, token)?, &config.base_url)?),
        None => Arc::new(HttpBatchReader::new(client, &config.base_url)?),
    };

    Ok(RowQuery::new(reader)
        .with_batch_size(config.batch_size)
        .with_order_by(config.order_by))
}
