//! Creche Monitor - early-childhood education dashboard core
//!
//! Loads the Ceará municipal panel and boundary file, derives the dashboard
//! metrics and writes the chart specifications as JSON on stdout.

mod charts;
mod config;
mod dashboard;
mod data;
mod stats;

use config::DashboardConfig;
use dashboard::Dashboard;
use data::DataCache;
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load()?;
    setup_logging(&config.log_level);

    info!(
        "Loading {} and {}",
        config.data_path.display(),
        config.geojson_path.display()
    );
    let cache = DataCache::load(&config.data_path, &config.geojson_path);

    let dashboard = Dashboard::build(&cache, &config);
    if dashboard.is_none() {
        warn!("Nothing to render: a source dataset is unavailable");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &dashboard)?;
    writeln!(out)?;

    Ok(())
}

/// Initialise the global `tracing` subscriber on stderr.
///
/// Falls back to `info` when the configured level is not a valid filter.
fn setup_logging(log_level: &str) {
    let filter =
        EnvFilter::try_new(log_level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
