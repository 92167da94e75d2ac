//! Dashboard configuration.
//!
//! Every field has a default matching the Ceará 2007/2019 panel, so the
//! optional `creche-monitor.json` only needs to carry the values it changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "creche-monitor.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parameters of the Metrics Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Year A of the expansion/growth views.
    pub baseline_year: i32,
    /// Year B of the expansion/growth views and of the KPI summary.
    pub outcome_year: i32,
    /// Year whose gap is subtracted in the event study. Must exist in the data.
    pub event_origin_year: i32,
    /// Coverage percentage a municipality must reach to meet the target.
    pub coverage_target: f64,
    pub top_n: usize,
    pub higher_group: String,
    pub lower_group: String,
    /// Municipality drawn in the accent color on the top performers chart.
    pub highlight_municipality: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            baseline_year: 2007,
            outcome_year: 2019,
            event_origin_year: 2012,
            coverage_target: 50.0,
            top_n: 5,
            higher_group: "Maior Dinamismo Econômico".to_string(),
            lower_group: "Menor Dinamismo Econômico".to_string(),
            highlight_municipality: Some("Quixeramobim".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub geojson_path: PathBuf,
    pub log_level: String,
    /// Static headline shown on the third KPI card.
    pub impact_headline: String,
    pub metrics: MetricsConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("tabela.csv"),
            geojson_path: PathBuf::from("ceara.json"),
            log_level: "info".to_string(),
            impact_headline: "+42.5%".to_string(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from [`CONFIG_FILE_NAME`] in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Load from an explicit path. An absent file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
