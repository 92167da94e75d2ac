//! Dashboard assembly.
//! Runs one full pass over the cached datasets and collects every visual.

use crate::charts::{ChartPlotter, ChartSpec, KpiCard, MapSpec, TableBuilder, TableSpec};
use crate::config::DashboardConfig;
use crate::data::{DataCache, DataProcessor};
use crate::stats::StatsCalculator;
use serde::Serialize;
use tracing::{debug, error};

/// Everything the presentation layer draws, in page order.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub subtitle: String,
    pub kpis: Vec<KpiCard>,
    pub expansion_map: MapSpec,
    /// Withheld when the event-study origin year is missing.
    pub event_study: Option<ChartSpec>,
    pub scatter: ChartSpec,
    pub top_performers: ChartSpec,
    pub table: TableSpec,
}

impl Dashboard {
    /// Build every visual. `None` when either dataset failed to load.
    pub fn build(cache: &DataCache, config: &DashboardConfig) -> Option<Self> {
        let (Some(panel), Some(boundaries)) = (cache.table(), cache.boundaries()) else {
            return None;
        };
        let metrics = &config.metrics;

        let kpi = StatsCalculator::kpi_summary(panel, metrics);

        let event_study = match StatsCalculator::event_study(panel, metrics) {
            Ok(points) => Some(ChartPlotter::event_study_chart(
                &points,
                metrics.event_origin_year,
            )),
            Err(e) => {
                error!("Event study withheld: {}", e);
                None
            }
        };

        let pair = DataProcessor::join_years(panel, metrics.baseline_year, metrics.outcome_year);
        let top = StatsCalculator::top_growth(&pair, metrics.top_n);

        debug!(
            "Dashboard pass: {} rows, {} joined municipalities",
            panel.len(),
            pair.len()
        );

        Some(Self {
            title: "Monitor de Eficiência (0 a 3 anos)".to_string(),
            subtitle: "Educação Infantil | Ceará".to_string(),
            kpis: ChartPlotter::kpi_cards(&kpi, &config.impact_headline),
            expansion_map: ChartPlotter::expansion_map(&pair, boundaries),
            event_study,
            scatter: ChartPlotter::scatter_chart(&pair, metrics),
            top_performers: ChartPlotter::top_growth_chart(
                &top,
                metrics.highlight_municipality.as_deref(),
            ),
            table: TableBuilder::build_detail_table(&pair, metrics.coverage_target),
        })
    }
}
