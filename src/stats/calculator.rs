//! Metrics Calculator Module
//! KPI summary, event-study series and growth ranking over the panel.

use crate::config::MetricsConfig;
use crate::data::{Panel, YearPair};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq)]
pub enum MetricsError {
    #[error("Event-study origin year {0} has no gap: both groups must be present")]
    MissingOriginYear(i32),
}

/// Headline numbers for the outcome year.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    pub year: i32,
    /// `None` when the year has no defined coverage values.
    pub mean_coverage: Option<f64>,
    pub below_target: usize,
}

/// One year of the event study.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStudyPoint {
    pub year: i32,
    pub higher_mean: f64,
    pub lower_mean: f64,
    pub gap: f64,
    /// Gap minus the gap at the origin year.
    pub normalized_gap: f64,
}

/// A municipality's female population growth, as ranked for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedGrowth {
    pub municipality_id: String,
    pub name: String,
    pub growth: f64,
}

/// Handles the derived metrics. Stateless; every call recomputes from the panel.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Arithmetic mean ignoring `NaN`. `None` when nothing is left.
    pub fn mean(values: &[f64]) -> Option<f64> {
        let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if defined.is_empty() {
            return None;
        }
        Some(Statistics::mean(&defined))
    }

    /// Mean coverage and below-target count for the outcome year.
    pub fn kpi_summary(panel: &Panel, config: &MetricsConfig) -> KpiSummary {
        let coverage: Vec<f64> = panel
            .year_slice(config.outcome_year)
            .map(|r| r.coverage)
            .collect();

        // NaN compares false, so missing values never count as below target
        let below_target = coverage
            .iter()
            .filter(|&&c| c < config.coverage_target)
            .count();

        KpiSummary {
            year: config.outcome_year,
            mean_coverage: Self::mean(&coverage),
            below_target,
        }
    }

    /// Per-year gap in mean log female employment between the two groups,
    /// normalized to zero at the configured origin year.
    ///
    /// Years where either group has no defined mean are left out. The origin
    /// year must have a gap, otherwise [`MetricsError::MissingOriginYear`].
    pub fn event_study(
        panel: &Panel,
        config: &MetricsConfig,
    ) -> Result<Vec<EventStudyPoint>, MetricsError> {
        let mut by_year: BTreeMap<i32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

        for record in panel.records() {
            let entry = by_year.entry(record.year).or_default();
            if record.income_group == config.higher_group {
                entry.0.push(record.log_female_employment);
            } else if record.income_group == config.lower_group {
                entry.1.push(record.log_female_employment);
            }
        }

        let gaps: Vec<(i32, f64, f64)> = by_year
            .iter()
            .filter_map(|(&year, (higher, lower))| {
                Some((year, Self::mean(higher)?, Self::mean(lower)?))
            })
            .collect();

        let origin_gap = gaps
            .iter()
            .find(|(year, _, _)| *year == config.event_origin_year)
            .map(|(_, higher, lower)| higher - lower)
            .ok_or(MetricsError::MissingOriginYear(config.event_origin_year))?;

        debug!(
            "Event study over {} years, origin {} gap {:.4}",
            gaps.len(),
            config.event_origin_year,
            origin_gap
        );

        Ok(gaps
            .into_iter()
            .map(|(year, higher_mean, lower_mean)| {
                let gap = higher_mean - lower_mean;
                EventStudyPoint {
                    year,
                    higher_mean,
                    lower_mean,
                    gap,
                    normalized_gap: gap - origin_gap,
                }
            })
            .collect())
    }

    /// The `n` largest defined growth values, returned smallest first.
    ///
    /// Ties at the cut are broken by ascending municipality id.
    pub fn top_growth(pair: &YearPair, n: usize) -> Vec<RankedGrowth> {
        let mut ranked: Vec<RankedGrowth> = pair
            .rows()
            .iter()
            .filter_map(|row| {
                row.growth_pct().map(|growth| RankedGrowth {
                    municipality_id: row.municipality_id.clone(),
                    name: row.name.clone(),
                    growth,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.growth
                .total_cmp(&a.growth)
                .then_with(|| a.municipality_id.cmp(&b.municipality_id))
        });
        ranked.truncate(n);

        // Stable, so equal values keep ascending id order
        ranked.sort_by(|a, b| a.growth.total_cmp(&b.growth));
        ranked
    }
}

/// Round to one decimal, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
