//! Stats module - derived metrics over the panel

mod calculator;

pub use calculator::{
    round1, EventStudyPoint, KpiSummary, MetricsError, RankedGrowth, StatsCalculator,
};
