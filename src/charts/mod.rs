//! Charts module - chart specifications and the detail table

mod plotter;
mod table;

pub use plotter::{ChartPlotter, ChartSpec, KpiCard, MapSpec};
pub use table::{TableBuilder, TableSpec};
