//! Detail Table Module
//! One row per municipality observed in both years of the pair.

use crate::data::YearPair;
use crate::stats::round1;
use serde::Serialize;

pub const TARGET_MET: &str = "Sim";
pub const TARGET_MISSED: &str = "Não";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub municipality: String,
    pub group: String,
    /// Outcome-year coverage, rounded to one decimal.
    pub coverage: f64,
    pub target: &'static str,
    pub expansion: f64,
    /// `None` when growth is undefined.
    pub growth: Option<f64>,
}

impl DetailRow {
    pub fn meets_target(&self) -> bool {
        self.target == TARGET_MET
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub key: &'static str,
    pub header: String,
    /// Progress-bar bounds for columns shown as a bar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    pub title: String,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<DetailRow>,
}

/// Builds the municipality detail table.
pub struct TableBuilder;

impl TableBuilder {
    /// Rows follow the pair's order. The target flag is judged on the rounded
    /// coverage, so 49.96 meets a target of 50.
    pub fn build_detail_table(pair: &YearPair, coverage_target: f64) -> TableSpec {
        let rows = pair
            .rows()
            .iter()
            .map(|row| {
                let coverage = round1(row.outcome_coverage);
                DetailRow {
                    municipality: row.name.clone(),
                    group: row.income_group.clone(),
                    coverage,
                    target: if coverage >= coverage_target {
                        TARGET_MET
                    } else {
                        TARGET_MISSED
                    },
                    expansion: round1(row.expansion()),
                    growth: row.growth_pct().map(round1),
                }
            })
            .collect();

        TableSpec {
            title: "Tabela de Municípios Detalhada".to_string(),
            columns: Self::columns(pair.outcome_year),
            rows,
        }
    }

    fn columns(outcome_year: i32) -> Vec<TableColumn> {
        let column = |key: &'static str, header: String| TableColumn {
            key,
            header,
            progress: None,
        };

        vec![
            column("municipality", "Município".to_string()),
            column("group", "Grupo".to_string()),
            TableColumn {
                key: "coverage",
                header: format!("Cobertura ({})", outcome_year),
                progress: Some((0.0, 100.0)),
            },
            column("target", "Meta".to_string()),
            column("expansion", "Expansão".to_string()),
            column("growth", "Crescimento".to_string()),
        ]
    }
}
