//! Data Processor Module
//! Joins two year slices of the panel on the municipality id.

use super::loader::{MunicipalYearRecord, Panel};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A municipality observed in both the baseline and the outcome year.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedMunicipality {
    pub municipality_id: String,
    /// Name and group are taken from the outcome-year row.
    pub name: String,
    pub income_group: String,
    pub baseline_coverage: f64,
    pub outcome_coverage: f64,
    pub baseline_women: f64,
    pub outcome_women: f64,
}

impl PairedMunicipality {
    /// Coverage change in percentage points.
    pub fn expansion(&self) -> f64 {
        self.outcome_coverage - self.baseline_coverage
    }

    /// Female population growth in percent.
    ///
    /// `None` when the baseline count is zero or either count is missing.
    pub fn growth_pct(&self) -> Option<f64> {
        if self.baseline_women == 0.0 || self.baseline_women.is_nan() || self.outcome_women.is_nan()
        {
            return None;
        }
        Some((self.outcome_women - self.baseline_women) / self.baseline_women * 100.0)
    }
}

/// The intersection of two year slices, ordered by municipality id.
#[derive(Debug, Clone)]
pub struct YearPair {
    pub baseline_year: i32,
    pub outcome_year: i32,
    rows: Vec<PairedMunicipality>,
}

impl YearPair {
    pub fn rows(&self) -> &[PairedMunicipality] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Handles year slicing and joining.
pub struct DataProcessor;

impl DataProcessor {
    /// Index one year slice by municipality id. The first row wins on duplicates.
    pub fn index_year(panel: &Panel, year: i32) -> BTreeMap<&str, &MunicipalYearRecord> {
        let mut index: BTreeMap<&str, &MunicipalYearRecord> = BTreeMap::new();

        for record in panel.year_slice(year) {
            if index.contains_key(record.municipality_id.as_str()) {
                warn!(
                    "Duplicate row for municipality {} in {}; keeping the first",
                    record.municipality_id, year
                );
                continue;
            }
            index.insert(record.municipality_id.as_str(), record);
        }

        index
    }

    /// Join the baseline and outcome slices, keeping only ids present in both.
    pub fn join_years(panel: &Panel, baseline_year: i32, outcome_year: i32) -> YearPair {
        let baseline = Self::index_year(panel, baseline_year);
        let outcome = Self::index_year(panel, outcome_year);

        let rows: Vec<PairedMunicipality> = outcome
            .iter()
            .filter_map(|(id, after)| {
                let before = baseline.get(id)?;
                Some(PairedMunicipality {
                    municipality_id: id.to_string(),
                    name: after.name.clone(),
                    income_group: after.income_group.clone(),
                    baseline_coverage: before.coverage,
                    outcome_coverage: after.coverage,
                    baseline_women: before.female_population,
                    outcome_women: after.female_population,
                })
            })
            .collect();

        debug!(
            "Joined {} municipalities ({} in {}, {} in {})",
            rows.len(),
            baseline.len(),
            baseline_year,
            outcome.len(),
            outcome_year
        );

        YearPair {
            baseline_year,
            outcome_year,
            rows,
        }
    }
}
