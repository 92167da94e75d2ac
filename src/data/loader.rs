//! Panel Data Loader Module
//! Reads the municipal panel CSV using Polars and converts it into typed records.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const COL_YEAR: &str = "ano";
pub const COL_MUNICIPALITY_ID: &str = "id_municipio_6";
pub const COL_MUNICIPALITY_NAME: &str = "nome_municipio";
pub const COL_INCOME_GROUP: &str = "grupo_renda";
pub const COL_COVERAGE: &str = "tae_creche_capped";
pub const COL_FEMALE_POPULATION: &str = "Total_mulheres";
pub const COL_LOG_FEMALE_EMPLOYMENT: &str = "log_emp_mulher";

/// Columns the panel file must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_YEAR,
    COL_MUNICIPALITY_ID,
    COL_MUNICIPALITY_NAME,
    COL_INCOME_GROUP,
    COL_COVERAGE,
    COL_FEMALE_POPULATION,
    COL_LOG_FEMALE_EMPLOYMENT,
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to parse GeoJSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Null value in column '{column}' at row {row}")]
    NullValue { column: &'static str, row: usize },
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// The two failure classes a load can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    NotFound,
    Parse,
}

impl LoaderError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoaderError::NotFound(_) => LoadErrorKind::NotFound,
            LoaderError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                LoadErrorKind::NotFound
            }
            _ => LoadErrorKind::Parse,
        }
    }
}

/// One row of the panel: a municipality observed in a given year.
///
/// Missing numeric cells are carried as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalYearRecord {
    pub municipality_id: String,
    pub name: String,
    pub year: i32,
    pub income_group: String,
    pub coverage: f64,
    pub female_population: f64,
    pub log_female_employment: f64,
}

/// The loaded panel. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    records: Vec<MunicipalYearRecord>,
}

impl Panel {
    pub fn new(records: Vec<MunicipalYearRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MunicipalYearRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Rows observed in `year`, in file order.
    pub fn year_slice(&self, year: i32) -> impl Iterator<Item = &MunicipalYearRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Handles panel loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load the panel CSV at `path`.
    pub fn load_table(path: &Path) -> Result<Panel, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let panel = Self::frame_to_panel(&df)?;
        debug!(
            "Loaded {} panel rows covering years {:?} from {}",
            panel.len(),
            panel.years(),
            path.display()
        );
        Ok(panel)
    }

    /// Convert a loaded frame into typed records, validating the schema.
    pub fn frame_to_panel(df: &DataFrame) -> Result<Panel, LoaderError> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|required| !columns.iter().any(|c| c == *required))
        {
            return Err(LoaderError::MissingColumn(missing.to_string()));
        }

        let ids = Self::string_values(df, COL_MUNICIPALITY_ID)?;
        let names = Self::string_values(df, COL_MUNICIPALITY_NAME)?;
        let groups = Self::string_values(df, COL_INCOME_GROUP)?;
        let years = Self::year_values(df)?;
        let coverage = Self::float_values(df, COL_COVERAGE)?;
        let population = Self::float_values(df, COL_FEMALE_POPULATION)?;
        let employment = Self::float_values(df, COL_LOG_FEMALE_EMPLOYMENT)?;

        let records = (0..df.height())
            .map(|i| MunicipalYearRecord {
                municipality_id: ids[i].clone(),
                name: names[i].clone(),
                year: years[i],
                income_group: groups[i].clone(),
                coverage: coverage[i],
                female_population: population[i],
                log_female_employment: employment[i],
            })
            .collect();

        Ok(Panel::new(records))
    }

    /// Read a key column as trimmed strings. Nulls are rejected.
    fn string_values(df: &DataFrame, name: &'static str) -> Result<Vec<String>, LoaderError> {
        let column = df.column(name)?;

        // Ids inferred as floats would stringify as "230010.0"
        let column = if column.dtype().is_float() {
            column.cast(&DataType::Int64)?
        } else {
            column.clone()
        };

        let as_str = column.cast(&DataType::String)?;
        let ca = as_str.as_materialized_series().str()?;

        ca.into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.map(|s| s.trim().to_string())
                    .ok_or(LoaderError::NullValue { column: name, row })
            })
            .collect()
    }

    fn year_values(df: &DataFrame) -> Result<Vec<i32>, LoaderError> {
        let column = df.column(COL_YEAR)?.cast(&DataType::Int32)?;
        let ca = column.as_materialized_series().i32()?;

        ca.into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or(LoaderError::NullValue {
                    column: COL_YEAR,
                    row,
                })
            })
            .collect()
    }

    /// Read a numeric column; nulls become `NaN`.
    fn float_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, LoaderError> {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let ca = column.as_materialized_series().f64()?;
        Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str =
        "ano,id_municipio_6,nome_municipio,grupo_renda,tae_creche_capped,Total_mulheres,log_emp_mulher";

    fn write_csv(dir: &TempDir, lines: &[&str]) -> PathBuf {
        let path = dir.path().join("tabela.csv");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_load_table_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            &[
                HEADER,
                "2007,230010,Abaiara,Menor Dinamismo Econômico,30.0,1000,5.1",
                "2019,230010,Abaiara,Menor Dinamismo Econômico,45.0,1200,5.4",
            ],
        );

        let panel = DataLoader::load_table(&path).unwrap();
        assert_eq!(panel.len(), 2);

        let first = &panel.records()[0];
        assert_eq!(first.municipality_id, "230010");
        assert_eq!(first.name, "Abaiara");
        assert_eq!(first.year, 2007);
        assert_eq!(first.income_group, "Menor Dinamismo Econômico");
        assert_eq!(first.coverage, 30.0);
        assert_eq!(first.female_population, 1000.0);
        assert_eq!(panel.years(), vec![2007, 2019]);
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = DataLoader::load_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
        assert_eq!(err.kind(), LoadErrorKind::NotFound);
    }

    #[test]
    fn test_load_table_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            &[
                "ano,id_municipio_6,nome_municipio,grupo_renda,tae_creche_capped,Total_mulheres",
                "2007,230010,Abaiara,Menor Dinamismo Econômico,30.0,1000",
            ],
        );

        let err = DataLoader::load_table(&path).unwrap_err();
        match &err {
            LoaderError::MissingColumn(name) => assert_eq!(name, COL_LOG_FEMALE_EMPLOYMENT),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), LoadErrorKind::Parse);
    }

    #[test]
    fn test_load_table_empty_numeric_cell_is_nan() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            &[
                HEADER,
                "2019,230010,Abaiara,Menor Dinamismo Econômico,,1200,5.4",
                "2019,230020,Acarape,Maior Dinamismo Econômico,55.5,900,",
            ],
        );

        let panel = DataLoader::load_table(&path).unwrap();
        assert!(panel.records()[0].coverage.is_nan());
        assert_eq!(panel.records()[1].coverage, 55.5);
        assert!(panel.records()[1].log_female_employment.is_nan());
    }

    #[test]
    fn test_load_table_null_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            &[
                HEADER,
                "2019,230010,Abaiara,Menor Dinamismo Econômico,45.0,1200,5.4",
                "2019,,Acarape,Maior Dinamismo Econômico,55.5,900,5.0",
            ],
        );

        let err = DataLoader::load_table(&path).unwrap_err();
        match err {
            LoaderError::NullValue { column, row } => {
                assert_eq!(column, COL_MUNICIPALITY_ID);
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_year_slice_filters_rows() {
        let record = |id: &str, year: i32| MunicipalYearRecord {
            municipality_id: id.to_string(),
            name: id.to_string(),
            year,
            income_group: "g".to_string(),
            coverage: 0.0,
            female_population: 0.0,
            log_female_employment: 0.0,
        };
        let panel = Panel::new(vec![
            record("a", 2007),
            record("b", 2019),
            record("c", 2019),
        ]);

        let ids: Vec<&str> = panel
            .year_slice(2019)
            .map(|r| r.municipality_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(panel.year_slice(2012).count(), 0);
    }
}
