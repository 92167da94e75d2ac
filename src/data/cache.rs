//! Data Cache Module
//! Holds the two loaded datasets for the lifetime of the process.

use super::boundaries::{BoundaryLoader, BoundarySet};
use super::loader::{DataLoader, LoaderError, Panel};
use std::path::Path;
use tracing::{error, info};

/// Startup-populated holder of the panel and the boundary set.
///
/// Either side is `None` when its load failed; the failure has already been
/// reported through the log by then. Nothing here is ever reloaded.
#[derive(Debug, Default)]
pub struct DataCache {
    table: Option<Panel>,
    boundaries: Option<BoundarySet>,
}

impl DataCache {
    /// Load both sources once.
    pub fn load(data_path: &Path, geojson_path: &Path) -> Self {
        let table = Self::report("panel", DataLoader::load_table(data_path));
        let boundaries = Self::report("boundaries", BoundaryLoader::load_boundaries(geojson_path));
        Self::from_parts(table, boundaries)
    }

    pub fn from_parts(table: Option<Panel>, boundaries: Option<BoundarySet>) -> Self {
        Self { table, boundaries }
    }

    pub fn table(&self) -> Option<&Panel> {
        self.table.as_ref()
    }

    pub fn boundaries(&self) -> Option<&BoundarySet> {
        self.boundaries.as_ref()
    }

    fn report<T>(what: &str, result: Result<T, LoaderError>) -> Option<T> {
        match result {
            Ok(value) => {
                info!("Loaded {}", what);
                Some(value)
            }
            Err(e) => {
                error!(kind = ?e.kind(), "Could not load {}: {}", what, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_withholds_missing_sources() {
        let dir = TempDir::new().unwrap();
        let geojson = dir.path().join("ceara.json");
        std::fs::write(&geojson, r#"{"type": "FeatureCollection", "features": []}"#).unwrap();

        let cache = DataCache::load(&dir.path().join("tabela.csv"), &geojson);
        assert!(cache.table().is_none());
        assert_eq!(cache.boundaries().map(|b| b.len()), Some(0));
    }

    #[test]
    fn test_load_withholds_malformed_sources() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("tabela.csv");
        let geojson = dir.path().join("ceara.json");
        std::fs::write(&csv, "ano,nome_municipio\n2019,Abaiara\n").unwrap();
        std::fs::write(&geojson, "not json").unwrap();

        let cache = DataCache::load(&csv, &geojson);
        assert!(cache.table().is_none());
        assert!(cache.boundaries().is_none());
    }
}
