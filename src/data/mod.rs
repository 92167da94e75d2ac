//! Data module - panel and boundary loading, year-pair processing

mod boundaries;
mod cache;
mod loader;
mod processor;

pub use boundaries::{BoundaryLoader, BoundarySet};
pub use cache::DataCache;
pub use loader::{DataLoader, LoadErrorKind, LoaderError, MunicipalYearRecord, Panel};
pub use processor::{DataProcessor, PairedMunicipality, YearPair};
