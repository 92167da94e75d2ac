//! Boundary Loader Module
//! Reads the municipal GeoJSON and derives the 6-digit join key of each feature.

use super::loader::LoaderError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Length of the municipality code shared with the panel.
pub const JOIN_KEY_LEN: usize = 6;

#[derive(Deserialize)]
struct RawFeatureCollection {
    features: Vec<Map<String, Value>>,
}

/// A single boundary polygon and the key it joins to the panel with.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub join_key: Option<String>,
    pub feature: Map<String, Value>,
}

/// All boundary features, in file order.
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    features: Vec<BoundaryFeature>,
}

impl BoundarySet {
    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Rebuild a FeatureCollection holding only features whose key is in `keys`.
    /// Features without a key never match.
    pub fn feature_collection_for(&self, keys: &HashSet<&str>) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .filter(|f| {
                f.join_key
                    .as_deref()
                    .map(|k| keys.contains(k))
                    .unwrap_or(false)
            })
            .map(|f| Value::Object(f.feature.clone()))
            .collect();

        serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

/// Handles boundary file loading.
pub struct BoundaryLoader;

impl BoundaryLoader {
    /// Load the GeoJSON boundary file at `path`.
    pub fn load_boundaries(path: &Path) -> Result<BoundarySet, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        let set = Self::parse_boundaries(&text)?;
        debug!(
            "Loaded {} boundary features from {}",
            set.len(),
            path.display()
        );
        Ok(set)
    }

    /// Parse GeoJSON text, assigning each feature's `id` from `properties.id`.
    pub fn parse_boundaries(text: &str) -> Result<BoundarySet, LoaderError> {
        let collection: RawFeatureCollection = serde_json::from_str(text)?;

        let mut unkeyed = 0usize;
        let features = collection
            .features
            .into_iter()
            .map(|mut feature| {
                let join_key = feature
                    .get("properties")
                    .and_then(Value::as_object)
                    .and_then(|props| props.get("id"))
                    .and_then(Self::id_to_string)
                    .map(|id| Self::join_key(&id));

                match &join_key {
                    Some(key) => {
                        feature.insert("id".to_string(), Value::String(key.clone()));
                    }
                    None => unkeyed += 1,
                }

                BoundaryFeature { join_key, feature }
            })
            .collect();

        if unkeyed > 0 {
            warn!("{} boundary features carry no id and will not be mapped", unkeyed);
        }

        Ok(BoundarySet { features })
    }

    /// First 6 characters of the long-form id.
    pub fn join_key(id: &str) -> String {
        id.chars().take(JOIN_KEY_LEN).collect()
    }

    fn id_to_string(value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
