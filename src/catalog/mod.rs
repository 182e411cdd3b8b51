//! # Stage Catalog
//!
//! Static, ordered definitions of crop growth stages keyed by crop type.
//! The catalog is shared read-only configuration: lifecycle instances look
//! stages up here but never mutate them.

pub mod definitions;
pub mod loader;

use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

pub use definitions::{CropCatalogEntry, StageDefinition};
pub use loader::CatalogError;

use crate::state_machine::errors::{unknown_crop, LifecycleResult};

const BUNDLED_CATALOG: &str = include_str!("../../config/crop_catalog.yaml");

/// Read-only lookup of stage definitions per crop type
#[derive(Debug, Clone)]
pub struct StageCatalog {
    crops: BTreeMap<String, CropCatalogEntry>,
}

impl StageCatalog {
    /// Catalog compiled into the binary
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUNDLED_CATALOG)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let crops = loader::parse_catalog(yaml)?;
        Ok(Self { crops })
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let yaml = loader::read_catalog_file(path)?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            crops = ?catalog.available_crops(),
            "Crop catalog loaded"
        );
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise fall back to the bundled catalog
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Ordered stages for a crop type (case-insensitive)
    pub fn stages_for(&self, crop_type: &str) -> LifecycleResult<&[StageDefinition]> {
        self.entry(crop_type).map(|entry| entry.stages.as_slice())
    }

    pub fn entry(&self, crop_type: &str) -> LifecycleResult<&CropCatalogEntry> {
        self.crops
            .get(&crop_type.trim().to_lowercase())
            .ok_or_else(|| unknown_crop(crop_type))
    }

    pub fn contains(&self, crop_type: &str) -> bool {
        self.crops.contains_key(&crop_type.trim().to_lowercase())
    }

    pub fn available_crops(&self) -> Vec<String> {
        self.crops.keys().cloned().collect()
    }
}
