//! YAML parsing and validation for the crop catalog.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::definitions::{CropCatalogEntry, StageDefinition};

/// Errors raised while loading a catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read crop catalog {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid crop catalog YAML: {0}")]
    InvalidYaml(String),
    #[error("Crop catalog defines no crops")]
    Empty,
    #[error("Crop '{crop}' defines no stages")]
    NoStages { crop: String },
    #[error("Crop '{crop}' repeats stage id '{stage_id}'")]
    DuplicateStageId { crop: String, stage_id: String },
    #[error("Stage '{stage_id}' of crop '{crop}' must last at least one day")]
    NonPositiveDuration { crop: String, stage_id: String },
    #[error("Stage orders of crop '{crop}' must run 0..{expected_len} without gaps")]
    NonContiguousOrder { crop: String, expected_len: usize },
    #[error("Stage durations of crop '{crop}' add up to more than {max} days")]
    DurationOverflow { crop: String, max: u32 },
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    crops: BTreeMap<String, RawCrop>,
}

#[derive(Debug, Deserialize)]
struct RawCrop {
    display_name: Option<String>,
    stages: Vec<RawStage>,
}

#[derive(Debug, Deserialize)]
struct RawStage {
    id: String,
    label: String,
    order: Option<u32>,
    duration_days: u32,
    description: Option<String>,
    #[serde(default)]
    tasks: Vec<String>,
}

pub(crate) fn read_catalog_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::FileRead {
        path: path.display().to_string(),
        source,
    })
}

/// Parse and validate catalog YAML into entries keyed by lower-cased crop type
pub(crate) fn parse_catalog(
    yaml: &str,
) -> Result<BTreeMap<String, CropCatalogEntry>, CatalogError> {
    let raw: RawCatalog =
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::InvalidYaml(e.to_string()))?;

    if raw.crops.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut entries = BTreeMap::new();
    for (name, crop) in raw.crops {
        let crop_type = name.trim().to_lowercase();
        let entry = build_entry(&crop_type, &name, crop)?;
        debug!(
            crop = %entry.crop_type,
            stage_count = entry.stages.len(),
            total_days = entry.total_days(),
            "Loaded crop catalog entry"
        );
        entries.insert(crop_type, entry);
    }

    Ok(entries)
}

fn build_entry(crop_type: &str, name: &str, crop: RawCrop) -> Result<CropCatalogEntry, CatalogError> {
    if crop.stages.is_empty() {
        return Err(CatalogError::NoStages {
            crop: crop_type.to_string(),
        });
    }

    let expected_len = crop.stages.len();
    let explicit_orders = crop.stages.iter().any(|s| s.order.is_some());

    let mut stages: Vec<StageDefinition> = crop
        .stages
        .into_iter()
        .enumerate()
        .map(|(position, raw)| StageDefinition {
            order: if explicit_orders {
                raw.order.unwrap_or(u32::MAX)
            } else {
                position as u32
            },
            id: raw.id,
            label: raw.label,
            nominal_duration_days: raw.duration_days,
            description: raw.description,
            task_templates: raw.tasks,
        })
        .collect();

    stages.sort_by_key(|s| s.order);

    let contiguous = stages
        .iter()
        .enumerate()
        .all(|(index, stage)| stage.order as usize == index);
    if !contiguous {
        return Err(CatalogError::NonContiguousOrder {
            crop: crop_type.to_string(),
            expected_len,
        });
    }

    let mut seen = HashSet::new();
    for stage in &stages {
        if !seen.insert(stage.id.as_str()) {
            return Err(CatalogError::DuplicateStageId {
                crop: crop_type.to_string(),
                stage_id: stage.id.clone(),
            });
        }
        if stage.nominal_duration_days == 0 {
            return Err(CatalogError::NonPositiveDuration {
                crop: crop_type.to_string(),
                stage_id: stage.id.clone(),
            });
        }
    }

    let summed = stages
        .iter()
        .try_fold(0u32, |total, stage| total.checked_add(stage.nominal_duration_days));
    if summed.is_none() {
        return Err(CatalogError::DurationOverflow {
            crop: crop_type.to_string(),
            max: u32::MAX,
        });
    }

    Ok(CropCatalogEntry {
        crop_type: crop_type.to_string(),
        display_name: crop.display_name.unwrap_or_else(|| name.to_string()),
        stages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_orders() {
        let yaml = r#"
crops:
  Millet:
    stages:
      - { id: sowing, label: Sowing, duration_days: 10, tasks: [Sow] }
      - { id: harvest, label: Harvest, duration_days: 60 }
"#;
        let entries = parse_catalog(yaml).unwrap();
        let millet = entries.get("millet").unwrap();
        assert_eq!(millet.display_name, "Millet");
        assert_eq!(millet.stages[1].order, 1);
        assert_eq!(millet.stages[0].task_templates, vec!["Sow".to_string()]);
    }

    #[test]
    fn test_explicit_orders_are_sorted() {
        let yaml = r#"
crops:
  gram:
    stages:
      - { id: b, label: B, order: 1, duration_days: 5 }
      - { id: a, label: A, order: 0, duration_days: 5 }
"#;
        let entries = parse_catalog(yaml).unwrap();
        assert_eq!(entries["gram"].stages[0].id, "a");
    }

    #[test]
    fn test_rejects_gaps_in_order() {
        let yaml = r#"
crops:
  gram:
    stages:
      - { id: a, label: A, order: 0, duration_days: 5 }
      - { id: b, label: B, order: 2, duration_days: 5 }
"#;
        assert!(matches!(
            parse_catalog(yaml),
            Err(CatalogError::NonContiguousOrder { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids_and_zero_durations() {
        let duplicate = r#"
crops:
  gram:
    stages:
      - { id: a, label: A, duration_days: 5 }
      - { id: a, label: A2, duration_days: 5 }
"#;
        assert!(matches!(
            parse_catalog(duplicate),
            Err(CatalogError::DuplicateStageId { .. })
        ));

        let zero = r#"
crops:
  gram:
    stages:
      - { id: a, label: A, duration_days: 0 }
"#;
        assert!(matches!(
            parse_catalog(zero),
            Err(CatalogError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_definitions() {
        assert!(matches!(parse_catalog("crops: {}"), Err(CatalogError::Empty)));
        assert!(matches!(
            parse_catalog("crops:\n  gram:\n    stages: []\n"),
            Err(CatalogError::NoStages { .. })
        ));
        assert!(matches!(
            parse_catalog("not: [valid"),
            Err(CatalogError::InvalidYaml(_))
        ));
    }

    #[test]
    fn test_rejects_durations_that_overflow_the_day_count() {
        let yaml = r#"
crops:
  gram:
    stages:
      - { id: a, label: A, duration_days: 3000000000 }
      - { id: b, label: B, duration_days: 3000000000 }
"#;
        assert!(matches!(
            parse_catalog(yaml),
            Err(CatalogError::DurationOverflow { .. })
        ));

        let single = r#"
crops:
  gram:
    stages:
      - { id: a, label: A, duration_days: 3000000000 }
"#;
        assert_eq!(parse_catalog(single).unwrap()["gram"].total_days(), 3_000_000_000);
    }
}
