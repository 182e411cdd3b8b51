//! Stage catalog types.

use serde::{Deserialize, Serialize};

/// One growth stage of a crop, immutable once the catalog is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Stable slug, e.g. `sowing`
    pub id: String,
    pub label: String,
    /// Rank within the crop, contiguous from 0
    pub order: u32,
    /// Expected length of the stage, always positive
    pub nominal_duration_days: u32,
    pub description: Option<String>,
    /// Task names instantiated for every new lifecycle
    pub task_templates: Vec<String>,
}

/// Catalog entry for a single crop type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropCatalogEntry {
    /// Lower-cased lookup key
    pub crop_type: String,
    pub display_name: String,
    /// Sorted by `order`, never empty
    pub stages: Vec<StageDefinition>,
}

impl CropCatalogEntry {
    /// Sum of nominal durations across all stages
    pub fn total_days(&self) -> u32 {
        self.stages.iter().map(|s| s.nominal_duration_days).sum()
    }

    pub fn stage(&self, stage_id: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    pub fn stage_at(&self, order: u32) -> Option<&StageDefinition> {
        self.stages.get(order as usize)
    }

    pub fn first_stage(&self) -> Option<&StageDefinition> {
        self.stages.first()
    }

    /// Order of the terminal stage
    pub fn final_order(&self) -> u32 {
        self.stages.len().saturating_sub(1) as u32
    }

    pub fn is_final(&self, order: u32) -> bool {
        order == self.final_order()
    }

    /// Nominal day (since sowing) on which the stage at `order` begins
    pub fn start_day(&self, order: u32) -> u32 {
        self.stages
            .iter()
            .take_while(|s| s.order < order)
            .map(|s| s.nominal_duration_days)
            .sum()
    }

    /// Nominal day (since sowing) on which the stage at `order` ends
    pub fn end_day(&self, order: u32) -> u32 {
        self.start_day(order)
            + self
                .stage_at(order)
                .map(|s| s.nominal_duration_days)
                .unwrap_or(0)
    }

    /// Estimate the stage from elapsed days alone.
    ///
    /// Read-only displays use this; it never replaces the lifecycle's own
    /// current stage. Days past the end of the catalog map to the last stage.
    pub fn nominal_stage_for_day(&self, day_count: u32) -> Option<&StageDefinition> {
        let mut elapsed = 0;
        for stage in &self.stages {
            elapsed += stage.nominal_duration_days;
            if day_count < elapsed {
                return Some(stage);
            }
        }
        self.stages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: &str, order: u32, days: u32) -> StageDefinition {
        StageDefinition {
            id: id.to_string(),
            label: id.to_string(),
            order,
            nominal_duration_days: days,
            description: None,
            task_templates: vec![],
        }
    }

    fn wheat() -> CropCatalogEntry {
        CropCatalogEntry {
            crop_type: "wheat".to_string(),
            display_name: "Wheat".to_string(),
            stages: vec![
                stage("planning", 0, 14),
                stage("sowing", 1, 20),
                stage("growth", 2, 40),
                stage("flowering", 3, 25),
                stage("harvest", 4, 15),
            ],
        }
    }

    #[test]
    fn test_day_offsets() {
        let entry = wheat();
        assert_eq!(entry.total_days(), 114);
        assert_eq!(entry.start_day(0), 0);
        assert_eq!(entry.start_day(2), 34);
        assert_eq!(entry.end_day(2), 74);
        assert_eq!(entry.end_day(4), 114);
        assert_eq!(entry.final_order(), 4);
    }

    #[test]
    fn test_nominal_stage_for_day() {
        let entry = wheat();
        assert_eq!(entry.nominal_stage_for_day(0).unwrap().id, "planning");
        assert_eq!(entry.nominal_stage_for_day(13).unwrap().id, "planning");
        assert_eq!(entry.nominal_stage_for_day(14).unwrap().id, "sowing");
        assert_eq!(entry.nominal_stage_for_day(74).unwrap().id, "flowering");
        assert_eq!(entry.nominal_stage_for_day(500).unwrap().id, "harvest");
    }
}
