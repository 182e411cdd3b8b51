//! # Derived Lifecycle Metrics
//!
//! Day count, stage statuses, progress percentage and completion are never
//! stored. They are recomputed from the instance, its catalog entry and the
//! current date every time a lifecycle is read.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::states::StageStatus;
use crate::catalog::{CropCatalogEntry, StageDefinition};
use crate::models::LifecycleInstance;

/// Whole days since sowing, never negative
pub fn day_count(sowing_date: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - sowing_date).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Status of every catalog stage relative to `current_order`
pub fn stage_statuses(
    entry: &CropCatalogEntry,
    current_order: u32,
) -> Vec<(&StageDefinition, StageStatus)> {
    entry
        .stages
        .iter()
        .map(|stage| (stage, StageStatus::relative_to(stage.order, current_order)))
        .collect()
}

/// Weighted completion of the lifecycle in `[0, 100]`.
///
/// Every stage before the current one counts in full. The current stage counts
/// by the fraction of its tasks that are checked; a stage without tasks falls
/// back to how far `day_count` has moved through its nominal window.
pub fn progress_percentage(entry: &CropCatalogEntry, instance: &LifecycleInstance, day_count: u32) -> f64 {
    let total_days = entry.total_days();
    if total_days == 0 {
        return 0.0;
    }

    let current_order = instance.current_stage_order;
    let before_current = entry.start_day(current_order) as f64;

    let current_contribution = match entry.stage_at(current_order) {
        Some(stage) => {
            let duration = stage.nominal_duration_days as f64;
            let (done, total) = instance.stage_task_counts(&stage.id);
            let fraction = if total == 0 {
                let into_stage = day_count as f64 - entry.start_day(current_order) as f64;
                (into_stage / duration).clamp(0.0, 1.0)
            } else {
                done as f64 / total as f64
            };
            duration * fraction
        }
        None => 0.0,
    };

    (100.0 * (before_current + current_contribution) / total_days as f64).clamp(0.0, 100.0)
}

/// Round a percentage to one decimal place for display
pub fn round_percentage(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The lifecycle is complete once it sits at the terminal stage with every
/// task of that stage checked. A terminal stage without tasks is complete on
/// arrival.
pub fn is_complete(entry: &CropCatalogEntry, instance: &LifecycleInstance) -> bool {
    if !entry.is_final(instance.current_stage_order) {
        return false;
    }
    entry
        .stage_at(instance.current_stage_order)
        .map(|stage| {
            let (done, total) = instance.stage_task_counts(&stage.id);
            done == total
        })
        .unwrap_or(false)
}

/// Per-stage slice of a [`LifecycleSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    pub stage_id: String,
    pub label: String,
    pub order: u32,
    pub status: StageStatus,
    pub start_day: u32,
    pub end_day: u32,
    pub tasks_completed: usize,
    pub tasks_total: usize,
}

/// Every derived metric of an instance at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    pub day_count: u32,
    pub total_days: u32,
    pub current_stage_id: String,
    pub current_stage_label: String,
    /// Date-estimated stage for read-only displays
    pub nominal_stage_id: Option<String>,
    pub progress_percentage: f64,
    pub is_complete: bool,
    pub stages: Vec<StageProgress>,
}

pub fn snapshot(entry: &CropCatalogEntry, instance: &LifecycleInstance, today: NaiveDate) -> LifecycleSnapshot {
    let days = day_count(instance.sowing_date, today);
    let current_label = entry
        .stage_at(instance.current_stage_order)
        .map(|s| s.label.clone())
        .unwrap_or_else(|| instance.current_stage_id.clone());

    let stages = stage_statuses(entry, instance.current_stage_order)
        .into_iter()
        .map(|(stage, status)| {
            let (tasks_completed, tasks_total) = instance.stage_task_counts(&stage.id);
            StageProgress {
                stage_id: stage.id.clone(),
                label: stage.label.clone(),
                order: stage.order,
                status,
                start_day: entry.start_day(stage.order),
                end_day: entry.end_day(stage.order),
                tasks_completed,
                tasks_total,
            }
        })
        .collect();

    LifecycleSnapshot {
        day_count: days,
        total_days: entry.total_days(),
        current_stage_id: instance.current_stage_id.clone(),
        current_stage_label: current_label,
        nominal_stage_id: entry.nominal_stage_for_day(days).map(|s| s.id.clone()),
        progress_percentage: progress_percentage(entry, instance, days),
        is_complete: is_complete(entry, instance),
        stages,
    }
}
