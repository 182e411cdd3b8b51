//! # Lifecycle Status View
//!
//! Response shape of `GET /lifecycle/status`. Built from an instance and its
//! catalog entry on every read; nothing here is persisted.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{LifecycleInstance, Task};
use crate::catalog::CropCatalogEntry;
use crate::state_machine::progress::{self, round_percentage};
use crate::state_machine::states::StageStatus;

const TIMELINE_DATE_FORMAT: &str = "%b %d";
const IN_PROGRESS: &str = "In Progress";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub label: String,
    pub status: StageStatus,
    pub description: Option<String>,
    /// End date for completed stages, start date for upcoming ones
    pub date: String,
    pub tasks: Vec<Task>,
    pub ai_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleStatusView {
    pub crop: String,
    pub sowing_date: NaiveDate,
    pub day_count: u32,
    /// Label of the authoritative current stage
    pub current_stage: String,
    pub current_stage_id: String,
    /// Stage estimated from the calendar alone
    pub nominal_stage: Option<String>,
    pub total_days: u32,
    pub progress_percentage: f64,
    pub is_complete: bool,
    pub timeline: Vec<TimelineEntry>,
    pub ai_summary: Option<String>,
    pub history: Vec<String>,
}

impl LifecycleStatusView {
    pub fn build(
        entry: &CropCatalogEntry,
        instance: &LifecycleInstance,
        today: NaiveDate,
        ai_summary: Option<String>,
        history: Vec<String>,
    ) -> Self {
        let snapshot = progress::snapshot(entry, instance, today);

        let timeline = entry
            .stages
            .iter()
            .zip(snapshot.stages.iter())
            .map(|(stage, stage_progress)| {
                let date = match stage_progress.status {
                    StageStatus::Completed => {
                        format_offset(instance.sowing_date, stage_progress.end_day)
                    }
                    StageStatus::Current => IN_PROGRESS.to_string(),
                    StageStatus::Upcoming => {
                        format_offset(instance.sowing_date, stage_progress.start_day)
                    }
                };
                TimelineEntry {
                    id: stage.id.clone(),
                    label: stage.label.clone(),
                    status: stage_progress.status,
                    description: stage.description.clone(),
                    date,
                    tasks: instance.tasks_for_stage(&stage.id).cloned().collect(),
                    ai_summary: stage_progress
                        .status
                        .is_current()
                        .then(|| ai_summary.clone())
                        .flatten(),
                }
            })
            .collect();

        let nominal_stage = snapshot
            .nominal_stage_id
            .as_deref()
            .and_then(|id| entry.stage(id))
            .map(|s| s.label.clone());

        Self {
            crop: entry.display_name.clone(),
            sowing_date: instance.sowing_date,
            day_count: snapshot.day_count,
            current_stage: snapshot.current_stage_label,
            current_stage_id: snapshot.current_stage_id,
            nominal_stage,
            total_days: snapshot.total_days,
            progress_percentage: round_percentage(snapshot.progress_percentage),
            is_complete: snapshot.is_complete,
            timeline,
            ai_summary,
            history,
        }
    }

    pub fn task(&self, task_id: i64) -> Option<&Task> {
        self.timeline
            .iter()
            .flat_map(|entry| entry.tasks.iter())
            .find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: i64) -> Option<&mut Task> {
        self.timeline
            .iter_mut()
            .flat_map(|entry| entry.tasks.iter_mut())
            .find(|t| t.id == task_id)
    }
}

/// Calendar label `days` after sowing, empty when the date is out of range
fn format_offset(sowing_date: NaiveDate, days: u32) -> String {
    sowing_date
        .checked_add_signed(Duration::days(i64::from(days)))
        .map(|date| date.format(TIMELINE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
