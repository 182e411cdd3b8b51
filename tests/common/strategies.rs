use proptest::prelude::*;

use cropmind_core::state_machine::LifecycleEvent;

/// Crops of the bundled catalog
pub fn crop_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("wheat"), Just("rice"), Just("cotton"), Just("sugarcane")]
}

/// Task ids inside and just outside a typical checklist
pub fn task_id_strategy() -> impl Strategy<Value = i64> {
    -2i64..40
}

pub fn toggle_sequence_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1i64..30, 0..60)
}

/// Arbitrary non-terminal events mixed together
pub fn event_strategy() -> impl Strategy<Value = LifecycleEvent> {
    prop_oneof![
        4 => task_id_strategy().prop_map(LifecycleEvent::ToggleTask),
        1 => Just(LifecycleEvent::AdvanceStage),
    ]
}

pub fn event_sequence_strategy() -> impl Strategy<Value = Vec<LifecycleEvent>> {
    prop::collection::vec(event_strategy(), 0..80)
}

/// Days since sowing, including sowing dates in the future
pub fn day_offset_strategy() -> impl Strategy<Value = i64> {
    -30i64..600
}
