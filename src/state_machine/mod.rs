//! # Lifecycle Engine
//!
//! The authoritative state machine over a lifecycle's current stage, the task
//! checklist it owns, and the progress metrics derived from both.

pub mod checklist;
pub mod errors;
pub mod events;
pub mod guards;
pub mod lifecycle_state_machine;
pub mod optimistic;
pub mod progress;
pub mod states;

pub use errors::{LifecycleError, LifecycleResult};
pub use events::LifecycleEvent;
pub use guards::{advance_guard, AdvanceGuard, PermissiveAdvanceGuard, StageTasksCompleteGuard};
pub use lifecycle_state_machine::{LifecycleStateMachine, TransitionOutcome};
pub use optimistic::OptimisticToggle;
pub use progress::{LifecycleSnapshot, StageProgress};
pub use states::{EnrollmentState, StageStatus};
