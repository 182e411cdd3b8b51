//! # Domain Models
//!
//! Plain data types shared by the lifecycle engine, the stores and the HTTP
//! layer. Persistence lives in [`crate::store`]; these types carry no I/O.

pub mod advice;
pub mod alert;
pub mod farmer;
pub mod lifecycle_instance;
pub mod lifecycle_view;
pub mod task;
pub mod weather;

pub use advice::{AdviceRecord, NewAdviceRecord};
pub use alert::{Alert, AlertKind, AlertSeverity, NewAlert};
pub use farmer::{FarmDetails, FarmerProfile, ProfileUpdate};
pub use lifecycle_instance::{LifecycleInstance, NewLifecycleInstance};
pub use lifecycle_view::{LifecycleStatusView, TimelineEntry};
pub use task::Task;
pub use weather::WeatherReport;
