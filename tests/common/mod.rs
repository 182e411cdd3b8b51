//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod builders;
pub mod strategies;
pub mod stubs;

pub use builders::*;
pub use stubs::*;

use chrono::NaiveDate;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Unique farmer email so tests never share state
pub fn unique_email(prefix: &str) -> String {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!(
        "{prefix}-{}@farm.test",
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}
