//! # Web API Handlers
//!
//! One module per resource; handlers stay thin and delegate to
//! [`crate::services`].

pub mod alerts;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod lifecycle;
pub mod onboarding;
pub mod user;
