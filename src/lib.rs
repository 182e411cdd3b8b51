#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # CropMind Core
//!
//! Backend core of the CropMind farming advisory service: crop lifecycle
//! tracking, checklist tasks and the farmer dashboard.
//!
//! ## Overview
//!
//! A farmer is enrolled in one crop lifecycle at a time. The lifecycle walks
//! the crop's ordered growth stages from the [`catalog`]; each stage carries a
//! checklist of tasks instantiated at onboarding. Day count, progress and
//! stage statuses are always derived on read, never stored.
//!
//! ## Module Organization
//!
//! - [`catalog`] - Static stage definitions per crop type
//! - [`state_machine`] - Lifecycle engine: transitions, guards, checklist and progress
//! - [`models`] - Farmers, lifecycle instances, tasks, alerts and view models
//! - [`store`] - Persistence boundary (in-memory and PostgreSQL)
//! - [`gateways`] - Weather and advisory upstream services
//! - [`services`] - Farmer-facing operations and the dashboard aggregator
//! - [`web`] - `axum` HTTP API
//! - [`config`] - YAML configuration with environment overlays
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cropmind_core::config::ConfigManager;
//! use cropmind_core::web::{create_router, AppState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let state = AppState::from_config(manager.config().clone()).await?;
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests, in-memory store only
//! ```

pub mod catalog;
pub mod config;
pub mod constants;
#[cfg(feature = "postgres")]
pub mod database;
pub mod error;
pub mod gateways;
pub mod logging;
pub mod models;
pub mod services;
pub mod state_machine;
pub mod store;
pub mod utils;
pub mod web;

pub use catalog::{CropCatalogEntry, StageCatalog, StageDefinition};
pub use config::{ConfigManager, CropMindConfig};
pub use constants::DashboardSection;
pub use error::{CropMindError, Result};
pub use models::{FarmerProfile, LifecycleInstance, LifecycleStatusView, Task};
pub use services::{CropMindServices, ServiceContext};
pub use state_machine::{LifecycleError, LifecycleEvent, LifecycleStateMachine};
pub use store::{FarmStore, InMemoryFarmStore};
