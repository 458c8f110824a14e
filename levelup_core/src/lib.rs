#![forbid(unsafe_code)]

//! Core domain model and business logic for the LevelUp training system.
//!
//! This crate provides:
//! - Domain types (profile, weekly plans, performance and workout logs)
//! - Exercise catalog with default starting loads
//! - Load suggestion engine
//! - Rest timer state machine with restart survival
//! - Workout session controller
//! - Persistence (JSON documents, workout journal)
//! - Body metrics and history queries

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod clock;
pub mod store;
pub mod document;
pub mod journal;
pub mod suggestion;
pub mod timer;
pub mod session;
pub mod body;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseCatalog};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use document::JsonDocumentStore;
pub use journal::JsonlLogStore;
pub use store::{LogStore, PlanStore, ProfileStore, WeightStore};
pub use suggestion::{LoadAdvisor, LoadSuggestion, SuggestionReason};
pub use timer::{AlertSink, FileTimerStore, RestTimer, TimerPhase, TimerStore};
pub use session::{SessionContext, SetOutcome, WorkoutSession};
