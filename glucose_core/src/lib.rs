#![forbid(unsafe_code)]

//! Core domain model and estimation engine for the gluco tracker.
//!
//! This crate provides:
//! - Domain types (events, configuration profile, curve points)
//! - Physiological effect models and the event dispatcher
//! - Point estimator and day curve generator
//! - Daily and period summaries
//! - Persistence helpers (event journal, CSV export, config)
//!
//! Estimates are illustrative only and must not be used for dosing decisions.

pub mod types;
pub mod error;
pub mod time;
pub mod effects;
pub mod dispatch;
pub mod estimator;
pub mod curve;
pub mod stats;
pub mod config;
pub mod logging;
pub mod journal;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use dispatch::compute_event_effect;
pub use estimator::estimate_at;
pub use curve::{generate_day_curve, DEFAULT_INTERVAL_MINUTES};
pub use stats::{summarize_day, summarize_period, DaySummary, PeriodSummary};
pub use journal::{EventSink, JournalRecord, JsonlJournal};
