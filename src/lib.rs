//! Recurring lawn treatment scheduling.
//!
//! Expands recurrence patterns into occurrence dates, applies per-date exceptions,
//! and checks each occurrence's forecast against treatment-specific weather limits.

pub mod cli;
pub mod config;
pub mod datasources;
pub mod error;
pub mod logic;
pub mod models;

pub use error::{Result, TurfPlanError};
