//! Vacancy analytics builder
//!
//! Aggregates collected vacancies into one row per (query, day) holding the
//! vacancy count and the average salary for that query.

pub mod config;
pub mod consumers;
pub mod domain;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{AnalyticsError, Result};
pub use jobs::{AnalyticsBuildJob, BuildJobStats};
