//! Storage collaborators of the analytics core.
//!
//! The vacancy table is written by the collector service; this service only
//! reads it. The `vacancy_analytics` table is owned here.

pub mod analytics;
pub mod vacancies;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AnalyticsRecord, VacancyRecord};
use crate::error::Result;

pub use analytics::PgAnalyticsStore;
pub use vacancies::PgVacancySource;

/// Source of vacancies eligible for analytics.
///
/// Implementations must only yield records in the configured currency with at
/// least one salary bound.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VacancySource: Send + Sync {
    async fn fetch_eligible(&self) -> Result<Vec<VacancyRecord>>;
}

/// Persistence for per-(query, day) analytics rows.
///
/// At most one row exists per `(query, created_at)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn find_by_query_and_date(
        &self,
        query: &str,
        date: NaiveDate,
    ) -> Result<Option<AnalyticsRecord>>;

    /// Insert when `record.id` is `None`, otherwise overwrite the row with that id.
    async fn save(&self, record: AnalyticsRecord) -> Result<AnalyticsRecord>;
}
