/// Vacancy source backed by the collector's `vacancies` table
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::VacancySource;
use crate::domain::{Currency, SalaryRange, VacancyRecord};
use crate::error::{AnalyticsError, Result};

/// Raw row as stored by the collector.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VacancyRow {
    pub id: String,
    pub salary_from: Option<i32>,
    pub salary_to: Option<i32>,
    pub salary_currency: Option<String>,
    pub queries: Vec<String>,
}

impl TryFrom<VacancyRow> for VacancyRecord {
    type Error = AnalyticsError;

    fn try_from(row: VacancyRow) -> Result<Self> {
        let salary = SalaryRange::from_bounds(
            row.salary_from.map(i64::from),
            row.salary_to.map(i64::from),
        )
        .map_err(|e| AnalyticsError::Precondition(format!("vacancy {}: {}", row.id, e)))?;

        let currency = row
            .salary_currency
            .as_deref()
            .ok_or_else(|| {
                AnalyticsError::Precondition(format!("vacancy {} has no salary currency", row.id))
            })?
            .parse::<Currency>()
            .map_err(|e| AnalyticsError::Precondition(format!("vacancy {}: {}", row.id, e)))?;

        Ok(VacancyRecord {
            id: row.id,
            salary,
            currency,
            queries: row.queries.into_iter().collect(),
        })
    }
}

#[derive(Clone)]
pub struct PgVacancySource {
    pool: PgPool,
    currency: Currency,
}

impl PgVacancySource {
    pub fn new(pool: PgPool, currency: Currency) -> Self {
        Self { pool, currency }
    }
}

#[async_trait]
impl VacancySource for PgVacancySource {
    async fn fetch_eligible(&self) -> Result<Vec<VacancyRecord>> {
        let rows = sqlx::query_as::<_, VacancyRow>(
            r#"
            SELECT id, salary_from, salary_to, salary_currency, queries
            FROM vacancies
            WHERE salary_currency = $1
              AND (salary_from IS NOT NULL OR salary_to IS NOT NULL)
            "#,
        )
        .bind(self.currency.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AnalyticsError::SourceUnavailable(e.to_string()))?;

        debug!(
            rows = rows.len(),
            currency = %self.currency,
            "Fetched vacancies with salary"
        );

        rows.into_iter().map(VacancyRecord::try_from).collect()
    }
}
