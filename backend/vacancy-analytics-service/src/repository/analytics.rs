/// Analytics repository - `vacancy_analytics` table
///
/// Expected schema:
///
/// ```sql
/// CREATE TABLE vacancy_analytics (
///     id             BIGSERIAL PRIMARY KEY,
///     created_at     DATE NOT NULL,
///     query          TEXT NOT NULL,
///     vacancy_count  INTEGER NOT NULL,
///     average_salary DOUBLE PRECISION NOT NULL,
///     UNIQUE (query, created_at)
/// );
/// ```
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::AnalyticsStore;
use crate::domain::AnalyticsRecord;
use crate::error::{AnalyticsError, Result};

#[derive(Clone)]
pub struct PgAnalyticsStore {
    pool: PgPool,
}

impl PgAnalyticsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsStore for PgAnalyticsStore {
    async fn find_by_query_and_date(
        &self,
        query: &str,
        date: NaiveDate,
    ) -> Result<Option<AnalyticsRecord>> {
        let record = sqlx::query_as::<_, AnalyticsRecord>(
            r#"
            SELECT id, created_at, query, vacancy_count, average_salary
            FROM vacancy_analytics
            WHERE query = $1 AND created_at = $2
            "#,
        )
        .bind(query)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn save(&self, record: AnalyticsRecord) -> Result<AnalyticsRecord> {
        let saved = match record.id {
            None => {
                sqlx::query_as::<_, AnalyticsRecord>(
                    r#"
                    INSERT INTO vacancy_analytics (created_at, query, vacancy_count, average_salary)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, created_at, query, vacancy_count, average_salary
                    "#,
                )
                .bind(record.created_at)
                .bind(&record.query)
                .bind(record.vacancy_count)
                .bind(record.average_salary)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => sqlx::query_as::<_, AnalyticsRecord>(
                r#"
                UPDATE vacancy_analytics
                SET vacancy_count = $2, average_salary = $3
                WHERE id = $1
                RETURNING id, created_at, query, vacancy_count, average_salary
                "#,
            )
            .bind(id)
            .bind(record.vacancy_count)
            .bind(record.average_salary)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AnalyticsError::NotFound(format!("vacancy_analytics id {}", id)))?,
        };

        Ok(saved)
    }
}
