// ============================================
// Analytics Build Job
// ============================================
//
// One run:
// 1. Fetch eligible vacancies (single currency, at least one salary bound)
// 2. Aggregate per query in memory
// 3. Reconcile each (query, aggregate) against today's row
//
// Steps 1 and 2 never write. A failure there aborts the run before any row is
// touched. In step 3 each query is independent: a failed query is logged and
// counted, the others still go through, and the run reports the failures.
//
// Triggered by the scheduled-tasks consumer or `--mode run-once`.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::error::{AnalyticsError, Result};
use crate::metrics;
use crate::repository::{AnalyticsStore, VacancySource};
use crate::services::aggregator;
use crate::services::reconciler::{AnalyticsReconciler, ReconcileOutcome};

/// Statistics of one build run
#[derive(Debug, Clone, Default)]
pub struct BuildJobStats {
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
    pub vacancies_fetched: usize,
    pub queries_aggregated: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed_queries: Vec<String>,
    pub total_duration_ms: u64,
}

impl BuildJobStats {
    pub fn succeeded(&self) -> usize {
        self.inserted + self.updated
    }
}

pub struct AnalyticsBuildJob {
    source: Arc<dyn VacancySource>,
    reconciler: AnalyticsReconciler,
}

impl AnalyticsBuildJob {
    pub fn new(source: Arc<dyn VacancySource>, store: Arc<dyn AnalyticsStore>) -> Self {
        Self {
            source,
            reconciler: AnalyticsReconciler::new(store),
        }
    }

    pub fn reconciler(&self) -> &AnalyticsReconciler {
        &self.reconciler
    }

    /// Run against the current local date.
    pub async fn run(&self) -> Result<BuildJobStats> {
        self.run_for_date(Local::now().date_naive()).await
    }

    /// Run with every query written under `today`.
    pub async fn run_for_date(&self, today: NaiveDate) -> Result<BuildJobStats> {
        let start_time = Instant::now();
        let result = self.run_inner(today, start_time).await;

        let elapsed = start_time.elapsed();
        metrics::record_run(result.is_ok(), elapsed.as_secs_f64());

        match &result {
            Ok(stats) => info!(
                date = %today,
                vacancies = stats.vacancies_fetched,
                queries = stats.queries_aggregated,
                inserted = stats.inserted,
                updated = stats.updated,
                duration_ms = stats.total_duration_ms,
                "Analytics build completed"
            ),
            Err(e) => error!(
                date = %today,
                error = %e,
                duration_ms = elapsed.as_millis() as u64,
                "Analytics build failed"
            ),
        }

        result
    }

    async fn run_inner(&self, today: NaiveDate, start_time: Instant) -> Result<BuildJobStats> {
        let mut stats = BuildJobStats {
            started_at: Some(Utc::now()),
            date: Some(today),
            ..Default::default()
        };

        info!(date = %today, "Starting analytics build");

        let vacancies = self.source.fetch_eligible().await.map_err(|e| match e {
            AnalyticsError::SourceUnavailable(_) | AnalyticsError::Precondition(_) => e,
            other => AnalyticsError::SourceUnavailable(other.to_string()),
        })?;
        stats.vacancies_fetched = vacancies.len();
        info!(vacancies = vacancies.len(), "Fetched eligible vacancies");

        let aggregates = aggregator::aggregate(&vacancies)?;
        stats.queries_aggregated = aggregates.len();
        info!(
            queries = aggregates.len(),
            "Prepared analytics for queries: {:?}",
            aggregates.keys().collect::<Vec<_>>()
        );

        for (query, aggregate) in &aggregates {
            match self.reconciler.reconcile(query, aggregate, today).await {
                Ok(outcome) => {
                    metrics::record_reconciliation(outcome.label());
                    match outcome {
                        ReconcileOutcome::Inserted(_) => stats.inserted += 1,
                        ReconcileOutcome::Updated(_) => stats.updated += 1,
                    }
                }
                Err(e) => {
                    metrics::record_reconciliation("failed");
                    error!(
                        query = %query,
                        count = aggregate.count,
                        average_salary = aggregate.average_salary,
                        error = %e,
                        "Failed to save analytics"
                    );
                    stats.failed_queries.push(query.clone());
                }
            }
        }

        stats.completed_at = Some(Utc::now());
        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        if !stats.failed_queries.is_empty() {
            return Err(AnalyticsError::Reconciliation {
                succeeded: stats.succeeded(),
                failed: stats.failed_queries,
            });
        }

        Ok(stats)
    }
}
