//! Analytics reconciliation
//!
//! Writes one aggregate per (query, day): the existing row for that day is
//! overwritten in place, otherwise a new row is inserted. Re-running a day
//! therefore replaces its figures instead of accumulating onto them.

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::debug;

use crate::domain::{AnalyticsRecord, QueryAggregate};
use crate::error::Result;
use crate::repository::AnalyticsStore;

/// Result of reconciling one query.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Inserted(AnalyticsRecord),
    Updated(AnalyticsRecord),
}

impl ReconcileOutcome {
    pub fn record(&self) -> &AnalyticsRecord {
        match self {
            ReconcileOutcome::Inserted(record) | ReconcileOutcome::Updated(record) => record,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Inserted(_) => "inserted",
            ReconcileOutcome::Updated(_) => "updated",
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsReconciler {
    store: Arc<dyn AnalyticsStore>,
}

impl AnalyticsReconciler {
    pub fn new(store: Arc<dyn AnalyticsStore>) -> Self {
        Self { store }
    }

    /// Persist `aggregate` for `query` under the current local date.
    ///
    /// Safe to call on its own, e.g. to retry a single query after a failed run.
    pub async fn persist(&self, query: &str, aggregate: &QueryAggregate) -> Result<ReconcileOutcome> {
        self.reconcile(query, aggregate, Local::now().date_naive())
            .await
    }

    /// Upsert the `(query, today)` row with `aggregate`. Performs exactly one write.
    pub async fn reconcile(
        &self,
        query: &str,
        aggregate: &QueryAggregate,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome> {
        debug!(query, date = %today, "Saving analytics");

        match self.store.find_by_query_and_date(query, today).await? {
            Some(mut existing) => {
                debug!(
                    query,
                    date = %today,
                    previous_count = existing.vacancy_count,
                    "Analytics already present, overwriting"
                );
                existing.overwrite_with(aggregate)?;
                let saved = self.store.save(existing).await?;
                debug!(query, date = %today, count = saved.vacancy_count, "Analytics updated");
                Ok(ReconcileOutcome::Updated(saved))
            }
            None => {
                let record = AnalyticsRecord::new(query, today, aggregate)?;
                let saved = self.store.save(record).await?;
                debug!(query, date = %today, id = ?saved.id, "Analytics inserted");
                Ok(ReconcileOutcome::Inserted(saved))
            }
        }
    }
}
