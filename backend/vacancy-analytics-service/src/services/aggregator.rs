//! Per-query aggregation
//!
//! Folds vacancy records into `query -> (count, average salary)`. Each record
//! contributes its resolved salary once to every query it is tagged with.
//! Averages are maintained as cumulative moving averages, so salaries are
//! never summed.

use std::collections::BTreeMap;

use super::salary;
use crate::domain::{QueryAggregate, VacancyRecord};
use crate::error::{AnalyticsError, Result};

pub type QueryAggregates = BTreeMap<String, QueryAggregate>;

/// Aggregate `records` by query term.
///
/// Fails with a precondition error if any record carries no query terms; no
/// partial result is returned in that case.
pub fn aggregate<'a, I>(records: I) -> Result<QueryAggregates>
where
    I: IntoIterator<Item = &'a VacancyRecord>,
{
    records
        .into_iter()
        .try_fold(QueryAggregates::new(), |aggregates, record| {
            fold_record(aggregates, record)
        })
}

fn fold_record(mut aggregates: QueryAggregates, record: &VacancyRecord) -> Result<QueryAggregates> {
    if record.queries.is_empty() {
        return Err(AnalyticsError::Precondition(format!(
            "vacancy {} has no query terms",
            record.id
        )));
    }

    let figure = salary::resolve(&record.salary);
    for query in &record.queries {
        let next = match aggregates.get(query) {
            Some(existing) => existing.observe(figure)?,
            None => QueryAggregate::first(figure),
        };
        aggregates.insert(query.clone(), next);
    }

    Ok(aggregates)
}
