use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalyticsError, Result};

/// Salary currency code as stored by the vacancy collector (e.g. `RUR`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency("RUR".to_string())
    }
}

impl FromStr for Currency {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AnalyticsError::Config(format!(
                "invalid currency code: {:?}",
                s
            )));
        }
        Ok(Currency(code.to_ascii_uppercase()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Salary bounds of a vacancy. At least one bound is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryRange {
    Between { from: i64, to: i64 },
    From { from: i64 },
    UpTo { to: i64 },
}

impl SalaryRange {
    /// Build a range from nullable bounds, rejecting rows the vacancy source
    /// should never hand over.
    pub fn from_bounds(from: Option<i64>, to: Option<i64>) -> Result<Self> {
        for bound in [from, to].into_iter().flatten() {
            if bound < 0 {
                return Err(AnalyticsError::Precondition(format!(
                    "negative salary bound: {}",
                    bound
                )));
            }
        }

        match (from, to) {
            (Some(from), Some(to)) => Ok(SalaryRange::Between { from, to }),
            (Some(from), None) => Ok(SalaryRange::From { from }),
            (None, Some(to)) => Ok(SalaryRange::UpTo { to }),
            (None, None) => Err(AnalyticsError::Precondition(
                "salary range has neither lower nor upper bound".to_string(),
            )),
        }
    }

    pub fn lower(&self) -> Option<i64> {
        match *self {
            SalaryRange::Between { from, .. } | SalaryRange::From { from } => Some(from),
            SalaryRange::UpTo { .. } => None,
        }
    }

    pub fn upper(&self) -> Option<i64> {
        match *self {
            SalaryRange::Between { to, .. } | SalaryRange::UpTo { to } => Some(to),
            SalaryRange::From { .. } => None,
        }
    }
}

/// Vacancy as handed to the aggregation core by the vacancy source.
#[derive(Debug, Clone, PartialEq)]
pub struct VacancyRecord {
    pub id: String,
    pub salary: SalaryRange,
    pub currency: Currency,
    /// Search queries that produced this vacancy. Expected to be non-empty.
    pub queries: BTreeSet<String>,
}

/// Running vacancy count and mean salary for one query within one build run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryAggregate {
    pub count: u32,
    pub average_salary: f64,
}

impl QueryAggregate {
    pub fn first(figure: f64) -> Self {
        Self {
            count: 1,
            average_salary: figure,
        }
    }

    /// Cumulative moving average step. Returns the aggregate including `figure`,
    /// or a precondition error once the count can no longer grow.
    pub fn observe(self, figure: f64) -> Result<Self> {
        let count = self.count.checked_add(1).ok_or_else(|| {
            AnalyticsError::Precondition(format!("vacancy count overflow after {}", self.count))
        })?;
        let average_salary = self.average_salary + (figure - self.average_salary) / count as f64;
        Ok(Self {
            count,
            average_salary,
        })
    }
}

/// Persisted per-(query, day) analytics row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AnalyticsRecord {
    /// Assigned by the store on first insert.
    pub id: Option<i64>,
    pub created_at: NaiveDate,
    pub query: String,
    pub vacancy_count: i32,
    pub average_salary: f64,
}

impl AnalyticsRecord {
    pub fn new(query: &str, created_at: NaiveDate, aggregate: &QueryAggregate) -> Result<Self> {
        Ok(Self {
            id: None,
            created_at,
            query: query.to_string(),
            vacancy_count: vacancy_count(aggregate)?,
            average_salary: aggregate.average_salary,
        })
    }

    /// Replace count and average with the aggregate's values. Identifier, query
    /// and date are kept.
    pub fn overwrite_with(&mut self, aggregate: &QueryAggregate) -> Result<()> {
        self.vacancy_count = vacancy_count(aggregate)?;
        self.average_salary = aggregate.average_salary;
        Ok(())
    }
}

fn vacancy_count(aggregate: &QueryAggregate) -> Result<i32> {
    i32::try_from(aggregate.count).map_err(|_| {
        AnalyticsError::Precondition(format!(
            "vacancy count {} does not fit the analytics table",
            aggregate.count
        ))
    })
}
