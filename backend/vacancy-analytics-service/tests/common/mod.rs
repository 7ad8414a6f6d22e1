//! In-memory collaborators for driving the build job without Postgres.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use vacancy_analytics_service::domain::{AnalyticsRecord, Currency, SalaryRange, VacancyRecord};
use vacancy_analytics_service::repository::{AnalyticsStore, VacancySource};
use vacancy_analytics_service::{AnalyticsError, Result};

pub fn vacancy(id: &str, from: Option<i64>, to: Option<i64>, queries: &[&str]) -> VacancyRecord {
    VacancyRecord {
        id: id.to_string(),
        salary: SalaryRange::from_bounds(from, to).expect("test vacancy has a bound"),
        currency: Currency::default(),
        queries: queries.iter().map(|q| q.to_string()).collect(),
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
}

pub struct StaticVacancySource {
    records: Mutex<Option<Vec<VacancyRecord>>>,
}

impl StaticVacancySource {
    pub fn new(records: Vec<VacancyRecord>) -> Self {
        Self {
            records: Mutex::new(Some(records)),
        }
    }

    /// A source whose backing store is down.
    pub fn unavailable() -> Self {
        Self {
            records: Mutex::new(None),
        }
    }
}

#[async_trait]
impl VacancySource for StaticVacancySource {
    async fn fetch_eligible(&self) -> Result<Vec<VacancyRecord>> {
        self.records
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AnalyticsError::SourceUnavailable("connection refused".to_string()))
    }
}

/// Store keyed by id that enforces the (query, date) uniqueness rule.
#[derive(Default)]
pub struct InMemoryAnalyticsStore {
    rows: Mutex<BTreeMap<i64, AnalyticsRecord>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    failing_queries: Mutex<HashSet<String>>,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_saves_for(&self, query: &str) {
        self.failing_queries.lock().unwrap().insert(query.to_string());
    }

    pub fn heal(&self) {
        self.failing_queries.lock().unwrap().clear();
    }

    pub fn insert_existing(&self, record: AnalyticsRecord) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.rows
            .lock()
            .unwrap()
            .insert(id, AnalyticsRecord { id: Some(id), ..record });
        id
    }

    pub fn rows(&self) -> Vec<AnalyticsRecord> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    pub fn row(&self, query: &str, date: NaiveDate) -> Option<AnalyticsRecord> {
        self.rows()
            .into_iter()
            .find(|r| r.query == query && r.created_at == date)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn find_by_query_and_date(
        &self,
        query: &str,
        date: NaiveDate,
    ) -> Result<Option<AnalyticsRecord>> {
        Ok(self.row(query, date))
    }

    async fn save(&self, record: AnalyticsRecord) -> Result<AnalyticsRecord> {
        if self.failing_queries.lock().unwrap().contains(&record.query) {
            return Err(AnalyticsError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap();
        let id = match record.id {
            Some(id) => {
                if !rows.contains_key(&id) {
                    return Err(AnalyticsError::NotFound(format!("vacancy_analytics id {}", id)));
                }
                id
            }
            None => {
                let duplicate = rows
                    .values()
                    .any(|r| r.query == record.query && r.created_at == record.created_at);
                assert!(!duplicate, "unique (query, created_at) violated for {}", record.query);
                self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1
            }
        };

        let saved = AnalyticsRecord {
            id: Some(id),
            ..record
        };
        rows.insert(id, saved.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(saved)
    }
}
