pub mod models;

pub use models::{AnalyticsRecord, Currency, QueryAggregate, SalaryRange, VacancyRecord};
