/// Error types for vacancy-analytics-service
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A record reached the core in a shape the upstream filter must never
    /// produce (no salary bounds, no query terms, negative salary).
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Vacancy source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Some queries were persisted, others were not. Writes that succeeded stay durable.
    #[error("Failed to reconcile {} queries ({succeeded} succeeded): {failed:?}", .failed.len())]
    Reconciliation {
        failed: Vec<String>,
        succeeded: usize,
    },
}

impl AnalyticsError {
    /// Whether a redelivered trigger could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AnalyticsError::Database(_)
                | AnalyticsError::SourceUnavailable(_)
                | AnalyticsError::Kafka(_)
                | AnalyticsError::Reconciliation { .. }
        )
    }
}
