// ============================================
// Background Jobs
// ============================================
//
// Triggered via:
// - Kafka scheduled-tasks topic (consumers::task_trigger)
// - Command line argument (--mode run-once), e.g. from a Kubernetes CronJob

pub mod analytics_build;

pub use analytics_build::{AnalyticsBuildJob, BuildJobStats};
