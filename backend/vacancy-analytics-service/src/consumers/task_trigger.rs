//! Scheduled Task Consumer
//!
//! Consumes analytics-builder task messages published by the scheduler and
//! runs one analytics build per message. Messages are handled one at a time,
//! so builds never overlap within a consumer. The payload is not interpreted.
//!
//! A build that fails with a transient error leaves the offset uncommitted and
//! rewinds the partition to the same message, so the task is redelivered after
//! a short pause. Any other outcome commits the offset.

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::Offset;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::TriggerConfig;
use crate::error::Result;
use crate::jobs::{AnalyticsBuildJob, BuildJobStats};

const REDELIVERY_BACKOFF: Duration = Duration::from_secs(30);

/// What to do with a task message once its build has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDisposition {
    Commit,
    Redeliver,
}

pub fn disposition(outcome: &Result<BuildJobStats>) -> TaskDisposition {
    match outcome {
        Err(e) if e.is_transient() => TaskDisposition::Redeliver,
        _ => TaskDisposition::Commit,
    }
}

pub struct TaskTriggerConsumer {
    job: Arc<AnalyticsBuildJob>,
    config: TriggerConfig,
}

impl TaskTriggerConsumer {
    pub fn new(job: Arc<AnalyticsBuildJob>, config: TriggerConfig) -> Self {
        Self { job, config }
    }

    /// Run the consumer loop
    pub async fn run(self) {
        if let Err(err) = self.run_inner().await {
            error!("Scheduled task consumer terminated with error: {err}");
        }
    }

    async fn run_inner(self) -> Result<()> {
        info!(
            "Starting scheduled task consumer (topic: {}, group: {})",
            self.config.topic, self.config.group_id
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.config.brokers)
            .set("group.id", &self.config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "latest")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "45000")
            // a build may take a while; stay in the group meanwhile
            .set("max.poll.interval.ms", "900000")
            .create()?;

        consumer.subscribe(&[&self.config.topic])?;

        loop {
            match consumer.recv().await {
                Ok(record) => {
                    debug!(
                        "Received scheduled task (partition: {}, offset: {}, payload_bytes: {})",
                        record.partition(),
                        record.offset(),
                        record.payload().map(|p| p.len()).unwrap_or(0)
                    );

                    let outcome = self.job.run().await;
                    if let Err(e) = &outcome {
                        warn!(
                            transient = e.is_transient(),
                            "Analytics build triggered by scheduled task failed: {}", e
                        );
                    }

                    match disposition(&outcome) {
                        TaskDisposition::Commit => {
                            if let Err(commit_err) =
                                consumer.commit_message(&record, CommitMode::Async)
                            {
                                warn!("Failed to commit Kafka offset: {}", commit_err);
                            }
                        }
                        TaskDisposition::Redeliver => {
                            info!(
                                "Rewinding to offset {} on partition {} for redelivery",
                                record.offset(),
                                record.partition()
                            );
                            consumer.seek(
                                record.topic(),
                                record.partition(),
                                Offset::Offset(record.offset()),
                                Duration::from_secs(5),
                            )?;
                            tokio::time::sleep(REDELIVERY_BACKOFF).await;
                        }
                    }
                }
                Err(err) => {
                    error!("Kafka error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;

    #[test]
    fn test_successful_build_is_committed() {
        let outcome = Ok(BuildJobStats::default());
        assert_eq!(disposition(&outcome), TaskDisposition::Commit);
    }

    #[test]
    fn test_transient_failure_is_redelivered() {
        let outcome = Err(AnalyticsError::SourceUnavailable("connection refused".into()));
        assert_eq!(disposition(&outcome), TaskDisposition::Redeliver);

        let outcome = Err(AnalyticsError::Reconciliation {
            failed: vec!["Java".into()],
            succeeded: 2,
        });
        assert_eq!(disposition(&outcome), TaskDisposition::Redeliver);
    }

    #[test]
    fn test_precondition_failure_is_committed() {
        let outcome = Err(AnalyticsError::Precondition("no bounds".into()));
        assert_eq!(disposition(&outcome), TaskDisposition::Commit);
    }
}
