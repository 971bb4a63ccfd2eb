//! Worker: drains the audit queue and drives jobs to a terminal status.
//!
//! Entries are processed strictly sequentially — a browser instance is an
//! expensive resource that doesn't parallelize well. Horizontal scale-out
//! happens by running more worker processes, each a distinct consumer
//! identity on the same queue; the visibility timeout guarantees an entry
//! is never delivered to two consumers concurrently within one attempt.

use crate::audit::Auditor;
use crate::config::WorkerConfig;
use crate::db::Db;
use crate::db::queue::QueueEntry;
use crate::error::{Error, Result};
use crate::model::{AuditResult, Job, normalize_audit_url};
use crate::notify::{Attachment, Notifier};
use crate::telemetry::jobs::{record_status_transition, start_job_span};
use crate::telemetry::metrics;
use crate::{content, report};
use opentelemetry::KeyValue;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{Instrument, error, info, warn};

pub struct Worker {
    db: Arc<Db>,
    auditor: Arc<dyn Auditor>,
    notifier: Arc<dyn Notifier>,
    config: WorkerConfig,
    shutdown: Arc<Notify>,
}

impl Clone for Worker {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            auditor: Arc::clone(&self.auditor),
            notifier: Arc::clone(&self.notifier),
            config: self.config.clone(),
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}

impl Worker {
    pub fn new(
        db: Arc<Db>,
        auditor: Arc<dyn Auditor>,
        notifier: Arc<dyn Notifier>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            db,
            auditor,
            notifier,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Signal the worker to stop. Entries already delivered are driven to a
    /// terminal status first; only the blocking read is interrupted.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Run the consumer loop until shutdown.
    pub async fn run(&self) -> Result<()> {
        // Idempotent: an already-existing queue is success, not an error.
        self.db.create_queue(&self.config.queue).await?;

        info!(
            queue = %self.config.queue,
            consumer = %self.config.consumer,
            "worker started"
        );

        loop {
            // Shutdown may only interrupt the blocking read. An interrupted
            // read at worst leaves entries invisible until their visibility
            // timeout lapses; processing below is never cancelled mid-entry.
            let read = tokio::select! {
                _ = self.shutdown.notified() => {
                    info!(consumer = %self.config.consumer, "worker shutting down");
                    return Ok(());
                }
                read = self.read_batch() => read,
            };

            match read {
                Ok(entries) => {
                    self.process_batch(entries).await;
                }
                Err(e) => {
                    error!("queue read error: {e}");
                    tokio::time::sleep(std::time::Duration::from_secs(
                        self.config.poll_seconds as u64,
                    ))
                    .await;
                }
            }
        }
    }

    /// One blocking batch read plus sequential processing of whatever it
    /// delivered. Returns the number of entries drained; zero on a timeout
    /// with no entries (no progress is not an error).
    pub async fn drain_once(&self) -> Result<usize> {
        let entries = self.read_batch().await?;
        Ok(self.process_batch(entries).await)
    }

    async fn read_batch(&self) -> Result<Vec<QueueEntry>> {
        self.db
            .read_batch(
                &self.config.queue,
                self.config.visibility_timeout,
                self.config.batch_size,
                self.config.poll_seconds,
            )
            .await
    }

    async fn process_batch(&self, entries: Vec<QueueEntry>) -> usize {
        let drained = entries.len();
        for entry in entries {
            if let Err(e) = self.process_entry(&entry).await {
                error!(msg_id = entry.msg_id, "entry processing error: {e}");
            }
        }
        drained
    }

    /// Drive one queue entry through the audit, acknowledging only after a
    /// durable done status.
    async fn process_entry(&self, entry: &QueueEntry) -> Result<()> {
        let span = start_job_span(&self.config.consumer, entry.msg_id);

        async {
            let Some(job_id) = entry.job_id() else {
                warn!(msg_id = entry.msg_id, "malformed queue entry, dead-lettering");
                self.db.ack_entry(&self.config.queue, entry.msg_id).await?;
                return Ok(());
            };
            span.record("job.id", tracing::field::display(job_id.0));

            let job = match self.db.get_job(job_id).await {
                Ok(job) => job,
                Err(Error::NotFound(_)) => {
                    // Fatal per-entry: redelivery reproduces this failure
                    // until the retry ceiling dead-letters the entry.
                    error!(
                        %job_id,
                        read_ct = entry.read_ct,
                        "queue entry references a missing job"
                    );
                    self.retire_failed_entry(entry).await?;
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            record_status_transition(&span, "pending", "processing");
            self.db.set_processing(job_id).await?;

            let url = normalize_audit_url(&job.site);
            info!(%job_id, url = %url, "audit starting");

            match self.auditor.audit(&url).await {
                Ok(result) => {
                    record_status_transition(&span, "processing", "done");
                    let job = self.db.complete_job(job_id, &result).await?;
                    info!(%job_id, duration_ms = result.duration_ms, "audit done");

                    // Best-effort; a send failure never touches the job's
                    // terminal state.
                    self.notify_done(&job, &result).await;

                    // Ack strictly after done is durable. A crash between
                    // persistence and ack yields a harmless duplicate
                    // redelivery that overwrites the row equivalently.
                    self.db.ack_entry(&self.config.queue, entry.msg_id).await?;
                }
                Err(e) => {
                    record_status_transition(&span, "processing", "error");
                    error!(%job_id, "audit failed: {e}");
                    if let Err(persist) = self.db.fail_job(job_id, &e.to_string()).await {
                        error!(%job_id, "could not persist error status: {persist}");
                    }
                    // No ack: retry happens only through queue redelivery.
                    self.retire_failed_entry(entry).await?;
                }
            }

            Ok(())
        }
        .instrument(span.clone())
        .await
    }

    /// Apply the explicit retry policy to an unacknowledged entry: schedule
    /// a backed-off redelivery, or dead-letter once attempts are exhausted.
    async fn retire_failed_entry(&self, entry: &QueueEntry) -> Result<()> {
        if entry.read_ct >= self.config.max_delivery_attempts {
            warn!(
                msg_id = entry.msg_id,
                read_ct = entry.read_ct,
                "delivery attempts exhausted, dead-lettering"
            );
            self.db.ack_entry(&self.config.queue, entry.msg_id).await?;
        } else {
            let delay = self.config.backoff_secs(entry.read_ct);
            info!(
                msg_id = entry.msg_id,
                read_ct = entry.read_ct,
                delay_secs = delay,
                "scheduling redelivery"
            );
            self.db
                .delay_redelivery(&self.config.queue, entry.msg_id, delay)
                .await?;
        }
        Ok(())
    }

    async fn notify_done(&self, job: &Job, result: &AuditResult) {
        let steps = content::next_steps(result);
        let artifact = report::render(&job.site, result, &steps);
        let body = report::notification_body(&job.site, result, None, &steps);
        let subject = format!("Your audit of {} is ready", job.site);

        let send = self
            .notifier
            .send(
                &job.contact,
                &subject,
                &body,
                Some(Attachment {
                    filename: "audit-report.html".to_string(),
                    content_type: "text/html".to_string(),
                    content: artifact,
                }),
            )
            .await;
        match send {
            Ok(()) => {
                metrics::notifications_sent().add(1, &[KeyValue::new("result", "ok")]);
            }
            Err(e) => {
                warn!(job_id = %job.id, "completion notification failed: {e}");
                metrics::notifications_sent().add(1, &[KeyValue::new("result", "error")]);
            }
        }
    }
}
