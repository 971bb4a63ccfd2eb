//! Durable queue operations via pgmq's SQL functions through SQLx.
//!
//! Calls pgmq.create, pgmq.send, pgmq.read_with_poll, pgmq.archive, and
//! pgmq.set_vt. Delivery is at-least-once: an entry read under a visibility
//! timeout is invisible to other consumers until the timeout lapses, then
//! redelivered. Archiving is the acknowledgment.

use crate::error::Result;
use crate::model::JobId;
use crate::telemetry::metrics;
use opentelemetry::KeyValue;

/// An entry read from a pgmq queue.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub msg_id: i64,
    /// How many times this entry has been delivered, this read included.
    pub read_ct: i32,
    pub enqueued_at: chrono::DateTime<chrono::Utc>,
    pub vt: chrono::DateTime<chrono::Utc>,
    pub message: serde_json::Value,
}

impl QueueEntry {
    /// Extract the job id from the entry payload.
    pub fn job_id(&self) -> Option<JobId> {
        self.message
            .get("job_id")
            .and_then(|v| v.as_str())
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .map(JobId)
    }
}

impl super::Db {
    /// Create a pgmq queue. Idempotent: an already-existing queue is
    /// success, not an error.
    pub async fn create_queue(&self, queue_name: &str) -> Result<()> {
        sqlx::query("SELECT pgmq.create($1)")
            .bind(queue_name)
            .execute(&self.pool)
            .await?;
        metrics::queue_operations().add(
            1,
            &[
                KeyValue::new("queue", queue_name.to_string()),
                KeyValue::new("operation", "create"),
            ],
        );
        Ok(())
    }

    /// Append a job id to the queue. Returns the entry's message ID.
    pub async fn enqueue_job(&self, queue_name: &str, job_id: JobId) -> Result<i64> {
        let payload = serde_json::json!({ "job_id": job_id.0 });
        let row: (i64,) = sqlx::query_as("SELECT pgmq.send($1, $2, $3)")
            .bind(queue_name)
            .bind(&payload)
            .bind(0i32)
            .fetch_one(&self.pool)
            .await?;
        metrics::queue_operations().add(
            1,
            &[
                KeyValue::new("queue", queue_name.to_string()),
                KeyValue::new("operation", "send"),
            ],
        );
        Ok(row.0)
    }

    /// Blocking batch read: wait up to `poll_seconds` for up to `qty`
    /// entries, each delivered under `vt_seconds` of invisibility. An empty
    /// vec on timeout is normal, not an error.
    pub async fn read_batch(
        &self,
        queue_name: &str,
        vt_seconds: i32,
        qty: i32,
        poll_seconds: i32,
    ) -> Result<Vec<QueueEntry>> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,
                i32,
                chrono::DateTime<chrono::Utc>,
                chrono::DateTime<chrono::Utc>,
                serde_json::Value,
            ),
        >(
            "SELECT msg_id, read_ct, enqueued_at, vt, message
             FROM pgmq.read_with_poll($1, $2, $3, $4)",
        )
        .bind(queue_name)
        .bind(vt_seconds)
        .bind(qty)
        .bind(poll_seconds)
        .fetch_all(&self.pool)
        .await?;

        let entries: Vec<QueueEntry> = rows
            .into_iter()
            .map(|(msg_id, read_ct, enqueued_at, vt, message)| QueueEntry {
                msg_id,
                read_ct,
                enqueued_at,
                vt,
                message,
            })
            .collect();

        metrics::queue_operations().add(
            1,
            &[
                KeyValue::new("queue", queue_name.to_string()),
                KeyValue::new(
                    "operation",
                    if entries.is_empty() {
                        "read_empty"
                    } else {
                        "read"
                    },
                ),
            ],
        );

        Ok(entries)
    }

    /// Acknowledge an entry (moves to the archive table, preserved for
    /// audit).
    pub async fn ack_entry(&self, queue_name: &str, msg_id: i64) -> Result<()> {
        sqlx::query("SELECT pgmq.archive($1, $2)")
            .bind(queue_name)
            .bind(msg_id)
            .execute(&self.pool)
            .await?;
        metrics::queue_operations().add(
            1,
            &[
                KeyValue::new("queue", queue_name.to_string()),
                KeyValue::new("operation", "archive"),
            ],
        );
        Ok(())
    }

    /// Push an unacknowledged entry's visibility `delay_seconds` into the
    /// future. This is the explicit redelivery backoff.
    pub async fn delay_redelivery(
        &self,
        queue_name: &str,
        msg_id: i64,
        delay_seconds: i32,
    ) -> Result<()> {
        sqlx::query("SELECT pgmq.set_vt($1, $2, $3)")
            .bind(queue_name)
            .bind(msg_id)
            .bind(delay_seconds)
            .execute(&self.pool)
            .await?;
        metrics::queue_operations().add(
            1,
            &[
                KeyValue::new("queue", queue_name.to_string()),
                KeyValue::new("operation", "set_vt"),
            ],
        );
        Ok(())
    }
}
