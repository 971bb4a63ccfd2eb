//! Job row operations: intake insert, lookups, worker state transitions.

use crate::error::{Error, Result};
use crate::model::{AuditResult, Job, JobId, JobStatus};
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use uuid::Uuid;

impl super::Db {
    /// Insert a new pending job. The row exists before the intake response
    /// is returned; enqueueing happens separately and is best-effort.
    pub async fn insert_job(&self, site: &str, contact: &str) -> Result<Job> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            "INSERT INTO jobs (id, site, contact, status, created_at)
             VALUES ($1, $2, $3, 'pending', $4)",
        )
        .bind(id)
        .bind(site)
        .bind(contact)
        .bind(now)
        .execute(&self.pool)
        .await?;

        metrics::jobs_submitted().add(1, &[KeyValue::new("result", "ok")]);

        self.get_job(JobId(id)).await
    }

    /// Get a job by ID.
    pub async fn get_job(&self, id: JobId) -> Result<Job> {
        let row: Option<JobRow> = sqlx::query_as(
            "SELECT id, site, contact, status, result, error_message, created_at, finished_at
             FROM jobs WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| Error::NotFound(format!("job {id}")))?
            .try_into_job()
    }

    /// List recent jobs, optionally filtered by status.
    pub async fn list_jobs(&self, status: Option<JobStatus>, limit: i64) -> Result<Vec<Job>> {
        let rows: Vec<JobRow> = match status {
            Some(s) => {
                sqlx::query_as(
                    "SELECT id, site, contact, status, result, error_message, created_at, finished_at
                     FROM jobs WHERE status = $1 ORDER BY created_at DESC LIMIT $2",
                )
                .bind(s.to_string())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, site, contact, status, result, error_message, created_at, finished_at
                     FROM jobs ORDER BY created_at DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(JobRow::try_into_job).collect()
    }

    /// Mark a job as processing. Unconditional: redelivery of an
    /// already-terminal job legitimately re-enters processing before
    /// overwriting the row with an equivalent terminal result.
    pub async fn set_processing(&self, id: JobId) -> Result<()> {
        let rows_affected = sqlx::query("UPDATE jobs SET status = 'processing' WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(Error::NotFound(format!("job {id}")));
        }

        metrics::job_state_transitions().add(1, &[KeyValue::new("to", "processing")]);
        Ok(())
    }

    /// Complete a job: processing -> done with the audit result. The entry
    /// is acknowledged only after this returns, so a crash in between yields
    /// a harmless duplicate redelivery.
    pub async fn complete_job(&self, id: JobId, result: &AuditResult) -> Result<Job> {
        let now = chrono::Utc::now();
        let result_json = serde_json::to_value(result)
            .map_err(|e| Error::Other(format!("serialize audit result: {e}")))?;

        let rows_affected = sqlx::query(
            "UPDATE jobs SET status = 'done', result = $1, error_message = NULL, finished_at = $2
             WHERE id = $3 AND status = 'processing'",
        )
        .bind(&result_json)
        .bind(now)
        .bind(id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(Error::InvalidTransition {
                from: JobStatus::Processing,
                to: JobStatus::Done,
            });
        }

        metrics::job_state_transitions().add(1, &[KeyValue::new("to", "done")]);
        metrics::audit_duration_ms().record(
            result.duration_ms as f64,
            &[KeyValue::new("outcome", "done")],
        );

        self.get_job(id).await
    }

    /// Fail a job: processing -> error with a message.
    pub async fn fail_job(&self, id: JobId, message: &str) -> Result<Job> {
        let now = chrono::Utc::now();
        let rows_affected = sqlx::query(
            "UPDATE jobs SET status = 'error', error_message = $1, finished_at = $2
             WHERE id = $3 AND status = 'processing'",
        )
        .bind(message)
        .bind(now)
        .bind(id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(Error::InvalidTransition {
                from: JobStatus::Processing,
                to: JobStatus::Error,
            });
        }

        metrics::job_state_transitions().add(1, &[KeyValue::new("to", "error")]);

        self.get_job(id).await
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    site: String,
    contact: String,
    status: String,
    result: Option<serde_json::Value>,
    error_message: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl JobRow {
    fn try_into_job(self) -> Result<Job> {
        let result = match self.result {
            Some(value) => Some(
                serde_json::from_value(value)
                    .map_err(|e| Error::Other(format!("corrupt audit result: {e}")))?,
            ),
            None => None,
        };

        Ok(Job {
            id: JobId(self.id),
            site: self.site,
            contact: self.contact,
            status: self.status.parse()?,
            result,
            error_message: self.error_message,
            created_at: self.created_at,
            finished_at: self.finished_at,
        })
    }
}
