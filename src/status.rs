//! Status reads: cache-aside with one-time downstream side effects.
//!
//! First post-completion observation of a done job via a store read renders
//! the report, sends the notification, and caches the final payload. Two
//! concurrent readers can both observe the miss and both fire the side
//! effects before either writes the cache — a duplicate notification is an
//! accepted hazard, deliberately not prevented by any lock or conditional
//! write.

use crate::cache::Cache;
use crate::db::Db;
use crate::error::Result;
use crate::model::{CacheOrigin, Job, JobId, JobStatus, StatusPayload};
use crate::notify::{Attachment, Notifier};
use crate::telemetry::metrics;
use crate::{content, report};
use opentelemetry::KeyValue;
use std::sync::Arc;
use tracing::{info, warn};

/// A status payload plus where it came from.
#[derive(Debug)]
pub struct StatusRead {
    pub payload: StatusPayload,
    pub origin: CacheOrigin,
}

pub struct StatusService {
    db: Arc<Db>,
    cache: Cache,
    notifier: Arc<dyn Notifier>,
    public_base_url: String,
    cache_ttl_secs: u64,
}

impl StatusService {
    pub fn new(
        db: Arc<Db>,
        cache: Cache,
        notifier: Arc<dyn Notifier>,
        public_base_url: impl Into<String>,
        cache_ttl_secs: u64,
    ) -> Self {
        Self {
            db,
            cache,
            notifier,
            public_base_url: public_base_url.into(),
            cache_ttl_secs,
        }
    }

    /// Read a job's status. Cache first; on miss, the store is the source
    /// of truth. Unknown id is NotFound; store/cache unreachable is an
    /// infra error and safe to retry.
    pub async fn read(&self, id: JobId) -> Result<StatusRead> {
        if let Some(payload) = self.cache.get::<StatusPayload>(id).await? {
            return Ok(StatusRead {
                payload,
                origin: CacheOrigin::Hit,
            });
        }

        let job = self.db.get_job(id).await?;
        let payload = StatusPayload::from_job(&job);

        // Done and observed via a store read, i.e. not yet cached: trigger
        // the one-time downstream side effects. Pending/processing/error
        // payloads are expected to change and are never cached.
        if job.status == JobStatus::Done
            && let Some(ref result) = job.result
        {
            self.finalize(&job, result, &payload).await;
        }

        Ok(StatusRead {
            payload,
            origin: CacheOrigin::Miss,
        })
    }

    /// Render + notify + cache-write, all best-effort: failures are logged
    /// and never surfaced to the caller.
    async fn finalize(&self, job: &Job, result: &crate::model::AuditResult, payload: &StatusPayload) {
        let steps = content::next_steps(result);
        let artifact = report::render(&job.site, result, &steps);
        let link = format!("{}/api/audits/{}", self.public_base_url, job.id.0);
        let body = report::notification_body(&job.site, result, Some(&link), &steps);
        let subject = format!("Audit report for {}", job.site);

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
                info!(job_id = %job.id, contact = %job.contact, "completion notification sent");
                metrics::notifications_sent().add(1, &[KeyValue::new("result", "ok")]);
            }
            Err(e) => {
                warn!(job_id = %job.id, "completion notification failed: {e}");
                metrics::notifications_sent().add(1, &[KeyValue::new("result", "error")]);
            }
        }

        if let Err(e) = self.cache.set(job.id, payload, self.cache_ttl_secs).await {
            warn!(job_id = %job.id, "cache write failed: {e}");
        }
    }
}
