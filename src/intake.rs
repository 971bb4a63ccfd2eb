//! Intake: validate a request, create a pending job, best-effort enqueue.

use crate::db::Db;
use crate::error::{Error, Result};
use crate::model::JobId;
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use std::sync::Arc;
use tracing::{info, warn};

pub struct IntakeService {
    db: Arc<Db>,
    queue: String,
}

impl IntakeService {
    pub fn new(db: Arc<Db>, queue: impl Into<String>) -> Self {
        Self {
            db,
            queue: queue.into(),
        }
    }

    /// Create a job for the given site and contact.
    ///
    /// The job row is committed (status=pending) before this returns, and
    /// the returned id always reflects successful creation. Enqueueing is
    /// best-effort: a queue failure is logged and swallowed — a pending job
    /// stays discoverable in the store for a polling fallback.
    pub async fn submit(&self, site: &str, contact: &str) -> Result<JobId> {
        let site = site.trim();
        let contact = contact.trim();

        if site.is_empty() {
            metrics::jobs_submitted().add(1, &[KeyValue::new("result", "rejected")]);
            return Err(Error::Validation("site is required".to_string()));
        }
        if contact.is_empty() {
            metrics::jobs_submitted().add(1, &[KeyValue::new("result", "rejected")]);
            return Err(Error::Validation("contact is required".to_string()));
        }

        let job = self.db.insert_job(site, contact).await?;
        info!(job_id = %job.id, site, "job created");

        if let Err(e) = self.db.enqueue_job(&self.queue, job.id).await {
            warn!(job_id = %job.id, "enqueue failed, job stays pending in the store: {e}");
        }

        Ok(job.id)
    }
}
