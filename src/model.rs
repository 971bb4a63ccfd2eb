//! Core data model.
//!
//! A job is one site-audit request tracked through its lifecycle. The job
//! row in Postgres is the sole source of truth for job state; only the
//! worker mutates it after intake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One site-audit request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier.
    pub id: JobId,

    /// Target site as submitted (trimmed, otherwise raw).
    pub site: String,

    /// Contact address that receives the audit notification.
    pub contact: String,

    /// Current lifecycle status.
    pub status: JobStatus,

    /// Structured audit payload, present once the job is done.
    pub result: Option<AuditResult>,

    /// Failure message, present once the job has errored.
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Newtype for job IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of UUID
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created by intake, waiting for a worker.
    Pending,
    /// A worker is running the audit.
    Processing,
    /// Audit finished, result persisted. Terminal.
    Done,
    /// Audit failed, message persisted. Terminal.
    Error,
}

impl JobStatus {
    /// Can transition from self to `to`?
    ///
    /// Status is monotonic: pending -> processing -> {done | error}. The one
    /// exception lives outside this table: queue redelivery may re-run an
    /// already-terminal job and overwrite the row with an equivalent
    /// terminal result (see the worker).
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, to),
            (Pending, Processing) | (Processing, Done) | (Processing, Error)
        )
    }

    /// Is this a terminal status?
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for JobStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "done" => Ok(JobStatus::Done),
            "error" => Ok(JobStatus::Error),
            other => Err(crate::error::Error::Other(format!(
                "unknown job status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Audit result
// ---------------------------------------------------------------------------

/// Category scores in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub performance: f64,
    pub accessibility: f64,
    pub seo: f64,
}

/// One individual check run by the audit engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditCheck {
    /// Stable check identifier (e.g. "image-alt").
    pub id: String,
    pub title: String,
    /// 1.0 = pass, 0.0 = fail, fractional for partial credit.
    pub score: f64,
    pub detail: Option<String>,
}

/// Structured audit payload persisted on a done job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub scores: CategoryScores,
    pub checks: Vec<AuditCheck>,
    /// The normalized URL the audit actually ran against.
    pub audited_url: String,
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Status payload
// ---------------------------------------------------------------------------

/// Wire form of a status read. This exact shape is cached verbatim for done
/// jobs, so cached and store-derived reads are byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AuditResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusPayload {
    pub fn from_job(job: &Job) -> Self {
        Self {
            status: job.status,
            result: job.result.clone(),
            error: job.error_message.clone(),
        }
    }
}

/// Where a status payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    Hit,
    Miss,
}

impl CacheOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheOrigin::Hit => "HIT",
            CacheOrigin::Miss => "MISS",
        }
    }
}

// ---------------------------------------------------------------------------
// URL normalization
// ---------------------------------------------------------------------------

/// Normalize a submitted site string for the audit engine: ensure a scheme,
/// strip query and fragment, ensure a trailing path separator.
///
/// A still-malformed input is passed through untouched; the audit engine
/// fails loudly on garbage rather than being second-guessed here.
pub fn normalize_audit_url(site: &str) -> String {
    let trimmed = site.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    match url::Url::parse(&with_scheme) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            let mut normalized = parsed.to_string();
            if !normalized.ends_with('/') {
                normalized.push('/');
            }
            normalized
        }
        Err(_) => trimmed.to_string(),
    }
}
