//! Error types for siteaudit.
//!
//! Taxonomy: validation and not-found surface to clients; store/cache
//! failures are infra errors; audit and browser failures land on the job
//! row; notification failures are logged and never escalated.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("job not found: {0}")]
    NotFound(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: crate::model::JobStatus,
        to: crate::model::JobStatus,
    },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("audit failed: {0}")]
    Audit(String),

    #[error("notification failed: {0}")]
    Notify(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
