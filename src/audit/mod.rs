//! Audit engine boundary.
//!
//! The worker drives audits through the [`Auditor`] trait; the production
//! implementation launches a disposable headless browser per audit. Tests
//! substitute a stub.

pub mod browser;
pub mod engine;

use crate::error::Result;
use crate::model::AuditResult;

pub use engine::HeadlessAuditor;

/// Runs one audit against a normalized URL and produces category scores
/// plus per-check details.
#[async_trait::async_trait]
pub trait Auditor: Send + Sync {
    async fn audit(&self, url: &str) -> Result<AuditResult>;
}
