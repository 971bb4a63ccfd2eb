//! # siteaudit
//!
//! Asynchronous website-audit pipeline.
//!
//! Intake creates a job (Postgres) and enqueues it (pgmq); the worker
//! drains the queue with at-least-once semantics and runs each audit in a
//! disposable headless browser; status reads are cache-aside (Redis) and
//! trigger report rendering + notification on first observation of a
//! completed job.

pub mod audit;
pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod http;
pub mod intake;
pub mod model;
pub mod notify;
pub mod report;
pub mod status;
pub mod telemetry;
pub mod worker;
