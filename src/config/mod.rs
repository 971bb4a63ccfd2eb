//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! Sensitive values wrapped in secrecy::SecretString to prevent log leaks.

pub mod secrets;

use crate::error::{Error, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Config {
    pub database_url: SecretString,
    pub redis_url: SecretString,
    /// Webhook endpoint the notifier posts to. None disables notifications.
    pub notify_webhook_url: Option<String>,
    /// Base URL used when building report links in notifications.
    pub public_base_url: String,
    pub http_addr: String,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    pub worker: WorkerConfig,
    /// TTL for cached status payloads, seconds.
    pub cache_ttl_secs: u64,
    /// Cache-Control max-age advertised on status reads, seconds.
    pub status_max_age_secs: u64,
}

/// Worker tuning. The retry ceiling and backoff schedule are explicit and
/// configurable rather than an implicit infrastructure default.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// pgmq queue name.
    pub queue: String,
    /// Consumer identity, used in logs and metrics.
    pub consumer: String,
    /// Max entries per blocking batch read.
    pub batch_size: i32,
    /// Bound on the blocking batch read, seconds.
    pub poll_seconds: i32,
    /// Visibility timeout for delivered entries, seconds.
    pub visibility_timeout: i32,
    /// Deliveries after which an entry is dead-lettered.
    pub max_delivery_attempts: i32,
    /// Base of the exponential redelivery backoff, seconds.
    pub backoff_base_secs: i32,
    /// Cap on the redelivery backoff, seconds.
    pub backoff_cap_secs: i32,
}

impl WorkerConfig {
    /// Redelivery delay for the given delivery count (1-based).
    pub fn backoff_secs(&self, read_ct: i32) -> i32 {
        let exp = read_ct.saturating_sub(1).clamp(0, 16) as u32;
        self.backoff_base_secs
            .saturating_mul(2i32.saturating_pow(exp))
            .min(self.backoff_cap_secs)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, systemd EnvironmentFile provides the vars.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: SecretString::from(required_var("DATABASE_URL")?),
            redis_url: SecretString::from(required_var("REDIS_URL")?),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
            public_base_url: var_or("PUBLIC_BASE_URL", "http://localhost:8080"),
            http_addr: var_or("HTTP_ADDR", "0.0.0.0:8080"),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: var_or("LOG_LEVEL", "info"),
            worker: WorkerConfig {
                queue: var_or("AUDIT_QUEUE", "audits"),
                consumer: var_or("WORKER_CONSUMER", &format!("worker-{}", &uuid::Uuid::new_v4().to_string()[..8])),
                batch_size: parsed_var("WORKER_BATCH_SIZE", 5)?,
                poll_seconds: parsed_var("WORKER_POLL_SECONDS", 5)?,
                visibility_timeout: parsed_var("WORKER_VISIBILITY_TIMEOUT", 120)?,
                max_delivery_attempts: parsed_var("WORKER_MAX_DELIVERY_ATTEMPTS", 5)?,
                backoff_base_secs: parsed_var("WORKER_BACKOFF_BASE_SECS", 30)?,
                backoff_cap_secs: parsed_var("WORKER_BACKOFF_CAP_SECS", 900)?,
            },
            cache_ttl_secs: parsed_var("CACHE_TTL_SECS", 600)?,
            status_max_age_secs: parsed_var("STATUS_MAX_AGE_SECS", 30)?,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{name} has an unparseable value: {raw}"))),
        Err(_) => Ok(default),
    }
}
