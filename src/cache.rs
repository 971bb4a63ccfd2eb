//! Redis-backed cache for final status payloads.
//!
//! Cache-aside only: entries are written after a done job's payload has
//! been derived from the store, expire via TTL, and are never explicitly
//! invalidated. Absence is always safe — it just forces a store read.

use crate::error::Result;
use crate::model::JobId;
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use tracing::debug;

#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

fn key_for(id: JobId) -> String {
    format!("audit:{}", id.0)
}

impl Cache {
    /// Connect to Redis with an auto-reconnecting connection manager.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Read a cached payload for a job. None is a miss.
    pub async fn get<T: DeserializeOwned>(&self, id: JobId) -> Result<Option<T>> {
        let key = key_for(id);
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(&key).await?;

        match data {
            Some(json) => {
                let value = serde_json::from_str(&json)
                    .map_err(|e| crate::error::Error::Other(format!("corrupt cache entry: {e}")))?;
                debug!(%key, "cache hit");
                metrics::cache_reads().add(1, &[KeyValue::new("result", "hit")]);
                Ok(Some(value))
            }
            None => {
                debug!(%key, "cache miss");
                metrics::cache_reads().add(1, &[KeyValue::new("result", "miss")]);
                Ok(None)
            }
        }
    }

    /// Write a payload with a fixed expiry.
    pub async fn set<T: Serialize>(&self, id: JobId, value: &T, ttl_secs: u64) -> Result<()> {
        let key = key_for(id);
        let json = serde_json::to_string(value)
            .map_err(|e| crate::error::Error::Other(format!("serialize cache entry: {e}")))?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, json, ttl_secs).await?;
        debug!(%key, ttl_secs, "cache set");
        Ok(())
    }
}
