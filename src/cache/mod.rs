use redis::{Client, RedisError, aio::ConnectionManager};
use std::time::Duration;
use uuid::Uuid;

use crate::models::jobs::JobSnapshot;

/// Redis-backed cache for the parent-job snapshot shown in the negotiation
/// panel.
///
/// Only immutable display fields go through here (location, scheduled
/// datetime), so entries never need invalidation and simply age out on the
/// TTL. Negotiation state itself is never cached: agreement flags and
/// offers are always read from the database.
#[derive(Clone)]
pub struct SnapshotCache {
    connection: ConnectionManager,
    ttl: Duration,
}

impl SnapshotCache {
    /// Connect to Redis. The TTL applies to every entry written.
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection, ttl })
    }

    fn key(job_id: Uuid) -> String {
        format!("job:{job_id}:snapshot")
    }

    pub async fn get(&self, job_id: Uuid) -> redis::RedisResult<Option<JobSnapshot>> {
        let raw: Option<String> = redis::cmd("GET")
            .arg(Self::key(job_id))
            .query_async(&mut self.connection.clone())
            .await?;

        // An entry that no longer decodes (schema drift across deploys) is
        // a miss; the next put overwrites it.
        Ok(raw.and_then(|v| serde_json::from_str(&v).ok()))
    }

    pub async fn put(&self, job_id: Uuid, snapshot: &JobSnapshot) -> redis::RedisResult<()> {
        let raw = serde_json::to_string(snapshot).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        redis::cmd("SET")
            .arg(Self::key(job_id))
            .arg(raw)
            .arg("EX")
            .arg(self.ttl.as_secs())
            .query_async(&mut self.connection.clone())
            .await
    }
}

/// Snapshot TTL from the environment, with a ten-minute default.
pub fn snapshot_ttl_from_env() -> Duration {
    std::env::var("CACHE_TTL_JOB_SNAPSHOT")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(600))
}
