//! Redis-backed session store

use async_trait::async_trait;
use redis::Client;
use uuid::Uuid;

use super::sessions::{visits_key, SessionStore};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Connect and check the server answers
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            client,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn record_visit(&self, session_id: Uuid) -> AppResult<i64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = visits_key(session_id);
        // Each visit pushes the expiry back, like a saved session
        let (visits,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, self.ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(visits - 1)
    }
}
