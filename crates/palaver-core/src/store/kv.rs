// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Minimal remote KV client capability.
//!
//! The remote backend never talks to Redis directly; it goes through this
//! trait so tests can substitute an in-process client and the bootstrap can
//! health-check any adapter the same way.

use async_trait::async_trait;
use tracing::debug;

use crate::error::CoreError;

/// Capability set every remote KV adapter must satisfy.
#[async_trait]
pub trait KvClient: Send + Sync {
    /// Fetch a value. Absent keys return `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Store a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Delete a key, returning the number of keys removed.
    async fn del(&self, key: &str) -> Result<u64, CoreError>;

    /// Health check. Fails on an unreachable store or a malformed reply.
    async fn ping(&self) -> Result<(), CoreError>;

    /// Release the client. Called once on shutdown or bootstrap fallback.
    async fn quit(&self) -> Result<(), CoreError>;
}

/// `KvClient` adapter over a multiplexed Redis connection.
pub struct RedisKv {
    connection: redis::aio::MultiplexedConnection,
}

impl RedisKv {
    /// Connect to the given Redis URL.
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_tokio_connection().await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl KvClient for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut connection = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut connection)
            .await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64, CoreError> {
        let mut connection = self.connection.clone();
        let removed: u64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut connection)
            .await?;
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        let mut connection = self.connection.clone();
        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
        if pong != "PONG" {
            return Err(CoreError::StoreError {
                operation: "ping".to_string(),
                details: format!("unexpected reply '{}'", pong),
            });
        }
        Ok(())
    }

    async fn quit(&self) -> Result<(), CoreError> {
        // The multiplexed connection closes when the last clone drops; there
        // is nothing to send here.
        debug!("Releasing redis connection");
        Ok(())
    }
}
