// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Persistence interfaces and backends for palaver-core.
//!
//! This module defines the run store abstraction and backend implementations.

pub mod kv;
pub mod memory;
pub mod redis;

pub use self::kv::{KvClient, RedisKv};
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::run::Run;

/// Persistence interface for tracked runs.
///
/// Both backends enforce the same transition rules:
/// `create` rejects a duplicate id, `start` requires `pending`,
/// `complete`/`fail` require `running`. `get` on an absent id returns
/// `Ok(None)`, never a synthesized run.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Create a new `pending` run. Fails with `RUN_ALREADY_EXISTS` when the
    /// id was created before.
    async fn create(&self, run_id: &str) -> Result<Run, CoreError>;

    /// Fetch a run snapshot.
    async fn get(&self, run_id: &str) -> Result<Option<Run>, CoreError>;

    /// Transition `pending -> running`.
    async fn start(&self, run_id: &str) -> Result<Run, CoreError>;

    /// Transition `running -> completed` with the result payload.
    async fn complete(&self, run_id: &str, result: serde_json::Value) -> Result<Run, CoreError>;

    /// Transition `running -> failed` with the error message.
    async fn fail(&self, run_id: &str, error: &str) -> Result<Run, CoreError>;

    /// Delete a run. Not part of the lifecycle; explicit cleanup only.
    /// Returns true when a run was actually removed.
    async fn delete(&self, run_id: &str) -> Result<bool, CoreError>;
}
