// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Remote KV run store.
//!
//! Each run is stored as one JSON snapshot under `run:{id}`. Every
//! transition is read-current, validate, write-new; there is no
//! compare-and-swap, so concurrent transitions on the same id are
//! last-writer-wins (see DESIGN.md).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::run::Run;
use crate::store::{KvClient, RunStore};

/// Key prefix for run snapshots.
const RUN_KEY_PREFIX: &str = "run:";

fn run_key(run_id: &str) -> String {
    format!("{}{}", RUN_KEY_PREFIX, run_id)
}

/// Run store backed by a remote KV client.
pub struct RedisStore {
    kv: Arc<dyn KvClient>,
}

impl RedisStore {
    /// Create a store over an already health-checked client.
    pub fn new(kv: Arc<dyn KvClient>) -> Self {
        Self { kv }
    }

    async fn read(&self, run_id: &str) -> Result<Option<Run>, CoreError> {
        match self.kv.get(&run_key(run_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn read_required(&self, run_id: &str) -> Result<Run, CoreError> {
        self.read(run_id).await?.ok_or_else(|| CoreError::RunNotFound {
            run_id: run_id.to_string(),
        })
    }

    async fn write(&self, run: &Run) -> Result<(), CoreError> {
        let raw = serde_json::to_string(run)?;
        self.kv.set(&run_key(&run.id), &raw).await
    }
}

#[async_trait]
impl RunStore for RedisStore {
    async fn create(&self, run_id: &str) -> Result<Run, CoreError> {
        if self.read(run_id).await?.is_some() {
            return Err(CoreError::RunAlreadyExists {
                run_id: run_id.to_string(),
            });
        }
        let run = Run::new(run_id);
        self.write(&run).await?;
        Ok(run)
    }

    async fn get(&self, run_id: &str) -> Result<Option<Run>, CoreError> {
        self.read(run_id).await
    }

    async fn start(&self, run_id: &str) -> Result<Run, CoreError> {
        let mut run = self.read_required(run_id).await?;
        run.start()?;
        self.write(&run).await?;
        Ok(run)
    }

    async fn complete(&self, run_id: &str, result: serde_json::Value) -> Result<Run, CoreError> {
        let mut run = self.read_required(run_id).await?;
        run.complete(result)?;
        self.write(&run).await?;
        Ok(run)
    }

    async fn fail(&self, run_id: &str, error: &str) -> Result<Run, CoreError> {
        let mut run = self.read_required(run_id).await?;
        run.fail(error)?;
        self.write(&run).await?;
        Ok(run)
    }

    async fn delete(&self, run_id: &str) -> Result<bool, CoreError> {
        Ok(self.kv.del(&run_key(run_id)).await? > 0)
    }
}
