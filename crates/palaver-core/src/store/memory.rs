// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory run store.
//!
//! Process-local map, lost on restart. Default backend and the automatic
//! fallback when no remote store is configured or reachable.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::run::Run;
use crate::store::RunStore;

/// Run store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    runs: RwLock<HashMap<String, Run>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for MemoryStore {
    async fn create(&self, run_id: &str) -> Result<Run, CoreError> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(run_id) {
            return Err(CoreError::RunAlreadyExists {
                run_id: run_id.to_string(),
            });
        }
        let run = Run::new(run_id);
        runs.insert(run_id.to_string(), run.clone());
        Ok(run)
    }

    async fn get(&self, run_id: &str) -> Result<Option<Run>, CoreError> {
        Ok(self.runs.read().await.get(run_id).cloned())
    }

    async fn start(&self, run_id: &str) -> Result<Run, CoreError> {
        let mut runs = self.runs.write().await;
        let run = runs.get_mut(run_id).ok_or_else(|| CoreError::RunNotFound {
            run_id: run_id.to_string(),
        })?;
        run.start()?;
        Ok(run.clone())
    }

    async fn complete(&self, run_id: &str, result: serde_json::Value) -> Result<Run, CoreError> {
        let mut runs = self.runs.write().await;
        let run = runs.get_mut(run_id).ok_or_else(|| CoreError::RunNotFound {
            run_id: run_id.to_string(),
        })?;
        run.complete(result)?;
        Ok(run.clone())
    }

    async fn fail(&self, run_id: &str, error: &str) -> Result<Run, CoreError> {
        let mut runs = self.runs.write().await;
        let run = runs.get_mut(run_id).ok_or_else(|| CoreError::RunNotFound {
            run_id: run_id.to_string(),
        })?;
        run.fail(error)?;
        Ok(run.clone())
    }

    async fn delete(&self, run_id: &str) -> Result<bool, CoreError> {
        Ok(self.runs.write().await.remove(run_id).is_some())
    }
}
