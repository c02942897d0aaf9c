// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! State manager: the run lifecycle API over a selected backend.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::error::CoreError;
use crate::run::Run;
use crate::store::{KvClient, MemoryStore, RunStore};

/// Which backend a manager was built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local map.
    Memory,
    /// Remote KV store.
    Remote,
}

impl BackendKind {
    /// Stable lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Remote => "remote",
        }
    }
}

/// Run lifecycle manager.
///
/// Thin wrapper over the selected [`RunStore`] that adds tracing and holds
/// the remote client handle (when present) so [`StateManager::close`] can
/// release it. Cheap to clone; clones share the backend.
///
/// [`RunStore`]: crate::store::RunStore
#[derive(Clone)]
pub struct StateManager {
    store: Arc<dyn RunStore>,
    remote: Option<Arc<dyn KvClient>>,
    backend: BackendKind,
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("backend", &self.backend)
            .finish()
    }
}

impl StateManager {
    /// Build a manager over an arbitrary store.
    pub fn new(
        store: Arc<dyn RunStore>,
        remote: Option<Arc<dyn KvClient>>,
        backend: BackendKind,
    ) -> Self {
        Self {
            store,
            remote,
            backend,
        }
    }

    /// Build an in-memory manager. Used by the bootstrap fallback and tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), None, BackendKind::Memory)
    }

    /// The backend this manager was built on.
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Create a new `pending` run.
    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn create(&self, run_id: &str) -> Result<Run, CoreError> {
        debug!("Creating run");
        self.store.create(run_id).await
    }

    /// Fetch a run snapshot; absent ids return `Ok(None)`.
    pub async fn get(&self, run_id: &str) -> Result<Option<Run>, CoreError> {
        self.store.get(run_id).await
    }

    /// Transition `pending -> running`.
    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn start(&self, run_id: &str) -> Result<Run, CoreError> {
        debug!("Starting run");
        self.store.start(run_id).await
    }

    /// Transition `running -> completed` with the result payload.
    #[instrument(skip(self, result), fields(run_id = %run_id))]
    pub async fn complete(&self, run_id: &str, result: serde_json::Value) -> Result<Run, CoreError> {
        debug!("Completing run");
        self.store.complete(run_id, result).await
    }

    /// Transition `running -> failed` with the error message.
    #[instrument(skip(self, error), fields(run_id = %run_id))]
    pub async fn fail(&self, run_id: &str, error: &str) -> Result<Run, CoreError> {
        debug!(error, "Failing run");
        self.store.fail(run_id, error).await
    }

    /// Delete a run. Explicit cleanup only, never part of the lifecycle.
    pub async fn delete(&self, run_id: &str) -> Result<bool, CoreError> {
        self.store.delete(run_id).await
    }

    /// Release the underlying remote client, if any.
    pub async fn close(&self) {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.quit().await {
                warn!("Failed to release remote store client: {}", e);
            } else {
                info!("Remote store client released");
            }
        }
    }
}
