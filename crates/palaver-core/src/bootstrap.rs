// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backend selection and the process-lifetime state context.
//!
//! [`StateContext`] produces exactly one live [`StateManager`] for the
//! process: `init` selects and health-checks the backend, `get` returns the
//! cached manager, `close` releases the remote client and clears the slot so
//! a later `init` can rebuild it.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::CoreError;
use crate::manager::{BackendKind, StateManager};
use crate::retry::{RetryPolicy, retry};
use crate::store::{KvClient, RedisKv, RedisStore};

/// Jitter bound applied between health-check attempts.
const HEALTH_CHECK_JITTER_MS: u64 = 100;

/// Explicit process-lifetime context owning the state manager singleton.
///
/// Constructed once at process start and passed by reference into request
/// handlers; there is no module-level global.
#[derive(Debug, Default)]
pub struct StateContext {
    slot: Mutex<Option<StateManager>>,
}

impl StateContext {
    /// Create an uninitialized context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select, health-check and cache the backend.
    ///
    /// 1. No remote URL configured: in-memory backend immediately.
    /// 2. Otherwise connect and `ping` up to `config.store_attempts` times
    ///    with exponential backoff plus jitter between failures.
    /// 3. After exhausting attempts: with `require_remote` the last error
    ///    propagates; otherwise the failed client is released and the
    ///    in-memory backend is used.
    ///
    /// A second `init` while initialized returns the cached manager.
    pub async fn init(&self, config: &Config) -> Result<StateManager, CoreError> {
        self.init_inner(config, None).await
    }

    /// Like [`StateContext::init`], but health-check a pre-built client
    /// instead of connecting from `config.redis_url`. Test seam and
    /// embedding hook for non-Redis adapters.
    pub async fn init_with_client(
        &self,
        config: &Config,
        client: Arc<dyn KvClient>,
    ) -> Result<StateManager, CoreError> {
        self.init_inner(config, Some(client)).await
    }

    async fn init_inner(
        &self,
        config: &Config,
        client: Option<Arc<dyn KvClient>>,
    ) -> Result<StateManager, CoreError> {
        let mut slot = self.slot.lock().await;
        if let Some(manager) = slot.as_ref() {
            return Ok(manager.clone());
        }

        let manager = build_manager(config, client).await?;
        info!(backend = manager.backend().as_str(), "State manager ready");
        *slot = Some(manager.clone());
        Ok(manager)
    }

    /// The cached manager. Fails with `NOT_INITIALIZED` before `init`.
    pub async fn get(&self) -> Result<StateManager, CoreError> {
        self.slot
            .lock()
            .await
            .as_ref()
            .cloned()
            .ok_or(CoreError::NotInitialized)
    }

    /// Release the remote client (if any) and clear the slot.
    pub async fn close(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(manager) = slot.take() {
            manager.close().await;
        }
    }
}

#[derive(Clone)]
enum RemoteSource {
    /// Pre-built client (tests, non-Redis adapters).
    Client(Arc<dyn KvClient>),
    /// Connect from URL on each attempt; a failed connection is dropped.
    Url(String),
}

async fn build_manager(
    config: &Config,
    client: Option<Arc<dyn KvClient>>,
) -> Result<StateManager, CoreError> {
    let source = match (client, config.redis_url.clone()) {
        (Some(kv), _) => RemoteSource::Client(kv),
        (None, Some(url)) => RemoteSource::Url(url),
        (None, None) => {
            info!("No remote store configured, using in-memory backend");
            return Ok(StateManager::in_memory());
        }
    };

    let attempts = config.store_attempts.max(1);
    let policy = RetryPolicy::new(
        attempts - 1,
        config.store_retry_delay_ms,
        HEALTH_CHECK_JITTER_MS,
    );

    let check_source = source.clone();
    let health_checked = retry(
        &policy,
        "remote store health check",
        |_| true,
        move |_attempt| {
            let source = check_source.clone();
            async move {
                let kv: Arc<dyn KvClient> = match source {
                    RemoteSource::Client(kv) => kv,
                    RemoteSource::Url(url) => Arc::new(RedisKv::connect(&url).await?),
                };
                kv.ping().await?;
                Ok::<_, CoreError>(kv)
            }
        },
    )
    .await;

    match health_checked {
        Ok(kv) => {
            info!("Remote store healthy, using remote backend");
            Ok(StateManager::new(
                Arc::new(RedisStore::new(kv.clone())),
                Some(kv),
                BackendKind::Remote,
            ))
        }
        Err(e) => {
            if let RemoteSource::Client(kv) = source {
                if let Err(quit_err) = kv.quit().await {
                    warn!("Failed to release remote store client: {}", quit_err);
                }
            }
            if config.require_remote {
                warn!("Remote store unreachable and required: {}", e);
                return Err(e);
            }
            warn!(
                "Remote store unreachable after {} attempt(s), falling back to in-memory: {}",
                attempts, e
            );
            Ok(StateManager::in_memory())
        }
    }
}
