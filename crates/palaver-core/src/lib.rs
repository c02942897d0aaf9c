// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Palaver Core - Run Lifecycle State Machine
//!
//! This crate tracks the lifecycle of asynchronous runs (a chat turn or a
//! background task) through a fixed state machine, persisting each run to a
//! pluggable backend. It owns backend selection at process start, including
//! health-check retries against the remote store and graceful degradation to
//! the in-memory store.
//!
//! # Run Status State Machine
//!
//! ```text
//!      ┌─────────┐
//!      │ PENDING │
//!      └────┬────┘
//!           │ start
//!           ▼
//!      ┌─────────┐
//!      │ RUNNING │──────────┬──────────┐
//!      └─────────┘          │          │
//!                      complete      fail
//!                           │          │
//!                           ▼          ▼
//!                    ┌───────────┐ ┌────────┐
//!                    │ COMPLETED │ │ FAILED │
//!                    └───────────┘ └────────┘
//! ```
//!
//! No other transitions are valid. A duplicate `create`, a `start` on a
//! non-pending run, or a terminal transition on a non-running run all fail
//! with a state conflict rather than being silently merged.
//!
//! # Backends
//!
//! | Backend | Storage | Use |
//! |---------|---------|-----|
//! | [`store::MemoryStore`] | process-local map | default, and automatic fallback |
//! | [`store::RedisStore`] | remote KV, one JSON record per run | shared/persistent deployments |
//!
//! The remote backend talks to the store through the minimal
//! [`store::KvClient`] capability (`get`/`set`/`del`/`ping`/`quit`), so tests
//! can substitute an in-process client.
//!
//! # Bootstrap
//!
//! [`bootstrap::StateContext`] is an explicit process-lifetime context: it is
//! constructed once at startup and handed to request handlers by reference.
//! `init` selects and health-checks the backend, `get` returns the cached
//! [`manager::StateManager`], and `close` releases the remote client so a
//! later `init` can rebuild (test isolation, graceful shutdown).

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod manager;
pub mod retry;
pub mod run;
pub mod store;

pub use bootstrap::StateContext;
pub use config::Config;
pub use error::{CoreError, Result};
pub use manager::{BackendKind, StateManager};
pub use retry::RetryPolicy;
pub use run::{Run, RunStatus};
