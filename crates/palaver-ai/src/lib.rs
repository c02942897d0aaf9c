// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Palaver AI - LLM Invocation Adapter
//!
//! Wraps outbound calls to a chat/embedding provider with validation,
//! per-call timeouts, retries with backoff, token accounting and cost
//! estimation.
//!
//! # Call discipline
//!
//! | Stage | Behavior |
//! |-------|----------|
//! | Validation | synchronous, before any network activity, never retried |
//! | Provider call | per-request timeout; non-2xx, network and timeout failures retried up to the budget |
//! | Accounting | input tokens counted best-effort (`exact`/`estimate` surfaced), cost from the pricing table |
//! | Metrics | fire-and-forget events, no delivery guarantee |
//!
//! Embeddings support a deterministic stub mode for reproducible tests; in
//! provider mode the call is a single timeout-bounded attempt with no retry
//! loop.

pub mod chat;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod metrics;
pub mod pricing;
pub mod tokens;
pub mod types;

pub use chat::ChatClient;
pub use config::AiConfig;
pub use embeddings::{EMBEDDING_DIM, stub_embedding};
pub use error::AiError;
pub use metrics::{MetricEvent, MetricsSink};
pub use tokens::count_input_tokens;
pub use types::{
    ChatMessage, ChatOptions, ChatReply, EmbedOptions, EmbeddingMode, Role, TokenCount, TokenMethod,
};
