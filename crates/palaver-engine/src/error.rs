// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Engine error type, folding the state and adapter layers together.

use palaver_ai::AiError;
use palaver_core::CoreError;
use thiserror::Error;

/// Errors surfaced to engine callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Run-state or persistence failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// LLM adapter failure.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// Tool payload rejected by a registered validator.
    #[error("invalid payload for tool '{tool}': {reason}")]
    InvalidPayload {
        /// Tool whose validator rejected the payload.
        tool: String,
        /// Validator's rejection reason.
        reason: String,
    },
}
