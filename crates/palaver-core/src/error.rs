// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for palaver-core.
//!
//! Provides a unified error type with stable machine-readable codes.

use std::fmt;

/// Result type using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur while tracking a run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CoreError {
    /// Run was not found in the store.
    RunNotFound {
        /// The run ID that was not found.
        run_id: String,
    },

    /// Run already exists (duplicate create).
    RunAlreadyExists {
        /// The run ID that already exists.
        run_id: String,
    },

    /// Run is in an invalid state for the requested transition.
    InvalidRunState {
        /// The run ID.
        run_id: String,
        /// The expected status.
        expected: String,
        /// The actual status.
        actual: String,
    },

    /// Store operation failed (connection, serialization, malformed record).
    StoreError {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },

    /// The state context has not been initialized yet.
    NotInitialized,
}

impl CoreError {
    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RunNotFound { .. } => "RUN_NOT_FOUND",
            Self::RunAlreadyExists { .. } => "RUN_ALREADY_EXISTS",
            Self::InvalidRunState { .. } => "INVALID_RUN_STATE",
            Self::StoreError { .. } => "STORE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
        }
    }

    /// True for state conflicts: duplicate creates and invalid transitions.
    ///
    /// These are caller/programming errors and are never retried.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::RunAlreadyExists { .. } | Self::InvalidRunState { .. }
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunNotFound { run_id } => {
                write!(f, "Run '{}' not found", run_id)
            }
            Self::RunAlreadyExists { run_id } => {
                write!(f, "Run '{}' already exists", run_id)
            }
            Self::InvalidRunState {
                run_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Run '{}' is in invalid state: expected '{}', got '{}'",
                    run_id, expected, actual
                )
            }
            Self::StoreError { operation, details } => {
                write!(f, "Store error during '{}': {}", operation, details)
            }
            Self::NotInitialized => {
                write!(f, "State context is not initialized")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<redis::RedisError> for CoreError {
    fn from(err: redis::RedisError) -> Self {
        CoreError::StoreError {
            operation: "redis".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::StoreError {
            operation: "json".to_string(),
            details: err.to_string(),
        }
    }
}
