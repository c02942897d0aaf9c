// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Adapter-specific error types.

use thiserror::Error;

/// Errors surfaced by the LLM invocation adapter.
#[derive(Debug, Error)]
pub enum AiError {
    /// Malformed caller input. Raised before any network activity and never
    /// retried.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The input that failed validation.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Provider call failed after exhausting the retry budget. Wraps the
    /// last underlying failure.
    #[error("provider call failed after {attempts} attempt(s): {message}")]
    Provider {
        /// Total attempts made (initial call plus retries).
        attempts: u32,
        /// Last HTTP status, when the failure was a non-2xx response.
        status: Option<u16>,
        /// Last underlying failure.
        message: String,
    },

    /// Missing or invalid adapter configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<palaver_core::config::ConfigError> for AiError {
    fn from(err: palaver_core::config::ConfigError) -> Self {
        AiError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AiError::Validation {
            field: "messages",
            message: "must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "validation error for 'messages': must not be empty"
        );

        let err = AiError::Provider {
            attempts: 3,
            status: Some(502),
            message: "bad gateway".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "provider call failed after 3 attempt(s): bad gateway"
        );
    }
}
