// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Adapter configuration loading from environment variables.

use palaver_core::config::ConfigError;

use crate::types::EmbeddingMode;

/// Palaver AI configuration
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Provider base URL, OpenAI-shaped (`.../chat/completions`,
    /// `.../embeddings` are appended).
    pub base_url: String,
    /// Provider API key.
    pub api_key: Option<String>,
    /// Default chat model.
    pub model: String,
    /// Default per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Default retry budget (additional attempts after the first failure).
    pub retries: u32,
    /// Base backoff delay between provider retries, in milliseconds.
    pub retry_delay_ms: u64,
    /// Embedding provider mode.
    pub embedding_mode: EmbeddingMode,
    /// Default embedding model (provider mode only).
    pub embedding_model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 30_000,
            retries: 2,
            retry_delay_ms: 500,
            embedding_mode: EmbeddingMode::Stub,
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `PALAVER_LLM_BASE_URL`: provider base URL (default: OpenAI)
    /// - `PALAVER_LLM_API_KEY`: provider API key (required for provider calls)
    /// - `PALAVER_LLM_MODEL`: default chat model (default: gpt-4o-mini)
    /// - `PALAVER_LLM_TIMEOUT_MS`: per-request timeout (default: 30000)
    /// - `PALAVER_LLM_RETRIES`: retry budget (default: 2)
    /// - `PALAVER_LLM_RETRY_DELAY_MS`: base backoff delay (default: 500)
    /// - `PALAVER_EMBEDDING_MODE`: `stub` or `provider` (default: stub)
    /// - `PALAVER_EMBEDDING_MODEL`: embedding model (default: text-embedding-3-small)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = std::env::var("PALAVER_LLM_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let api_key = std::env::var("PALAVER_LLM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let model = std::env::var("PALAVER_LLM_MODEL").unwrap_or(defaults.model);

        let timeout_ms: u64 = std::env::var("PALAVER_LLM_TIMEOUT_MS")
            .unwrap_or_else(|_| defaults.timeout_ms.to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PALAVER_LLM_TIMEOUT_MS", "must be a positive integer")
            })?;

        let retries: u32 = std::env::var("PALAVER_LLM_RETRIES")
            .unwrap_or_else(|_| defaults.retries.to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PALAVER_LLM_RETRIES", "must be a non-negative integer")
            })?;

        let retry_delay_ms: u64 = std::env::var("PALAVER_LLM_RETRY_DELAY_MS")
            .unwrap_or_else(|_| defaults.retry_delay_ms.to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PALAVER_LLM_RETRY_DELAY_MS", "must be a non-negative integer")
            })?;

        let embedding_mode = match std::env::var("PALAVER_EMBEDDING_MODE") {
            Ok(raw) => EmbeddingMode::parse(&raw).ok_or(ConfigError::Invalid(
                "PALAVER_EMBEDDING_MODE",
                "must be 'stub' or 'provider'",
            ))?,
            Err(_) => defaults.embedding_mode,
        };

        let embedding_model =
            std::env::var("PALAVER_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model);

        Ok(Self {
            base_url,
            api_key,
            model,
            timeout_ms,
            retries,
            retry_delay_ms,
            embedding_mode,
            embedding_model,
        })
    }
}
