// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request/response types for the invocation adapter.

use serde::{Deserialize, Serialize};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt
    System,
    /// End-user input
    User,
    /// Model output
    Assistant,
}

/// One message of a composed prompt, in the provider wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role.
    pub role: Role,
    /// Textual content. Must be non-empty for every message of a call.
    pub content: String,
}

impl ChatMessage {
    /// System-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Assistant-role message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call chat overrides; unset fields fall back to [`AiConfig`] defaults.
///
/// [`AiConfig`]: crate::config::AiConfig
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Model name override.
    pub model: Option<String>,
    /// Per-request timeout override, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Retry budget override (additional attempts after the first failure).
    pub retries: Option<u32>,
}

/// Per-call embedding overrides.
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    /// Embedding model override (provider mode only).
    pub model: Option<String>,
    /// Per-request timeout override, in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// How an input token count was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMethod {
    /// Counted with the exact encoder.
    Exact,
    /// `length / 4` heuristic; the encoder was unavailable.
    Estimate,
}

impl TokenMethod {
    /// Stable lowercase name for logs and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Estimate => "estimate",
        }
    }
}

/// Token count plus the method that produced it. The method is always
/// surfaced; a fallback is never silently swapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCount {
    /// Number of tokens.
    pub tokens: u32,
    /// How the count was produced.
    pub method: TokenMethod,
}

/// Successful chat call result.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Extracted reply text.
    pub reply: String,
    /// Model the call resolved to.
    pub model: String,
    /// Input tokens, counted before the call.
    pub tokens_in: u32,
    /// How `tokens_in` was counted.
    pub token_method: TokenMethod,
    /// Output tokens as reported by the provider, when present.
    pub tokens_out: Option<u32>,
    /// Estimated cost in USD for this call.
    pub cost_usd: f64,
}

/// Embedding provider mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingMode {
    /// Deterministic hash-derived vectors, no network. Default.
    #[default]
    Stub,
    /// Real embeddings endpoint.
    Provider,
}

impl EmbeddingMode {
    /// Parse the configuration value (`stub` / `provider`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "stub" => Some(Self::Stub),
            "provider" => Some(Self::Provider),
            _ => None,
        }
    }
}
