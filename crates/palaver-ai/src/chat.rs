// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! LLM invocation adapter.
//!
//! [`ChatClient`] owns the HTTP client, the resolved configuration and the
//! metrics sink, and exposes the two provider operations: [`ChatClient::chat`]
//! and [`ChatClient::embed`]. Input validation always happens before any
//! network activity, so a malformed call never consumes retry budget.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use palaver_core::retry::{RetryPolicy, retry};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::config::AiConfig;
use crate::embeddings::stub_embedding;
use crate::error::AiError;
use crate::metrics::MetricsSink;
use crate::pricing::estimate_cost;
use crate::tokens::{count_input_tokens, count_text};
use crate::types::{ChatMessage, ChatOptions, ChatReply, EmbedOptions, EmbeddingMode};

/// One failed provider attempt. Drives the retry decision internally and is
/// folded into [`AiError::Provider`] once the budget is spent.
struct ProviderFailure {
    status: Option<u16>,
    message: String,
    retryable: bool,
}

impl ProviderFailure {
    fn transport(err: &reqwest::Error) -> Self {
        Self {
            status: None,
            message: if err.is_timeout() {
                "request timed out".to_string()
            } else {
                format!("transport error: {err}")
            },
            retryable: true,
        }
    }

    fn status(status: u16, body: &str) -> Self {
        let snippet: String = body.chars().take(200).collect();
        Self {
            status: Some(status),
            message: format!("provider returned HTTP {status}: {snippet}"),
            // 4xx responses are caller or auth mistakes and will not heal on
            // retry; 429 and 5xx can.
            retryable: status == 429 || status >= 500,
        }
    }

    fn malformed(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            message: detail.into(),
            retryable: false,
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    completion_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRecord>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRecord {
    embedding: Vec<f32>,
}

/// Client for chat-completion and embedding calls against an OpenAI-shaped
/// provider API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: AiConfig,
    metrics: MetricsSink,
}

impl ChatClient {
    /// Create a client with a fresh metrics sink.
    pub fn new(config: AiConfig) -> Self {
        Self::with_metrics(config, MetricsSink::new())
    }

    /// Create a client that emits into an existing sink.
    pub fn with_metrics(config: AiConfig, metrics: MetricsSink) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            metrics,
        }
    }

    /// Metrics sink this client emits into.
    pub fn metrics(&self) -> &MetricsSink {
        &self.metrics
    }

    fn api_key(&self) -> Result<&str, AiError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::Config("PALAVER_LLM_API_KEY is not set".to_string()))
    }

    /// Send a chat-completion call.
    ///
    /// Validates the prompt, counts input tokens up front, then calls the
    /// provider with per-request timeout and bounded retries. On success the
    /// reply carries the token accounting and the cost estimate for the call.
    #[instrument(skip_all, fields(messages = messages.len()))]
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatReply, AiError> {
        if messages.is_empty() {
            return Err(AiError::Validation {
                field: "messages",
                message: "must not be empty".to_string(),
            });
        }
        for (index, message) in messages.iter().enumerate() {
            if message.content.trim().is_empty() {
                return Err(AiError::Validation {
                    field: "messages",
                    message: format!("message {index} has empty content"),
                });
            }
        }

        let model = options.model.as_deref().unwrap_or(&self.config.model);
        let timeout_ms = options.timeout_ms.unwrap_or(self.config.timeout_ms);
        let retries = options.retries.unwrap_or(self.config.retries);
        let api_key = self.api_key()?.to_string();

        let input_count = count_input_tokens(messages);
        debug!(
            model,
            tokens_in = input_count.tokens,
            token_method = input_count.method.as_str(),
            "dispatching chat completion"
        );

        let url = format!("{}/chat/completions", self.config.base_url);
        let body = json!({
            "model": model,
            "messages": messages,
        });
        let policy = RetryPolicy::new(
            retries,
            self.config.retry_delay_ms,
            self.config.retry_delay_ms / 2,
        );

        let attempts = AtomicU32::new(0);
        let outcome = retry(
            &policy,
            "chat completion",
            |failure: &ProviderFailure| failure.retryable,
            |_attempt| {
                attempts.fetch_add(1, Ordering::SeqCst);
                self.chat_attempt(&url, &api_key, &body, timeout_ms)
            },
        )
        .await;

        let attempts = attempts.load(Ordering::SeqCst);
        let response = match outcome {
            Ok(response) => response,
            Err(failure) => {
                self.metrics
                    .emit("llm.chat.errors", 1.0, &[("model", model)]);
                return Err(AiError::Provider {
                    attempts,
                    status: failure.status,
                    message: failure.message,
                });
            }
        };

        let reply = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AiError::Provider {
                attempts,
                status: None,
                message: "provider response carried no message content".to_string(),
            })?;

        let tokens_out = response.usage.and_then(|usage| usage.completion_tokens);
        // Cost needs an output count even when the provider omits usage.
        let billed_out = tokens_out.unwrap_or_else(|| count_text(&reply).tokens);
        let cost_usd = estimate_cost(model, input_count.tokens, billed_out);

        self.metrics.emit(
            "llm.chat.tokens_in",
            f64::from(input_count.tokens),
            &[("model", model)],
        );
        self.metrics.emit(
            "llm.chat.tokens_out",
            f64::from(billed_out),
            &[("model", model)],
        );
        self.metrics
            .emit("llm.chat.cost_usd", cost_usd, &[("model", model)]);
        self.metrics
            .emit("llm.chat.attempts", f64::from(attempts), &[("model", model)]);

        Ok(ChatReply {
            reply,
            model: model.to_string(),
            tokens_in: input_count.tokens,
            token_method: input_count.method,
            tokens_out,
            cost_usd,
        })
    }

    async fn chat_attempt(
        &self,
        url: &str,
        api_key: &str,
        body: &serde_json::Value,
        timeout_ms: u64,
    ) -> Result<ChatCompletionResponse, ProviderFailure> {
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .timeout(Duration::from_millis(timeout_ms))
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderFailure::transport(&err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderFailure::status(status.as_u16(), &body));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|err| ProviderFailure::malformed(format!("unparseable response: {err}")))
    }

    /// Produce an embedding vector for `input`.
    ///
    /// In stub mode the vector is derived locally and deterministically with
    /// no network activity. In provider mode a single request is made with no
    /// retries; embedding callers are expected to handle their own backoff.
    #[instrument(skip_all, fields(chars = input.len()))]
    pub async fn embed(
        &self,
        input: &str,
        options: &EmbedOptions,
    ) -> Result<Vec<f32>, AiError> {
        if input.trim().is_empty() {
            return Err(AiError::Validation {
                field: "input",
                message: "must not be empty".to_string(),
            });
        }

        match self.config.embedding_mode {
            EmbeddingMode::Stub => {
                debug!("serving stub embedding");
                Ok(stub_embedding(input))
            }
            EmbeddingMode::Provider => self.embed_remote(input, options).await,
        }
    }

    async fn embed_remote(
        &self,
        input: &str,
        options: &EmbedOptions,
    ) -> Result<Vec<f32>, AiError> {
        let model = options
            .model
            .as_deref()
            .unwrap_or(&self.config.embedding_model);
        let timeout_ms = options.timeout_ms.unwrap_or(self.config.timeout_ms);
        let api_key = self.api_key()?;

        let url = format!("{}/embeddings", self.config.base_url);
        let body = json!({
            "model": model,
            "input": input,
        });

        let provider_err = |status: Option<u16>, message: String| AiError::Provider {
            attempts: 1,
            status,
            message,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(Duration::from_millis(timeout_ms))
            .json(&body)
            .send()
            .await
            .map_err(|err| provider_err(None, format!("transport error: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            warn!(status = status.as_u16(), "embedding request rejected");
            return Err(provider_err(
                Some(status.as_u16()),
                format!("provider returned HTTP {status}: {snippet}"),
            ));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| provider_err(None, format!("unparseable response: {err}")))?;

        let record = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| provider_err(None, "provider returned no embedding".to_string()))?;

        Ok(record.embedding)
    }
}
