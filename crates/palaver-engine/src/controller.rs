// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Execution controller driving one chat turn per run.
//!
//! The controller owns a [`StateManager`] and a [`ChatClient`] and walks
//! every turn through the run lifecycle: create the run as pending, mark it
//! running, call the model, then persist the terminal outcome. On any
//! failure after creation the run is marked failed with the error message
//! and the original error is re-raised to the caller.

use palaver_ai::{ChatClient, ChatMessage, ChatOptions, TokenMethod};
use palaver_core::StateManager;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::validators::{Validation, ValidatorRegistry};

/// Outcome of one completed chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Identifier of the run that recorded this turn.
    pub run_id: String,
    /// Model reply text.
    pub reply: String,
    /// Model the call resolved to.
    pub model: String,
    /// Input tokens counted before the call.
    pub tokens_in: u32,
    /// How the input tokens were counted.
    pub token_method: TokenMethod,
    /// Output tokens reported by the provider, when present.
    pub tokens_out: Option<u32>,
    /// Estimated cost of the call in USD.
    pub cost_usd: f64,
}

/// Drives chat turns through the run state machine.
#[derive(Debug, Clone)]
pub struct ExecutionController {
    state: StateManager,
    llm: ChatClient,
    validators: ValidatorRegistry,
}

impl ExecutionController {
    /// Controller with an empty validator registry.
    pub fn new(state: StateManager, llm: ChatClient) -> Self {
        Self::with_validators(state, llm, ValidatorRegistry::new())
    }

    /// Controller sharing an existing validator registry.
    pub fn with_validators(
        state: StateManager,
        llm: ChatClient,
        validators: ValidatorRegistry,
    ) -> Self {
        Self {
            state,
            llm,
            validators,
        }
    }

    /// State manager this controller records runs through.
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Validator registry used by [`validate_tool_payload`].
    ///
    /// [`validate_tool_payload`]: Self::validate_tool_payload
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Validate a tool payload against the registry, returning the parsed
    /// payload. Tools without a registered validator pass through unchanged.
    pub fn validate_tool_payload(&self, tool: &str, payload: &Value) -> Result<Value, EngineError> {
        match self.validators.validate(tool, payload) {
            Validation::Valid(parsed) => Ok(parsed),
            Validation::Invalid(reasons) => Err(EngineError::InvalidPayload {
                tool: tool.to_string(),
                reason: reasons.join("; "),
            }),
        }
    }

    /// Execute one chat turn as a tracked run.
    ///
    /// The run is created before the model call and is guaranteed to end in
    /// a terminal state: completed with the turn's outcome, or failed with
    /// the error message. Validation failures surface before the run starts
    /// executing but still leave a failed run behind, so every accepted turn
    /// has an auditable record.
    pub async fn run_chat(
        &self,
        input: &str,
        system_prompt: Option<&str>,
        options: &ChatOptions,
    ) -> Result<ChatTurn, EngineError> {
        let run_id = Uuid::new_v4().to_string();
        self.run_chat_with_id(&run_id, input, system_prompt, options)
            .await
    }

    /// Execute one chat turn under a caller-chosen run id.
    ///
    /// Fails with [`CoreError::RunAlreadyExists`] when the id is taken.
    ///
    /// [`CoreError::RunAlreadyExists`]: palaver_core::CoreError::RunAlreadyExists
    #[instrument(skip_all, fields(run_id = %run_id, input_len = input.len()))]
    pub async fn run_chat_with_id(
        &self,
        run_id: &str,
        input: &str,
        system_prompt: Option<&str>,
        options: &ChatOptions,
    ) -> Result<ChatTurn, EngineError> {
        self.state.create(run_id).await?;
        debug!(run_id = %run_id, "run created");

        match self.drive(run_id, input, system_prompt, options).await {
            Ok(turn) => {
                info!(
                    run_id = %run_id,
                    model = %turn.model,
                    tokens_in = turn.tokens_in,
                    cost_usd = turn.cost_usd,
                    "chat turn completed"
                );
                Ok(turn)
            }
            Err(err) => {
                if let Err(fail_err) = self.state.fail(run_id, &err.to_string()).await {
                    warn!(
                        run_id = %run_id,
                        error = %fail_err,
                        "could not record run failure"
                    );
                }
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        run_id: &str,
        input: &str,
        system_prompt: Option<&str>,
        options: &ChatOptions,
    ) -> Result<ChatTurn, EngineError> {
        self.state.start(run_id).await?;

        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = system_prompt {
            messages.push(ChatMessage::system(prompt));
        }
        messages.push(ChatMessage::user(input));

        let reply = self.llm.chat(&messages, options).await?;

        let result = json!({
            "input": input,
            "reply": reply.reply,
            "model": reply.model,
            "tokensIn": reply.tokens_in,
            "tokensOut": reply.tokens_out,
            "tokenMethod": reply.token_method.as_str(),
            "costUsd": reply.cost_usd,
        });
        self.state.complete(run_id, result).await?;

        Ok(ChatTurn {
            run_id: run_id.to_string(),
            reply: reply.reply,
            model: reply.model,
            tokens_in: reply.tokens_in,
            token_method: reply.token_method,
            tokens_out: reply.tokens_out,
            cost_usd: reply.cost_usd,
        })
    }
}
