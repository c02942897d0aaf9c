// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-tool payload validators.
//!
//! A validator is a plain function over the tool's JSON payload that either
//! accepts it, returning the parsed (possibly normalized) payload, or
//! rejects it with one or more reasons. Tools without a registered
//! validator are accepted with the payload passed through unchanged;
//! validation tightens as validators are added, it never blocks unknown
//! tools.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::debug;

/// Outcome of validating one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Payload accepted; carries the parsed payload, which a validator may
    /// have normalized.
    Valid(Value),
    /// Payload rejected, with the reasons.
    Invalid(Vec<String>),
}

impl Validation {
    /// Shorthand for a single-reason rejection.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(vec![reason.into()])
    }

    /// True when the payload was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

type ValidatorFn = Arc<dyn Fn(&Value) -> Validation + Send + Sync>;

/// Registry mapping tool names to payload validators.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: Arc<RwLock<HashMap<String, ValidatorFn>>>,
}

impl ValidatorRegistry {
    /// Empty registry; every tool validates permissively.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator for `tool`, replacing any previous one.
    pub fn register<F>(&self, tool: impl Into<String>, validator: F)
    where
        F: Fn(&Value) -> Validation + Send + Sync + 'static,
    {
        let tool = tool.into();
        debug!(tool = %tool, "registering payload validator");
        let mut validators = self.validators.write().unwrap_or_else(|e| e.into_inner());
        validators.insert(tool, Arc::new(validator));
    }

    /// Validate `payload` for `tool`. Tools with no registered validator
    /// are accepted with the payload returned unchanged.
    pub fn validate(&self, tool: &str, payload: &Value) -> Validation {
        let validator = {
            let validators = self.validators.read().unwrap_or_else(|e| e.into_inner());
            validators.get(tool).cloned()
        };
        match validator {
            Some(validator) => validator(payload),
            None => Validation::Valid(payload.clone()),
        }
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// True when no validators are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.len())
            .finish()
    }
}
