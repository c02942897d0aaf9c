// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run record and status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status of a tracked run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Run is created but not yet started.
    Pending,
    /// Run is currently executing.
    Running,
    /// Run finished successfully.
    Completed,
    /// Run finished with an error.
    Failed,
}

impl RunStatus {
    /// Stable lowercase name, matching the stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// True for `completed` and `failed`; no transition leaves these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked run: one chat turn or background task.
///
/// Serializes to the flat snapshot stored by the remote backend:
/// `{id, status, result?, error?, createdAt, updatedAt}`. `result` and
/// `error` are mutually exclusive and only set on the respective terminal
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Caller-supplied unique identifier.
    pub id: String,
    /// Current status.
    pub status: RunStatus,
    /// Opaque payload, present only when status is `completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error message, present only when status is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// When the run was last written.
    pub updated_at: DateTime<Utc>,
}

impl Run {
    /// Create a fresh `pending` run.
    pub fn new(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            status: RunStatus::Pending,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Verify the run is in `expected` status before a transition.
    ///
    /// Both backends call this so they enforce identical transition rules.
    pub fn ensure_status(&self, expected: RunStatus) -> Result<(), CoreError> {
        if self.status != expected {
            return Err(CoreError::InvalidRunState {
                run_id: self.id.clone(),
                expected: expected.as_str().to_string(),
                actual: self.status.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Transition `pending -> running`.
    pub fn start(&mut self) -> Result<(), CoreError> {
        self.ensure_status(RunStatus::Pending)?;
        self.status = RunStatus::Running;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition `running -> completed` with the result payload.
    pub fn complete(&mut self, result: serde_json::Value) -> Result<(), CoreError> {
        self.ensure_status(RunStatus::Running)?;
        self.status = RunStatus::Completed;
        self.result = Some(result);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Transition `running -> failed` with the error message.
    pub fn fail(&mut self, error: &str) -> Result<(), CoreError> {
        self.ensure_status(RunStatus::Running)?;
        self.status = RunStatus::Failed;
        self.error = Some(error.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }
}
