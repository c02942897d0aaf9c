// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Palaver Engine - Execution Controller
//!
//! Ties the run lifecycle to the LLM adapter: every chat turn is recorded
//! as a [`Run`](palaver_core::Run) that walks pending -> running ->
//! completed/failed, with the outcome (reply, token accounting, cost)
//! persisted on the terminal transition. Tool payloads pass through the
//! [`ValidatorRegistry`] before any run is created.

pub mod controller;
pub mod error;
pub mod validators;

pub use controller::{ChatTurn, ExecutionController};
pub use error::EngineError;
pub use validators::{Validation, ValidatorRegistry};
