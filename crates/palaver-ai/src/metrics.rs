// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fire-and-forget metrics sink.
//!
//! Events go over a broadcast channel with no delivery guarantee and no
//! backpressure: consumers subscribe, or events are dropped silently.

use tokio::sync::broadcast;

/// One emitted metric sample.
#[derive(Debug, Clone)]
pub struct MetricEvent {
    /// Metric name, e.g. `llm.tokens.input`.
    pub name: String,
    /// Sample value.
    pub value: f64,
    /// Label pairs, e.g. `("model", "gpt-4o")`.
    pub labels: Vec<(String, String)>,
}

/// Broadcast-backed sink. Cheap to clone; clones share the channel.
#[derive(Debug, Clone)]
pub struct MetricsSink {
    tx: broadcast::Sender<MetricEvent>,
}

impl MetricsSink {
    /// Create a sink with a bounded in-flight buffer. Slow consumers lag and
    /// lose events rather than blocking emitters.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    /// Attach a consumer.
    pub fn subscribe(&self) -> broadcast::Receiver<MetricEvent> {
        self.tx.subscribe()
    }

    /// Emit one sample. Never fails; with no subscribers the event is
    /// dropped.
    pub fn emit(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let event = MetricEvent {
            name: name.to_string(),
            value,
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        let _ = self.tx.send(event);
    }
}

impl Default for MetricsSink {
    fn default() -> Self {
        Self::new()
    }
}
