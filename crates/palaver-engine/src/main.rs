// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Palaver binary: bootstraps the state layer, runs one chat turn from the
//! command line and prints the recorded run.

use anyhow::Context;
use palaver_ai::{AiConfig, ChatClient, ChatOptions};
use palaver_core::{Config, StateContext};
use palaver_engine::ExecutionController;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello.".to_string());

    let config = Config::from_env().context("loading state configuration")?;
    let ai_config = AiConfig::from_env().context("loading adapter configuration")?;

    let context = StateContext::new();
    let state = context
        .init(&config)
        .await
        .context("initializing state backend")?;
    info!(backend = state.backend().as_str(), "state layer ready");

    let controller = ExecutionController::new(state, ChatClient::new(ai_config));
    let turn = controller
        .run_chat(&input, None, &ChatOptions::default())
        .await
        .context("running chat turn")?;

    println!("run {} [{}]", turn.run_id, turn.model);
    println!("{}", turn.reply);
    println!(
        "tokens in: {} ({}), out: {}, cost: ${:.6}",
        turn.tokens_in,
        turn.token_method.as_str(),
        turn.tokens_out
            .map_or_else(|| "n/a".to_string(), |t| t.to_string()),
        turn.cost_usd
    );

    context.close().await;
    Ok(())
}
