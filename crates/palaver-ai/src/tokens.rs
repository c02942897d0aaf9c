// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Best-effort input token counting.
//!
//! With the `tiktoken` feature the exact encoder is used; otherwise (or when
//! the encoder fails to load) the `length / 4` heuristic applies. The chosen
//! method is part of the result, never hidden.

use crate::types::{ChatMessage, TokenCount, TokenMethod};

/// Count input tokens across all message contents.
pub fn count_input_tokens(messages: &[ChatMessage]) -> TokenCount {
    let text: String = messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    count_text(&text)
}

/// Count tokens for a single text.
pub fn count_text(text: &str) -> TokenCount {
    if let Some(tokens) = exact_count(text) {
        return TokenCount {
            tokens,
            method: TokenMethod::Exact,
        };
    }
    TokenCount {
        tokens: estimate_count(text),
        method: TokenMethod::Estimate,
    }
}

/// `length / 4` heuristic, rounded up.
fn estimate_count(text: &str) -> u32 {
    (text.chars().count() as u32).div_ceil(4)
}

#[cfg(feature = "tiktoken")]
fn exact_count(text: &str) -> Option<u32> {
    use std::sync::OnceLock;
    use tiktoken_rs::CoreBPE;

    static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();
    let encoder = ENCODER
        .get_or_init(|| match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                tracing::warn!("Exact tokenizer unavailable, estimating: {}", e);
                None
            }
        })
        .as_ref()?;
    Some(encoder.encode_with_special_tokens(text).len() as u32)
}

#[cfg(not(feature = "tiktoken"))]
fn exact_count(_text: &str) -> Option<u32> {
    None
}
