// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Deterministic stub embeddings.
//!
//! A SHA-256 digest of the input seeds a counter-hash expansion, so the
//! vector for a given input is identical across calls and processes; no
//! model is involved. Used for reproducible tests and offline development.

use sha2::{Digest, Sha256};

/// Dimension of every produced embedding.
pub const EMBEDDING_DIM: usize = 1536;

/// Derive a fixed-dimension pseudo-embedding from the input text.
///
/// Every coordinate is finite and lies in `[-1, 1]`.
pub fn stub_embedding(input: &str) -> Vec<f32> {
    let seed = Sha256::digest(input.as_bytes());
    let mut out = Vec::with_capacity(EMBEDDING_DIM);
    let mut counter: u32 = 0;

    while out.len() < EMBEDDING_DIM {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(counter.to_le_bytes());
        let block = hasher.finalize();

        for chunk in block.chunks_exact(4) {
            if out.len() == EMBEDDING_DIM {
                break;
            }
            let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            // map the full u32 range onto [-1, 1]
            out.push((raw as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32);
        }
        counter += 1;
    }

    out
}
