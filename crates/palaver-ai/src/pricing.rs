// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-model pricing table for cost estimation.

/// USD per 1K tokens, input and output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// USD per 1K input tokens.
    pub input_per_1k: f64,
    /// USD per 1K output tokens.
    pub output_per_1k: f64,
}

/// Known model prefixes, most specific first. Dated model variants
/// (`gpt-4o-2024-08-06`) match their base entry by prefix.
const PRICING: &[(&str, ModelPricing)] = &[
    (
        "gpt-4o-mini",
        ModelPricing {
            input_per_1k: 0.000_15,
            output_per_1k: 0.000_6,
        },
    ),
    (
        "gpt-4o",
        ModelPricing {
            input_per_1k: 0.002_5,
            output_per_1k: 0.01,
        },
    ),
    (
        "gpt-4.1-mini",
        ModelPricing {
            input_per_1k: 0.000_4,
            output_per_1k: 0.001_6,
        },
    ),
    (
        "gpt-4.1",
        ModelPricing {
            input_per_1k: 0.002,
            output_per_1k: 0.008,
        },
    ),
    (
        "gpt-3.5-turbo",
        ModelPricing {
            input_per_1k: 0.000_5,
            output_per_1k: 0.001_5,
        },
    ),
];

/// Fallback for unknown models.
const DEFAULT_PRICING: ModelPricing = ModelPricing {
    input_per_1k: 0.001,
    output_per_1k: 0.002,
};

/// Pricing for a model, falling back to [`DEFAULT_PRICING`] when unknown.
pub fn pricing_for(model: &str) -> ModelPricing {
    PRICING
        .iter()
        .find(|(prefix, _)| model.starts_with(prefix))
        .map(|(_, pricing)| *pricing)
        .unwrap_or(DEFAULT_PRICING)
}

/// Estimated USD cost for one call.
pub fn estimate_cost(model: &str, tokens_in: u32, tokens_out: u32) -> f64 {
    let pricing = pricing_for(model);
    (tokens_in as f64 / 1000.0) * pricing.input_per_1k
        + (tokens_out as f64 / 1000.0) * pricing.output_per_1k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_pricing() {
        assert_eq!(pricing_for("gpt-4o").input_per_1k, 0.002_5);
        // mini must not be shadowed by the gpt-4o entry
        assert_eq!(pricing_for("gpt-4o-mini").input_per_1k, 0.000_15);
    }

    #[test]
    fn test_dated_variant_matches_prefix() {
        assert_eq!(pricing_for("gpt-4o-2024-08-06"), pricing_for("gpt-4o"));
    }

    #[test]
    fn test_unknown_model_uses_fallback() {
        assert_eq!(pricing_for("some-local-model"), DEFAULT_PRICING);
    }

    #[test]
    fn test_estimate_cost() {
        // 1000 in + 1000 out on gpt-4o: 0.0025 + 0.01
        let cost = estimate_cost("gpt-4o", 1000, 1000);
        assert!((cost - 0.0125).abs() < 1e-9);

        assert_eq!(estimate_cost("gpt-4o", 0, 0), 0.0);
    }
}
