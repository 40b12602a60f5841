//! Token pricing and cost estimation.
//!
//! Prices are configured per 1M tokens to match how providers publish
//! rates. Cost math runs through [`rust_decimal`] rather than `f64` so the
//! 4-decimal USD output is stable regardless of token counts; the result
//! is rounded half-up to 4 decimal places.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy, dec};
use serde::{Deserialize, Serialize};

/// Default input-token rate: $0.35 per 1M tokens (Gemini Flash class).
pub const DEFAULT_PRICE_IN_PER_MILLION: Decimal = dec!(0.35);
/// Default output-token rate: $1.05 per 1M tokens.
pub const DEFAULT_PRICE_OUT_PER_MILLION: Decimal = dec!(1.05);

const COST_DECIMAL_PLACES: u32 = 4;

/// Per-1M-token pricing for a token-metered service.
///
/// Deserializes from the `[pricing]` config table; both fields fall back
/// to the default Gemini Flash rates when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenPricing {
    /// Dollars per 1M input tokens.
    #[serde(default = "default_price_in")]
    pub price_in_per_million: Decimal,

    /// Dollars per 1M output tokens.
    #[serde(default = "default_price_out")]
    pub price_out_per_million: Decimal,
}

fn default_price_in() -> Decimal {
    DEFAULT_PRICE_IN_PER_MILLION
}

fn default_price_out() -> Decimal {
    DEFAULT_PRICE_OUT_PER_MILLION
}

impl Default for TokenPricing {
    fn default() -> Self {
        Self {
            price_in_per_million: DEFAULT_PRICE_IN_PER_MILLION,
            price_out_per_million: DEFAULT_PRICE_OUT_PER_MILLION,
        }
    }
}

impl TokenPricing {
    pub fn new(price_in_per_million: Decimal, price_out_per_million: Decimal) -> Self {
        Self {
            price_in_per_million,
            price_out_per_million,
        }
    }

    /// Estimate the USD cost of a token count pair.
    ///
    /// `input * price_in / 1e6 + output * price_out / 1e6`, rounded
    /// half-up to 4 decimal places.
    pub fn estimate_cost(&self, input_tokens: u64, output_tokens: u64) -> Decimal {
        let per_million = Decimal::from(1_000_000u64);

        let cost = (Decimal::from(input_tokens) * self.price_in_per_million
            + Decimal::from(output_tokens) * self.price_out_per_million)
            / per_million;

        cost.round_dp_with_strategy(COST_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
    }

    /// [`Self::estimate_cost`] as an `f64` for summaries serialized as
    /// plain JSON numbers. The value is already rounded to 4 decimal
    /// places, well within `f64` precision.
    pub fn estimate_cost_usd(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        self.estimate_cost(input_tokens, output_tokens)
            .to_f64()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_default_rates() {
        let pricing = TokenPricing::default();
        assert_eq!(pricing.price_in_per_million, dec!(0.35));
        assert_eq!(pricing.price_out_per_million, dec!(1.05));
    }

    #[test]
    fn test_one_million_each_at_default_rates() {
        let pricing = TokenPricing::default();
        assert_eq!(pricing.estimate_cost(1_000_000, 1_000_000), dec!(1.4000));
    }

    #[test]
    fn test_zero_tokens_cost_zero() {
        let pricing = TokenPricing::default();
        assert_eq!(pricing.estimate_cost(0, 0), dec!(0));
    }

    #[rstest]
    // 150 input tokens at $0.35/1M = $0.0000525, half-up to $0.0001
    #[case(150, 0, dec!(0.0001))]
    // 100 input tokens = $0.000035, rounds down to zero
    #[case(100, 0, dec!(0.0000))]
    // Output side: 48 tokens at $1.05/1M = $0.0000504 -> $0.0001
    #[case(0, 48, dec!(0.0001))]
    fn test_rounding_half_up(#[case] input: u64, #[case] output: u64, #[case] expected: Decimal) {
        let pricing = TokenPricing::default();
        assert_eq!(pricing.estimate_cost(input, output), expected);
    }

    #[test]
    fn test_custom_rates() {
        let pricing = TokenPricing::new(dec!(3.00), dec!(15.00));
        assert_eq!(pricing.estimate_cost(2_000_000, 1_000_000), dec!(21.0000));
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let pricing: TokenPricing = toml::from_str("price_in_per_million = 0.10").unwrap();
        assert_eq!(pricing.price_in_per_million, dec!(0.10));
        assert_eq!(pricing.price_out_per_million, DEFAULT_PRICE_OUT_PER_MILLION);
    }

    #[test]
    fn test_estimate_cost_usd_matches_decimal() {
        let pricing = TokenPricing::default();
        assert_eq!(pricing.estimate_cost_usd(1_000_000, 1_000_000), 1.4);
    }
}
