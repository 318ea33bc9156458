//! Discount schedules applied to regrets and strategy sums at each iteration boundary.
//!
//! A schedule maps an iteration number `t` (starting at 1) to three factors:
//! one for non-negative cumulative regret, one for negative cumulative regret,
//! and one for the cumulative strategy sum.
//!
//! | Scheme | positive | negative | strategy sum |
//! |--------|----------|----------|--------------|
//! | Vanilla CFR | 1 | 1 | 1 |
//! | CFR+ (regret matching+) | 1 | 0 | 1 |
//! | Linear CFR | t/(t+1) | t/(t+1) | t/(t+1) |
//! | Discounted CFR | t^α/(t^α+1) | t^β/(t^β+1) | (t/(t+1))^γ |

use serde::{Deserialize, Serialize};

use crate::cfr::config::ConfigError;

/// Source of the per-iteration discount factors.
pub trait DiscountSchedule {
    /// Returns `(positive, negative, strategy_sum)` discount factors for iteration `iter`.
    fn discount_factors(&self, iter: u64) -> (f32, f32, f32);
}

/// Built-in discount schedules. Persisted in the policy table header.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DiscountParams {
    /// Plain accumulation.
    #[default]
    Vanilla,
    /// Negative regrets are floored at zero after each iteration.
    RegretMatchingPlus,
    /// Iteration `t` is weighted proportionally to `t`.
    Linear,
    /// DCFR with the given exponents (Brown & Sandholm 2019 use 1.5, 0, 2).
    Discounted {
        /// Exponent for positive regrets.
        alpha: f32,
        /// Exponent for negative regrets.
        beta: f32,
        /// Exponent for the strategy sum.
        gamma: f32,
    },
}

impl DiscountParams {
    /// DCFR with the exponents recommended in the literature.
    pub fn dcfr() -> Self {
        DiscountParams::Discounted {
            alpha: 1.5,
            beta: 0.0,
            gamma: 2.0,
        }
    }

    /// Check that the exponents are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let DiscountParams::Discounted { alpha, beta, gamma } = *self {
            for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidDiscount(name, value));
                }
            }
        }
        Ok(())
    }
}

impl DiscountSchedule for DiscountParams {
    fn discount_factors(&self, iter: u64) -> (f32, f32, f32) {
        let t = iter.max(1) as f32;
        match *self {
            DiscountParams::Vanilla => (1.0, 1.0, 1.0),
            DiscountParams::RegretMatchingPlus => (1.0, 0.0, 1.0),
            DiscountParams::Linear => {
                let d = t / (t + 1.0);
                (d, d, d)
            }
            DiscountParams::Discounted { alpha, beta, gamma } => {
                let pos = t.powf(alpha) / (t.powf(alpha) + 1.0);
                let neg = t.powf(beta) / (t.powf(beta) + 1.0);
                let sum = (t / (t + 1.0)).powf(gamma);
                (pos, neg, sum)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vanilla_is_identity() {
        for t in [1, 2, 100] {
            assert_eq!(DiscountParams::Vanilla.discount_factors(t), (1.0, 1.0, 1.0));
        }
    }

    #[test]
    fn test_regret_matching_plus_floors_negative() {
        assert_eq!(
            DiscountParams::RegretMatchingPlus.discount_factors(5),
            (1.0, 0.0, 1.0)
        );
    }

    #[test]
    fn test_linear_weights() {
        let (p, n, s) = DiscountParams::Linear.discount_factors(1);
        assert_eq!((p, n, s), (0.5, 0.5, 0.5));
        let (p, _, _) = DiscountParams::Linear.discount_factors(3);
        assert!((p - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_dcfr_factors() {
        let (p, n, s) = DiscountParams::dcfr().discount_factors(4);
        assert!((p - 8.0 / 9.0).abs() < 1e-6);
        assert!((n - 0.5).abs() < 1e-6);
        assert!((s - 0.64).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_negative_exponent() {
        let params = DiscountParams::Discounted {
            alpha: 1.0,
            beta: -0.5,
            gamma: 1.0,
        };
        assert!(params.validate().is_err());
        assert!(DiscountParams::dcfr().validate().is_ok());
    }
}
