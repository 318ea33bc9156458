//! Configuration options for the MCCFR solver.
//!
//! This module provides configuration structs that control which traversal
//! engine is used, how regrets are discounted, and how training is driven.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cfr::discount::DiscountParams;

/// Which Monte Carlo traversal engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingScheme {
    /// Sample chance, enumerate every player action.
    #[default]
    Chance,
    /// Sample chance and opponent actions, explore up to `k` traverser actions.
    Robust {
        /// Actions explored per traverser node.
        k: usize,
    },
}

/// Configuration for the solver.
///
/// # Example
/// ```
/// use mccfr_solver::cfr::{DiscountParams, SamplingScheme, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_sampling(SamplingScheme::Robust { k: 2 })
///     .with_discount(DiscountParams::dcfr())
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Traversal engine.
    pub sampling: SamplingScheme,

    /// Discount schedule applied at every iteration boundary.
    ///
    /// Vanilla accumulation by default.
    pub discount: DiscountParams,

    /// Random seed for reproducibility.
    ///
    /// If set, the engine will use this seed for random number generation,
    /// making results reproducible. If `None`, a random seed is used.
    pub seed: Option<u64>,

    /// Iterations between policy table checkpoints during training.
    ///
    /// Set to `None` to disable checkpointing.
    pub checkpoint_interval: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingScheme::Chance,
            discount: DiscountParams::Vanilla,
            seed: None,
            checkpoint_interval: None,
        }
    }
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Robust sampling with DCFR discounting, a good default for larger games.
    pub fn fast() -> Self {
        Self {
            sampling: SamplingScheme::Robust { k: 2 },
            discount: DiscountParams::dcfr(),
            ..Default::default()
        }
    }

    /// Builder method: set the traversal engine.
    pub fn with_sampling(mut self, sampling: SamplingScheme) -> Self {
        self.sampling = sampling;
        self
    }

    /// Builder method: set the discount schedule.
    pub fn with_discount(mut self, discount: DiscountParams) -> Self {
        self.discount = discount;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: checkpoint every `interval` iterations.
    pub fn with_checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let SamplingScheme::Robust { k } = self.sampling {
            if k == 0 {
                return Err(ConfigError::InvalidSampleCount(k));
            }
        }

        if self.checkpoint_interval == Some(0) {
            return Err(ConfigError::InvalidCheckpointInterval);
        }

        self.discount.validate()
    }
}

/// Errors that can occur when validating solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Robust sampling needs at least one action per traverser node.
    InvalidSampleCount(usize),
    /// A discount exponent is negative or not finite.
    InvalidDiscount(&'static str, f32),
    /// Checkpoint interval of zero iterations.
    InvalidCheckpointInterval,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSampleCount(k) => {
                write!(f, "Robust sampling count k={} must be at least 1", k)
            }
            ConfigError::InvalidDiscount(name, val) => {
                write!(f, "Discount exponent {}={} must be finite and non-negative", name, val)
            }
            ConfigError::InvalidCheckpointInterval => {
                write!(f, "Checkpoint interval must be at least 1 iteration")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CfrStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Running mean of the sampled root value, from the root player's perspective.
    pub mean_value: f64,
}

impl CfrStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one more root value into the running mean.
    pub fn record_value(&mut self, value: f32) {
        self.iterations += 1;
        self.mean_value += (value as f64 - self.mean_value) / self.iterations as f64;
    }

    /// Add wall time spent training.
    pub fn add_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_seconds += elapsed.as_secs_f64();
        self.update_rate();
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.sampling, SamplingScheme::Chance);
        assert_eq!(config.discount, DiscountParams::Vanilla);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_k() {
        let config = SolverConfig::new().with_sampling(SamplingScheme::Robust { k: 0 });
        assert_eq!(config.validate(), Err(ConfigError::InvalidSampleCount(0)));
    }

    #[test]
    fn test_rejects_bad_discount() {
        let config = SolverConfig::new().with_discount(DiscountParams::Discounted {
            alpha: 1.5,
            beta: f32::NAN,
            gamma: 2.0,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDiscount("beta", _))
        ));
    }

    #[test]
    fn test_rejects_zero_checkpoint_interval() {
        let config = SolverConfig::new().with_checkpoint_interval(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidCheckpointInterval));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SolverConfig::fast().with_seed(3).with_checkpoint_interval(100);
        let json = serde_json::to_string(&config).unwrap();
        let back: SolverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_stats_running_mean() {
        let mut stats = CfrStats::new();
        for v in [1.0, 2.0, 3.0] {
            stats.record_value(v);
        }
        assert_eq!(stats.iterations, 3);
        assert!((stats.mean_value - 2.0).abs() < 1e-12);

        stats.add_elapsed(Duration::from_millis(1500));
        assert!((stats.iterations_per_second - 2.0).abs() < 1e-9);
    }
}
