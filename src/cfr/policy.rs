//! Per-infoset regret and strategy accumulator.
//!
//! A [`Policy`] holds, for one information set with `n` actions:
//! - **Cumulative regret** `R`: sum of importance-weighted instantaneous advantages
//! - **Strategy sum** `S`: reach-weighted sum of the strategies played
//! - **Current strategy**: regret matching over `R`, recomputed once per
//!   iteration by [`NodeStrategy::next_strategy`]
//!
//! The current strategy is frozen for the duration of an iteration so every
//! visit within one iteration plays the same strategy, even though regrets
//! keep accumulating.

use serde::{Deserialize, Serialize};

/// Strategy learned at one decision point.
pub trait NodeStrategy {
    /// Number of actions at this decision point.
    fn num_actions(&self) -> usize;

    /// Probability with which the `i`th action is currently played.
    fn action_probability(&self, i: usize) -> f32;

    /// The full current strategy.
    fn current_strategy(&self) -> &[f32];

    /// Add observed instantaneous advantages from a full-enumeration visit.
    ///
    /// Regret is scaled by `counterfactual_p` (reach of everyone but the acting
    /// player), and the current strategy is added to the strategy sum with
    /// weight `reach_p` (the acting player's own reach).
    fn add_regret(&mut self, reach_p: f32, counterfactual_p: f32, advantages: &[f32]) {
        self.add_weighted_regret(counterfactual_p, advantages);
        self.add_strategy_weight(reach_p);
    }

    /// Accumulate `scale * values[a]` into the cumulative regret of each action.
    fn add_weighted_regret(&mut self, scale: f32, values: &[f32]);

    /// Add the current strategy into the strategy sum with weight `weight`.
    fn add_strategy_weight(&mut self, weight: f32);

    /// Apply the iteration's discount factors and recompute the current strategy.
    fn next_strategy(&mut self, discount_pos: f32, discount_neg: f32, discount_sum: f32);

    /// Time-averaged strategy, uniform if nothing has been accumulated.
    fn average_strategy(&self) -> Vec<f32>;
}

/// Tabular regret-matching policy for a single information set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    regret_sum: Vec<f32>,
    strategy_sum: Vec<f32>,
    current: Vec<f32>,
}

impl Policy {
    /// New policy over `num_actions` actions, playing uniformly.
    pub fn new(num_actions: usize) -> Self {
        Self {
            regret_sum: vec![0.0; num_actions],
            strategy_sum: vec![0.0; num_actions],
            current: uniform(num_actions),
        }
    }

    /// Cumulative regret per action.
    pub fn regret_sum(&self) -> &[f32] {
        &self.regret_sum
    }

    /// Cumulative strategy weight per action.
    pub fn strategy_sum(&self) -> &[f32] {
        &self.strategy_sum
    }
}

impl NodeStrategy for Policy {
    fn num_actions(&self) -> usize {
        self.current.len()
    }

    fn action_probability(&self, i: usize) -> f32 {
        self.current[i]
    }

    fn current_strategy(&self) -> &[f32] {
        &self.current
    }

    fn add_weighted_regret(&mut self, scale: f32, values: &[f32]) {
        debug_assert_eq!(values.len(), self.regret_sum.len());
        for (r, &v) in self.regret_sum.iter_mut().zip(values) {
            *r += scale * v;
        }
    }

    fn add_strategy_weight(&mut self, weight: f32) {
        for (s, &p) in self.strategy_sum.iter_mut().zip(&self.current) {
            *s += weight * p;
        }
    }

    fn next_strategy(&mut self, discount_pos: f32, discount_neg: f32, discount_sum: f32) {
        for r in self.regret_sum.iter_mut() {
            if *r >= 0.0 {
                *r *= discount_pos;
            } else {
                *r *= discount_neg;
            }
        }
        for s in self.strategy_sum.iter_mut() {
            *s *= discount_sum;
        }
        regret_matching(&self.regret_sum, &mut self.current);
    }

    fn average_strategy(&self) -> Vec<f32> {
        let total: f32 = self.strategy_sum.iter().sum();
        if total > 0.0 {
            self.strategy_sum.iter().map(|&s| s / total).collect()
        } else {
            uniform(self.strategy_sum.len())
        }
    }
}

/// Strategy proportional to positive regret, uniform when no regret is positive.
pub fn regret_matching(regrets: &[f32], strategy: &mut [f32]) {
    let total: f32 = regrets.iter().map(|&r| r.max(0.0)).sum();
    if total > 0.0 {
        for (p, &r) in strategy.iter_mut().zip(regrets) {
            *p = r.max(0.0) / total;
        }
    } else {
        strategy.fill(1.0 / strategy.len() as f32);
    }
}

fn uniform(n: usize) -> Vec<f32> {
    vec![1.0 / n as f32; n]
}
