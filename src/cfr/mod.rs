//! Monte Carlo CFR (Counterfactual Regret Minimization) module.
//!
//! This module provides sampling-based CFR engines for computing Nash
//! equilibrium strategies in two-player zero-sum extensive-form games.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! Monte Carlo variants sample part of the tree on each traversal instead of
//! walking all of it.
//!
//! # Engines
//!
//! - [`ChanceSampling`]: samples chance outcomes, enumerates player actions
//! - [`RobustSampling`]: also samples opponent actions and explores at most
//!   `k` of the traverser's actions
//!
//! # Discounting
//!
//! [`DiscountParams`] selects vanilla accumulation, CFR+, Linear CFR or
//! Discounted CFR. Factors are applied to every touched policy when the
//! profile advances to the next iteration.
//!
//! # Usage
//!
//! 1. Implement [`GameTreeNode`] (and an [`InfoSet`]) for your game
//! 2. Create a [`PolicyTable`] and wrap it in an engine
//! 3. Call [`Sampler::run`] then [`StrategyProfile::update`], or let a
//!    [`Trainer`] do it
//! 4. Read average strategies from the table
//!
//! # Example
//!
//! ```
//! use mccfr_solver::cfr::{ChanceSampling, DiscountParams, NodeStrategy, PolicyTable, Trainer};
//! use mccfr_solver::games::kuhn::KuhnNode;
//!
//! let table = PolicyTable::new(DiscountParams::dcfr());
//! let mut trainer = Trainer::new(ChanceSampling::with_seed(table, 42));
//! let stats = trainer.train(KuhnNode::new, 1_000).unwrap();
//! assert_eq!(stats.info_sets, 12);
//!
//! let queen = trainer.profile().get(b"1:").unwrap().average_strategy();
//! println!("Queen opening: pass={:.3} bet={:.3}", queen[0], queen[1]);
//! ```
//!
//! # Theory
//!
//! **Regret**: The difference between the value of an action and the value of the current strategy.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Lanctot, M., et al. "Monte Carlo Sampling for Regret Minimization in Extensive Games" (2009)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)
//! - Brown, N., Sandholm, T. "Solving Imperfect-Information Games via Discounted Regret Minimization" (2019)

pub mod chance_sampling;
pub mod config;
pub mod discount;
pub mod eval;
pub mod game;
pub mod policy;
pub mod pool;
pub mod robust_sampling;
pub mod sampler;
pub mod table;
pub mod trainer;

// Re-export main types for convenient access
pub use chance_sampling::ChanceSampling;
pub use config::{CfrStats, ConfigError, SamplingScheme, SolverConfig};
pub use discount::{DiscountParams, DiscountSchedule};
pub use eval::{expected_value, StrategyKind};
pub use game::{sample_chance_node, GameTreeNode, InfoSet, NodeType};
pub use policy::{regret_matching, NodeStrategy, Policy};
pub use pool::{LocalSlicePool, Scratch, SlicePool, SyncSlicePool};
pub use robust_sampling::RobustSampling;
pub use sampler::Sampler;
pub use table::{PolicyTable, StrategyExport, StrategyProfile};
pub use trainer::{Checkpoint, Trainer};
