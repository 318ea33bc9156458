//! # MCCFR Solver
//!
//! Monte Carlo Counterfactual Regret Minimization (CFR) engines for computing
//! Nash equilibrium strategies in two-player zero-sum extensive-form games.
//!
//! ## Features
//!
//! - **Generic Engines**: Work with any game implementing [`GameTreeNode`]
//! - **Two Samplers**: Chance sampling and robust (external) sampling
//! - **Discounting**: Vanilla CFR, CFR+, Linear CFR and Discounted CFR schedules
//! - **Buffer Pooling**: Scratch vectors are recycled across traversals
//! - **Checkpointing**: Save and resume policy tables
//! - **Reservoir Sampling**: Disk-backed uniform sample of training examples
//!
//! ## Quick Start
//!
//! ```
//! use mccfr_solver::cfr::{DiscountParams, PolicyTable, RobustSampling, Trainer};
//! use mccfr_solver::games::kuhn::KuhnNode;
//!
//! // 1. Implement GameTreeNode for your game (Kuhn Poker ships with the crate)
//! // 2. Pick an engine
//! let sampler = RobustSampling::with_seed(PolicyTable::new(DiscountParams::dcfr()), 2, 7);
//!
//! // 3. Train
//! let mut trainer = Trainer::new(sampler);
//! trainer.train(KuhnNode::new, 2_000).unwrap();
//!
//! // 4. Get strategies
//! let export = trainer.profile().export_average_strategies();
//! assert_eq!(export.strategies.len(), 12);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Traversal engines, policies and training
//! - [`games`]: Example game implementations (Kuhn Poker, explicit trees)
//! - [`reservoir`]: Persistent reservoir buffer
//! - [`persist`]: Headers for persisted state
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Trainer (run + update loop)                  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!               ┌───────────────┴───────────────┐
//!               ▼                               ▼
//!      ┌─────────────────┐             ┌─────────────────┐
//!      │ ChanceSampling  │             │ RobustSampling  │
//!      └─────────────────┘             └─────────────────┘
//!               │     GameTreeNode trait        │
//!               ├───────────────┬───────────────┤
//!               ▼               ▼               ▼
//!         ┌──────────┐   ┌────────────┐  ┌─────────────┐
//!         │   Kuhn   │   │  Explicit  │  │ PolicyTable │
//!         │  Poker   │   │   trees    │  │ + SlicePool │
//!         └──────────┘   └────────────┘  └─────────────┘
//! ```

#![warn(missing_docs)]

/// Monte Carlo CFR module.
///
/// Sampling engines, per-infoset policies and the training loop.
pub mod cfr;

/// Error type shared across the crate.
pub mod error;

/// Game implementations module.
///
/// Contains example games like Kuhn Poker for testing and validation.
pub mod games;

/// Headers for persisted state.
pub mod persist;

/// Disk-backed reservoir sampling.
pub mod reservoir;

// Re-export commonly used types at crate root for convenience
pub use cfr::{
    ChanceSampling, GameTreeNode, InfoSet, NodeStrategy, NodeType, PolicyTable, RobustSampling,
    Sampler, SolverConfig, StrategyProfile, Trainer,
};
pub use error::{Result, SolverError};
pub use reservoir::ReservoirBuffer;
