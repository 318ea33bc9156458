//! Game implementations for the MCCFR engines.
//!
//! These serve as:
//!
//! 1. **Validation**: Games with known Nash equilibria (like Kuhn Poker) verify
//!    that the sampling engines converge to the right answer.
//!
//! 2. **Examples**: Demonstrate how to implement [`GameTreeNode`] for new games.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker - A simplified 3-card poker game with known Nash equilibrium
//! - [`tree`]: Explicit trees built node by node, for tiny games and tests
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define a node type and an info set type
//! 3. Implement [`GameTreeNode`] and [`InfoSet`](crate::cfr::InfoSet)
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.
//!
//! [`GameTreeNode`]: crate::cfr::GameTreeNode

pub mod kuhn;
pub mod tree;
