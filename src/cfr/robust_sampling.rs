//! Robust (external) sampling MCCFR.
//!
//! One player is the *traverser* for each iteration, alternating with the
//! iteration counter. During a traversal:
//!
//! - **Chance nodes**: one outcome is sampled; its probability cancels.
//! - **Traverser nodes**: `min(k, n)` distinct actions are drawn uniformly
//!   without replacement. Each is explored with the path sampling probability
//!   scaled by `q = min(k, n) / n`, the chance any one action is drawn.
//! - **Opponent nodes**: one action is sampled from the current strategy and
//!   cached by infoset key, so revisiting the same infoset within a traversal
//!   replays the same action. The average strategy receives a stochastic
//!   update weighted by the inverse sampling probability.
//! - **Terminal nodes**: utility divided by the probability of having sampled
//!   this path.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashMap;

use crate::cfr::game::{perspective_sign, root_player, GameTreeNode, InfoSet, NodeType};
use crate::cfr::policy::NodeStrategy;
use crate::cfr::pool::{SlicePool, SyncSlicePool};
use crate::cfr::sampler::{sample_action, Sampler};
use crate::cfr::table::StrategyProfile;
use crate::error::Result;

/// Robust-sampling MCCFR engine.
pub struct RobustSampling<P> {
    profile: P,
    k: usize,
    pool: Arc<SyncSlicePool>,
    rng: StdRng,
}

impl<P: StrategyProfile> RobustSampling<P> {
    /// Create an engine sampling up to `k` actions at the traverser's nodes.
    pub fn new(profile: P, k: usize) -> Self {
        Self::with_parts(profile, k, Arc::default(), StdRng::from_entropy())
    }

    /// Create an engine with a reproducible RNG.
    pub fn with_seed(profile: P, k: usize, seed: u64) -> Self {
        Self::with_parts(profile, k, Arc::default(), StdRng::seed_from_u64(seed))
    }

    /// Create an engine drawing scratch buffers from a pool shared with other workers.
    pub fn with_pool(profile: P, k: usize, pool: Arc<SyncSlicePool>, seed: u64) -> Self {
        Self::with_parts(profile, k, pool, StdRng::seed_from_u64(seed))
    }

    fn with_parts(profile: P, k: usize, pool: Arc<SyncSlicePool>, rng: StdRng) -> Self {
        debug_assert!(k > 0, "robust sampling needs k >= 1");
        Self {
            profile,
            k: k.max(1),
            pool,
            rng,
        }
    }

    /// Maximum number of actions explored at a traverser node.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Consume the engine, returning the trained profile.
    pub fn into_profile(self) -> P {
        self.profile
    }
}

impl<P: StrategyProfile> Sampler for RobustSampling<P> {
    type Profile = P;

    fn run<N: GameTreeNode>(&mut self, root: N) -> Result<f32> {
        let traverser = (self.profile.iter() % 2) as usize;
        let last = root_player(&root);
        let mut walk = Walk {
            profile: &mut self.profile,
            pool: &self.pool,
            rng: &mut self.rng,
            k: self.k,
            traverser,
            sampled: FxHashMap::default(),
        };
        walk.value(root, last, 1.0)
    }

    fn profile(&self) -> &P {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut P {
        &mut self.profile
    }
}

/// State owned by a single traversal, including its sampled-action cache.
struct Walk<'a, P> {
    profile: &'a mut P,
    pool: &'a SyncSlicePool,
    rng: &'a mut StdRng,
    k: usize,
    traverser: usize,
    sampled: FxHashMap<Vec<u8>, usize>,
}

impl<P: StrategyProfile> Walk<'_, P> {
    fn value<N: GameTreeNode>(&mut self, node: N, last: usize, sample_p: f32) -> Result<f32> {
        let ev = match node.node_type() {
            NodeType::Terminal => node.utility(last) as f32 / sample_p,
            NodeType::Chance => {
                let (child, _) = node.sample_child(&mut *self.rng);
                self.value(child, last, sample_p)?
            }
            NodeType::Player => {
                let sign = perspective_sign(last, node.player());
                let value = if node.player() == self.traverser {
                    self.traverser_value(&node, sample_p)?
                } else {
                    self.opponent_value(&node, sample_p)?
                };
                sign * value
            }
        };

        node.close();
        Ok(ev)
    }

    fn traverser_value<N: GameTreeNode>(&mut self, node: &N, sample_p: f32) -> Result<f32> {
        let player = node.player();
        let n = node.num_children();
        let key = node.info_set(player).key();

        let pool = self.pool;
        let mut strategy = pool.alloc(n);
        strategy.copy_from_slice(self.profile.policy(&key, n)?.current_strategy());

        // Shuffle-and-take min(k, n) distinct actions.
        let mut actions: Vec<usize> = (0..n).collect();
        let taken = self.k.min(n);
        let (selected, _) = actions.partial_shuffle(&mut *self.rng, taken);
        // Inclusion probability of each action; 1/n when k = 1.
        let q = taken as f32 / n as f32;

        let mut regrets = pool.alloc(n);
        regrets.fill(0.0);
        let mut cf_value = 0.0;
        for &i in selected.iter() {
            let util = self.value(node.get_child(i), player, q * sample_p)?;
            regrets[i] = util;
            cf_value += strategy[i] * util;
        }

        // Unsampled actions contribute no regret this iteration.
        for &i in selected.iter() {
            regrets[i] -= cf_value;
        }

        self.profile
            .policy(&key, n)?
            .add_weighted_regret(1.0 / q, &regrets);
        Ok(cf_value)
    }

    fn opponent_value<N: GameTreeNode>(&mut self, node: &N, sample_p: f32) -> Result<f32> {
        let player = node.player();
        let n = node.num_children();
        let key = node.info_set(player).key();

        let policy = self.profile.policy(&key, n)?;
        let action = match self.sampled.get(&key).copied() {
            Some(action) => action,
            None => {
                let action = sample_action(policy.current_strategy(), &mut *self.rng);
                self.sampled.insert(key, action);
                action
            }
        };

        // Stochastic average-strategy update.
        policy.add_strategy_weight(1.0 / sample_p);

        // The sampled action's probability cancels, as for chance nodes.
        self.value(node.get_child(action), player, sample_p)
    }
}
