//! Chance-sampled CFR.
//!
//! Each traversal samples one outcome at every chance node and enumerates
//! every action at every player node. Because chance outcomes are drawn from
//! their true distribution, no importance weighting is needed: terminal
//! utilities are returned as-is and the regret of each action is weighted by
//! the counterfactual reach (the opponent's reach probability).

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cfr::game::{perspective_sign, root_player, GameTreeNode, InfoSet, NodeType};
use crate::cfr::policy::NodeStrategy;
use crate::cfr::pool::{LocalSlicePool, SlicePool};
use crate::cfr::sampler::Sampler;
use crate::cfr::table::StrategyProfile;
use crate::error::Result;

/// Chance-sampling CFR engine.
pub struct ChanceSampling<P> {
    profile: P,
    pool: LocalSlicePool,
    rng: StdRng,
}

impl<P: StrategyProfile> ChanceSampling<P> {
    /// Create an engine with an entropy-seeded RNG.
    pub fn new(profile: P) -> Self {
        Self::with_rng(profile, StdRng::from_entropy())
    }

    /// Create an engine whose chance sampling is reproducible.
    pub fn with_seed(profile: P, seed: u64) -> Self {
        Self::with_rng(profile, StdRng::seed_from_u64(seed))
    }

    fn with_rng(profile: P, rng: StdRng) -> Self {
        Self {
            profile,
            pool: LocalSlicePool::new(),
            rng,
        }
    }

    /// Consume the engine, returning the trained profile.
    pub fn into_profile(self) -> P {
        self.profile
    }
}

impl<P: StrategyProfile> Sampler for ChanceSampling<P> {
    type Profile = P;

    fn run<N: GameTreeNode>(&mut self, root: N) -> Result<f32> {
        let last = root_player(&root);
        let mut walk = Walk {
            profile: &mut self.profile,
            pool: &self.pool,
            rng: &mut self.rng,
        };
        walk.value(root, last, [1.0, 1.0])
    }

    fn profile(&self) -> &P {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut P {
        &mut self.profile
    }
}

/// State borrowed for the duration of one traversal.
struct Walk<'a, P> {
    profile: &'a mut P,
    pool: &'a LocalSlicePool,
    rng: &'a mut StdRng,
}

impl<P: StrategyProfile> Walk<'_, P> {
    /// Value of `node` from `last`'s perspective. `reach` holds each player's
    /// own reach probability.
    fn value<N: GameTreeNode>(&mut self, node: N, last: usize, reach: [f32; 2]) -> Result<f32> {
        let ev = match node.node_type() {
            NodeType::Terminal => node.utility(last) as f32,
            NodeType::Chance => {
                // Sampled from the true distribution, so the probability cancels.
                let (child, _) = node.sample_child(&mut *self.rng);
                self.value(child, last, reach)?
            }
            NodeType::Player => {
                let sign = perspective_sign(last, node.player());
                sign * self.player_value(&node, reach)?
            }
        };

        node.close();
        Ok(ev)
    }

    fn player_value<N: GameTreeNode>(&mut self, node: &N, reach: [f32; 2]) -> Result<f32> {
        let player = node.player();
        let n = node.num_children();
        let key = node.info_set(player).key();

        let pool = self.pool;
        let mut strategy = pool.alloc(n);
        strategy.copy_from_slice(self.profile.policy(&key, n)?.current_strategy());

        let mut advantages = pool.alloc(n);
        let mut expected = 0.0;
        for i in 0..n {
            let p = strategy[i];
            let mut child_reach = reach;
            child_reach[player] *= p;

            let util = self.value(node.get_child(i), player, child_reach)?;
            advantages[i] = util;
            expected += p * util;
        }

        // Action utilities become instantaneous advantages.
        for a in advantages.iter_mut() {
            *a -= expected;
        }

        let reach_p = reach[player];
        let counterfactual_p = reach[1 - player];
        self.profile
            .policy(&key, n)?
            .add_regret(reach_p, counterfactual_p, &advantages);
        Ok(expected)
    }
}
