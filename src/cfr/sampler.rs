//! Common interface of the Monte Carlo traversal engines.

use rand::Rng;

use crate::cfr::game::GameTreeNode;
use crate::cfr::table::StrategyProfile;
use crate::error::Result;

/// A Monte Carlo CFR traversal engine.
///
/// One call to [`Sampler::run`] walks a sampled portion of the tree rooted at
/// `root`, feeds regret and strategy observations into the profile, and
/// returns an unbiased estimate of the root's counterfactual value from the
/// perspective of the player acting at the root (player 0 if the root is a
/// chance node).
///
/// `run` never advances the iteration; callers follow each batch of runs
/// with `profile_mut().update()`.
pub trait Sampler {
    /// Strategy profile the engine trains.
    type Profile: StrategyProfile;

    /// Traverse the tree once.
    fn run<N: GameTreeNode>(&mut self, root: N) -> Result<f32>;

    /// The strategy profile.
    fn profile(&self) -> &Self::Profile;

    /// Mutable access to the strategy profile.
    fn profile_mut(&mut self) -> &mut Self::Profile;
}

/// Sample an action index according to a probability distribution.
pub(crate) fn sample_action<R: Rng + ?Sized>(strategy: &[f32], rng: &mut R) -> usize {
    let r: f32 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &prob) in strategy.iter().enumerate() {
        cumsum += prob;
        if r < cumsum {
            return i;
        }
    }

    // Rounding left r past the total: take the last action that can be played.
    strategy
        .iter()
        .rposition(|&prob| prob > 0.0)
        .unwrap_or(strategy.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_action_follows_distribution() {
        let mut rng = StdRng::seed_from_u64(3);
        let strategy = [0.2, 0.0, 0.8];
        let mut counts = [0usize; 3];
        for _ in 0..50_000 {
            counts[sample_action(&strategy, &mut rng)] += 1;
        }
        assert_eq!(counts[1], 0);
        let freq = counts[2] as f64 / 50_000.0;
        assert!((freq - 0.8).abs() < 0.01, "frequency {}", freq);
    }

    #[test]
    fn test_rounding_fallback_skips_zero_probability() {
        // Largest f32 the generator can yield: 1 - 2^-24.
        let mut rng = StepRng::new(u64::MAX, 0);
        assert!(rng.gen::<f32>() > 0.99);
        assert_eq!(sample_action(&[0.5, 0.49, 0.0], &mut rng), 1);
        assert_eq!(sample_action(&[0.0, 0.99, 0.0, 0.0], &mut rng), 1);
    }

    #[test]
    fn test_sample_action_degenerate() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(sample_action(&[0.0, 1.0], &mut rng), 1);
        }
    }
}
