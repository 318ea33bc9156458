//! Exact evaluation of small game trees.
//!
//! Walks every branch (chance nodes included) and weights each by its
//! probability under a strategy profile. This is exponential in tree size and
//! is only meant for validation games like Kuhn poker.

use crate::cfr::discount::DiscountSchedule;
use crate::cfr::game::{GameTreeNode, InfoSet, NodeType};
use crate::cfr::policy::NodeStrategy;
use crate::cfr::table::PolicyTable;

/// Which strategy of each policy to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// The regret-matching strategy of the current iteration.
    Current,
    /// The time-averaged strategy (the equilibrium approximation).
    Average,
}

/// Expected utility of `node` for `player` when both players follow `table`.
///
/// Information sets missing from the table are played uniformly.
pub fn expected_value<N: GameTreeNode, D: DiscountSchedule>(
    node: N,
    player: usize,
    table: &PolicyTable<D>,
    kind: StrategyKind,
) -> f64 {
    let value = match node.node_type() {
        NodeType::Terminal => node.utility(player),
        NodeType::Chance => (0..node.num_children())
            .map(|i| {
                node.get_child_probability(i)
                    * expected_value(node.get_child(i), player, table, kind)
            })
            .sum(),
        NodeType::Player => {
            let n = node.num_children();
            let key = node.info_set(node.player()).key();
            let strategy = match table.get(&key) {
                Some(policy) => match kind {
                    StrategyKind::Current => policy.current_strategy().to_vec(),
                    StrategyKind::Average => policy.average_strategy(),
                },
                None => vec![1.0 / n as f32; n],
            };
            strategy
                .iter()
                .enumerate()
                .map(|(i, &p)| p as f64 * expected_value(node.get_child(i), player, table, kind))
                .sum()
        }
    };

    node.close();
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::table::StrategyProfile;
    use crate::games::kuhn::KuhnNode;
    use crate::games::tree::TreeNode;

    #[test]
    fn test_uniform_value_of_explicit_tree() {
        let root = TreeNode::chance(vec![
            (0.5, TreeNode::terminal(2.0)),
            (
                0.5,
                TreeNode::player(1, "x", vec![TreeNode::terminal(0.0), TreeNode::terminal(4.0)]),
            ),
        ]);
        let table: PolicyTable = PolicyTable::default();
        let value = expected_value(root.clone(), 0, &table, StrategyKind::Current);
        assert!((value - 2.0).abs() < 1e-9);
        let value = expected_value(root, 1, &table, StrategyKind::Current);
        assert!((value + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_kuhn_is_zero_sum() {
        let table: PolicyTable = PolicyTable::default();
        let v0 = expected_value(KuhnNode::new(), 0, &table, StrategyKind::Current);
        let v1 = expected_value(KuhnNode::new(), 1, &table, StrategyKind::Current);
        assert!((v0 + v1).abs() < 1e-9);
    }

    #[test]
    fn test_uses_stored_strategy() {
        let root = TreeNode::player(0, "r", vec![TreeNode::terminal(1.0), TreeNode::terminal(5.0)]);
        let mut table: PolicyTable = PolicyTable::default();
        table.policy(b"r", 2).unwrap().add_weighted_regret(1.0, &[0.0, 1.0]);
        table.update();
        let value = expected_value(root, 0, &table, StrategyKind::Current);
        assert!((value - 5.0).abs() < 1e-9);
    }
}
