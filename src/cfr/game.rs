//! Game tree capability consumed by the sampling engines.
//!
//! The engines never see a concrete game. Anything that can answer the
//! questions below (what kind of node is this, who acts, what are the
//! children, what is the payoff) can be solved.

use rand::Rng;

/// The kind of a node in an extensive-form game tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Nature moves; children are reached with fixed probabilities.
    Chance,
    /// A player chooses among the children.
    Player,
    /// The game is over and payoffs are defined.
    Terminal,
}

/// What a player has observed at a decision point.
///
/// Two nodes whose info sets share a key are the same decision point for
/// regret accounting. The key is an arbitrary byte string: a readable history,
/// an abstraction bucket, or a hash all work.
pub trait InfoSet {
    /// Unique key of this information set.
    fn key(&self) -> Vec<u8>;
}

/// A node in a two-player zero-sum extensive-form game tree.
///
/// Nodes own whatever resources back their subtree. The engines call
/// [`GameTreeNode::close`] exactly once per visited node, right after the
/// node's value has been folded into its parent.
pub trait GameTreeNode: Sized {
    /// Info set type exposed at player nodes.
    type InfoSet: InfoSet;

    /// The kind of this node.
    fn node_type(&self) -> NodeType;

    /// Release resources held by this node.
    fn close(self) {
        drop(self);
    }

    /// Number of direct children.
    fn num_children(&self) -> usize;

    /// Build the `i`th child.
    fn get_child(&self, i: usize) -> Self;

    /// Probability of the `i`th child. Only meaningful at chance nodes.
    fn get_child_probability(&self, i: usize) -> f64;

    /// Sample one child of a chance node according to its branching
    /// probabilities, returning the child and the probability it was drawn with.
    fn sample_child<R: Rng + ?Sized>(&self, rng: &mut R) -> (Self, f64) {
        sample_chance_node(self, rng)
    }

    /// The acting player (0 or 1). Only meaningful at player nodes.
    fn player(&self) -> usize;

    /// The information set of this node as seen by `player`.
    fn info_set(&self, player: usize) -> Self::InfoSet;

    /// Payoff for `player`. Only meaningful at terminal nodes.
    fn utility(&self, player: usize) -> f64;
}

/// Sample a child of a chance node by walking the CDF of its child probabilities.
pub fn sample_chance_node<N, R>(node: &N, rng: &mut R) -> (N, f64)
where
    N: GameTreeNode,
    R: Rng + ?Sized,
{
    let n = node.num_children();
    debug_assert!(n > 0, "chance node without children");

    let x: f64 = rng.gen();
    let mut cumulative = 0.0;
    for i in 0..n {
        let p = node.get_child_probability(i);
        cumulative += p;
        if x < cumulative {
            return (node.get_child(i), p);
        }
    }

    // Rounding can leave the CDF a hair short of 1.
    let last = n - 1;
    (node.get_child(last), node.get_child_probability(last))
}

/// Sign that converts a value from `current` player's perspective to `last` player's.
#[inline]
pub(crate) fn perspective_sign(last: usize, current: usize) -> f32 {
    if last == current {
        1.0
    } else {
        -1.0
    }
}

/// Player whose perspective the value of `root` is reported from.
#[inline]
pub(crate) fn root_player<N: GameTreeNode>(root: &N) -> usize {
    match root.node_type() {
        NodeType::Player => root.player(),
        NodeType::Chance | NodeType::Terminal => 0,
    }
}
