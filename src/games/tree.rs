//! Games written out as explicit trees.
//!
//! Handy for tiny games (matching pennies, one-shot decisions) and for
//! exercising the engines on hand-built shapes. Subtrees are reference
//! counted, so building a child is a pointer copy.

use std::cell::Cell;
use std::rc::Rc;

use crate::cfr::game::{GameTreeNode, InfoSet, NodeType};

#[derive(Debug)]
enum Tree {
    Terminal(f64),
    Chance(Vec<(f64, TreeNode)>),
    Player {
        player: usize,
        key: Vec<u8>,
        children: Vec<TreeNode>,
    },
}

/// A node of an explicit game tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    tree: Rc<Tree>,
    closes: Option<Rc<Cell<usize>>>,
}

/// Info set label of an explicit player node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeInfoSet(Vec<u8>);

impl InfoSet for TreeInfoSet {
    fn key(&self) -> Vec<u8> {
        self.0.clone()
    }
}

impl TreeNode {
    fn from_tree(tree: Tree) -> Self {
        Self {
            tree: Rc::new(tree),
            closes: None,
        }
    }

    /// Leaf paying `utility` to player 0 and `-utility` to player 1.
    pub fn terminal(utility: f64) -> Self {
        Self::from_tree(Tree::Terminal(utility))
    }

    /// Chance node over `(probability, child)` outcomes.
    pub fn chance(outcomes: Vec<(f64, TreeNode)>) -> Self {
        Self::from_tree(Tree::Chance(outcomes))
    }

    /// Decision node for `player`, labelled with info set `key`.
    ///
    /// Explicit trees only label the acting player's view; both players see
    /// the same key.
    pub fn player(player: usize, key: &str, children: Vec<TreeNode>) -> Self {
        Self::from_tree(Tree::Player {
            player,
            key: key.as_bytes().to_vec(),
            children,
        })
    }

    /// Attach a counter incremented every time this node or any descendant
    /// built from it is closed.
    pub fn counting_closes(mut self) -> (Self, Rc<Cell<usize>>) {
        let counter = Rc::new(Cell::new(0));
        self.closes = Some(Rc::clone(&counter));
        (self, counter)
    }

    fn child(&self, node: &TreeNode) -> TreeNode {
        TreeNode {
            tree: Rc::clone(&node.tree),
            closes: self.closes.clone(),
        }
    }
}

impl GameTreeNode for TreeNode {
    type InfoSet = TreeInfoSet;

    fn node_type(&self) -> NodeType {
        match *self.tree {
            Tree::Terminal(_) => NodeType::Terminal,
            Tree::Chance(_) => NodeType::Chance,
            Tree::Player { .. } => NodeType::Player,
        }
    }

    fn close(self) {
        if let Some(counter) = &self.closes {
            counter.set(counter.get() + 1);
        }
    }

    fn num_children(&self) -> usize {
        match &*self.tree {
            Tree::Terminal(_) => 0,
            Tree::Chance(outcomes) => outcomes.len(),
            Tree::Player { children, .. } => children.len(),
        }
    }

    fn get_child(&self, i: usize) -> Self {
        match &*self.tree {
            Tree::Terminal(_) => panic!("terminal node has no children"),
            Tree::Chance(outcomes) => self.child(&outcomes[i].1),
            Tree::Player { children, .. } => self.child(&children[i]),
        }
    }

    fn get_child_probability(&self, i: usize) -> f64 {
        match &*self.tree {
            Tree::Chance(outcomes) => outcomes[i].0,
            _ => 0.0,
        }
    }

    fn player(&self) -> usize {
        match *self.tree {
            Tree::Player { player, .. } => player,
            _ => 0,
        }
    }

    fn info_set(&self, _player: usize) -> TreeInfoSet {
        match &*self.tree {
            Tree::Player { key, .. } => TreeInfoSet(key.clone()),
            _ => TreeInfoSet(Vec::new()),
        }
    }

    fn utility(&self, player: usize) -> f64 {
        match *self.tree {
            Tree::Terminal(u) if player == 0 => u,
            Tree::Terminal(u) => -u,
            _ => 0.0,
        }
    }
}
