//! Kuhn Poker implementation for CFR validation.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because it has a known, mathematically proven Nash equilibrium.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack (0), Queen (1), King (2)
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card
//! - Player 1 acts first: Pass or Bet (1 chip)
//! - Player 2 responds based on P1's action
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! Deal (6 outcomes, 1/6 each)
//! └── P1 (first to act)
//!     ├── Pass
//!     │   └── P2
//!     │       ├── Pass → Showdown (pot = 2)
//!     │       └── Bet
//!     │           └── P1
//!     │               ├── Pass → P2 wins (pot = 3)
//!     │               └── Bet → Showdown (pot = 4)
//!     └── Bet
//!         └── P2
//!             ├── Pass → P1 wins (pot = 3)
//!             └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium
//!
//! - **Player 1 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **Player 1 with Queen**: Always Pass
//! - **Player 1 with King**: Bet with probability 3α
//! - **Player 2 facing Bet with Jack**: Always Fold
//! - **Player 2 facing Bet with Queen**: Call with probability 1/3
//! - **Player 2 facing Bet with King**: Always Call
//!
//! **Expected Value**: Player 1 EV = -1/18 ≈ -0.0556
//!
//! Information set keys are `"{card}:{history}"`, e.g. `"0:pb"` is player 1
//! holding the Jack after pass, bet. Action 0 is Pass, action 1 is Bet.

use std::fmt;

use crate::cfr::game::{GameTreeNode, InfoSet, NodeType};

/// Actions in Kuhn Poker, in child order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl KuhnAction {
    /// Both actions, indexed by child number.
    pub const ALL: [KuhnAction; 2] = [KuhnAction::Pass, KuhnAction::Bet];

    fn symbol(self) -> char {
        match self {
            KuhnAction::Pass => 'p',
            KuhnAction::Bet => 'b',
        }
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Information state in Kuhn Poker.
///
/// What a player knows: their card and the action history.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KuhnInfoSet {
    /// Player's card (0=Jack, 1=Queen, 2=King)
    pub card: u8,
    /// Action history as string (e.g., "pb" = pass then bet)
    pub history: String,
}

impl InfoSet for KuhnInfoSet {
    fn key(&self) -> Vec<u8> {
        format!("{}:{}", self.card, self.history).into_bytes()
    }
}

impl fmt::Display for KuhnInfoSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", card_symbol(self.card), self.history)
    }
}

/// A node of the Kuhn Poker tree.
///
/// The root is the chance node dealing the cards; every other node carries
/// the dealt cards and the betting history so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KuhnNode {
    cards: Option<[u8; 2]>,
    history: String,
}

impl Default for KuhnNode {
    fn default() -> Self {
        Self::new()
    }
}

impl KuhnNode {
    /// Every deal, `[player 1 card, player 2 card]`, in chance-child order.
    pub const DEALS: [[u8; 2]; 6] = [[0, 1], [0, 2], [1, 0], [1, 2], [2, 0], [2, 1]];

    /// The chance node at the root of the game.
    pub fn new() -> Self {
        Self {
            cards: None,
            history: String::new(),
        }
    }

    /// Player 1's first decision after a specific deal.
    pub fn dealt(cards: [u8; 2]) -> Self {
        Self {
            cards: Some(cards),
            history: String::new(),
        }
    }

    /// Cards dealt to each player, `None` before the deal.
    pub fn cards(&self) -> Option<[u8; 2]> {
        self.cards
    }

    /// Action history as a string of `p`/`b`.
    pub fn history(&self) -> &str {
        &self.history
    }

    /// Get card name for display.
    pub fn card_name(card: u8) -> &'static str {
        match card {
            0 => "Jack",
            1 => "Queen",
            2 => "King",
            _ => "Unknown",
        }
    }

    fn is_terminal(&self) -> bool {
        // "pp" - both pass, showdown
        // "pbp" - pass, bet, fold
        // "pbb" - pass, bet, call
        // "bp" - bet, fold
        // "bb" - bet, call
        matches!(self.history.as_str(), "pp" | "pbp" | "pbb" | "bp" | "bb")
    }

    /// Payoff for player 0; player 1's is the negation.
    fn p0_payoff(&self, cards: [u8; 2]) -> f64 {
        let p0_wins = cards[0] > cards[1];
        match self.history.as_str() {
            // Showdown after both pass: win or lose the ante.
            "pp" => {
                if p0_wins {
                    1.0
                } else {
                    -1.0
                }
            }
            // Player 2 folded to a bet.
            "bp" => 1.0,
            // Player 1 folded after checking.
            "pbp" => -1.0,
            // Showdown after bet-call.
            "bb" | "pbb" => {
                if p0_wins {
                    2.0
                } else {
                    -2.0
                }
            }
            _ => 0.0,
        }
    }
}

fn card_symbol(card: u8) -> &'static str {
    match card {
        0 => "J",
        1 => "Q",
        2 => "K",
        _ => "?",
    }
}

impl fmt::Display for KuhnNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cards {
            Some([a, b]) => write!(
                f,
                "P1:{} P2:{} History:{}",
                card_symbol(a),
                card_symbol(b),
                self.history
            ),
            None => write!(f, "Deal"),
        }
    }
}

impl GameTreeNode for KuhnNode {
    type InfoSet = KuhnInfoSet;

    fn node_type(&self) -> NodeType {
        if self.cards.is_none() {
            NodeType::Chance
        } else if self.is_terminal() {
            NodeType::Terminal
        } else {
            NodeType::Player
        }
    }

    fn num_children(&self) -> usize {
        match self.node_type() {
            NodeType::Chance => Self::DEALS.len(),
            NodeType::Player => KuhnAction::ALL.len(),
            NodeType::Terminal => 0,
        }
    }

    fn get_child(&self, i: usize) -> Self {
        match self.cards {
            None => Self::dealt(Self::DEALS[i]),
            Some(cards) => {
                let mut history = self.history.clone();
                history.push(KuhnAction::ALL[i].symbol());
                Self {
                    cards: Some(cards),
                    history,
                }
            }
        }
    }

    fn get_child_probability(&self, _i: usize) -> f64 {
        if self.cards.is_none() {
            1.0 / Self::DEALS.len() as f64
        } else {
            0.0
        }
    }

    fn player(&self) -> usize {
        // After "pb", P1 acts again.
        match self.history.as_str() {
            "p" | "b" => 1,
            _ => 0,
        }
    }

    fn info_set(&self, player: usize) -> KuhnInfoSet {
        let card = self.cards.map_or(0, |cards| cards[player]);
        KuhnInfoSet {
            card,
            history: self.history.clone(),
        }
    }

    fn utility(&self, player: usize) -> f64 {
        let payoff = match self.cards {
            Some(cards) if self.is_terminal() => self.p0_payoff(cards),
            _ => return 0.0,
        };
        if player == 0 {
            payoff
        } else {
            -payoff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::discount::DiscountParams;
    use crate::cfr::eval::{expected_value, StrategyKind};
    use crate::cfr::table::PolicyTable;
    use crate::cfr::{ChanceSampling, NodeStrategy, Sampler, StrategyProfile};

    #[test]
    fn test_kuhn_game_tree() {
        let root = KuhnNode::new();
        assert_eq!(root.node_type(), NodeType::Chance);
        assert_eq!(root.num_children(), 6);
        let total: f64 = (0..6).map(|i| root.get_child_probability(i)).sum();
        assert!((total - 1.0).abs() < 1e-12);

        let dealt = root.get_child(4);
        assert_eq!(dealt.cards(), Some([2, 0]));
        assert_eq!(dealt.node_type(), NodeType::Player);
        assert_eq!(dealt.player(), 0);
        assert_eq!(dealt.num_children(), 2);
    }

    #[test]
    fn test_kuhn_terminal_payoffs() {
        // K vs J, both pass: higher card wins.
        let pp = KuhnNode::dealt([2, 0]).get_child(0).get_child(0);
        assert_eq!(pp.node_type(), NodeType::Terminal);
        assert_eq!(pp.utility(0), 1.0);
        assert_eq!(pp.utility(1), -1.0);

        // J vs K, bet then fold.
        let bp = KuhnNode::dealt([0, 2]).get_child(1).get_child(0);
        assert_eq!(bp.history(), "bp");
        assert_eq!(bp.utility(0), 1.0);

        // J vs K, bet then call.
        let bb = KuhnNode::dealt([0, 2]).get_child(1).get_child(1);
        assert_eq!(bb.utility(0), -2.0);
        assert_eq!(bb.utility(1), 2.0);

        // Check, bet, fold.
        let pbp = KuhnNode::dealt([2, 1]).get_child(0).get_child(1).get_child(0);
        assert_eq!(pbp.node_type(), NodeType::Terminal);
        assert_eq!(pbp.utility(0), -1.0);
    }

    #[test]
    fn test_kuhn_info_sets() {
        // Q vs K after a pass: P2 to act with the King.
        let node = KuhnNode::dealt([1, 2]).get_child(0);
        assert_eq!(node.player(), 1);

        let info = node.info_set(node.player());
        assert_eq!(info.card, 2);
        assert_eq!(info.history, "p");
        assert_eq!(info.key(), b"2:p".to_vec());

        // P1 acts again after pass, bet.
        let pb = node.get_child(1);
        assert_eq!(pb.player(), 0);
        assert_eq!(pb.info_set(0).key(), b"1:pb".to_vec());
    }

    #[test]
    fn test_kuhn_cfr_convergence() {
        let mut sampler = ChanceSampling::with_seed(PolicyTable::new(DiscountParams::dcfr()), 42);
        for _ in 0..50_000 {
            sampler.run(KuhnNode::new()).unwrap();
            sampler.profile_mut().update();
        }

        // 3 cards × 4 decision histories.
        let table = sampler.profile();
        assert_eq!(table.len(), 12);

        let avg = |key: &str| table.get(key.as_bytes()).unwrap().average_strategy();

        // Queen should mostly pass
        assert!(avg("1:")[0] > 0.9, "queen pass {:?}", avg("1:"));

        // King bets three times as often as Jack bluffs.
        let jack_bet = avg("0:")[1];
        let king_bet = avg("2:")[1];
        assert!(jack_bet < 0.4, "jack bet {}", jack_bet);
        assert!((king_bet - 3.0 * jack_bet).abs() < 0.15, "jack {} king {}", jack_bet, king_bet);

        // P2 with Jack always folds, with King always calls.
        assert!(avg("0:b")[0] > 0.95, "P2 Jack should fold to bet");
        assert!(avg("2:b")[1] > 0.95, "P2 King should call bet");

        // P2 with Queen calls about a third of the time.
        let queen_call = avg("1:b")[1];
        assert!(queen_call > 0.2 && queen_call < 0.5, "queen call {}", queen_call);

        let value = expected_value(KuhnNode::new(), 0, table, StrategyKind::Average);
        assert!((value + 1.0 / 18.0).abs() < 0.01, "game value {}", value);
    }
}
