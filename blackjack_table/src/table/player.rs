use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hand::{Hand, Owner};

static EMPTY_DEALER_HAND: Hand = Hand::empty(Owner::Dealer);

/// A seat at the table. The dealer is a player with `dealer` set and a single
/// hand; it never wagers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Player {
    pub dealer: bool,
    pub hands: Vec<Hand>,
    pub stack: i64,
    pub winnings: i64,
    pub win_streak: u32,
    pub last_wager: i64,
    pub last_hand_won: bool,
    pub last_hand_pushed: bool,
}

impl Player {
    /// Seats a player with the given stack. A start stack of 0 rolls a d20 and
    /// buys in for that many times five minimum wagers.
    pub fn new(start_stack: i64, min_wager: i64) -> Player {
        let stack = if start_stack > 0 {
            start_stack
        } else {
            rand::thread_rng().gen_range(1..=20) * 5 * min_wager
        };
        Player {
            stack,
            ..Default::default()
        }
    }

    pub fn dealer() -> Player {
        Player {
            dealer: true,
            ..Default::default()
        }
    }

    /// The first active hand in creation order. Split hands are appended, so
    /// they are played after the hand they came from.
    pub fn active_hand(&self) -> Option<&Hand> {
        self.hands.iter().find(|hand| hand.active)
    }

    pub fn active_hand_index(&self) -> Option<usize> {
        self.hands.iter().position(|hand| hand.active)
    }

    pub fn active_hand_mut(&mut self) -> Option<&mut Hand> {
        self.hands.iter_mut().find(|hand| hand.active)
    }

    /// The first hand, or an empty dealer hand before anything was dealt.
    pub fn primary_hand(&self) -> &Hand {
        self.hands.first().unwrap_or(&EMPTY_DEALER_HAND)
    }
}
