use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank};

/// Who a hand belongs to. Players are referred to by their seat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Owner {
    Dealer,
    Player(usize),
}

/// One hand of cards together with its wagers and status flags. A player may
/// hold several hands after splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Hand {
    pub owner: Owner,
    pub cards: Vec<Card>,
    pub active: bool,
    pub busted: bool,
    pub double_down: bool,
    pub even_money: bool,
    pub insured: bool,
    pub split: bool,
    pub stand: bool,
    pub winner: bool,
    pub wager: i64,
    pub insurance_wager: i64,
    pub side_wager: i64,
    pub side_winnings: i64,
}

impl Hand {
    /// An inactive hand without cards or wagers.
    pub const fn empty(owner: Owner) -> Hand {
        Hand {
            owner,
            cards: Vec::new(),
            active: false,
            busted: false,
            double_down: false,
            even_money: false,
            insured: false,
            split: false,
            stand: false,
            winner: false,
            wager: 0,
            insurance_wager: 0,
            side_wager: 0,
            side_winnings: 0,
        }
    }

    /// A fresh active hand carrying the given wager.
    pub fn new(owner: Owner, wager: i64) -> Hand {
        Hand {
            active: true,
            wager,
            ..Hand::empty(owner)
        }
    }

    pub fn is_dealer(&self) -> bool {
        self.owner == Owner::Dealer
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// The dealer's up-card, or a player's first card.
    pub fn up_card(&self) -> Option<&Card> {
        self.cards.first()
    }

    /// The dealer's hole card, or a player's second card.
    pub fn hole_card(&self) -> Option<&Card> {
        self.cards.get(1)
    }

    /// Evaluates the hand. A soft evaluation counts un-demoted Aces as 1, a hard
    /// evaluation counts them as 11. Aces demoted to resolve an overflow stay
    /// demoted, and a hand that stays over 21 is marked busted and inactive.
    pub fn value(&mut self, soft: bool) -> u32 {
        let (total, busted) = resolve(&mut self.cards, self.split, soft);
        if busted {
            self.active = false;
            self.busted = true;
            self.winner = false;
        }
        total
    }

    /// Same total as `value`, without writing any demotion or bust back.
    pub fn peek_value(&self, soft: bool) -> u32 {
        let mut cards = self.cards.clone();
        resolve(&mut cards, self.split, soft).0
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, card) in self.cards.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            if card.masked {
                write!(f, "??")?;
            } else {
                write!(f, "{}", card)?;
            }
        }
        Ok(())
    }
}

fn is_ace_pair(cards: &[Card]) -> bool {
    match cards {
        [first, second] => {
            first.rank == Rank::Ace
                && second.rank == Rank::Ace
                && first.masked == second.masked
                && first.demoted == second.demoted
                && first.double_down == second.double_down
        }
        _ => false,
    }
}

/// Returns the total and whether the cards are busted. Each pass demotes at most
/// one Ace, so the loop ends after at most `cards.len()` demotions.
fn resolve(cards: &mut [Card], split: bool, soft: bool) -> (u32, bool) {
    for _ in 0..=cards.len() {
        if is_ace_pair(cards) {
            return (12, false);
        }

        let mut total = 0;
        let mut has_soft_ace = false;
        for card in cards.iter() {
            total += card.value(soft);
            has_soft_ace |= card.rank == Rank::Ace && !card.demoted && soft;
        }

        if total == 21 && split {
            return (21, false);
        }
        if total <= 21 {
            return (total, false);
        }

        let demotable = if has_soft_ace || !soft {
            cards
                .iter_mut()
                .find(|card| card.rank == Rank::Ace && !card.demoted)
        } else {
            None
        };
        match demotable {
            Some(card) => card.demoted = true,
            None => return (total, true),
        }
    }

    let total = cards.iter().map(|card| card.value(soft)).sum();
    (total, total > 21)
}
