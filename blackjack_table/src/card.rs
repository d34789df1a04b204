use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Spades,
    Clubs,
    Diamonds,
}

impl Suit {
    pub fn symbol(&self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Spades => '♠',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
        }
    }

    pub fn is_red(&self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    fn from_symbol(symbol: char) -> Option<Suit> {
        match symbol {
            '♥' | 'H' | 'h' => Some(Suit::Hearts),
            '♠' | 'S' | 's' => Some(Suit::Spades),
            '♣' | 'C' | 'c' => Some(Suit::Clubs),
            '♦' | 'D' | 'd' => Some(Suit::Diamonds),
            _ => None,
        }
    }
}

/// Card ranks. `One` is the demoted form of an Ace and never appears in a
/// freshly built deck.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Serialize, Deserialize,
)]
pub enum Rank {
    One = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub fn label(&self) -> &'static str {
        match self {
            Rank::One | Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    fn from_label(label: &str) -> Option<Rank> {
        // "A" always reads back as the promoted Ace.
        Rank::dealt().find(|rank| rank.label() == label)
    }

    /// Every rank a deck is built from.
    pub fn dealt() -> impl Iterator<Item = Rank> {
        Rank::iter().filter(|rank| *rank != Rank::One)
    }
}

/// A card in the shoe or in a hand. The suit and rank are its identity, the
/// flags are markup that only lives while the card sits in one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    #[serde(default)]
    pub masked: bool,
    #[serde(default)]
    pub demoted: bool,
    #[serde(default)]
    pub double_down: bool,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Card {
        Card {
            suit,
            rank,
            masked: false,
            demoted: false,
            double_down: false,
        }
    }

    /// The same card with every flag cleared.
    pub fn clean(&self) -> Card {
        Card::new(self.suit, self.rank)
    }

    /// Blackjack value of the card. A soft value counts an Ace as 1, a hard
    /// value counts it as 11. Masked cards are worth nothing and demoted cards
    /// are always worth 1.
    pub fn value(&self, soft: bool) -> u32 {
        if self.masked {
            return 0;
        }
        if self.demoted {
            return 1;
        }
        match self.rank {
            Rank::One => 1,
            Rank::Ace => {
                if soft {
                    1
                } else {
                    11
                }
            }
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            rank => rank as u32,
        }
    }

    /// Poker ranking used by the side bets: Ace is 14 unless demoted.
    pub fn pips(&self) -> u32 {
        if self.demoted {
            return 1;
        }
        self.rank as u32
    }

    pub fn is_ace(&self) -> bool {
        matches!(self.rank, Rank::One | Rank::Ace)
    }

    pub fn is_one_eyed_jack(&self) -> bool {
        self.rank == Rank::Jack && matches!(self.suit, Suit::Hearts | Suit::Spades)
    }

    /// Hi-Lo weight of the card once it is seen.
    pub fn hi_lo(&self) -> i32 {
        match self.rank {
            Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 1,
            Rank::Seven | Rank::Eight | Rank::Nine => 0,
            _ => -1,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit.symbol(), self.rank.label())
    }
}

impl FromStr for Card {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let mut chars = text.chars();
        let suit = chars
            .next()
            .and_then(Suit::from_symbol)
            .ok_or_else(|| TableError::InvalidCard(s.to_string()))?;
        let rank =
            Rank::from_label(chars.as_str()).ok_or_else(|| TableError::InvalidCard(s.to_string()))?;
        Ok(Card::new(suit, rank))
    }
}

/// Every (suit, rank) pair, including the `One` alias.
pub fn all_cards() -> impl Iterator<Item = Card> {
    Suit::iter().flat_map(|suit| Rank::iter().map(move |rank| Card::new(suit, rank)))
}
