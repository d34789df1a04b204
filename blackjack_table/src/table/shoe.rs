use log::info;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::card::{Card, Rank, Suit};
use crate::TableError;

const DIE_SIDES: usize = 20;
const CARDS_PER_DECK: usize = 52;

/// Represents a shoe in the real world: several shuffled decks, a draw index and
/// a cut card. The running Hi-Lo count of every card dealt face up is kept here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Shoe {
    number_of_decks: u8,
    without_tens: bool,
    cards: Vec<Card>,
    cut: usize,
    index: usize,
    running_count: i32,
}

impl Shoe {
    /// Creates a shuffled shoe that is cut and has its first card burned.
    /// Spanish decks leave out every ten.
    pub fn new(number_of_decks: u8, without_tens: bool) -> Shoe {
        let number_of_decks = number_of_decks.max(1);
        let mut rng = thread_rng();
        let mut cards = Vec::with_capacity(number_of_decks as usize * CARDS_PER_DECK);
        for _ in 0..number_of_decks {
            let mut deck: Vec<Card> = Suit::iter()
                .flat_map(|suit| Rank::dealt().map(move |rank| Card::new(suit, rank)))
                .filter(|card| !(without_tens && card.rank == Rank::Ten))
                .collect();
            deck.shuffle(&mut rng);
            cards.extend(deck);
        }

        let mut shoe = Shoe {
            number_of_decks,
            without_tens,
            cards,
            cut: 0,
            index: 0,
            running_count: 0,
        };
        shoe.shuffle();
        shoe.burn();
        shoe.cut_shoe();
        shoe
    }

    /// Creates a shoe that deals the given cards first, then random cards up to
    /// 52 per deck. The draw index starts at the first given card.
    pub fn fixed(number_of_decks: u8, firsts: &[&str]) -> Result<Shoe, TableError> {
        let number_of_decks = number_of_decks.max(1);
        let mut cards = firsts
            .iter()
            .map(|card| card.parse())
            .collect::<Result<Vec<Card>, TableError>>()?;

        let mut rng = thread_rng();
        let suits: Vec<Suit> = Suit::iter().collect();
        let ranks: Vec<Rank> = Rank::iter().collect();
        while cards.len() < number_of_decks as usize * CARDS_PER_DECK {
            let suit = suits[rng.gen_range(0..suits.len())];
            let rank = match ranks[rng.gen_range(0..ranks.len())] {
                Rank::One => Rank::Ace,
                rank => rank,
            };
            cards.push(Card::new(suit, rank));
        }

        let mut shoe = Shoe {
            number_of_decks,
            without_tens: false,
            cards,
            cut: 0,
            index: 0,
            running_count: 0,
        };
        shoe.cut_shoe();
        Ok(shoe)
    }

    /// Shuffles every card of the shoe in place.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut thread_rng());
    }

    /// Places the cut card. Two d20 are rolled until their sum is at most 80% of
    /// the highest possible sum, and the cut lands at that fraction of the shoe.
    pub fn cut_shoe(&mut self) {
        let mut rng = thread_rng();
        let limit = (2 * DIE_SIDES) * 4 / 5;
        let roll = loop {
            let sum = rng.gen_range(1..=DIE_SIDES) + rng.gen_range(1..=DIE_SIDES);
            if sum <= limit {
                break sum;
            }
        };
        self.cut = self.cards.len() * roll / (2 * DIE_SIDES);
    }

    /// Discards the next card. Never moves past the last card.
    pub fn burn(&mut self) {
        self.index = (self.index + 1).min(self.cards.len().saturating_sub(1));
    }

    /// Deals the next card face up and adds it to the running count.
    pub fn deal(&mut self) -> Card {
        let card = self.draw();
        self.running_count += card.hi_lo();
        card
    }

    /// Deals the next card face down. Masked cards are not counted.
    pub fn deal_masked(&mut self) -> Card {
        let mut card = self.draw();
        card.masked = true;
        card
    }

    fn draw(&mut self) -> Card {
        if self.cards.is_empty() {
            *self = Shoe::new(self.number_of_decks, self.without_tens);
        }
        if self.index >= self.cards.len() {
            info!("Shoe ran out mid-round, reshuffling");
            self.reshuffle();
        }
        let card = self.cards[self.index].clean();
        self.index += 1;
        card
    }

    /// Checks if the cut card has been reached.
    pub fn reached_cut_card(&self) -> bool {
        self.cut <= self.index
    }

    /// Reshuffles the whole shoe once the cut card has been reached. Returns
    /// whether a reshuffle happened.
    pub fn shuffle_if_needed(&mut self) -> bool {
        if !self.reached_cut_card() {
            return false;
        }
        info!(
            "Cut card reached at {} of {}, reshuffling",
            self.index,
            self.cards.len()
        );
        self.reshuffle();
        true
    }

    fn reshuffle(&mut self) {
        self.shuffle();
        self.cut_shoe();
        self.index = 0;
        self.burn();
        self.running_count = 0;
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cut(&self) -> usize {
        self.cut
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn number_of_decks(&self) -> u8 {
        self.number_of_decks
    }

    /// Fraction of the shoe already dealt.
    pub fn penetration(&self) -> f64 {
        if self.cards.is_empty() {
            return 0.0;
        }
        self.index as f64 / self.cards.len() as f64
    }
}
