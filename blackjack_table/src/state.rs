use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank};
use crate::table::player::Player;
use crate::table::shoe::Shoe;
use crate::{Rule, TableError};

/// Progressive pools, in cents, paid by `TrifectaStaxx` in descending order of
/// rarity.
pub const PROGRESSIVE_SEEDS: [i64; 4] = [15_000_000, 5_000_000, 2_500_000, 100_000];

/// Aggregate results kept across rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Stats {
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub dealer_blackjacks: u32,
    pub dealer_busts: u32,
    pub player_blackjacks: u32,
    pub player_busts: u32,
    pub bust_cards: Vec<Card>,
    pub bust_counts: BTreeMap<Rank, u32>,
    pub sidebet_winnings: i64,
    pub sidebet_losings: i64,
}

impl Stats {
    /// Records the first card of a busted hand.
    pub fn record_bust(&mut self, first_card: Card) {
        let card = first_card.clean();
        self.bust_cards.push(card);
        *self.bust_counts.entry(card.rank).or_default() += 1;
    }

    pub fn hands(&self) -> u32 {
        self.wins + self.losses + self.pushes
    }

    /// Wins over decided (non-push) hands, as a percentage.
    pub fn win_percentage(&self) -> f64 {
        let decided = (self.wins + self.losses).max(1);
        self.wins as f64 / decided as f64 * 100.0
    }
}

/// Everything that changes while the table runs. One value of this type is
/// threaded through the dealer, the rules and settlement, and it is what gets
/// saved after every action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BlackjackState {
    pub house: i64,
    pub rounds: u32,
    #[serde(flatten)]
    pub stats: Stats,
    pub progressives: [i64; 4],
    pub dealer: Player,
    pub players: Vec<Player>,
    pub shoe: Shoe,
}

impl BlackjackState {
    /// A fresh table with a newly shuffled shoe.
    pub fn new(rule: &Rule, number_of_players: usize) -> Self {
        let shoe = Shoe::new(rule.number_of_decks, rule.without_tens());
        BlackjackState::with_shoe(rule, number_of_players, shoe)
    }

    pub fn with_shoe(rule: &Rule, number_of_players: usize, shoe: Shoe) -> Self {
        let mut rng = rand::thread_rng();
        let progressives = PROGRESSIVE_SEEDS.map(|seed| (rng.gen::<f64>() * seed as f64) as i64);
        let mut state = BlackjackState {
            house: rule.house_start,
            rounds: 0,
            stats: Stats::default(),
            progressives,
            dealer: Player::dealer(),
            players: Vec::new(),
            shoe,
        };
        state.seat_players(rule, number_of_players);
        state
    }

    /// Makes sure exactly `number_of_players` players are seated. A restored
    /// table keeps the players it already had.
    pub fn seat_players(&mut self, rule: &Rule, number_of_players: usize) {
        self.players.truncate(number_of_players);
        while self.players.len() < number_of_players {
            self.players
                .push(Player::new(rule.player_start_stack, rule.min_wager));
        }
        self.dealer.dealer = true;
    }

    pub fn running_count(&self) -> i32 {
        self.shoe.running_count()
    }

    /// Net position of all players: stacks plus winnings.
    pub fn total_net(&self) -> i64 {
        self.players
            .iter()
            .map(|player| player.stack + player.winnings)
            .sum()
    }
}

/// The persistence boundary. The dealer hands the whole state over after every
/// change; a failed save ends the session.
pub trait StateStore {
    fn save(&mut self, state: &BlackjackState) -> Result<(), TableError>;
}

/// Keeps the latest snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saves: usize,
    pub last: Option<BlackjackState>,
}

impl StateStore for MemoryStore {
    fn save(&mut self, state: &BlackjackState) -> Result<(), TableError> {
        self.saves += 1;
        self.last = Some(state.clone());
        Ok(())
    }
}
