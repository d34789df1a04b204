//! Proposition bets settled right after the deal. Every variant looks at the
//! player's first two cards together with the dealer's cards and pays a
//! multiple of the side wager.

use log::info;

use crate::card::{Card, Rank};
use crate::state::BlackjackState;
use crate::table::hand::Hand;
use crate::GameMode;

pub const SPANISH21_MATCH_SUITED: i64 = 12;
pub const SPANISH21_MATCH_UNSUITED: i64 = 3;

/// Pools reset to these amounts (in cents) after they are won.
pub const PROGRESSIVE_RESETS: [i64; 4] = [1_000_000, 500_000, 100_000, 50_000];
/// Cents added to each pool per unit of a losing `TrifectaStaxx` wager.
pub const PROGRESSIVE_SHARES: [i64; 4] = [60, 25, 10, 5];

pub fn is_flush(cards: &[Card]) -> bool {
    cards.len() >= 3 && cards.iter().all(|card| card.suit == cards[0].suit)
}

fn is_run(cards: &[Card], ace_key: u32) -> bool {
    let mut keys: Vec<u32> = cards
        .iter()
        .map(|card| if card.is_ace() { ace_key } else { card.pips() })
        .collect();
    keys.sort_unstable();
    keys.windows(2).all(|pair| pair[1] == pair[0] + 1)
}

/// A contiguous run with Aces counted either high or low.
pub fn is_straight(cards: &[Card]) -> bool {
    cards.len() >= 3 && (is_run(cards, 14) || is_run(cards, 1))
}

pub fn is_straight_flush(cards: &[Card]) -> bool {
    is_straight(cards) && is_flush(cards)
}

/// Every card ten or higher, topped by an Ace.
pub fn is_royal(cards: &[Card]) -> bool {
    !cards.is_empty()
        && cards.iter().all(|card| card.pips() >= 10)
        && cards.iter().map(|card| card.pips()).max() == Some(14)
}

pub fn is_royal_flush(cards: &[Card]) -> bool {
    is_royal(cards) && is_straight_flush(cards)
}

/// A dealt two-card player hand made of two cards of `rank`.
pub fn is_pair_hand(hand: &Hand, rank: Rank, suited: bool) -> bool {
    if hand.is_dealer() || hand.split || hand.cards.len() != 2 {
        return false;
    }
    let (first, second) = (hand.cards[0], hand.cards[1]);
    first.rank == rank && second.rank == rank && (!suited || first.suit == second.suit)
}

fn is_one_eyed_jack_pair(hand: &Hand, suited: bool) -> bool {
    is_pair_hand(hand, Rank::Jack, suited) && hand.cards.iter().all(|card| card.is_one_eyed_jack())
}

/// Two tens, not counting faces.
pub fn is_twenty_hand(hand: &Hand) -> bool {
    is_pair_hand(hand, Rank::Ten, false)
}

/// The three card poker hand made of a player's two cards and the dealer's
/// up-card, in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trifecta {
    cards: [Card; 3],
}

impl Trifecta {
    /// Only a dealt, unsplit two-card player hand forms a trifecta.
    pub fn new(hand: &Hand, dealer_up: &Card) -> Option<Trifecta> {
        if hand.is_dealer() || hand.split {
            return None;
        }
        match hand.cards.as_slice() {
            [first, second] => Some(Trifecta {
                cards: [first.clean(), second.clean(), dealer_up.clean()],
            }),
            _ => None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_pair(&self, rank: Rank) -> bool {
        let matching = self.cards.iter().filter(|card| card.rank == rank).count();
        matching >= 2
    }

    pub fn is_trips(&self, suited: bool) -> bool {
        let [first, second, third] = self.cards;
        let same_rank = (first.rank == second.rank && first.rank == third.rank)
            || self.cards.iter().all(|card| card.is_ace());
        let same_suit = first.suit == second.suit && first.suit == third.suit;
        same_rank && (!suited || same_suit)
    }

    pub fn is_trip_aces(&self, suited: bool) -> bool {
        self.is_trips(suited) && self.cards[0].is_ace()
    }

    pub fn is_triplet(&self, rank: Rank) -> bool {
        self.is_trips(false) && self.cards[0].rank == rank
    }

    pub fn is_straight(&self) -> bool {
        is_straight(&self.cards)
    }

    pub fn is_flush(&self) -> bool {
        is_flush(&self.cards)
    }

    pub fn is_straight_flush(&self) -> bool {
        is_straight_flush(&self.cards)
    }

    pub fn is_royal_flush(&self) -> bool {
        is_royal_flush(&self.cards)
    }

    pub fn is_jacks_or_better(&self) -> bool {
        [Rank::Jack, Rank::Queen, Rank::King, Rank::Ace]
            .into_iter()
            .any(|rank| self.is_pair(rank))
            || self.is_trips(false)
            || self.is_straight()
            || self.is_flush()
            || self.is_straight_flush()
            || self.is_royal_flush()
    }
}

pub fn jack_attack_winnings(hand: &Hand) -> i64 {
    let multiple = if is_one_eyed_jack_pair(hand, true) {
        100
    } else if is_one_eyed_jack_pair(hand, false) {
        50
    } else if is_pair_hand(hand, Rank::Jack, true) {
        25
    } else if is_pair_hand(hand, Rank::Jack, false) {
        10
    } else if is_twenty_hand(hand) {
        5
    } else {
        0
    };
    multiple * hand.side_wager
}

/// Each of the player's two cards is matched against both dealer cards.
pub fn spanish21_winnings(hand: &Hand, dealer_up: &Card, dealer_hole: &Card) -> i64 {
    let mut winnings = 0;
    for card in hand.cards.iter().take(2) {
        for dealer_card in [dealer_up, dealer_hole] {
            if card.rank != dealer_card.rank {
                continue;
            }
            let multiple = if card.suit == dealer_card.suit {
                SPANISH21_MATCH_SUITED
            } else {
                SPANISH21_MATCH_UNSUITED
            };
            winnings += multiple * hand.side_wager;
        }
    }
    winnings
}

pub fn trifecta_winnings(trifecta: &Trifecta, side_wager: i64) -> i64 {
    let multiple = if trifecta.is_triplet(Rank::Five) {
        60
    } else if trifecta.is_straight_flush() {
        40
    } else if trifecta.is_trips(false) {
        30
    } else if trifecta.is_straight() {
        6
    } else if trifecta.is_flush() {
        4
    } else if trifecta.is_jacks_or_better() {
        2
    } else {
        0
    };
    multiple * side_wager
}

pub fn trifecta3_winnings(trifecta: &Trifecta, side_wager: i64) -> i64 {
    let multiple = if trifecta.is_trips(true) {
        270
    } else if trifecta.is_straight_flush() {
        180
    } else if trifecta.is_trips(false) {
        90
    } else {
        0
    };
    multiple * side_wager
}

/// Pays a pool (converted from cents) on the rarest hands and a fixed amount on
/// the others. A losing wager feeds every pool.
pub fn trifecta_staxx_winnings(
    trifecta: &Trifecta,
    side_wager: i64,
    progressives: &mut [i64; 4],
) -> i64 {
    let jackpot = if trifecta.is_trip_aces(true) {
        Some(0)
    } else if trifecta.is_trip_aces(false) {
        Some(1)
    } else if trifecta.is_triplet(Rank::King) {
        Some(2)
    } else if trifecta.is_triplet(Rank::Queen) {
        Some(3)
    } else {
        None
    };
    if let Some(pool) = jackpot {
        let winnings = progressives[pool] / 100;
        progressives[pool] = PROGRESSIVE_RESETS[pool];
        return winnings;
    }

    if trifecta.is_straight_flush() {
        150
    } else if trifecta.is_trips(false) {
        100
    } else if trifecta.is_straight() {
        30
    } else if trifecta.is_flush() {
        20
    } else {
        for (pool, share) in progressives.iter_mut().zip(PROGRESSIVE_SHARES) {
            *pool += share * side_wager;
        }
        0
    }
}

/// Settles the side bet of the table's game mode for the active hand of every
/// player holding a side wager.
pub fn pay_side_bets(state: &mut BlackjackState, mode: GameMode) {
    if mode == GameMode::Blackjack {
        return;
    }
    let BlackjackState {
        dealer,
        players,
        stats,
        progressives,
        ..
    } = state;
    let dealer_hand = dealer.primary_hand();
    let (Some(up), Some(hole)) = (dealer_hand.up_card(), dealer_hand.hole_card()) else {
        return;
    };

    for (seat, player) in players.iter_mut().enumerate() {
        let Some(hand) = player.active_hand_mut() else {
            continue;
        };
        if hand.side_wager <= 0 {
            continue;
        }

        let trifecta = Trifecta::new(hand, up);
        let winnings = match (mode, trifecta) {
            (GameMode::JackAttack, _) => jack_attack_winnings(hand),
            (GameMode::Spanish21, _) => spanish21_winnings(hand, up, hole),
            (GameMode::Trifecta, Some(trifecta)) => trifecta_winnings(&trifecta, hand.side_wager),
            (GameMode::Trifecta3, Some(trifecta)) => trifecta3_winnings(&trifecta, hand.side_wager),
            (GameMode::TrifectaStaxx, Some(trifecta)) => {
                trifecta_staxx_winnings(&trifecta, hand.side_wager, progressives)
            }
            _ => 0,
        };

        hand.side_winnings = winnings;
        if winnings > 0 {
            info!("Player {} wins {} on the {:?} side bet", seat + 1, winnings, mode);
            player.stack += winnings + hand.side_wager;
            stats.sidebet_winnings += winnings;
        } else {
            stats.sidebet_losings += hand.side_wager;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::hand::Owner;

    fn cards(cards: &[&str]) -> Vec<Card> {
        cards.iter().map(|card| card.parse().unwrap()).collect()
    }

    fn hand_of(cards_str: &[&str], side_wager: i64) -> Hand {
        let mut hand = Hand::new(Owner::Player(0), 10);
        hand.cards = cards(cards_str);
        hand.side_wager = side_wager;
        hand
    }

    fn trifecta(player: &[&str], up: &str) -> Trifecta {
        let up: Card = up.parse().unwrap();
        Trifecta::new(&hand_of(player, 1), &up).unwrap()
    }

    #[test]
    fn flushes_need_three_suited_cards() {
        assert!(is_flush(&cards(&["♥2", "♥9", "♥K"])));
        assert!(!is_flush(&cards(&["♥2", "♥9"])));
        assert!(!is_flush(&cards(&["♥2", "♥9", "♠K"])));
    }

    #[test]
    fn straights_count_aces_high_or_low() {
        assert!(is_straight(&cards(&["♥Q", "♠A", "♣K"])));
        assert!(is_straight(&cards(&["♥3", "♠A", "♣2"])));
        assert!(is_straight(&cards(&["♥7", "♠5", "♣6"])));
        assert!(!is_straight(&cards(&["♥K", "♠A", "♣2"])));
        assert!(!is_straight(&cards(&["♥7", "♠5", "♣5"])));
    }

    #[test]
    fn royal_flush() {
        assert!(is_royal_flush(&cards(&["♠A", "♠Q", "♠K"])));
        assert!(!is_royal_flush(&cards(&["♠J", "♠Q", "♠K"])));
        assert!(!is_royal_flush(&cards(&["♠A", "♥Q", "♠K"])));
    }

    #[test]
    fn trifecta_needs_an_unsplit_player_hand() {
        let up: Card = "♥6".parse().unwrap();
        let mut hand = hand_of(&["♥2", "♥3"], 1);
        assert!(Trifecta::new(&hand, &up).is_some());
        hand.split = true;
        assert!(Trifecta::new(&hand, &up).is_none());

        let mut dealer = hand_of(&["♥2", "♥3"], 0);
        dealer.owner = Owner::Dealer;
        assert!(Trifecta::new(&dealer, &up).is_none());

        let three = hand_of(&["♥2", "♥3", "♥4"], 1);
        assert!(Trifecta::new(&three, &up).is_none());
    }

    #[test]
    fn trips_and_suited_trips() {
        assert!(trifecta(&["♥7", "♠7"], "♣7").is_trips(false));
        assert!(!trifecta(&["♥7", "♠7"], "♣7").is_trips(true));
        assert!(trifecta(&["♥7", "♥7"], "♥7").is_trips(true));
        assert!(!trifecta(&["♥7", "♠7"], "♣8").is_trips(false));
        assert!(trifecta(&["♥A", "♥A"], "♥A").is_trip_aces(true));
        assert!(trifecta(&["♦K", "♠K"], "♣K").is_triplet(Rank::King));
        assert!(!trifecta(&["♦K", "♠K"], "♣K").is_triplet(Rank::Queen));
    }

    #[test]
    fn jacks_or_better() {
        assert!(trifecta(&["♥Q", "♠Q"], "♣3").is_jacks_or_better());
        assert!(trifecta(&["♥3", "♠A"], "♣A").is_jacks_or_better());
        assert!(!trifecta(&["♥10", "♠10"], "♣3").is_jacks_or_better());
        assert!(trifecta(&["♥2", "♥9"], "♥4").is_jacks_or_better());
    }

    #[test]
    fn trifecta_pays_the_best_category() {
        assert_eq!(trifecta_winnings(&trifecta(&["♥5", "♠5"], "♣5"), 2), 120);
        assert_eq!(trifecta_winnings(&trifecta(&["♥4", "♥5"], "♥6"), 2), 80);
        assert_eq!(trifecta_winnings(&trifecta(&["♥9", "♠9"], "♣9"), 2), 60);
        assert_eq!(trifecta_winnings(&trifecta(&["♥4", "♠5"], "♣6"), 2), 12);
        assert_eq!(trifecta_winnings(&trifecta(&["♥2", "♥9"], "♥4"), 2), 8);
        assert_eq!(trifecta_winnings(&trifecta(&["♥K", "♠K"], "♣2"), 2), 4);
        assert_eq!(trifecta_winnings(&trifecta(&["♥2", "♠9"], "♣4"), 2), 0);
    }

    #[test]
    fn trifecta3_pays_suited_trips_most() {
        assert_eq!(trifecta3_winnings(&trifecta(&["♥8", "♥8"], "♥8"), 1), 270);
        assert_eq!(trifecta3_winnings(&trifecta(&["♥4", "♥5"], "♥6"), 1), 180);
        assert_eq!(trifecta3_winnings(&trifecta(&["♥8", "♠8"], "♣8"), 1), 90);
        assert_eq!(trifecta3_winnings(&trifecta(&["♥4", "♠5"], "♣6"), 1), 0);
    }

    #[test]
    fn staxx_pays_and_resets_the_jackpot() {
        let mut pools = [20_000_000, 6_000_000, 3_000_000, 200_000];
        let won = trifecta_staxx_winnings(&trifecta(&["♥A", "♥A"], "♥A"), 5, &mut pools);
        assert_eq!(won, 200_000);
        assert_eq!(pools[0], PROGRESSIVE_RESETS[0]);

        let won = trifecta_staxx_winnings(&trifecta(&["♥Q", "♠Q"], "♣Q"), 5, &mut pools);
        assert_eq!(won, 2_000);
        assert_eq!(pools[3], PROGRESSIVE_RESETS[3]);

        assert_eq!(
            trifecta_staxx_winnings(&trifecta(&["♥4", "♠5"], "♣6"), 5, &mut pools),
            30
        );
    }

    #[test]
    fn losing_staxx_wagers_seed_the_pools() {
        let mut pools = [0; 4];
        let won = trifecta_staxx_winnings(&trifecta(&["♥2", "♠9"], "♣4"), 10, &mut pools);
        assert_eq!(won, 0);
        assert_eq!(pools, [600, 250, 100, 50]);
    }

    #[test]
    fn jack_attack_table() {
        assert_eq!(jack_attack_winnings(&hand_of(&["♥J", "♥J"], 2)), 200);
        assert_eq!(jack_attack_winnings(&hand_of(&["♥J", "♠J"], 2)), 100);
        assert_eq!(jack_attack_winnings(&hand_of(&["♣J", "♣J"], 2)), 50);
        assert_eq!(jack_attack_winnings(&hand_of(&["♣J", "♦J"], 2)), 20);
        assert_eq!(jack_attack_winnings(&hand_of(&["♣10", "♦10"], 2)), 10);
        assert_eq!(jack_attack_winnings(&hand_of(&["♣K", "♦10"], 2)), 0);
    }

    #[test]
    fn spanish21_matches_both_dealer_cards() {
        let up: Card = "♥7".parse().unwrap();
        let hole: Card = "♠7".parse().unwrap();
        let hand = hand_of(&["♥7", "♦2"], 1);
        assert_eq!(spanish21_winnings(&hand, &up, &hole), 12 + 3);
        let hand = hand_of(&["♥7", "♠7"], 2);
        assert_eq!(spanish21_winnings(&hand, &up, &hole), 2 * (12 + 3 + 3 + 12));
        let hand = hand_of(&["♥8", "♠9"], 2);
        assert_eq!(spanish21_winnings(&hand, &up, &hole), 0);
    }

    #[test]
    fn losing_spanish21_match_is_tallied() {
        let rule = crate::Rule {
            number_of_decks: 1,
            min_wager: 10,
            player_start_stack: 90,
            ..Default::default()
        };
        let shoe = crate::table::shoe::Shoe::fixed(1, &[]).unwrap();
        let mut state = BlackjackState::with_shoe(&rule, 1, shoe);
        let mut dealer = Hand::new(Owner::Dealer, 0);
        dealer.cards = cards(&["♥7", "♠7"]);
        state.dealer.hands.push(dealer);
        state.players[0].hands.push(hand_of(&["♥8", "♠9"], 2));

        pay_side_bets(&mut state, GameMode::Spanish21);
        assert_eq!(state.stats.sidebet_losings, 2);
        assert_eq!(state.stats.sidebet_winnings, 0);
        assert_eq!(state.players[0].hands[0].side_winnings, 0);
        assert_eq!(state.players[0].stack, 90);
    }
}
