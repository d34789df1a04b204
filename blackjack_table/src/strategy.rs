use crate::card::{Card, Rank, Suit};
use crate::rules::{can_double_down, can_split, RuleContext};
use crate::table::hand::{Hand, Owner};
use crate::table::player::Player;
use crate::{Action, TableError};

pub trait Strategy {
    /// Picks the action for `hand` given the numeric value of the dealer's
    /// up-card, counting an Ace as 1.
    ///
    /// Returns `TableError::Undecidable` when `dealer_up` is outside 1..=11,
    /// which is what a dealer without an up-card reports.
    fn decide(&self, hand: &Hand, ctx: &RuleContext, dealer_up: u32) -> Result<Action, TableError>;
}

/// A fixed decision table over pairs and hard totals. It only ever answers hit,
/// stand, double or split.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStrategy;

impl Strategy for BasicStrategy {
    fn decide(&self, hand: &Hand, ctx: &RuleContext, dealer_up: u32) -> Result<Action, TableError> {
        if !hand.active || hand.cards.len() < 2 {
            return Ok(Action::Stand);
        }
        if !(1..=11).contains(&dealer_up) {
            return Err(TableError::Undecidable {
                hand: hand.to_string(),
                dealer_up,
            });
        }

        let up = dealer_up;
        let hard = hand.peek_value(false);
        let splittable = can_split(hand, ctx);
        let doubleable = can_double_down(hand, ctx);

        if !splittable && hand.cards[0].is_ace() && hand.cards[1].is_ace() {
            return Ok(Action::Stand);
        }

        if splittable {
            let action = if hand.cards[0].is_ace() {
                Action::Split
            } else {
                match hard {
                    20 => Action::Stand,
                    18 if up >= 8 => Action::Stand,
                    18 => Action::Split,
                    16 | 14 if up >= 8 => Action::Hit,
                    16 | 14 => Action::Split,
                    8 | 10 if (2..=7).contains(&up) => Action::Double,
                    8 | 10 => Action::Hit,
                    _ if (2..=6).contains(&up) => Action::Split,
                    _ => Action::Hit,
                }
            };
            return Ok(action);
        }

        let action = match hard {
            0..=8 => Action::Hit,
            9 if (3..=6).contains(&up) && doubleable => Action::Double,
            10 if (2..=9).contains(&up) && doubleable => Action::Double,
            11 if doubleable => Action::Double,
            9..=11 => Action::Hit,
            12..=16 if (2..=6).contains(&up) => Action::Stand,
            12..=16 => Action::Hit,
            _ => Action::Stand,
        };
        Ok(action)
    }
}

/// One row of the strategy chart: a two-card start and the decision against
/// every dealer up-card in `ChartRow::dealer_up_cards` order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub first: Rank,
    pub second: Rank,
    pub actions: Vec<Option<Action>>,
}

impl ChartRow {
    pub fn dealer_up_cards() -> impl Iterator<Item = Rank> {
        Rank::dealt()
    }
}

/// Runs `strategy` over every two-card start against every dealer up-card.
/// `stack` decides whether splitting and doubling are affordable.
pub fn strategy_chart<S: Strategy>(strategy: &S, stack: i64) -> Vec<ChartRow> {
    let mut rows = Vec::new();
    for first in Rank::dealt() {
        for second in Rank::dealt() {
            let mut hand = Hand::new(Owner::Player(0), 0);
            hand.receive_card(Card::new(Suit::Hearts, first));
            hand.receive_card(Card::new(Suit::Spades, second));

            let actions = ChartRow::dealer_up_cards()
                .map(|up| {
                    let mut dealer = Hand::new(Owner::Dealer, 0);
                    let up_card = Card::new(Suit::Clubs, up);
                    dealer.receive_card(up_card);
                    let mut hole = Card::new(Suit::Diamonds, Rank::Two);
                    hole.masked = true;
                    dealer.receive_card(hole);
                    let ctx = RuleContext::new(&dealer, stack);
                    strategy.decide(&hand, &ctx, up_card.value(true)).ok()
                })
                .collect();
            rows.push(ChartRow {
                first,
                second,
                actions,
            });
        }
    }
    rows
}

/// The wager an automated player puts down: let a push ride, press a winning
/// streak, otherwise bet the minimum. The table clamps the result to the
/// player's stack.
pub fn autoplay_wager(player: &Player, min_wager: i64) -> i64 {
    if player.last_hand_pushed {
        return player.last_wager;
    }
    if player.last_hand_won {
        if player.win_streak > 6 {
            return player.stack;
        }
        if player.win_streak > 3 {
            return player
                .stack
                .min((2 ^ (player.win_streak % 3)) as i64 * min_wager);
        }
    }
    min_wager
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand_of(cards: &[&str]) -> Hand {
        let mut hand = Hand::new(Owner::Player(0), 10);
        for card in cards {
            hand.receive_card(card.parse().unwrap());
        }
        hand
    }

    fn dealer_showing(up: &str) -> Hand {
        let mut dealer = Hand::new(Owner::Dealer, 0);
        dealer.receive_card(up.parse().unwrap());
        let mut hole: Card = "♦7".parse().unwrap();
        hole.masked = true;
        dealer.receive_card(hole);
        dealer
    }

    fn decide(cards: &[&str], up: &str, stack: i64) -> Action {
        let dealer = dealer_showing(up);
        let ctx = RuleContext::new(&dealer, stack);
        let up_value = dealer.cards[0].value(true);
        BasicStrategy
            .decide(&hand_of(cards), &ctx, up_value)
            .unwrap()
    }

    #[test]
    fn pairs() {
        assert_eq!(decide(&["♥A", "♠A"], "♣9", 100), Action::Split);
        assert_eq!(decide(&["♥K", "♠K"], "♣6", 100), Action::Stand);
        assert_eq!(decide(&["♥9", "♠9"], "♣6", 100), Action::Split);
        assert_eq!(decide(&["♥9", "♠9"], "♣9", 100), Action::Stand);
        assert_eq!(decide(&["♥8", "♠8"], "♣6", 100), Action::Split);
        assert_eq!(decide(&["♥8", "♠8"], "♣10", 100), Action::Hit);
        assert_eq!(decide(&["♥5", "♠5"], "♣7", 100), Action::Double);
        assert_eq!(decide(&["♥5", "♠5"], "♣8", 100), Action::Hit);
        assert_eq!(decide(&["♥3", "♠3"], "♣4", 100), Action::Split);
        assert_eq!(decide(&["♥3", "♠3"], "♣A", 100), Action::Hit);
    }

    #[test]
    fn unsplittable_aces_stand() {
        let dealer = dealer_showing("♣9");
        let ctx = RuleContext::new(&dealer, 100);
        let mut aces = hand_of(&["♥A", "♠A"]);
        aces.split = true;
        assert_eq!(BasicStrategy.decide(&aces, &ctx, 9).unwrap(), Action::Stand);
    }

    #[test]
    fn hard_totals() {
        assert_eq!(decide(&["♥2", "♠5"], "♣6", 100), Action::Hit);
        assert_eq!(decide(&["♥4", "♠5"], "♣4", 100), Action::Double);
        assert_eq!(decide(&["♥4", "♠5"], "♣2", 100), Action::Hit);
        assert_eq!(decide(&["♥4", "♠6"], "♣9", 100), Action::Double);
        assert_eq!(decide(&["♥4", "♠6"], "♣K", 100), Action::Hit);
        assert_eq!(decide(&["♥5", "♠6"], "♣A", 100), Action::Double);
        assert_eq!(decide(&["♥10", "♠2"], "♣4", 100), Action::Stand);
        assert_eq!(decide(&["♥10", "♠6"], "♣7", 100), Action::Hit);
        assert_eq!(decide(&["♥10", "♠7"], "♣A", 100), Action::Stand);
        assert_eq!(decide(&["♥A", "♠7"], "♣9", 100), Action::Stand);
    }

    #[test]
    fn double_falls_back_to_hit_when_unaffordable() {
        assert_eq!(decide(&["♥5", "♠6"], "♣6", 5), Action::Hit);
    }

    #[test]
    fn inactive_hands_stand() {
        let dealer = dealer_showing("♣9");
        let ctx = RuleContext::new(&dealer, 100);
        let mut hand = hand_of(&["♥5", "♠6"]);
        hand.active = false;
        assert_eq!(BasicStrategy.decide(&hand, &ctx, 9).unwrap(), Action::Stand);
        assert_eq!(
            BasicStrategy.decide(&hand_of(&["♥5"]), &ctx, 9).unwrap(),
            Action::Stand
        );
    }

    #[test]
    fn unknown_up_card_is_undecidable() {
        let dealer = dealer_showing("♣9");
        let ctx = RuleContext::new(&dealer, 100);
        let result = BasicStrategy.decide(&hand_of(&["♥5", "♠6"]), &ctx, 0);
        match result {
            Err(TableError::Undecidable { hand, dealer_up }) => {
                assert_eq!(hand, "♥5 ♠6");
                assert_eq!(dealer_up, 0);
            }
            other => panic!("unexpected decision {:?}", other),
        }
        let message = BasicStrategy
            .decide(&hand_of(&["♥5", "♠6"]), &ctx, 12)
            .unwrap_err()
            .to_string();
        assert!(message.starts_with("I didn't understand... What should I do?"));
    }

    #[test]
    fn chart_covers_every_start() {
        let chart = strategy_chart(&BasicStrategy, 100);
        assert_eq!(chart.len(), 13 * 13);
        assert!(chart.iter().all(|row| row.actions.len() == 13));
        assert!(chart
            .iter()
            .all(|row| row.actions.iter().all(|action| action.is_some())));

        let eights = chart
            .iter()
            .find(|row| row.first == Rank::Eight && row.second == Rank::Eight)
            .unwrap();
        // Dealer up-cards run Two..Ace.
        assert_eq!(eights.actions[0], Some(Action::Split));
        assert_eq!(eights.actions[12], Some(Action::Split));
    }

    #[test]
    fn wager_policy() {
        let mut player = Player::new(1000, 10);
        assert_eq!(autoplay_wager(&player, 10), 10);

        player.last_hand_pushed = true;
        player.last_wager = 40;
        assert_eq!(autoplay_wager(&player, 10), 40);

        player.last_hand_pushed = false;
        player.last_hand_won = true;
        player.win_streak = 2;
        assert_eq!(autoplay_wager(&player, 10), 10);
        player.win_streak = 4;
        assert_eq!(autoplay_wager(&player, 10), (2 ^ 1) * 10);
        player.win_streak = 5;
        assert_eq!(autoplay_wager(&player, 10), 0);
        player.win_streak = 7;
        assert_eq!(autoplay_wager(&player, 10), 1000);
    }
}
