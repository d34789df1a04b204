use log::debug;

use crate::rules::is_blackjack;
use crate::state::{BlackjackState, Stats};
use crate::table::hand::Hand;
use crate::table::player::Player;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    /// Wager returned plus the given profit.
    Win(i64),
    Push,
    Loss,
}

/// The total a hand stands on: the hard total when it fits, the soft one
/// otherwise.
fn resolved_value(hand: &mut Hand) -> u32 {
    let soft = hand.value(true);
    let hard = hand.value(false);
    if hard != soft && hard <= 21 {
        hard
    } else {
        soft
    }
}

/// Pays insurance to every insured hand. Called once the dealer shows a blackjack.
pub fn pay_insured(state: &mut BlackjackState) {
    let BlackjackState { players, house, .. } = state;
    for player in players.iter_mut() {
        for hand in player.hands.iter_mut() {
            if hand.insured && hand.insurance_wager > 0 {
                player.stack += 2 * hand.insurance_wager;
                *house -= hand.insurance_wager;
                hand.insurance_wager = 0;
            }
        }
    }
}

/// Settles every player hand against the dealer.
///
/// `pay_blackjacks` settles hands decided by a blackjack on either side,
/// `pay_all_others` settles the rest, and `update_stats` records dealer results
/// and busts. Running it once with only `pay_blackjacks` and later with only
/// `pay_all_others` settles each hand exactly once.
pub fn pay_winners(
    state: &mut BlackjackState,
    pay_blackjacks: bool,
    pay_all_others: bool,
    update_stats: bool,
) {
    if !pay_blackjacks && !pay_all_others {
        return;
    }
    let BlackjackState {
        dealer,
        players,
        stats,
        house,
        ..
    } = state;
    let Some(dealer_hand) = dealer.hands.first_mut() else {
        return;
    };
    let dealer_value = resolved_value(dealer_hand);
    let dealer_blackjack = is_blackjack(dealer_hand);

    if update_stats {
        if dealer_blackjack {
            stats.dealer_blackjacks += 1;
        } else if dealer_value > 21 {
            stats.dealer_busts += 1;
            stats.record_bust(dealer_hand.cards[0]);
        }
    }

    for player in players.iter_mut() {
        for index in 0..player.hands.len() {
            let hand = &mut player.hands[index];
            if hand.cards.is_empty() {
                continue;
            }
            let value = resolved_value(hand);
            if value > 21 && update_stats {
                stats.player_busts += 1;
                stats.record_bust(hand.cards[0]);
            }

            // Lost insurance is taken even from a hand already paid early.
            if pay_all_others && !dealer_blackjack && hand.insurance_wager > 0 {
                *house += hand.insurance_wager;
                hand.insurance_wager = 0;
            }

            let hand_blackjack = is_blackjack(hand);
            let outcome = if dealer_blackjack {
                if !pay_blackjacks {
                    continue;
                }
                if hand.even_money {
                    Outcome::Win(hand.wager)
                } else if hand_blackjack {
                    Outcome::Push
                } else {
                    Outcome::Loss
                }
            } else if hand_blackjack {
                if !pay_blackjacks {
                    continue;
                }
                stats.player_blackjacks += 1;
                Outcome::Win(hand.wager + hand.wager / 2)
            } else if !pay_all_others {
                continue;
            } else if value > 21 {
                Outcome::Loss
            } else if dealer_value > 21 || value > dealer_value {
                Outcome::Win(hand.wager)
            } else if value == dealer_value {
                Outcome::Push
            } else {
                Outcome::Loss
            };

            let wager = hand.wager;
            hand.winner = matches!(outcome, Outcome::Win(_));
            settle(player, wager, outcome, stats, house);
        }
    }
}

fn settle(player: &mut Player, wager: i64, outcome: Outcome, stats: &mut Stats, house: &mut i64) {
    debug!("Settling a {} wager: {:?}", wager, outcome);
    match outcome {
        Outcome::Win(profit) => {
            player.stack += wager + profit;
            player.winnings += profit;
            player.win_streak += 1;
            player.last_hand_won = true;
            player.last_hand_pushed = false;
            *house -= profit;
            stats.wins += 1;
        }
        Outcome::Push => {
            player.stack += wager;
            player.win_streak = 0;
            player.last_hand_won = false;
            player.last_hand_pushed = true;
            stats.pushes += 1;
        }
        Outcome::Loss => {
            player.winnings -= wager;
            player.win_streak = 0;
            player.last_hand_won = false;
            player.last_hand_pushed = false;
            *house += wager;
            stats.losses += 1;
        }
    }
}
