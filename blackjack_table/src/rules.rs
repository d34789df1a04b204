//! Legality predicates. Each one answers whether an action is allowed for a
//! hand given the dealer's hand and the owning player's stack. None of them
//! changes the hand: totals are computed with `Hand::peek_value`.

use crate::card::Rank;
use crate::table::hand::Hand;
use crate::table::player::Player;

/// The part of the table a legality check looks at besides the hand itself.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub dealer: &'a Hand,
    pub stack: i64,
}

impl<'a> RuleContext<'a> {
    pub fn new(dealer: &'a Hand, stack: i64) -> Self {
        RuleContext { dealer, stack }
    }

    fn dealer_hole_masked(&self) -> bool {
        self.dealer.hole_card().map_or(false, |card| card.masked)
    }
}

/// Two unsplit cards worth 21. The dealer's hand is checked with the true value
/// of the hole card even while it is still face down.
pub fn is_blackjack(hand: &Hand) -> bool {
    if hand.split || hand.cards.len() != 2 {
        return false;
    }
    if hand.peek_value(false) == 21 {
        return true;
    }
    if hand.is_dealer() {
        let up = hand.cards[0];
        let mut hole = hand.cards[1];
        hole.masked = false;
        return up.value(false) + hole.value(false) == 21;
    }
    false
}

fn is_split_ace(hand: &Hand) -> bool {
    hand.split && hand.up_card().map_or(false, |card| card.rank == Rank::Ace)
}

pub fn can_hit(hand: &Hand, ctx: &RuleContext) -> bool {
    if hand.cards.len() < 2 {
        return false;
    }
    if hand.is_dealer() {
        return hand.peek_value(false) <= 16;
    }
    if can_even_money(hand, ctx)
        || is_blackjack(ctx.dealer)
        || hand.stand
        || hand.double_down
        || is_split_ace(hand)
        || is_blackjack(hand)
    {
        return false;
    }
    if hand.peek_value(false) == 21 {
        return false;
    }
    hand.peek_value(true) < 21
}

pub fn can_double_down(hand: &Hand, ctx: &RuleContext) -> bool {
    if ctx.stack < hand.wager || hand.stand || hand.even_money || hand.double_down {
        return false;
    }
    if ctx.dealer.cards.len() > 1 && !ctx.dealer_hole_masked() {
        return false;
    }
    if hand.cards.len() != 2 {
        return false;
    }
    if hand.split && hand.cards[0].is_ace() {
        return false;
    }
    if is_blackjack(hand) {
        return false;
    }
    hand.peek_value(true) < 21 && hand.peek_value(false) != 21
}

/// Note that a two-card blackjack is always worth a hard 21, so the final
/// check rejects every hand the earlier checks let through.
pub fn can_even_money(hand: &Hand, ctx: &RuleContext) -> bool {
    if hand.split || hand.even_money || hand.stand {
        return false;
    }
    if !ctx.dealer.up_card().map_or(false, |card| card.is_ace()) || !ctx.dealer_hole_masked() {
        return false;
    }
    if hand.cards.len() != 2 || !is_blackjack(hand) {
        return false;
    }
    hand.peek_value(false) != 21
}

pub fn can_insurance(hand: &Hand, ctx: &RuleContext) -> bool {
    let dealer_shows_ace = ctx
        .dealer
        .up_card()
        .map_or(false, |card| card.rank == Rank::Ace);
    if !dealer_shows_ace || hand.split || hand.even_money {
        return false;
    }
    !hand.insured
}

pub fn can_split(hand: &Hand, ctx: &RuleContext) -> bool {
    if ctx.stack < hand.wager || hand.stand || hand.cards.len() != 2 {
        return false;
    }
    let (first, second) = (hand.cards[0], hand.cards[1]);
    if hand.split && first.is_ace() {
        return false;
    }
    first.pips() == second.pips() || (first.is_ace() && second.is_ace())
}

pub fn can_stand(hand: &Hand, ctx: &RuleContext) -> bool {
    if hand.stand {
        return false;
    }
    if can_even_money(hand, ctx) {
        return true;
    }
    if is_split_ace(hand) {
        return hand.cards.len() == 2 && hand.cards[1].is_ace();
    }
    let soft = hand.peek_value(true);
    if soft >= 21 {
        return false;
    }
    if hand.is_dealer() {
        soft >= 17
    } else {
        hand.peek_value(false) != 21
    }
}

/// Whether the hand itself offers any action.
pub fn has_action(hand: &Hand, ctx: &RuleContext) -> bool {
    can_hit(hand, ctx)
        || can_even_money(hand, ctx)
        || can_split(hand, ctx)
        || can_stand(hand, ctx)
        || can_insurance(hand, ctx)
}

/// Whether the player still has something to decide this round.
pub fn can_play(player: &Player, dealer: &Hand, min_wager: i64) -> bool {
    if player.active_hand().is_none() || player.stack < min_wager || is_blackjack(dealer) {
        return false;
    }
    let ctx = RuleContext::new(dealer, player.stack);
    if player.dealer {
        return can_hit(player.primary_hand(), &ctx);
    }
    if dealer.hole_card().map_or(false, |card| !card.masked) {
        return false;
    }
    player.hands.iter().any(|hand| has_action(hand, &ctx))
}
