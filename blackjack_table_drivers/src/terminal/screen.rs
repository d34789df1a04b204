//! Text layout of every screen. Nothing here touches the terminal: each screen
//! is built as a list of lines, styled with ANSI sequences when color is on.

use blackjack_table::agent::{AutomatedAgent, Prompt};
use blackjack_table::card::{Card, Rank, Suit};
use blackjack_table::rules::{
    can_double_down, can_even_money, can_hit, can_insurance, can_split, can_stand, is_blackjack,
    RuleContext,
};
use blackjack_table::state::BlackjackState;
use blackjack_table::strategy::{strategy_chart, BasicStrategy, ChartRow};
use blackjack_table::table::hand::Hand;
use blackjack_table::table::GameView;
use blackjack_table::{Action, GameMode, Rule};
use crossterm::style::{Color, Stylize};

use crate::TableOptions;

const RULE_LINE: &str =
    "=============================================================================";
const CARD_SPACING: &str = "   ";

/// How the table is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalOptions {
    pub glyphs: bool,
    pub draw: bool,
    pub color: bool,
    pub side_bets: bool,
    pub game_mode: GameMode,
}

impl TerminalOptions {
    pub fn new(rule: &Rule, options: &TableOptions) -> Self {
        TerminalOptions {
            glyphs: options.glyphs,
            draw: options.draw,
            color: options.color,
            side_bets: rule.side_bets && rule.game_mode != GameMode::Blackjack,
            game_mode: rule.game_mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Winner,
    Loser,
    Push,
}

/// Formats whole dollars from cents: `$1,234.56`.
pub fn currency(cents: i64) -> String {
    let mut value = cents.unsigned_abs();
    let mut result = format!(".{:02}", value % 100);
    value /= 100;
    while value >= 1000 {
        result = format!(",{:03}{}", value % 1000, result);
        value /= 1000;
    }
    if cents < 0 {
        format!("$-{}{}", value, result)
    } else {
        format!("${}{}", value, result)
    }
}

/// The Unicode playing card for `card`, if the block has one.
fn glyph(card: &Card) -> Option<char> {
    let base = match card.suit {
        Suit::Spades => 0x1F0A0,
        Suit::Hearts => 0x1F0B0,
        Suit::Diamonds => 0x1F0C0,
        Suit::Clubs => 0x1F0D0,
    };
    // The block has a Knight between Jack and Queen.
    let offset = match card.rank {
        Rank::One | Rank::Ace => 1,
        Rank::Jack => 11,
        Rank::Queen => 13,
        Rank::King => 14,
        rank => rank as u32,
    };
    char::from_u32(base + offset)
}

/// The total a hand stands on, Aces counted high while that fits.
fn standing_value(hand: &Hand) -> u32 {
    let high = hand.peek_value(false);
    if high <= 21 {
        high
    } else {
        hand.peek_value(true)
    }
}

/// The outcome of a player hand, known once the dealer has finished drawing.
pub fn verdict(hand: &Hand, dealer: &Hand) -> Option<Verdict> {
    if hand.is_dealer() || hand.cards.is_empty() || dealer.cards.len() < 2 {
        return None;
    }
    let dealer_ctx = RuleContext::new(dealer, 0);
    if dealer.hole_card().map_or(true, |card| card.masked) || can_hit(dealer, &dealer_ctx) {
        return None;
    }

    let value = standing_value(hand);
    let dealer_value = standing_value(dealer);
    let verdict = if hand.busted || value > 21 {
        Verdict::Loser
    } else if is_blackjack(dealer) {
        if hand.even_money {
            Verdict::Winner
        } else if is_blackjack(hand) {
            Verdict::Push
        } else {
            Verdict::Loser
        }
    } else if is_blackjack(hand) || dealer_value > 21 || value > dealer_value {
        Verdict::Winner
    } else if value == dealer_value {
        Verdict::Push
    } else {
        Verdict::Loser
    };
    Some(verdict)
}

/// The legal actions for `hand`, each with its key in brackets.
pub fn action_menu(hand: &Hand, ctx: &RuleContext, asking_for_insurance: bool) -> String {
    let mut options = Vec::new();
    if can_even_money(hand, ctx) {
        options.push("[e]ven money?");
        options.push("[s]tand?");
    } else if can_insurance(hand, ctx) {
        options.push("[i]nsurance?");
        options.push("[n]o thanks!");
    } else if !asking_for_insurance {
        if can_split(hand, ctx) {
            options.push("s[p]lit?");
        }
        if can_hit(hand, ctx) {
            options.push("[h]it?");
        }
        if can_stand(hand, ctx) {
            options.push("[s]tand?");
        }
        if can_double_down(hand, ctx) {
            options.push("[d]ouble down?");
        }
    }
    options.join("        ")
}

fn action_name(action: Action) -> &'static str {
    match action {
        Action::Hit => "HIT",
        Action::Stand => "STAND",
        Action::Double => "DOUBLE DOWN",
        Action::Split => "SPLIT",
        _ => "?????",
    }
}

fn rate(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

impl TerminalOptions {
    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn suit_text(&self, suit: Suit) -> String {
        let symbol = suit.symbol().to_string();
        if suit.is_red() {
            self.paint(&symbol, Color::Red)
        } else {
            symbol
        }
    }

    pub fn card_text(&self, card: &Card) -> String {
        if card.masked {
            return String::from("***");
        }
        if self.glyphs {
            if let Some(glyph) = glyph(card) {
                let glyph = glyph.to_string();
                return if card.suit.is_red() {
                    self.paint(&glyph, Color::Red)
                } else {
                    glyph
                };
            }
        }
        format!("{}{}", self.suit_text(card.suit), card.rank.label())
    }

    /// Cards drawn side by side as boxes, a face-down card hatched.
    pub fn card_boxes(&self, cards: &[Card]) -> Vec<String> {
        let mut lines = vec![String::new(); 7];
        for card in cards {
            lines[0].push_str("╭────────╮");
            if card.masked {
                for line in &mut lines[1..6] {
                    line.push_str("│░░░░░░░░│");
                }
            } else {
                let label = card.rank.label();
                let padding = " ".repeat(7 - label.len());
                let suit = self.suit_text(card.suit);
                lines[1].push_str(&format!("│{}{}{}│", suit, label, padding));
                for line in &mut lines[2..5] {
                    line.push_str("│        │");
                }
                lines[5].push_str(&format!("│{}{}{}│", padding, label, suit));
            }
            lines[6].push_str("╰────────╯");
            for line in lines.iter_mut() {
                line.push_str(CARD_SPACING);
            }
        }
        lines
    }

    fn verdict_text(&self, verdict: Verdict) -> String {
        match verdict {
            Verdict::Winner => self.paint("WINNER!", Color::Green),
            Verdict::Loser => self.paint("LOSER!", Color::Red),
            Verdict::Push => self.paint("PUSH!", Color::Cyan),
        }
    }

    /// The cards of a hand followed by its total and, once known, its outcome.
    pub fn hand_lines(&self, hand: &Hand, dealer: &Hand) -> Vec<String> {
        let mut lines = if self.draw {
            self.card_boxes(&hand.cards)
        } else {
            Vec::new()
        };

        let mut summary = String::new();
        if !self.draw {
            for card in &hand.cards {
                summary.push_str(&self.card_text(card));
                summary.push_str(CARD_SPACING);
            }
        }

        let high = hand.peek_value(false);
        let low = hand.peek_value(true);
        let blackjack = is_blackjack(hand) && hand.cards.iter().all(|card| !card.masked);
        if high != low && high <= 21 && !blackjack {
            summary.push_str(&format!("Total: {}/{}", high, low));
        } else {
            summary.push_str(&format!("Total: {}", standing_value(hand)));
        }
        if let Some(verdict) = verdict(hand, dealer) {
            summary.push_str(CARD_SPACING);
            summary.push_str(&self.verdict_text(verdict));
        }
        if blackjack && !hand.even_money {
            summary.push_str("   Blackjack!");
        } else if standing_value(hand) > 21 {
            summary.push_str("   BUSTED!");
        }
        lines.push(summary);
        lines
    }

    fn hint_lines(&self, state: &BlackjackState, player_index: usize, hand: &Hand) -> Vec<String> {
        let prompt = Prompt {
            state,
            player_index,
            asking_for_insurance: false,
        };
        let Ok(action) = AutomatedAgent::new(BasicStrategy).suggest(&prompt) else {
            return Vec::new();
        };

        let mut lines = vec![
            String::new(),
            self.paint(
                &format!("Hint: Autoplay says you should {}!", action_name(action)),
                Color::Cyan,
            ),
        ];
        let pair = hand.cards.len() == 2 && hand.cards[0].rank == hand.cards[1].rank;
        let advice = match action {
            Action::Hit => Some(("Your hand is somewhat weak. You should hit to try and improve your position.", Color::Yellow)),
            Action::Stand if standing_value(hand) >= 17 => Some(("Your hand is strong. You should stand.", Color::Green)),
            Action::Stand => Some(("The dealer is weak and may bust. You should stand.", Color::Yellow)),
            Action::Double => Some(("Odds are in your favor. You should double down.", Color::Cyan)),
            Action::Split => Some(("You have a pair in a favorable position. You should split.", Color::Cyan)),
            _ => None,
        };
        if let Some((text, color)) = advice {
            lines.push(self.paint(text, color));
        }
        if pair && matches!(action, Action::Hit | Action::Stand) {
            lines.push(self.paint(
                "You have a pair but splitting it here could be risky.",
                Color::Yellow,
            ));
        }
        lines
    }

    fn progressive_lines(&self, state: &BlackjackState) -> Vec<String> {
        let colors = [Color::Yellow, Color::Blue, Color::Magenta, Color::Cyan];
        let pools: Vec<String> = state
            .progressives
            .iter()
            .zip(colors)
            .map(|(pool, color)| self.paint(&currency(*pool), color))
            .collect();
        vec![
            RULE_LINE.to_string(),
            format!("{:^77}", "PROGRESSIVES"),
            RULE_LINE.to_string(),
            format!("     {}", pools.join("         ")),
        ]
    }

    /// The table: progressives, the dealer, every player with their hands,
    /// and the prompt the table is waiting on.
    pub fn game_screen(&self, state: &BlackjackState, view: GameView) -> Vec<String> {
        let mut lines = Vec::new();
        if self.side_bets {
            lines.extend(self.progressive_lines(state));
        }

        let dealer = state.dealer.primary_hand();
        lines.push(RULE_LINE.to_string());
        lines.push(format!(
            "Dealer:   House: {}   Count: {}",
            currency(state.house * 100),
            state.running_count()
        ));
        if !dealer.cards.is_empty() {
            lines.extend(self.hand_lines(dealer, dealer));
        }

        for (index, player) in state.players.iter().enumerate() {
            let acting = view.acting_player == Some(index);
            let winnings = if player.winnings >= 0 {
                self.paint(&format!("+{}", currency(player.winnings * 100)), Color::Green)
            } else {
                self.paint(&currency(player.winnings * 100), Color::Red)
            };
            let header = format!(
                "Player {}:   {}   {}",
                index + 1,
                self.paint(&format!("Stack: ${}", player.stack), Color::Green),
                winnings
            );
            lines.push(RULE_LINE.to_string());
            lines.push(if acting { self.bold(&header) } else { header });

            let ctx = RuleContext::new(dealer, player.stack);
            let active_index = player.active_hand_index();
            for (hand_index, hand) in player.hands.iter().enumerate() {
                let mut wager = format!("Hand {}:   Wager: ${}", hand_index + 1, hand.wager);
                if hand.side_wager > 0 {
                    let side = format!("{:?} Wager: ${}", self.game_mode, hand.side_wager);
                    wager.push_str(CARD_SPACING);
                    wager.push_str(&self.paint(&side, Color::Magenta));
                }
                lines.push(wager);
                lines.extend(self.hand_lines(hand, dealer));
                if hand.side_winnings > 0 {
                    let paid = format!(
                        "{:?} pays {}!",
                        self.game_mode,
                        currency(hand.side_winnings * 100)
                    );
                    lines.push(self.paint(&paid, Color::Magenta));
                }

                if acting && active_index == Some(hand_index) {
                    let menu = action_menu(hand, &ctx, view.asking_for_insurance);
                    if !menu.is_empty() {
                        lines.push(self.bold(&format!("   {}", menu)));
                    }
                    if !view.asking_for_insurance {
                        lines.extend(self.hint_lines(state, index, hand));
                    }
                }
            }
        }

        lines.push(RULE_LINE.to_string());
        if view.asking_to_deal {
            lines.push(self.bold("   DEAL?   [d]eal / [q]uit / [w] stats"));
        }
        lines
    }

    /// The autoplay decision for every two-card start against every dealer
    /// up-card.
    pub fn strategy_screen(&self, stack: i64) -> Vec<String> {
        let up_cards: String = ChartRow::dealer_up_cards()
            .map(|rank| format!(" {:<2}", rank.label()))
            .collect();
        let mut lines = vec![
            String::from(" AUTOPLAY TABLE"),
            RULE_LINE.to_string(),
            format!("Dealer ==> {}", up_cards),
            RULE_LINE.to_string(),
        ];

        for row in strategy_chart(&BasicStrategy, stack) {
            let mut line = format!("{:>2},{:<2}      ", row.first.label(), row.second.label());
            for action in &row.actions {
                let color = match action {
                    Some(Action::Hit) => Color::Red,
                    Some(Action::Stand) => Color::Green,
                    Some(Action::Double) => Color::Yellow,
                    Some(Action::Split) => Color::Cyan,
                    _ => Color::Grey,
                };
                let key = action.map_or('?', |action| action.key().to_ascii_uppercase());
                line.push_str(&self.paint(&format!("░{}░", key), color));
            }
            lines.push(line);
        }
        lines
    }

    /// Every card in the shoe, marking where the next card and the cut card are.
    pub fn shoe_screen(&self, state: &BlackjackState) -> Vec<String> {
        let shoe = &state.shoe;
        let mut lines = vec![format!(
            "Decks: {}   Cards: {}   Index: {}   Cut: {}",
            shoe.number_of_decks(),
            shoe.len(),
            shoe.index(),
            shoe.cut()
        )];
        if shoe.is_empty() {
            return lines;
        }

        lines.push(String::from("=="));
        for (position, card) in shoe.cards().iter().enumerate() {
            let mut line = self.card_text(&card.clean());
            if position == shoe.index() {
                line.push_str("<==next card");
            }
            if position == shoe.cut() {
                line.push_str("<==cut card");
            }
            lines.push(line);
        }
        lines.push(String::from("=="));
        lines
    }

    pub fn stats_screen(&self, state: &BlackjackState) -> Vec<String> {
        let stats = &state.stats;
        let hands = stats.hands();
        let mut lines = vec![
            self.bold(&format!("Round #{}", state.rounds)),
            String::new(),
            String::from("   Wins | Losses | Pushes"),
            format!("     {} | {} | {}", stats.wins, stats.losses, stats.pushes),
            String::new(),
            format!(
                "   Hands: {}   Win Pct: {:.2}%",
                hands,
                stats.win_percentage()
            ),
        ];

        if self.side_bets {
            let earnings = stats.sidebet_winnings - stats.sidebet_losings;
            lines.push(format!(
                "   {:?} Earnings:  {}",
                self.game_mode,
                currency(earnings * 100)
            ));
        }

        let total_net = state.total_net();
        if total_net > 0 {
            lines.push(self.paint(
                &format!("   Total Winnings:  {}", currency(total_net * 100)),
                Color::Green,
            ));
        } else {
            lines.push(self.paint(
                &format!("   Total Losses:  {}", currency(total_net * 100)),
                Color::Red,
            ));
        }

        lines.push(String::new());
        lines.push(String::from("    Dealer    "));
        lines.push(format!(
            "   Blackjacks: {}   Busts:  {}   Bust %: {:.2}%  Blackjack %: {:.2}%",
            stats.dealer_blackjacks,
            stats.dealer_busts,
            rate(stats.dealer_busts, state.rounds),
            rate(stats.dealer_blackjacks, state.rounds)
        ));
        lines.push(String::new());
        lines.push(String::from("    Player    "));
        lines.push(format!(
            "   Blackjacks: {}   Busts:  {}   Bust %: {:.2}%  Blackjack %: {:.2}%",
            stats.player_blackjacks,
            stats.player_busts,
            rate(stats.player_busts, hands),
            rate(stats.player_blackjacks, hands)
        ));

        let shoe = &state.shoe;
        lines.push(String::new());
        lines.push(format!(
            "Decks: {} Cards: {} Index: {} Cut: {} Penetration: {:.2}%",
            shoe.number_of_decks(),
            shoe.len(),
            shoe.index(),
            shoe.cut(),
            shoe.penetration() * 100.0
        ));

        lines.push(String::new());
        lines.push(String::from("=== Bust Heuristics ==="));
        for rank in Rank::dealt() {
            let count = stats.bust_counts.get(&rank).copied().unwrap_or(0);
            lines.push(format!(
                "{:>3} {} ({})",
                rank.label(),
                "░".repeat(count as usize),
                count
            ));
        }
        lines
    }
}
