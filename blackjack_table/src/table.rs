pub mod hand;
pub mod player;
pub mod shoe;

use blackjack_table_macros::allowed_phase;
use log::{debug, info, warn};

use crate::agent::{PlayerAgent, Prompt};
use crate::rules::{
    can_double_down, can_even_money, can_hit, can_insurance, can_play, can_split, has_action,
    is_blackjack, RuleContext,
};
use crate::settlement::{pay_insured, pay_winners};
use crate::sidebets::pay_side_bets;
use crate::state::{BlackjackState, StateStore};
use crate::{Action, GameMode, Rule, TableError};

use self::hand::{Hand, Owner};
use self::player::Player;
use self::shoe::Shoe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Deal,
    SideBets,
    Insurance,
    PlayerTurns,
    DealerTurn,
    Settlement,
    ReshuffleCheck,
    Terminal,
}

/// What the table is waiting for when it asks to be drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameView {
    pub asking_for_insurance: bool,
    pub asking_to_deal: bool,
    pub acting_player: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoRequest {
    StrategyTable,
    ShoeDetails,
    Stats,
}

impl InfoRequest {
    fn for_action(action: Action) -> Option<InfoRequest> {
        match action {
            Action::StrategyTable => Some(InfoRequest::StrategyTable),
            Action::ShoeDetails => Some(InfoRequest::ShoeDetails),
            Action::Stats => Some(InfoRequest::Stats),
            _ => None,
        }
    }
}

/// The presentation and input boundary. The table never draws anything itself.
pub trait TableIo {
    /// Blocks until the next key is available.
    fn read_action(&mut self) -> Result<char, TableError>;
    fn render(&mut self, state: &BlackjackState, view: GameView);
    fn show_info(&mut self, state: &BlackjackState, request: InfoRequest);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    Quit,
}

/// Runs a table: deals rounds, asks every seat's agent for actions, plays the
/// dealer's hand and settles. The whole state is handed to `store` after
/// every change.
///
/// A round moves through the phases in `RoundPhase` order. `deal_round` runs a
/// complete round, the phase methods can also be driven one by one.
pub struct Dealer<S: StateStore> {
    rule: Rule,
    state: BlackjackState,
    agents: Vec<Box<dyn PlayerAgent>>,
    store: S,

    phase: RoundPhase,
    blackjacks_paid: bool,
}

impl<S: StateStore> Dealer<S> {
    pub fn new(
        rule: Rule,
        state: BlackjackState,
        agents: Vec<Box<dyn PlayerAgent>>,
        store: S,
    ) -> Result<Self, TableError> {
        if agents.len() != state.players.len() {
            return Err(TableError::AgentCount {
                expected: state.players.len(),
                actual: agents.len(),
            });
        }
        Ok(Dealer {
            rule,
            state,
            agents,
            store,
            phase: RoundPhase::Deal,
            blackjacks_paid: false,
        })
    }

    pub fn state(&self) -> &BlackjackState {
        &self.state
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Plays one full round. Returns `Quit` once a player quits, the deal prompt
    /// is answered with `q` or the autoplay round cap is reached.
    #[allowed_phase(Deal)]
    pub fn deal_round(&mut self, io: &mut dyn TableIo) -> Result<RoundOutcome, TableError> {
        self.state.rounds += 1;
        if self.rule.autoplay && self.state.rounds > self.rule.max_autoplay_rounds {
            info!(
                "Autoplay finished after {} rounds",
                self.rule.max_autoplay_rounds
            );
            io.show_info(&self.state, InfoRequest::Stats);
            return self.quit();
        }

        self.deal_hand()?;
        self.pay_side_bets()?;
        if self.phase == RoundPhase::Insurance && self.offer_insurance(io)? == RoundOutcome::Quit {
            return self.quit();
        }
        if self.phase == RoundPhase::PlayerTurns && self.play_players(io)? == RoundOutcome::Quit {
            return self.quit();
        }
        self.play_dealer()?;
        self.settle()?;
        self.finish_round(io)
    }

    /// Collects wagers and deals two cards to every seated hand and to the
    /// dealer, the dealer's second card face down.
    #[allowed_phase(Deal)]
    pub fn deal_hand(&mut self) -> Result<(), TableError> {
        self.blackjacks_paid = false;
        let rule = self.rule;
        let min_wager = rule.min_wager;
        let takes_side_bets = rule.side_bets && rule.game_mode != GameMode::Blackjack;

        for (index, (player, agent)) in self
            .state
            .players
            .iter_mut()
            .zip(self.agents.iter_mut())
            .enumerate()
        {
            player.hands.clear();

            if player.stack < min_wager {
                if player.winnings > 0 {
                    info!("Player {} reloaded {}", index + 1, player.winnings);
                    player.stack = player.winnings;
                    player.winnings = 0;
                } else {
                    let credit = Player::new(rule.player_start_stack, min_wager).stack;
                    info!("Player {} takes credit of {}", index + 1, credit);
                    player.stack = credit;
                    player.winnings -= credit;
                }
            }

            if player.stack < min_wager {
                continue;
            }
            let wager = agent
                .place_wager(player, min_wager)
                .clamp(min_wager, player.stack);
            player.stack -= wager;
            player.last_wager = wager;
            let mut hand = Hand::new(Owner::Player(index), wager);

            let side_wager = min_wager / 2;
            if takes_side_bets
                && side_wager > 0
                && player.stack >= side_wager
                && agent.will_play_side_bet(player.stack)
            {
                player.stack -= side_wager;
                hand.side_wager = side_wager;
            }
            player.hands.push(hand);
        }

        let BlackjackState {
            players,
            dealer,
            shoe,
            ..
        } = &mut self.state;
        dealer.hands = vec![Hand::new(Owner::Dealer, 0)];
        for round in 0..2 {
            for player in players.iter_mut() {
                if let Some(hand) = player.active_hand_mut() {
                    hand.receive_card(shoe.deal());
                }
            }
            let card = if round == 0 {
                shoe.deal()
            } else {
                shoe.deal_masked()
            };
            if let Some(hand) = dealer.hands.first_mut() {
                hand.receive_card(card);
            }
        }
        debug!("Dealer shows {}", dealer.primary_hand());

        self.phase = RoundPhase::SideBets;
        self.save()
    }

    /// Pays the side bet of the table's game mode, then decides whether the
    /// insurance phase runs.
    #[allowed_phase(SideBets)]
    pub fn pay_side_bets(&mut self) -> Result<(), TableError> {
        if self.rule.side_bets {
            pay_side_bets(&mut self.state, self.rule.game_mode);
        }
        self.phase = if self.dealer_shows_ace() {
            RoundPhase::Insurance
        } else {
            RoundPhase::PlayerTurns
        };
        self.save()
    }

    /// Against a dealer Ace: pays Spanish21 blackjacks early, asks every hand
    /// about insurance, and settles insurance if the dealer has blackjack.
    #[allowed_phase(Insurance)]
    pub fn offer_insurance(&mut self, io: &mut dyn TableIo) -> Result<RoundOutcome, TableError> {
        if self.rule.game_mode == GameMode::Spanish21 {
            pay_winners(&mut self.state, true, false, false);
            self.blackjacks_paid = true;
        }

        for index in 0..self.state.players.len() {
            if self.state.players[index].active_hand().is_none() {
                continue;
            }
            let view = GameView {
                asking_for_insurance: true,
                acting_player: Some(index),
                ..Default::default()
            };
            io.render(&self.state, view);
            if self.handle_player_action(io, index, true)? == RoundOutcome::Quit {
                return Ok(RoundOutcome::Quit);
            }
        }

        if is_blackjack(self.state.dealer.primary_hand()) {
            info!("Dealer has blackjack");
            pay_insured(&mut self.state);
            self.phase = RoundPhase::DealerTurn;
        } else {
            self.phase = RoundPhase::PlayerTurns;
        }
        self.save()?;
        Ok(RoundOutcome::Continue)
    }

    /// Lets every player act, in seat order, until none of their hands has
    /// anything left to decide.
    #[allowed_phase(PlayerTurns)]
    pub fn play_players(&mut self, io: &mut dyn TableIo) -> Result<RoundOutcome, TableError> {
        for index in 0..self.state.players.len() {
            while can_play(
                &self.state.players[index],
                self.state.dealer.primary_hand(),
                self.rule.min_wager,
            ) {
                if !self.active_hand_has_action(index) {
                    debug!("Player {} has nothing to decide, standing", index + 1);
                    stand(&mut self.state.players[index]);
                    self.save()?;
                    continue;
                }

                let view = GameView {
                    acting_player: Some(index),
                    ..Default::default()
                };
                io.render(&self.state, view);
                if self.handle_player_action(io, index, false)? == RoundOutcome::Quit {
                    return Ok(RoundOutcome::Quit);
                }
            }
        }
        self.phase = RoundPhase::DealerTurn;
        Ok(RoundOutcome::Continue)
    }

    /// Turns the hole card over and draws until the dealer must stand.
    #[allowed_phase(DealerTurn)]
    pub fn play_dealer(&mut self) -> Result<(), TableError> {
        let BlackjackState { dealer, shoe, .. } = &mut self.state;
        if let Some(hand) = dealer.hands.first_mut() {
            if let Some(hole) = hand.cards.get_mut(1) {
                hole.masked = false;
            }
            while can_hit(hand, &RuleContext::new(hand, 0)) {
                hand.receive_card(shoe.deal());
            }
            debug!("Dealer stands on {}", hand);
        }
        self.phase = RoundPhase::Settlement;
        self.save()
    }

    #[allowed_phase(Settlement)]
    pub fn settle(&mut self) -> Result<(), TableError> {
        pay_winners(&mut self.state, !self.blackjacks_paid, true, true);
        self.phase = RoundPhase::ReshuffleCheck;
        self.save()
    }

    /// Asks to deal again. `w` shows the statistics first, `q` ends the
    /// session. Reshuffles once the cut card has been reached.
    #[allowed_phase(ReshuffleCheck)]
    pub fn finish_round(&mut self, io: &mut dyn TableIo) -> Result<RoundOutcome, TableError> {
        let view = GameView {
            asking_to_deal: true,
            ..Default::default()
        };
        io.render(&self.state, view);

        if !self.rule.autoplay {
            loop {
                match Action::from(io.read_action()?) {
                    Action::Quit => return self.quit(),
                    Action::Stats => io.show_info(&self.state, InfoRequest::Stats),
                    _ => break,
                }
            }
        }

        self.state.shoe.shuffle_if_needed();
        self.phase = RoundPhase::Deal;
        self.save()?;
        Ok(RoundOutcome::Continue)
    }

    fn quit(&mut self) -> Result<RoundOutcome, TableError> {
        info!("Leaving the table after {} rounds", self.state.rounds);
        self.phase = RoundPhase::Terminal;
        self.save()?;
        Ok(RoundOutcome::Quit)
    }

    fn save(&mut self) -> Result<(), TableError> {
        self.store.save(&self.state)
    }

    fn dealer_shows_ace(&self) -> bool {
        self.state
            .dealer
            .primary_hand()
            .up_card()
            .map_or(false, |card| card.is_ace())
    }

    fn active_hand_has_action(&self, index: usize) -> bool {
        let player = &self.state.players[index];
        let ctx = RuleContext::new(self.state.dealer.primary_hand(), player.stack);
        player
            .active_hand()
            .map_or(false, |hand| has_action(hand, &ctx))
    }

    /// Asks the seat's agent until it answers with something other than an
    /// informational request, then applies that action.
    fn handle_player_action(
        &mut self,
        io: &mut dyn TableIo,
        index: usize,
        asking_for_insurance: bool,
    ) -> Result<RoundOutcome, TableError> {
        loop {
            let prompt = Prompt {
                state: &self.state,
                player_index: index,
                asking_for_insurance,
            };
            let action = self.agents[index].next_action(&prompt, io)?;

            if let Some(request) = InfoRequest::for_action(action) {
                io.show_info(&self.state, request);
                continue;
            }
            if action == Action::Quit {
                return Ok(RoundOutcome::Quit);
            }

            let applied = self.apply_action(index, action);
            debug!(
                "Player {} {:?}: {}",
                index + 1,
                action,
                if applied { "applied" } else { "ignored" }
            );
            if !applied && self.agents[index].is_automated() && !asking_for_insurance {
                warn!(
                    "Player {} cannot {:?}, standing instead",
                    index + 1,
                    action
                );
                stand(&mut self.state.players[index]);
            }

            if let Some(hand) = self.state.players[index].active_hand_mut() {
                hand.value(false);
            }
            self.save()?;
            return Ok(RoundOutcome::Continue);
        }
    }

    /// Applies one action to the seat's active hand. Actions the rules do not
    /// allow leave the table untouched and return false.
    fn apply_action(&mut self, index: usize, action: Action) -> bool {
        let BlackjackState {
            players,
            dealer,
            shoe,
            ..
        } = &mut self.state;
        if action == Action::RevealHole {
            return reveal_hole(dealer);
        }
        let Some(player) = players.get_mut(index) else {
            return false;
        };
        let dealer_hand = dealer.primary_hand();
        match action {
            Action::Hit => hit(player, dealer_hand, shoe),
            Action::Stand => stand(player),
            Action::Double => double_down(player, dealer_hand, shoe),
            Action::Split => split_hand(player, dealer_hand, shoe),
            Action::Insure => insure(player, dealer_hand),
            Action::Decline => decline_insurance(player),
            Action::EvenMoney => even_money(player, dealer_hand),
            _ => false,
        }
    }
}

fn hit_hand(hand: &mut Hand, ctx: &RuleContext, shoe: &mut Shoe, double_down: bool) -> bool {
    if !can_hit(hand, ctx) {
        return false;
    }
    let mut card = shoe.deal();
    if double_down {
        card.double_down = true;
        hand.double_down = true;
        hand.active = false;
        hand.stand = true;
    }
    hand.receive_card(card);
    true
}

fn hit(player: &mut Player, dealer: &Hand, shoe: &mut Shoe) -> bool {
    let ctx = RuleContext::new(dealer, player.stack);
    match player.active_hand_mut() {
        Some(hand) => hit_hand(hand, &ctx, shoe, false),
        None => false,
    }
}

fn stand(player: &mut Player) -> bool {
    match player.active_hand_mut() {
        Some(hand) => {
            hand.active = false;
            hand.stand = true;
            true
        }
        None => false,
    }
}

fn double_down(player: &mut Player, dealer: &Hand, shoe: &mut Shoe) -> bool {
    let Some(index) = player.active_hand_index() else {
        return false;
    };
    let ctx = RuleContext::new(dealer, player.stack);
    let hand = &mut player.hands[index];
    if !can_double_down(hand, &ctx) || !hit_hand(hand, &ctx, shoe, true) {
        return false;
    }
    player.stack -= hand.wager;
    hand.wager *= 2;
    true
}

/// Moves the second card into a new hand carrying the same wager and deals a
/// fresh second card to both. The new hand is played after the current one.
fn split_hand(player: &mut Player, dealer: &Hand, shoe: &mut Shoe) -> bool {
    let Some(index) = player.active_hand_index() else {
        return false;
    };
    let ctx = RuleContext::new(dealer, player.stack);
    if !can_split(&player.hands[index], &ctx) {
        return false;
    }

    let original = &mut player.hands[index];
    original.split = true;
    let mut split = Hand::new(original.owner, original.wager);
    split.split = true;

    // Aces demoted while the pair was one hand count high again.
    let mut moved = original.cards[1];
    moved.demoted = false;
    original.cards[0].demoted = false;
    split.receive_card(moved);

    original.cards[1] = shoe.deal();
    split.receive_card(shoe.deal());

    player.stack -= split.wager;
    player.hands.push(split);
    true
}

fn insure(player: &mut Player, dealer: &Hand) -> bool {
    let ctx = RuleContext::new(dealer, player.stack);
    let Some(index) = player.active_hand_index() else {
        return false;
    };
    let hand = &mut player.hands[index];
    if !can_insurance(hand, &ctx) {
        return false;
    }
    hand.insured = true;
    hand.insurance_wager = hand.wager / 2;
    player.stack -= hand.insurance_wager;
    true
}

fn decline_insurance(player: &mut Player) -> bool {
    match player.active_hand_mut() {
        Some(hand) => {
            hand.insurance_wager = 0;
            hand.insured = true;
            true
        }
        None => false,
    }
}

fn even_money(player: &mut Player, dealer: &Hand) -> bool {
    let ctx = RuleContext::new(dealer, player.stack);
    let Some(hand) = player.active_hand_mut() else {
        return false;
    };
    if !can_even_money(hand, &ctx) {
        return false;
    }
    hand.active = false;
    hand.stand = true;
    hand.even_money = true;
    hand.insurance_wager = 0;
    hand.insured = true;
    true
}

fn reveal_hole(dealer: &mut Player) -> bool {
    let hole = dealer
        .hands
        .first_mut()
        .and_then(|hand| hand.cards.get_mut(1));
    match hole {
        Some(card) => {
            card.masked = false;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AutomatedAgent, ScriptedAgent};
    use crate::state::MemoryStore;
    use crate::strategy::BasicStrategy;

    #[derive(Default)]
    struct RecordingIo {
        keys: Vec<char>,
        views: Vec<GameView>,
        infos: Vec<InfoRequest>,
    }

    impl RecordingIo {
        fn with_keys(keys: &str) -> Self {
            RecordingIo {
                keys: keys.chars().rev().collect(),
                ..Default::default()
            }
        }
    }

    impl TableIo for RecordingIo {
        fn read_action(&mut self) -> Result<char, TableError> {
            Ok(self.keys.pop().unwrap_or('q'))
        }

        fn render(&mut self, _state: &BlackjackState, view: GameView) {
            self.views.push(view);
        }

        fn show_info(&mut self, _state: &BlackjackState, request: InfoRequest) {
            self.infos.push(request);
        }
    }

    fn get_typical_rule() -> Rule {
        Rule {
            number_of_decks: 1,
            min_wager: 10,
            game_mode: GameMode::Blackjack,
            side_bets: false,
            player_start_stack: 100,
            ..Default::default()
        }
    }

    fn stands() -> ScriptedAgent {
        ScriptedAgent::new(Vec::<Action>::new(), Action::Stand)
    }

    fn table(rule: Rule, firsts: &[&str], agent: ScriptedAgent) -> Dealer<MemoryStore> {
        let shoe = Shoe::fixed(rule.number_of_decks, firsts).unwrap();
        let state = BlackjackState::with_shoe(&rule, 1, shoe);
        let agents: Vec<Box<dyn PlayerAgent>> = vec![Box::new(agent)];
        Dealer::new(rule, state, agents, MemoryStore::default()).unwrap()
    }

    #[test]
    fn deals_players_first_and_masks_the_hole_card() {
        let rule = Rule {
            min_wager: 1,
            ..get_typical_rule()
        };
        let firsts = [
            "♣6", "♠10", "♣6", "♥A", "♥A", "♦6", "♥6", "♥3", "♥Q", "♣10",
        ];
        let mut dealer = table(rule, &firsts, stands());
        dealer.deal_hand().unwrap();

        let state = dealer.state();
        let hand = &state.players[0].hands[0];
        assert_eq!(hand.to_string(), "♣6 ♣6");
        let dealer_hand = state.dealer.primary_hand();
        assert_eq!(dealer_hand.cards[0].to_string(), "♠10");
        assert!(!dealer_hand.cards[0].masked);
        assert_eq!(dealer_hand.cards[1].to_string(), "♥A");
        assert!(dealer_hand.cards[1].masked);
        assert_eq!(state.players[0].stack, 99);

        dealer.pay_side_bets().unwrap();
        assert_eq!(dealer.phase(), RoundPhase::PlayerTurns);
    }

    #[test]
    fn round_renders_and_skips_insurance() {
        let rule = Rule {
            min_wager: 1,
            ..get_typical_rule()
        };
        let firsts = [
            "♣6", "♠10", "♣6", "♥A", "♥A", "♦6", "♥6", "♥3", "♥Q", "♣10",
        ];
        let mut dealer = table(rule, &firsts, stands());
        let mut io = RecordingIo::with_keys("q");

        assert_eq!(dealer.deal_round(&mut io).unwrap(), RoundOutcome::Quit);
        assert!(!io.views.is_empty());
        assert!(io.views.iter().all(|view| !view.asking_for_insurance));
        assert!(io.views.iter().any(|view| view.asking_to_deal));

        // Ten up and an Ace in the hole beat the pair of sixes.
        let state = dealer.state();
        assert_eq!(state.stats.dealer_blackjacks, 1);
        assert_eq!(state.stats.losses, 1);
        assert_eq!(state.players[0].stack, 99);
        assert_eq!(state.house, 1);
        assert_eq!(dealer.phase(), RoundPhase::Terminal);
        assert!(dealer.store().saves > 0);
    }

    #[test]
    fn phase_methods_refuse_to_run_out_of_order() {
        let mut dealer = table(
            get_typical_rule(),
            &[],
            stands(),
        );
        match dealer.play_dealer() {
            Err(TableError::PhaseViolation {
                action,
                expected,
                actual,
            }) => {
                assert_eq!(action, "play_dealer");
                assert_eq!(expected, RoundPhase::DealerTurn);
                assert_eq!(actual, RoundPhase::Deal);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(dealer.store().saves, 0);
        assert!(matches!(
            dealer.settle(),
            Err(TableError::PhaseViolation { .. })
        ));
    }

    #[test]
    fn agents_must_match_the_seats() {
        let rule = get_typical_rule();
        let state = BlackjackState::with_shoe(&rule, 2, Shoe::fixed(1, &[]).unwrap());
        let agents: Vec<Box<dyn PlayerAgent>> =
            vec![Box::new(stands())];
        assert!(matches!(
            Dealer::new(rule, state, agents, MemoryStore::default()),
            Err(TableError::AgentCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn split_hands_are_played_and_settled_separately() {
        let firsts = ["♥8", "♠9", "♣8", "♦7", "♥3", "♠2", "♣K"];
        let agent = ScriptedAgent::new([Action::Split], Action::Stand);
        let mut dealer = table(get_typical_rule(), &firsts, agent);
        let mut io = RecordingIo::with_keys("d");

        assert_eq!(dealer.deal_round(&mut io).unwrap(), RoundOutcome::Continue);
        let state = dealer.state();
        let hands = &state.players[0].hands;
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0].to_string(), "♥8 ♥3");
        assert_eq!(hands[1].to_string(), "♣8 ♠2");
        assert!(hands.iter().all(|hand| hand.split && hand.stand));

        // Dealer draws to 26 and both hands win.
        assert_eq!(state.stats.dealer_busts, 1);
        assert_eq!(state.stats.wins, 2);
        assert_eq!(state.players[0].stack, 120);
        assert_eq!(state.house, -20);
        assert_eq!(dealer.phase(), RoundPhase::Deal);
    }

    #[test]
    fn double_down_doubles_the_wager_for_one_card() {
        let firsts = ["♥5", "♠9", "♣6", "♦7", "♥10", "♣2"];
        let agent = ScriptedAgent::new([Action::Double], Action::Stand);
        let mut dealer = table(get_typical_rule(), &firsts, agent);
        let mut io = RecordingIo::with_keys("d");

        dealer.deal_round(&mut io).unwrap();
        let state = dealer.state();
        let hand = &state.players[0].hands[0];
        assert_eq!(hand.cards.len(), 3);
        assert!(hand.double_down && hand.cards[2].double_down);
        assert_eq!(hand.wager, 20);
        assert_eq!(state.dealer.primary_hand().to_string(), "♠9 ♦7 ♣2");
        assert_eq!(state.players[0].stack, 120);
    }

    #[test]
    fn illegal_actions_change_nothing() {
        let firsts = ["♥10", "♠9", "♣9", "♦7", "♥2"];
        let agent = ScriptedAgent::new([Action::Split, Action::Insure, Action::Stand], Action::Stand);
        let mut dealer = table(get_typical_rule(), &firsts, agent);
        let mut io = RecordingIo::with_keys("d");

        dealer.deal_round(&mut io).unwrap();
        let state = dealer.state();
        assert_eq!(state.players[0].hands.len(), 1);
        assert!(!state.players[0].hands[0].insured);
        assert_eq!(state.players[0].hands[0].to_string(), "♥10 ♣9");
    }

    #[test]
    fn busting_ends_the_hand() {
        let firsts = ["♥10", "♠9", "♣6", "♦8", "♥K"];
        let agent = ScriptedAgent::new([Action::Hit], Action::Hit);
        let mut dealer = table(get_typical_rule(), &firsts, agent);
        let mut io = RecordingIo::with_keys("d");

        dealer.deal_round(&mut io).unwrap();
        let state = dealer.state();
        let hand = &state.players[0].hands[0];
        assert!(hand.busted && !hand.active);
        assert_eq!(hand.cards.len(), 3);
        assert_eq!(state.stats.player_busts, 1);
        assert_eq!(state.players[0].stack, 90);
    }

    #[test]
    fn informational_actions_do_not_use_a_turn() {
        let firsts = ["♥10", "♠9", "♣8", "♦8"];
        let agent = ScriptedAgent::new(
            [Action::ShoeDetails, Action::StrategyTable, Action::Stats],
            Action::Stand,
        );
        let mut dealer = table(get_typical_rule(), &firsts, agent);
        let mut io = RecordingIo::with_keys("wd");

        dealer.deal_round(&mut io).unwrap();
        assert_eq!(
            io.infos,
            vec![
                InfoRequest::ShoeDetails,
                InfoRequest::StrategyTable,
                InfoRequest::Stats,
                InfoRequest::Stats,
            ]
        );
        assert_eq!(dealer.state().stats.pushes, 0);
        assert_eq!(dealer.state().stats.wins, 1);
    }

    #[test]
    fn insurance_pays_against_a_dealer_blackjack() {
        let firsts = ["♥10", "♠A", "♣9", "♦K"];
        let agent = ScriptedAgent::new([Action::Insure], Action::Stand);
        let mut dealer = table(get_typical_rule(), &firsts, agent);
        let mut io = RecordingIo::with_keys("d");

        dealer.deal_round(&mut io).unwrap();
        assert!(io.views.iter().any(|view| view.asking_for_insurance));
        let state = dealer.state();
        assert_eq!(state.players[0].stack, 95);
        assert_eq!(state.house, 5);
        assert_eq!(state.stats.dealer_blackjacks, 1);
    }

    #[test]
    fn spanish21_pays_blackjacks_once() {
        let rule = Rule {
            game_mode: GameMode::Spanish21,
            ..get_typical_rule()
        };
        let firsts = ["♥A", "♠A", "♣K", "♦7"];
        let agent = ScriptedAgent::new([Action::Decline], Action::Stand);
        let mut dealer = table(rule, &firsts, agent);
        let mut io = RecordingIo::with_keys("d");

        dealer.deal_round(&mut io).unwrap();
        let state = dealer.state();
        assert_eq!(state.players[0].stack, 115);
        assert_eq!(state.stats.player_blackjacks, 1);
        assert_eq!(state.stats.wins, 1);
        assert_eq!(state.house, -15);
    }

    #[test]
    fn spanish21_insured_blackjack_loses_only_the_insurance() {
        let rule = Rule {
            game_mode: GameMode::Spanish21,
            ..get_typical_rule()
        };
        let firsts = ["♥A", "♠A", "♣K", "♦7"];
        let agent = ScriptedAgent::new([Action::Insure], Action::Stand);
        let mut dealer = table(rule, &firsts, agent);
        let mut io = RecordingIo::with_keys("d");

        dealer.deal_round(&mut io).unwrap();
        let state = dealer.state();
        assert_eq!(state.players[0].stack, 110);
        assert_eq!(state.house, -10);
        assert_eq!(state.house, -(state.players[0].stack - 100));
        assert!(state.players[0].hands[0].insured);
        assert_eq!(state.players[0].hands[0].insurance_wager, 0);
        assert_eq!(state.stats.player_blackjacks, 1);
    }

    #[test]
    fn quitting_mid_round_stops_the_table() {
        let firsts = ["♥10", "♠9", "♣6", "♦8"];
        let agent = ScriptedAgent::new([Action::Quit], Action::Stand);
        let mut dealer = table(get_typical_rule(), &firsts, agent);
        let mut io = RecordingIo::default();

        assert_eq!(dealer.deal_round(&mut io).unwrap(), RoundOutcome::Quit);
        assert_eq!(dealer.phase(), RoundPhase::Terminal);
        assert!(dealer.deal_round(&mut io).is_err());
    }

    #[test]
    fn broke_players_take_credit() {
        let firsts = ["♥10", "♠9", "♣8", "♦8"];
        let mut dealer = table(
            get_typical_rule(),
            &firsts,
            stands(),
        );
        dealer.state.players[0].stack = 5;
        dealer.deal_hand().unwrap();
        let player = &dealer.state().players[0];
        assert_eq!(player.stack, 90);
        assert_eq!(player.winnings, -100);
    }

    #[test]
    fn side_bets_are_taken_when_the_mode_has_one() {
        let rule = Rule {
            game_mode: GameMode::Trifecta,
            side_bets: true,
            ..get_typical_rule()
        };
        let mut dealer = table(rule, &[], stands());
        dealer.deal_hand().unwrap();
        let hand = &dealer.state().players[0].hands[0];
        assert_eq!(hand.side_wager, 5);
        assert_eq!(dealer.state().players[0].stack, 85);
    }

    #[test]
    fn autoplay_stops_at_the_round_cap() {
        let rule = Rule {
            autoplay: true,
            max_autoplay_rounds: 3,
            ..get_typical_rule()
        };
        let state = BlackjackState::new(&rule, 2);
        let agents: Vec<Box<dyn PlayerAgent>> = vec![
            Box::new(AutomatedAgent::new(BasicStrategy)),
            Box::new(AutomatedAgent::new(BasicStrategy)),
        ];
        let mut dealer = Dealer::new(rule, state, agents, MemoryStore::default()).unwrap();
        let mut io = RecordingIo::default();

        let mut rounds = 0;
        while dealer.deal_round(&mut io).unwrap() == RoundOutcome::Continue {
            rounds += 1;
        }
        assert_eq!(rounds, 3);
        assert_eq!(io.infos.last(), Some(&InfoRequest::Stats));
        assert!(dealer.state().stats.hands() >= 6);
    }
}
