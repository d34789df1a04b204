use std::collections::VecDeque;

use crate::rules::RuleContext;
use crate::state::BlackjackState;
use crate::strategy::{autoplay_wager, BasicStrategy, Strategy};
use crate::table::hand::Hand;
use crate::table::player::Player;
use crate::table::TableIo;
use crate::{Action, TableError};

/// What an agent is asked to decide about.
#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    pub state: &'a BlackjackState,
    pub player_index: usize,
    pub asking_for_insurance: bool,
}

impl<'a> Prompt<'a> {
    pub fn player(&self) -> Option<&'a Player> {
        self.state.players.get(self.player_index)
    }

    pub fn dealer_hand(&self) -> &'a Hand {
        self.state.dealer.primary_hand()
    }

    pub fn active_hand(&self) -> Option<&'a Hand> {
        self.player().and_then(Player::active_hand)
    }
}

/// Decides for one seat: its actions, its wager and whether it plays the side
/// bet. Each player gets its own agent when the `Dealer` is built.
pub trait PlayerAgent {
    fn next_action(&mut self, prompt: &Prompt, io: &mut dyn TableIo) -> Result<Action, TableError>;

    fn place_wager(&mut self, _player: &Player, min_wager: i64) -> i64 {
        min_wager
    }

    fn will_play_side_bet(&mut self, _stack: i64) -> bool {
        true
    }

    /// Automated agents get a hint of their next move on screen.
    fn is_automated(&self) -> bool {
        false
    }
}

/// Reads every action from the table's input source.
#[derive(Debug, Default)]
pub struct InteractiveAgent;

impl PlayerAgent for InteractiveAgent {
    fn next_action(&mut self, _prompt: &Prompt, io: &mut dyn TableIo) -> Result<Action, TableError> {
        let key = io.read_action()?;
        Ok(Action::from(key))
    }
}

/// Replays a fixed list of actions, then keeps answering `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedAgent {
    actions: VecDeque<Action>,
    fallback: Action,
    wager: Option<i64>,
    side_bets: bool,
}

impl ScriptedAgent {
    pub fn new<I: IntoIterator<Item = Action>>(actions: I, fallback: Action) -> Self {
        ScriptedAgent {
            actions: actions.into_iter().collect(),
            fallback,
            wager: None,
            side_bets: true,
        }
    }

    pub fn with_wager(mut self, wager: i64) -> Self {
        self.wager = Some(wager);
        self
    }

    pub fn without_side_bets(mut self) -> Self {
        self.side_bets = false;
        self
    }

    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl PlayerAgent for ScriptedAgent {
    fn next_action(&mut self, _prompt: &Prompt, _io: &mut dyn TableIo) -> Result<Action, TableError> {
        Ok(self.actions.pop_front().unwrap_or(self.fallback))
    }

    fn place_wager(&mut self, _player: &Player, min_wager: i64) -> i64 {
        self.wager.unwrap_or(min_wager)
    }

    fn will_play_side_bet(&mut self, _stack: i64) -> bool {
        self.side_bets
    }
}

/// Plays by a `Strategy`, declines insurance and sizes wagers with
/// `autoplay_wager`.
#[derive(Debug, Default)]
pub struct AutomatedAgent<S: Strategy = BasicStrategy> {
    strategy: S,
}

impl<S: Strategy> AutomatedAgent<S> {
    pub fn new(strategy: S) -> Self {
        AutomatedAgent { strategy }
    }

    /// The action this agent would take for the prompt.
    pub fn suggest(&self, prompt: &Prompt) -> Result<Action, TableError> {
        if prompt.asking_for_insurance {
            return Ok(Action::Decline);
        }
        let (Some(player), Some(hand)) = (prompt.player(), prompt.active_hand()) else {
            return Ok(Action::Stand);
        };
        let dealer = prompt.dealer_hand();
        let dealer_up = dealer.up_card().map_or(0, |card| card.value(true));
        let ctx = RuleContext::new(dealer, player.stack);
        self.strategy.decide(hand, &ctx, dealer_up)
    }
}

impl<S: Strategy> PlayerAgent for AutomatedAgent<S> {
    fn next_action(&mut self, prompt: &Prompt, _io: &mut dyn TableIo) -> Result<Action, TableError> {
        self.suggest(prompt)
    }

    fn place_wager(&mut self, player: &Player, min_wager: i64) -> i64 {
        autoplay_wager(player, min_wager)
    }

    fn will_play_side_bet(&mut self, stack: i64) -> bool {
        stack > 0
    }

    fn is_automated(&self) -> bool {
        true
    }
}
