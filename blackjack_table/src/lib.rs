pub mod agent;
pub mod card;
mod error;
pub mod rules;
pub mod settlement;
pub mod sidebets;
pub mod state;
pub mod strategy;
pub mod table;

pub use error::TableError;
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

/// The table configuration a `Dealer` runs with. Built by the drivers from the
/// command line and the optional configuration file.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub number_of_decks: u8,
    pub min_wager: i64,
    pub game_mode: GameMode,
    pub side_bets: bool,
    pub house_start: i64,
    pub player_start_stack: i64, // 0 means roll a d20 and multiply by 5 x min_wager.
    pub autoplay: bool,
    pub max_autoplay_rounds: u32,
}

impl Rule {
    /// Spanish21 shoes carry no tens.
    pub fn without_tens(&self) -> bool {
        self.game_mode == GameMode::Spanish21
    }
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 5,
            min_wager: 25,
            game_mode: GameMode::Spanish21,
            side_bets: true,
            house_start: 0,
            player_start_stack: 0,
            autoplay: false,
            max_autoplay_rounds: 500,
        }
    }
}

/// Selects the side bet paid after the deal. `Spanish21` also changes the shoe
/// and pays blackjacks before the insurance phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
pub enum GameMode {
    Blackjack,
    JackAttack,
    Trifecta,
    Trifecta3,
    TrifectaStaxx,
    Spanish21,
}

/// A single discrete action symbol accepted by the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Insure,
    Decline,
    EvenMoney,
    RevealHole,
    StrategyTable,
    ShoeDetails,
    Stats,
    Quit,
    #[default]
    Pass,
}

impl From<char> for Action {
    fn from(key: char) -> Self {
        match key.to_ascii_lowercase() {
            'h' => Action::Hit,
            's' => Action::Stand,
            'd' => Action::Double,
            'p' => Action::Split,
            'i' => Action::Insure,
            'n' => Action::Decline,
            'e' => Action::EvenMoney,
            'r' => Action::RevealHole,
            'a' => Action::StrategyTable,
            'v' => Action::ShoeDetails,
            'w' => Action::Stats,
            'q' => Action::Quit,
            _ => Action::Pass,
        }
    }
}

impl Action {
    pub fn key(&self) -> char {
        match self {
            Action::Hit => 'h',
            Action::Stand => 's',
            Action::Double => 'd',
            Action::Split => 'p',
            Action::Insure => 'i',
            Action::Decline => 'n',
            Action::EvenMoney => 'e',
            Action::RevealHole => 'r',
            Action::StrategyTable => 'a',
            Action::ShoeDetails => 'v',
            Action::Stats => 'w',
            Action::Quit => 'q',
            Action::Pass => 'x',
        }
    }

    /// Informational actions show something and ask again without using up a turn.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            Action::StrategyTable | Action::ShoeDetails | Action::Stats
        )
    }
}
