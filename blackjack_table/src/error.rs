use thiserror::Error;

use crate::table::RoundPhase;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("{action} is only allowed in {expected:?} phase, the table is in {actual:?} phase")]
    PhaseViolation {
        action: &'static str,
        expected: RoundPhase,
        actual: RoundPhase,
    },

    #[error("I didn't understand... What should I do? (hand {hand}, dealer shows {dealer_up})")]
    Undecidable { hand: String, dealer_up: u32 },

    #[error("cannot read a card from {0:?}")]
    InvalidCard(String),

    #[error("the input source was closed")]
    InputClosed,

    #[error("failed to read the next action: {0}")]
    Input(#[from] std::io::Error),

    #[error("failed to save the table state: {0}")]
    Persistence(String),

    #[error("the table seats {expected} players but {actual} agents were given")]
    AgentCount { expected: usize, actual: usize },
}
