use std::fs;
use std::path::{Path, PathBuf};

use blackjack_table::state::{BlackjackState, StateStore};
use blackjack_table::{Rule, TableError};
use log::{info, warn};

/// Writes the whole table state to a YAML file after every change.
#[derive(Debug, Clone)]
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        YamlFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for YamlFileStore {
    fn save(&mut self, state: &BlackjackState) -> Result<(), TableError> {
        let content = serde_yaml::to_string(state)
            .map_err(|err| TableError::Persistence(format!("cannot encode the table: {}", err)))?;
        fs::write(&self.path, content).map_err(|err| {
            TableError::Persistence(format!("cannot write {}: {}", self.path.display(), err))
        })
    }
}

fn read_state(path: &Path) -> Result<BlackjackState, String> {
    let content = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_yaml::from_str(&content).map_err(|err| err.to_string())
}

/// The table to start with: the snapshot at `path` unless `clean` is set or the
/// snapshot cannot be read, a fresh table otherwise. Either way exactly
/// `number_of_players` players are seated.
pub fn load_state(
    path: &Path,
    clean: bool,
    rule: &Rule,
    number_of_players: usize,
) -> BlackjackState {
    if clean {
        info!("Starting a clean table");
        return BlackjackState::new(rule, number_of_players);
    }
    match read_state(path) {
        Ok(mut state) => {
            info!(
                "Restored the table from {} after {} rounds",
                path.display(),
                state.rounds
            );
            state.seat_players(rule, number_of_players);
            state
        }
        Err(reason) => {
            warn!(
                "Cannot restore the table from {} ({}), starting a clean one",
                path.display(),
                reason
            );
            BlackjackState::new(rule, number_of_players)
        }
    }
}
