use std::fs;
use std::path::{Path, PathBuf};

use blackjack_table::Rule;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod store;
pub mod terminal;

pub use store::{load_state, YamlFileStore};
pub use terminal::{TerminalIo, TerminalOptions};

/// Looked up in the home directory when no config file is given.
pub const DEFAULT_CONFIG_FILE: &str = ".blackjack_table.yml";
pub const DEFAULT_STATE_FILE: &str = "state.out";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid game mode: {0}")]
    GameMode(#[from] serde::de::value::Error),
    #[error("invalid setting: {0}")]
    Invalid(&'static str),
}

/// Table settings from one source. Every field is optional so the command line
/// and the config file can be layered; whatever is still unset after merging
/// takes the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub table: ConfigTable,
}

impl Config {
    /// Keeps every value set in `self` and fills the rest from `fallback`.
    pub fn or(self, fallback: Config) -> Config {
        Config {
            rule: self.rule.or(fallback.rule),
            table: self.table.or(fallback.table),
        }
    }

    /// Applies the built-in defaults and checks the result.
    pub fn resolve(self) -> Result<(Rule, TableOptions), ConfigError> {
        let mut rule: Rule = self.rule.try_into()?;
        let options = self.table.resolve();
        rule.autoplay = options.autoplay;

        if rule.number_of_decks == 0 {
            return Err(ConfigError::Invalid("the shoe needs at least one deck"));
        }
        if rule.min_wager <= 0 {
            return Err(ConfigError::Invalid("the minimum wager must be positive"));
        }
        if options.number_of_players == 0 {
            return Err(ConfigError::Invalid("the table needs at least one player"));
        }
        Ok((rule, options))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub number_of_decks: Option<u8>,
    pub min_wager: Option<i64>,
    pub game_mode: Option<String>,
    pub side_bets: Option<bool>,
    pub house_start: Option<i64>,
    pub player_start_stack: Option<i64>,
    pub max_autoplay_rounds: Option<u32>,
}

impl ConfigRule {
    fn or(self, fallback: ConfigRule) -> ConfigRule {
        ConfigRule {
            number_of_decks: self.number_of_decks.or(fallback.number_of_decks),
            min_wager: self.min_wager.or(fallback.min_wager),
            game_mode: self.game_mode.or(fallback.game_mode),
            side_bets: self.side_bets.or(fallback.side_bets),
            house_start: self.house_start.or(fallback.house_start),
            player_start_stack: self.player_start_stack.or(fallback.player_start_stack),
            max_autoplay_rounds: self.max_autoplay_rounds.or(fallback.max_autoplay_rounds),
        }
    }
}

impl TryInto<Rule> for ConfigRule {
    type Error = serde::de::value::Error;

    fn try_into(self) -> Result<Rule, Self::Error> {
        let default = Rule::default();
        let game_mode = match self.game_mode {
            Some(mode) => mode.parse()?,
            None => default.game_mode,
        };

        let rule = Rule {
            number_of_decks: self.number_of_decks.unwrap_or(default.number_of_decks),
            min_wager: self.min_wager.unwrap_or(default.min_wager),
            game_mode,
            side_bets: self.side_bets.unwrap_or(default.side_bets),
            house_start: self.house_start.unwrap_or(default.house_start),
            player_start_stack: self
                .player_start_stack
                .unwrap_or(default.player_start_stack),
            autoplay: default.autoplay,
            max_autoplay_rounds: self
                .max_autoplay_rounds
                .unwrap_or(default.max_autoplay_rounds),
        };

        Ok(rule)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigTable {
    pub number_of_players: Option<usize>,
    pub autoplay: Option<bool>,
    pub glyphs: Option<bool>,
    pub draw: Option<bool>,
    pub color: Option<bool>,
    pub clean: Option<bool>,
    pub state_file: Option<String>,
}

impl ConfigTable {
    fn or(self, fallback: ConfigTable) -> ConfigTable {
        ConfigTable {
            number_of_players: self.number_of_players.or(fallback.number_of_players),
            autoplay: self.autoplay.or(fallback.autoplay),
            glyphs: self.glyphs.or(fallback.glyphs),
            draw: self.draw.or(fallback.draw),
            color: self.color.or(fallback.color),
            clean: self.clean.or(fallback.clean),
            state_file: self.state_file.or(fallback.state_file),
        }
    }

    fn resolve(self) -> TableOptions {
        TableOptions {
            number_of_players: self.number_of_players.unwrap_or(1),
            autoplay: self.autoplay.unwrap_or(false),
            glyphs: self.glyphs.unwrap_or(false),
            draw: self.draw.unwrap_or(true),
            color: self.color.unwrap_or(true),
            clean: self.clean.unwrap_or(true),
            state_file: PathBuf::from(
                self.state_file
                    .unwrap_or_else(|| String::from(DEFAULT_STATE_FILE)),
            ),
        }
    }
}

/// Driver settings that are not part of the table rule.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub number_of_players: usize,
    pub autoplay: bool,
    pub glyphs: bool,
    pub draw: bool,
    pub color: bool,
    pub clean: bool,
    pub state_file: PathBuf,
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
    let filename = filename.as_ref();
    let file_content = fs::read_to_string(filename).map_err(|source| ConfigError::Read {
        path: filename.display().to_string(),
        source,
    })?;
    if file_content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(&file_content)?)
}

/// Loads the config file named on the command line, or the one in the home
/// directory when none is named. Only an explicitly named file has to exist.
pub fn load_config(filename: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(filename) = filename {
        return parse_config_from_file(filename);
    }
    match home::home_dir().map(|home| home.join(DEFAULT_CONFIG_FILE)) {
        Some(path) if path.is_file() => {
            info!("Reading config file {}", path.display());
            parse_config_from_file(path)
        }
        _ => Ok(Config::default()),
    }
}
