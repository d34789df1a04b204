use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use blackjack_table::agent::{AutomatedAgent, InteractiveAgent, PlayerAgent};
use blackjack_table::strategy::BasicStrategy;
use blackjack_table::table::{Dealer, RoundOutcome};
use blackjack_table_drivers::{
    load_config, load_state, Config, ConfigRule, ConfigTable, TerminalIo, TerminalOptions,
    YamlFileStore,
};
use clap::Parser;
use log::{error, info};

/// Plays blackjack with side bets at a terminal table.
///
/// Every option can also be set in the config file; the command line wins.
#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file [default: ~/.blackjack_table.yml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of decks in the shoe [default: 5]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
    decks: Option<u8>,

    /// Number of players [default: 1]
    #[arg(long)]
    players: Option<usize>,

    /// Minimum wager [default: 25]
    #[arg(long)]
    minimum: Option<i64>,

    /// Show Unicode playing cards [default: false]
    #[arg(long, value_name = "BOOL")]
    glyphs: Option<bool>,

    /// Draw cards as boxes [default: true]
    #[arg(long, value_name = "BOOL")]
    draw: Option<bool>,

    /// Starting house balance [default: 0]
    #[arg(long)]
    house: Option<i64>,

    /// Starting stack per player, 0 rolls one [default: 0]
    #[arg(long)]
    stack: Option<i64>,

    /// Offer the game mode's side bet [default: true]
    #[arg(long, value_name = "BOOL")]
    side_bets: Option<bool>,

    /// Blackjack, JackAttack, Trifecta, Trifecta3, TrifectaStaxx or Spanish21 [default: Spanish21]
    #[arg(long)]
    mode: Option<String>,

    /// Let the basic strategy play every seat [default: false]
    #[arg(long, value_name = "BOOL")]
    autoplay: Option<bool>,

    /// Rounds to play in autoplay [default: 500]
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Ignore the saved table [default: true]
    #[arg(long, value_name = "BOOL")]
    clean: Option<bool>,

    /// Use colors [default: true]
    #[arg(long, value_name = "BOOL")]
    color: Option<bool>,

    /// Where the table is saved [default: state.out]
    #[arg(long)]
    state: Option<String>,

    /// Write log records to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl CommandLineArgs {
    fn to_config(&self) -> Config {
        Config {
            rule: ConfigRule {
                number_of_decks: self.decks,
                min_wager: self.minimum,
                game_mode: self.mode.clone(),
                side_bets: self.side_bets,
                house_start: self.house,
                player_start_stack: self.stack,
                max_autoplay_rounds: self.max_rounds,
            },
            table: ConfigTable {
                number_of_players: self.players,
                autoplay: self.autoplay,
                glyphs: self.glyphs,
                draw: self.draw,
                color: self.color,
                clean: self.clean,
                state_file: self.state.clone(),
            },
        }
    }
}

fn init_logger(log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.init();
    Ok(())
}

fn run(args: CommandLineArgs) -> Result<(), Box<dyn Error>> {
    let file_config = load_config(args.config.as_deref())?;
    let (rule, options) = args.to_config().or(file_config).resolve()?;
    info!("Table rule: {:?}", rule);

    let state = load_state(
        &options.state_file,
        options.clean,
        &rule,
        options.number_of_players,
    );
    let agents: Vec<Box<dyn PlayerAgent>> = (0..options.number_of_players)
        .map(|_| -> Box<dyn PlayerAgent> {
            if rule.autoplay {
                Box::new(AutomatedAgent::new(BasicStrategy))
            } else {
                Box::new(InteractiveAgent)
            }
        })
        .collect();

    let store = YamlFileStore::new(&options.state_file);
    let mut dealer = Dealer::new(rule, state, agents, store)?;
    let mut io = TerminalIo::new(TerminalOptions::new(&rule, &options))?;
    while dealer.deal_round(&mut io)? == RoundOutcome::Continue {}

    info!("Table closed after {} rounds", dealer.state().rounds);
    Ok(())
}

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();
    if let Err(err) = init_logger(args.log_file.as_ref()) {
        eprintln!("Cannot open the log file: {}", err);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
