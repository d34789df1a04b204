mod screen;

pub use screen::{action_menu, currency, verdict, TerminalOptions, Verdict};

use std::io::{self, Stdout, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use blackjack_table::state::BlackjackState;
use blackjack_table::table::{GameView, InfoRequest, TableIo};
use blackjack_table::TableError;
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use log::{debug, warn};

/// Draws the table on the terminal and reads single key presses.
///
/// The terminal stays in raw mode while this value lives. Keys are read on a
/// separate thread and queued on a channel, so a key pressed while the table
/// is busy is not lost.
pub struct TerminalIo {
    options: TerminalOptions,
    keys: Receiver<char>,
    out: Stdout,
}

impl TerminalIo {
    pub fn new(options: TerminalOptions) -> Result<Self, TableError> {
        enable_raw_mode()?;
        let (sender, keys) = mpsc::channel();
        thread::Builder::new()
            .name(String::from("key-reader"))
            .spawn(move || read_keys(sender))?;
        Ok(TerminalIo {
            options,
            keys,
            out: io::stdout(),
        })
    }

    fn draw(&mut self, lines: &[String]) {
        if let Err(err) = self.write_lines(lines) {
            warn!("Cannot draw the table: {}", err);
        }
    }

    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in lines {
            // Raw mode does not return the carriage on a line feed.
            queue!(self.out, Print(line), Print("\r\n"))?;
        }
        self.out.flush()
    }
}

impl Drop for TerminalIo {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            warn!("Cannot restore the terminal: {}", err);
        }
    }
}

impl TableIo for TerminalIo {
    fn read_action(&mut self) -> Result<char, TableError> {
        let key = self.keys.recv().map_err(|_| TableError::InputClosed)?;
        debug!("Key pressed: {}", key);
        Ok(key)
    }

    fn render(&mut self, state: &BlackjackState, view: GameView) {
        let lines = self.options.game_screen(state, view);
        self.draw(&lines);
    }

    fn show_info(&mut self, state: &BlackjackState, request: InfoRequest) {
        let lines = match request {
            InfoRequest::StrategyTable => {
                let stack = state.players.first().map_or(0, |player| player.stack);
                self.options.strategy_screen(stack)
            }
            InfoRequest::ShoeDetails => self.options.shoe_screen(state),
            InfoRequest::Stats => self.options.stats_screen(state),
        };
        self.draw(&lines);
    }
}

/// The table key for a terminal event. Escape and Ctrl-C quit.
fn key_for(event: Event) -> Option<char> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some('q'),
        KeyCode::Char(key) => Some(key),
        KeyCode::Esc => Some('q'),
        _ => None,
    }
}

fn read_keys(sender: Sender<char>) {
    loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(err) => {
                warn!("Key reader stopped: {}", err);
                return;
            }
        };
        if let Some(key) = key_for(event) {
            if sender.send(key).is_err() {
                return;
            }
        }
    }
}
