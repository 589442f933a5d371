pub mod engine;
pub mod state;
pub mod view;

use crate::input::{self, SwipeTracker};
use crate::storage::Store;
use crate::terminal::{self, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use state::{Controller, GameState, GameStatus};
use std::io::Stdout;
use std::time::Duration;
use tracing::{info, warn};

const STATE_FILE: &str = "2048-game-state.json";
const BEST_FILE: &str = "2048-best-score.json";
const POLL_MS: u64 = 50;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Twenty48Config
{
    seed: Option<u64>,
    fresh: bool,
}

impl Twenty48Config
{
    pub fn from_args(args: &[String]) -> Result<Self, String>
    {
        let mut config = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--seed" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --seed".to_string())?;
                config.seed = Some(parse_seed(value)?);
            } else if let Some(rest) = arg.strip_prefix("--seed=") {
                config.seed = Some(parse_seed(rest)?);
            } else if arg == "--new" {
                config.fresh = true;
            } else {
                return Err(format!("Unknown 2048 option '{arg}'"));
            }
        }
        Ok(config)
    }

    fn rng(&self) -> StdRng
    {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

pub(crate) fn parse_seed(value: &str) -> Result<u64, String>
{
    value
        .parse::<u64>()
        .map_err(|_| "Seed must be a non-negative integer".to_string())
}

enum Action
{
    Quit,
    Move(input::Direction),
    Restart,
    KeepPlaying,
    Redraw,
}

pub fn run_with_config(store: &Store, config: Twenty48Config) -> Result<(), String>
{
    let best = store.load::<u32>(BEST_FILE).unwrap_or(0);
    let snapshot = if config.fresh {
        None
    } else {
        store.load::<GameState>(STATE_FILE)
    };
    let mut controller = Controller::resume(snapshot, best, config.rng());
    save_state(store, controller.state());

    let mut term = TerminalGuard::enter_with_mouse().map_err(|err| err.to_string())?;
    let mut swipes = SwipeTracker::default();
    draw(term.stdout(), &controller)?;

    loop {
        let Some(action) = next_action(&mut swipes)? else {
            continue;
        };

        match action {
            Action::Quit => break,
            Action::Redraw => {}
            Action::Restart => {
                controller.restart();
                save_state(store, controller.state());
            }
            Action::KeepPlaying => {
                if controller.status() != GameStatus::Won {
                    continue;
                }
                controller.keep_playing();
                save_state(store, controller.state());
            }
            Action::Move(direction) => {
                let Some(turn) = controller.apply(direction) else {
                    continue;
                };
                if !turn.moved {
                    continue;
                }
                if turn.new_best {
                    save_best(store, controller.best());
                }
                save_state(store, controller.state());
            }
        }

        draw(term.stdout(), &controller)?;
    }

    info!(
        score = controller.state().score,
        best = controller.best(),
        "leaving 2048"
    );
    Ok(())
}

fn next_action(swipes: &mut SwipeTracker) -> Result<Option<Action>, String>
{
    if !event::poll(Duration::from_millis(POLL_MS)).map_err(|err| err.to_string())? {
        return Ok(None);
    }

    let action = match event::read().map_err(|err| err.to_string())? {
        Event::Key(KeyEvent { kind: KeyEventKind::Release, .. }) => None,
        Event::Key(KeyEvent { code, modifiers, .. }) => match code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Restart),
            KeyCode::Char('c') | KeyCode::Enter => Some(Action::KeepPlaying),
            other => input::direction_for_key(other).map(Action::Move),
        },
        Event::Mouse(mouse) => swipes.handle(&mouse).map(Action::Move),
        Event::Resize(_, _) => Some(Action::Redraw),
        _ => None,
    };
    Ok(action)
}

fn draw(stdout: &mut Stdout, controller: &Controller<StdRng>) -> Result<(), String>
{
    let lines = view::render(controller.state(), controller.best());
    terminal::draw_lines(stdout, &lines)
}

fn save_state(store: &Store, state: &GameState)
{
    if let Err(err) = store.save(STATE_FILE, state) {
        warn!(%err, "failed to save 2048 game");
    }
}

fn save_best(store: &Store, best: u32)
{
    if let Err(err) = store.save(BEST_FILE, &best) {
        warn!(%err, "failed to save 2048 best score");
    }
}
