use super::engine::{self, Grid};
use crate::input::Direction;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const START_TILES: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus
{
    Playing,
    Won,
    Over,
}

/// Full session snapshot, persisted as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState
{
    pub grid: Grid,
    pub score: u32,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub keep_playing: bool,
    #[serde(default)]
    pub over: bool,
}

impl GameState
{
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> Self
    {
        let mut grid = Grid::empty();
        for _ in 0..START_TILES {
            grid = engine::spawn_tile(&grid, rng);
        }
        Self {
            grid,
            score: 0,
            won: false,
            keep_playing: false,
            over: false,
        }
    }

    pub fn status(&self) -> GameStatus
    {
        if self.over {
            GameStatus::Over
        } else if self.won && !self.keep_playing {
            GameStatus::Won
        } else {
            GameStatus::Playing
        }
    }

    /// A snapshot worth resuming: not finished, at least the two opening
    /// tiles, only valid tiles, and a score the board could have produced.
    pub fn is_resumable(&self) -> bool
    {
        !self.over
            && self.grid.count_tiles() >= START_TILES
            && self.grid.is_well_formed()
            && u64::from(self.score) <= self.grid.max_score()
    }
}

/// Result of one accepted input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Turn
{
    pub moved: bool,
    pub score_delta: u32,
    pub just_won: bool,
    pub just_lost: bool,
    pub new_best: bool,
}

/// Owns the running game, the best score and the random source.
pub struct Controller<R>
{
    state: GameState,
    best: u32,
    rng: R,
}

impl<R: Rng> Controller<R>
{
    pub fn new(best: u32, mut rng: R) -> Self
    {
        let state = GameState::new_game(&mut rng);
        Self { state, best, rng }
    }

    /// Resumes `snapshot` when it is usable, otherwise starts over.
    pub fn resume(snapshot: Option<GameState>, best: u32, rng: R) -> Self
    {
        match snapshot {
            Some(state) if state.is_resumable() => {
                info!(score = state.score, "resuming saved 2048 game");
                let best = best.max(state.score);
                Self { state, best, rng }
            }
            Some(state) => {
                if state.over {
                    debug!("saved 2048 game was finished, starting fresh");
                } else {
                    warn!(score = state.score, "saved 2048 game is not a reachable board, starting fresh");
                }
                Self::new(best, rng)
            }
            None => Self::new(best, rng),
        }
    }

    pub fn state(&self) -> &GameState
    {
        &self.state
    }

    pub fn best(&self) -> u32
    {
        self.best
    }

    pub fn status(&self) -> GameStatus
    {
        self.state.status()
    }

    /// Applies one move. Returns `None` while the game is not accepting input
    /// (won and not yet dismissed, or over).
    pub fn apply(&mut self, direction: Direction) -> Option<Turn>
    {
        if self.status() != GameStatus::Playing {
            return None;
        }

        let result = engine::slide(&self.state.grid, direction);
        if !result.moved {
            return Some(Turn::default());
        }

        let mut turn = Turn {
            moved: true,
            score_delta: result.score_delta,
            ..Turn::default()
        };

        self.state.score = self.state.score.saturating_add(result.score_delta);
        if self.state.score > self.best {
            self.best = self.state.score;
            turn.new_best = true;
        }
        if result.reached_win && !self.state.won {
            self.state.won = true;
            turn.just_won = true;
            info!(score = self.state.score, "reached 2048");
        }

        self.state.grid = engine::spawn_tile(&result.grid, &mut self.rng);
        if !engine::has_moves_available(&self.state.grid) {
            self.state.over = true;
            turn.just_lost = true;
            info!(score = self.state.score, max_tile = self.state.grid.max_value(), "2048 game over");
        }

        debug!(
            direction = direction.label(),
            delta = result.score_delta,
            merges = result.merges,
            score = self.state.score,
            "move applied"
        );
        Some(turn)
    }

    /// Dismisses the win message and keeps playing the same board.
    pub fn keep_playing(&mut self)
    {
        if self.status() == GameStatus::Won {
            self.state.keep_playing = true;
        }
    }

    pub fn restart(&mut self)
    {
        self.state = GameState::new_game(&mut self.rng);
        info!(best = self.best, "new 2048 game");
    }
}
