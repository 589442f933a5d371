use crate::games::twenty48::parse_seed;
use crate::input::{self, Direction};
use crate::terminal::{self, BOLD, RESET, Rgb, TerminalGuard};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::info;

const DEFAULT_SIZE: usize = 20;
const MIN_SIZE: usize = 8;
const MAX_SIZE: usize = 40;
const FOOD_POINTS: u32 = 10;
const START_TICK: Duration = Duration::from_millis(100);
const MIN_TICK: Duration = Duration::from_millis(50);
const TICK_STEP: Duration = Duration::from_millis(2);

const HEAD: Rgb = Rgb::new(204, 255, 204);
const BODY: Rgb = Rgb::new(57, 255, 20);
const FOOD: Rgb = Rgb::new(255, 0, 60);
const WALL: Rgb = Rgb::new(90, 90, 90);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point
{
    pub x: usize,
    pub y: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step
{
    /// No heading yet, the snake waits for the first key.
    Idle,
    Moved,
    Ate,
    Crashed,
    /// The snake fills the whole board.
    Cleared,
}

pub struct Snake
{
    size: usize,
    body: VecDeque<Point>,
    heading: Option<Direction>,
    turned: bool,
    food: Option<Point>,
    score: u32,
    tick: Duration,
    finished: Option<Step>,
}

impl Snake
{
    pub fn new<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self
    {
        let start = Point {
            x: size / 2,
            y: size / 2,
        };
        let mut snake = Self {
            size,
            body: VecDeque::from([start]),
            heading: None,
            turned: false,
            food: None,
            score: 0,
            tick: START_TICK,
            finished: None,
        };
        snake.food = snake.free_cell(rng);
        snake
    }

    pub fn head(&self) -> Point
    {
        self.body[0]
    }

    pub fn length(&self) -> usize
    {
        self.body.len()
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn tick(&self) -> Duration
    {
        self.tick
    }

    pub fn food(&self) -> Option<Point>
    {
        self.food
    }

    pub fn heading(&self) -> Option<Direction>
    {
        self.heading
    }

    pub fn finished(&self) -> Option<Step>
    {
        self.finished
    }

    /// Accepts at most one turn per tick and never a U-turn.
    pub fn turn(&mut self, direction: Direction) -> bool
    {
        if self.finished.is_some() || self.turned {
            return false;
        }
        if self.heading.is_some_and(|heading| heading.opposite() == direction) {
            return false;
        }
        self.heading = Some(direction);
        self.turned = true;
        true
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Step
    {
        if let Some(step) = self.finished {
            return step;
        }
        self.turned = false;
        let Some(heading) = self.heading else {
            return Step::Idle;
        };

        let Some(next) = self.step_from(self.head(), heading) else {
            return self.finish(Step::Crashed);
        };
        let eats = self.food == Some(next);
        // the tail moves away this tick unless the snake grows
        let checked = if eats { self.body.len() } else { self.body.len() - 1 };
        if self.body.iter().take(checked).any(|&part| part == next) {
            return self.finish(Step::Crashed);
        }

        self.body.push_front(next);
        if !eats {
            self.body.pop_back();
            return Step::Moved;
        }

        self.score += FOOD_POINTS;
        if self.tick > MIN_TICK {
            self.tick = self.tick.saturating_sub(TICK_STEP).max(MIN_TICK);
        }
        self.food = self.free_cell(rng);
        if self.food.is_none() {
            return self.finish(Step::Cleared);
        }
        Step::Ate
    }

    fn finish(&mut self, step: Step) -> Step
    {
        self.finished = Some(step);
        info!(score = self.score, length = self.body.len(), ?step, "snake game over");
        step
    }

    fn step_from(&self, point: Point, direction: Direction) -> Option<Point>
    {
        let (dx, dy) = direction.vector();
        let x = point.x.checked_add_signed(dx)?;
        let y = point.y.checked_add_signed(dy)?;
        (x < self.size && y < self.size).then_some(Point { x, y })
    }

    fn free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point>
    {
        let free: Vec<Point> = (0..self.size)
            .flat_map(|y| (0..self.size).map(move |x| Point { x, y }))
            .filter(|point| !self.body.contains(point))
            .collect();
        free.choose(rng).copied()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct SnakeConfig
{
    seed: Option<u64>,
    size: usize,
}

impl Default for SnakeConfig
{
    fn default() -> Self
    {
        Self {
            seed: None,
            size: DEFAULT_SIZE,
        }
    }
}

impl SnakeConfig
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
            } else if arg == "--size" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --size".to_string())?;
                config.size = parse_size(value)?;
            } else if let Some(rest) = arg.strip_prefix("--size=") {
                config.size = parse_size(rest)?;
            } else {
                return Err(format!("Unknown snake option '{arg}'"));
            }
        }
        Ok(config)
    }
}

fn parse_size(value: &str) -> Result<usize, String>
{
    let parsed = value
        .parse::<usize>()
        .map_err(|_| "Board size must be a number".to_string())?;
    Ok(parsed.clamp(MIN_SIZE, MAX_SIZE))
}

pub fn run_with_config(config: SnakeConfig) -> Result<(), String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut snake = Snake::new(config.size, &mut rng);
    let mut best = 0;
    let mut last_tick = Instant::now();
    info!(size = config.size, "snake started");
    terminal::draw_lines(term.stdout(), &render(&snake, best))?;

    loop {
        let mut dirty = false;
        while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
            match event::read().map_err(|err| err.to_string())? {
                Event::Key(KeyEvent { kind: KeyEventKind::Release, .. }) => {}
                Event::Key(KeyEvent { code, modifiers, .. }) => match code {
                    KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    KeyCode::Char('r') if snake.finished().is_some() => {
                        snake = Snake::new(config.size, &mut rng);
                        last_tick = Instant::now();
                        dirty = true;
                    }
                    other => {
                        if let Some(direction) = input::direction_for_key(other) {
                            snake.turn(direction);
                        }
                    }
                },
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        if snake.finished().is_none() && last_tick.elapsed() >= snake.tick() {
            let step = snake.advance(&mut rng);
            best = best.max(snake.score());
            dirty |= step != Step::Idle;
            last_tick = Instant::now();
        }

        if dirty {
            terminal::draw_lines(term.stdout(), &render(&snake, best))?;
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn render(snake: &Snake, best: u32) -> Vec<String>
{
    let mut lines = Vec::new();
    lines.push(format!("{BOLD}{}{RESET}", terminal::paint("KB Games - Snake", BODY)));
    lines.push(format!(
        "Score: {:>5}  Best: {:>5}  Length: {:>3}  Tick: {:>3}ms",
        snake.score(),
        best,
        snake.length(),
        snake.tick().as_millis()
    ));

    let wall = terminal::paint(&"#".repeat(snake.size * 2 + 2), WALL);
    lines.push(wall.clone());
    for y in 0..snake.size {
        let mut line = terminal::paint("#", WALL);
        for x in 0..snake.size {
            let point = Point { x, y };
            let glyph = if point == snake.head() {
                terminal::paint("@@", HEAD)
            } else if snake.body.contains(&point) {
                terminal::paint("[]", BODY)
            } else if snake.food == Some(point) {
                terminal::paint("()", FOOD)
            } else {
                "  ".to_string()
            };
            line.push_str(&glyph);
        }
        line.push_str(&terminal::paint("#", WALL));
        lines.push(line);
    }
    lines.push(wall);

    lines.push(match snake.finished() {
        Some(Step::Cleared) => format!("Board cleared! Score {}. Press r to play again.", snake.score()),
        Some(_) => format!("Game over! Score {}. Press r to restart.", snake.score()),
        None if snake.heading().is_none() => "Press an arrow key to start.".to_string(),
        None => String::new(),
    });
    lines.push("Controls: arrows/WASD/hjkl to steer, ESC to quit".to_string());
    lines
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn rng() -> StdRng
    {
        StdRng::seed_from_u64(3)
    }

    fn snake_at(size: usize, body: &[(usize, usize)], heading: Direction) -> Snake
    {
        Snake {
            size,
            body: body.iter().map(|&(x, y)| Point { x, y }).collect(),
            heading: Some(heading),
            turned: false,
            food: None,
            score: 0,
            tick: START_TICK,
            finished: None,
        }
    }

    #[test]
    fn waits_for_first_key()
    {
        let mut rng = rng();
        let mut snake = Snake::new(DEFAULT_SIZE, &mut rng);
        assert_eq!(snake.head(), Point { x: 10, y: 10 });
        assert_ne!(snake.food(), Some(snake.head()));
        assert_eq!(snake.advance(&mut rng), Step::Idle);
        assert_eq!(snake.head(), Point { x: 10, y: 10 });

        snake.food = Some(Point { x: 0, y: 0 });
        assert!(snake.turn(Direction::Left));
        assert_eq!(snake.advance(&mut rng), Step::Moved);
        assert_eq!(snake.head(), Point { x: 9, y: 10 });
    }

    #[test]
    fn one_turn_per_tick_and_no_reversal()
    {
        let mut rng = rng();
        let mut snake = snake_at(10, &[(5, 5), (4, 5)], Direction::Right);
        assert!(!snake.turn(Direction::Left));
        assert!(snake.turn(Direction::Up));
        assert!(!snake.turn(Direction::Right));
        snake.advance(&mut rng);
        assert_eq!(snake.head(), Point { x: 5, y: 4 });
        assert!(snake.turn(Direction::Left));
    }

    #[test]
    fn wall_ends_the_game()
    {
        let mut rng = rng();
        let mut snake = snake_at(10, &[(0, 3)], Direction::Left);
        assert_eq!(snake.advance(&mut rng), Step::Crashed);
        assert_eq!(snake.finished(), Some(Step::Crashed));
        assert!(!snake.turn(Direction::Up));
    }

    #[test]
    fn biting_the_body_ends_the_game()
    {
        let mut rng = rng();
        // head at (2,2) heading down into (2,3), which is mid-body
        let mut snake = snake_at(10, &[(2, 2), (3, 2), (3, 3), (2, 3), (1, 3)], Direction::Down);
        assert_eq!(snake.advance(&mut rng), Step::Crashed);
    }

    #[test]
    fn chasing_the_tail_is_allowed()
    {
        let mut rng = rng();
        let mut snake = snake_at(10, &[(2, 2), (3, 2), (3, 3), (2, 3)], Direction::Down);
        assert_eq!(snake.advance(&mut rng), Step::Moved);
        assert_eq!(snake.head(), Point { x: 2, y: 3 });
        assert_eq!(snake.length(), 4);
    }

    #[test]
    fn eating_grows_scores_and_speeds_up()
    {
        let mut rng = rng();
        let mut snake = snake_at(10, &[(4, 4)], Direction::Right);
        snake.food = Some(Point { x: 5, y: 4 });
        assert_eq!(snake.advance(&mut rng), Step::Ate);
        assert_eq!(snake.length(), 2);
        assert_eq!(snake.score(), FOOD_POINTS);
        assert_eq!(snake.tick(), START_TICK - TICK_STEP);
        let food = snake.food().expect("food respawned");
        assert!(!snake.body.contains(&food));
    }

    #[test]
    fn speed_stops_at_floor()
    {
        let mut rng = rng();
        let mut snake = snake_at(10, &[(4, 4)], Direction::Right);
        snake.tick = MIN_TICK;
        snake.food = Some(Point { x: 5, y: 4 });
        snake.advance(&mut rng);
        assert_eq!(snake.tick(), MIN_TICK);
    }

    #[test]
    fn filling_the_board_clears_it()
    {
        let mut rng = rng();
        let size = MIN_SIZE;
        // serpentine over every cell except the last one
        let mut body = Vec::new();
        for y in 0..size {
            let xs: Vec<usize> = if y % 2 == 0 {
                (0..size).collect()
            } else {
                (0..size).rev().collect()
            };
            for x in xs {
                body.push((x, y));
            }
        }
        let last = body.pop().expect("cell");
        body.reverse();
        let mut snake = snake_at(size, &body, Direction::Left);
        snake.food = Some(Point { x: last.0, y: last.1 });
        assert_eq!(snake.advance(&mut rng), Step::Cleared);
        assert_eq!(snake.food(), None);
    }

    #[test]
    fn parses_options()
    {
        let args: Vec<String> = ["--size=12", "--seed", "4"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            SnakeConfig::from_args(&args),
            Ok(SnakeConfig {
                seed: Some(4),
                size: 12,
            })
        );
        let args = vec!["--size=200".to_string()];
        assert_eq!(SnakeConfig::from_args(&args).map(|config| config.size), Ok(MAX_SIZE));
        assert!(SnakeConfig::from_args(&["--size=big".to_string()]).is_err());
    }
}
