use crate::games::twenty48::parse_seed;
use crate::terminal::{self, BOLD, RESET, Rgb, TerminalGuard};
use crate::words::WORDS;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const DEFAULT_SECONDS: u64 = 60;
const MIN_SECONDS: u64 = 10;
const MAX_SECONDS: u64 = 600;
const TICK_MS: u64 = 33;
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

const MATRIX: Rgb = Rgb::new(0, 255, 0);
const TYPED: Rgb = Rgb::new(255, 255, 255);
const MISS: Rgb = Rgb::new(255, 80, 80);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase
{
    Ready,
    Playing,
    Over,
}

/// One timed round: a prompt word, what has been typed so far and the
/// countdown. Time is fed in from outside so the round stays testable.
pub struct TypingRound
{
    duration: Duration,
    elapsed: Duration,
    phase: Phase,
    word: &'static str,
    input: String,
    score: u32,
    keystrokes: u32,
}

impl TypingRound
{
    pub fn new(duration: Duration) -> Self
    {
        Self {
            duration,
            elapsed: Duration::ZERO,
            phase: Phase::Ready,
            word: "",
            input: String::new(),
            score: 0,
            keystrokes: 0,
        }
    }

    pub fn phase(&self) -> Phase
    {
        self.phase
    }

    pub fn word(&self) -> &'static str
    {
        self.word
    }

    pub fn input(&self) -> &str
    {
        &self.input
    }

    pub fn score(&self) -> u32
    {
        self.score
    }

    pub fn keystrokes(&self) -> u32
    {
        self.keystrokes
    }

    /// Whole seconds on the countdown, the way a once-a-second timer shows it.
    pub fn seconds_left(&self) -> u64
    {
        self.duration.as_secs().saturating_sub(self.elapsed.as_secs())
    }

    pub fn wpm(&self) -> f32
    {
        compute_wpm(self.score, self.elapsed)
    }

    /// Starts a round unless one is already running.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool
    {
        if self.phase == Phase::Playing {
            return false;
        }
        self.phase = Phase::Playing;
        self.elapsed = Duration::ZERO;
        self.score = 0;
        self.keystrokes = 0;
        self.input.clear();
        self.word = next_word(rng);
        info!(seconds = self.duration.as_secs(), "typing round started");
        true
    }

    /// Adds one character. Returns true when it completes the prompt, which
    /// scores a point and brings up the next word.
    pub fn type_char<R: Rng + ?Sized>(&mut self, ch: char, rng: &mut R) -> bool
    {
        if self.phase != Phase::Playing || ch.is_control() {
            return false;
        }
        self.keystrokes += 1;
        self.input.extend(normalize(ch).to_uppercase());
        if self.input != self.word {
            return false;
        }

        self.score += 1;
        self.input.clear();
        debug!(word = self.word, score = self.score, "word typed");
        self.word = next_word(rng);
        true
    }

    pub fn backspace(&mut self)
    {
        if self.phase == Phase::Playing {
            self.input.pop();
        }
    }

    /// Moves the clock to `elapsed` since the start. Returns true on the
    /// update that ends the round.
    pub fn update(&mut self, elapsed: Duration) -> bool
    {
        if self.phase != Phase::Playing {
            return false;
        }
        self.elapsed = elapsed.min(self.duration);
        if elapsed < self.duration {
            return false;
        }
        self.phase = Phase::Over;
        self.input.clear();
        info!(score = self.score, wpm = self.wpm(), "typing round over");
        true
    }
}

/// Folds full-width letters and digits onto their ASCII forms.
pub fn normalize(ch: char) -> char
{
    let full_width = matches!(ch, 'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９');
    if !full_width {
        return ch;
    }
    char::from_u32(ch as u32 - FULL_WIDTH_OFFSET).unwrap_or(ch)
}

fn next_word<R: Rng + ?Sized>(rng: &mut R) -> &'static str
{
    WORDS.choose(rng).copied().unwrap_or("PYTHON")
}

fn compute_wpm(words_typed: u32, elapsed: Duration) -> f32
{
    let minutes = elapsed.as_secs_f32() / 60.0;
    if minutes <= 0.0 {
        return 0.0;
    }
    words_typed as f32 / minutes
}

#[derive(Debug, PartialEq, Eq)]
pub struct TypingConfig
{
    seed: Option<u64>,
    duration: Duration,
}

impl Default for TypingConfig
{
    fn default() -> Self
    {
        Self {
            seed: None,
            duration: Duration::from_secs(DEFAULT_SECONDS),
        }
    }
}

impl TypingConfig
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
            } else if arg == "--seconds" {
                let value = iter
                    .next()
                    .ok_or_else(|| "Expected value after --seconds".to_string())?;
                config.duration = parse_seconds(value)?;
            } else if let Some(rest) = arg.strip_prefix("--seconds=") {
                config.duration = parse_seconds(rest)?;
            } else {
                return Err(format!("Unknown typing option '{arg}'"));
            }
        }
        Ok(config)
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String>
{
    let parsed = value
        .parse::<u64>()
        .map_err(|_| "Seconds must be a number".to_string())?;
    if parsed == 0 {
        return Err("Seconds must be positive".to_string());
    }
    Ok(Duration::from_secs(parsed.clamp(MIN_SECONDS, MAX_SECONDS)))
}

pub fn run_with_config(config: TypingConfig) -> Result<(), String>
{
    let mut term = TerminalGuard::enter().map_err(|err| err.to_string())?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut round = TypingRound::new(config.duration);
    let mut started: Option<Instant> = None;
    let mut best = 0;
    let mut last_tick = Instant::now();
    terminal::draw_lines(term.stdout(), &render(&round, best))?;

    loop {
        while event::poll(Duration::from_millis(0)).map_err(|err| err.to_string())? {
            match event::read().map_err(|err| err.to_string())? {
                Event::Key(KeyEvent { kind: KeyEventKind::Release, .. }) => {}
                Event::Key(KeyEvent { code, modifiers, .. }) => match code {
                    KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    KeyCode::Enter => {
                        if round.start(&mut rng) {
                            started = Some(Instant::now());
                        }
                    }
                    KeyCode::Backspace => round.backspace(),
                    KeyCode::Char(ch) => {
                        round.type_char(ch, &mut rng);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        if let Some(start) = started {
            if round.update(start.elapsed()) {
                best = best.max(round.score());
                started = None;
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(TICK_MS) {
            terminal::draw_lines(term.stdout(), &render(&round, best))?;
            last_tick = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn render(round: &TypingRound, best: u32) -> Vec<String>
{
    let mut lines = Vec::new();
    lines.push(format!("{BOLD}{}{RESET}", terminal::paint("KB Games - Fast Typing", MATRIX)));
    lines.push(format!(
        "Time left: {:>3}s  Score: {:>3}  Best: {:>3}",
        round.seconds_left(),
        round.score(),
        best
    ));
    lines.push(String::new());

    match round.phase() {
        Phase::Ready => {
            lines.push("Press Enter to start.".to_string());
        }
        Phase::Playing => {
            lines.push(format!("  {}", render_word(round.word(), round.input())));
            lines.push(String::new());
            lines.push(format!("> {}", round.input()));
        }
        Phase::Over => {
            lines.push(format!("Time's up! Final score: {}", round.score()));
            lines.push(format!("WPM: {:>5.1}  Keystrokes: {}", round.wpm(), round.keystrokes()));
            lines.push("Press Enter to play again.".to_string());
        }
    }

    lines.push(String::new());
    lines.push("Controls: type the word, backspace to fix, Enter to start, ESC to quit".to_string());
    lines
}

/// The prompt with the correctly typed prefix highlighted, or the whole word
/// flagged once the input stops matching.
fn render_word(word: &str, input: &str) -> String
{
    if !word.starts_with(input) {
        return format!("{BOLD}{}{RESET}", terminal::paint(word, MISS));
    }
    let (done, rest) = word.split_at(input.len());
    format!(
        "{BOLD}{}{}{RESET}",
        terminal::paint(done, TYPED),
        terminal::paint(rest, MATRIX)
    )
}
