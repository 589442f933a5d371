use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb
{
    pub const fn new(r: u8, g: u8, b: u8) -> Self
    {
        Self { r, g, b }
    }
}

/// Raw mode + alternate screen for the lifetime of a game.
pub struct TerminalGuard
{
    stdout: Stdout,
    mouse: bool,
}

impl TerminalGuard
{
    pub fn enter() -> io::Result<Self>
    {
        Self::open(false)
    }

    /// Like [`TerminalGuard::enter`], also reporting mouse drags.
    pub fn enter_with_mouse() -> io::Result<Self>
    {
        Self::open(true)
    }

    fn open(mouse: bool) -> io::Result<Self>
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        if mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        Ok(Self { stdout, mouse })
    }

    pub fn stdout(&mut self) -> &mut Stdout
    {
        &mut self.stdout
    }
}

impl Drop for TerminalGuard
{
    fn drop(&mut self)
    {
        if self.mouse {
            let _ = execute!(self.stdout, DisableMouseCapture);
        }
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Clears the screen and writes `lines` from the top-left corner.
pub fn draw_lines(stdout: &mut Stdout, lines: &[String]) -> Result<(), String>
{
    let output = format!("{}\r\n", lines.join("\r\n"));

    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All)).map_err(|err| err.to_string())?;
    stdout.write_all(output.as_bytes()).map_err(|err| err.to_string())?;
    stdout.flush().map_err(|err| err.to_string())?;

    Ok(())
}

pub fn fg(color: Rgb) -> String
{
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

pub fn bg(color: Rgb) -> String
{
    format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

pub fn paint(text: &str, color: Rgb) -> String
{
    format!("{}{text}{RESET}", fg(color))
}

/// Visible width, skipping ANSI escape sequences.
pub fn visible_width(text: &str) -> usize
{
    let mut width = 0;
    let mut in_escape = false;
    for ch in text.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }
    width
}
