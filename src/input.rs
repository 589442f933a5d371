use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};

/// Displacement (in units) below which a drag counts as a tap.
pub const SWIPE_DEAD_ZONE: f32 = 10.0;

// Rough glyph metrics of a terminal cell, used to turn cell deltas into units.
const UNITS_PER_COLUMN: f32 = 8.0;
const UNITS_PER_ROW: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction
{
    Up,
    Down,
    Left,
    Right,
}

impl Direction
{
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector `(dx, dy)`; `dy` grows downwards.
    pub fn vector(self) -> (isize, isize)
    {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction
    {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn label(self) -> &'static str
    {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Arrow keys, WASD and hjkl.
pub fn direction_for_key(code: KeyCode) -> Option<Direction>
{
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
            'w' | 'k' => Some(Direction::Up),
            's' | 'j' => Some(Direction::Down),
            'a' | 'h' => Some(Direction::Left),
            'd' | 'l' => Some(Direction::Right),
            _ => None,
        },
        _ => None,
    }
}

/// Classifies a swipe vector by its dominant axis. Returns `None` for taps.
pub fn classify_swipe(dx: f32, dy: f32, dead_zone: f32) -> Option<Direction>
{
    let abs_dx = dx.abs();
    let abs_dy = dy.abs();
    if abs_dx.max(abs_dy) < dead_zone {
        return None;
    }

    if abs_dx > abs_dy {
        if dx > 0.0 {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    } else if dy > 0.0 {
        Some(Direction::Down)
    } else {
        Some(Direction::Up)
    }
}

/// Turns left-button press/release pairs into swipe directions.
#[derive(Default)]
pub struct SwipeTracker
{
    start: Option<(u16, u16)>,
}

impl SwipeTracker
{
    pub fn handle(&mut self, event: &MouseEvent) -> Option<Direction>
    {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start = Some((event.column, event.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (start_col, start_row) = self.start.take()?;
                let dx = (event.column as f32 - start_col as f32) * UNITS_PER_COLUMN;
                let dy = (event.row as f32 - start_row as f32) * UNITS_PER_ROW;
                classify_swipe(dx, dy, SWIPE_DEAD_ZONE)
            }
            _ => None,
        }
    }
}
