use super::engine::{SIZE, Tile};
use super::state::{GameState, GameStatus};
use crate::terminal::{self, BOLD, RESET, Rgb};

const CELL_WIDTH: usize = 8;
const CELL_HEIGHT: usize = 3;
const BOARD_WIDTH: usize = SIZE * (CELL_WIDTH + 1) + 1;

const EMPTY_BG: Rgb = Rgb::new(205, 193, 180);
const BORDER: Rgb = Rgb::new(187, 173, 160);
const DARK_TEXT: Rgb = Rgb::new(119, 110, 101);
const LIGHT_TEXT: Rgb = Rgb::new(249, 246, 242);
const TITLE: Rgb = Rgb::new(237, 194, 46);

fn tile_colors(value: u32) -> (Rgb, Rgb)
{
    let background = match value {
        2 => Rgb::new(238, 228, 218),
        4 => Rgb::new(237, 224, 200),
        8 => Rgb::new(242, 177, 121),
        16 => Rgb::new(245, 149, 99),
        32 => Rgb::new(246, 124, 95),
        64 => Rgb::new(246, 94, 59),
        128 => Rgb::new(237, 207, 114),
        256 => Rgb::new(237, 204, 97),
        512 => Rgb::new(237, 200, 80),
        1024 => Rgb::new(237, 197, 63),
        2048 => Rgb::new(237, 194, 46),
        _ => Rgb::new(60, 58, 50),
    };
    let text = if value <= 4 { DARK_TEXT } else { LIGHT_TEXT };
    (background, text)
}

/// Frame for one 2048 state: header, board, message and controls.
pub fn render(state: &GameState, best: u32) -> Vec<String>
{
    let mut lines = Vec::new();
    let title = format!("{BOLD}{}{RESET}", terminal::paint("KB Games - 2048", TITLE));
    lines.push(centered(&title, BOARD_WIDTH));
    lines.push(format!(
        "Score: {:>6}  Best: {:>6}  Max tile: {:>5}",
        state.score,
        best,
        state.grid.max_value()
    ));
    lines.push(String::new());

    let segment = format!("{}+", "-".repeat(CELL_WIDTH));
    let border = format!("{}+{}{RESET}", terminal::fg(BORDER), segment.repeat(SIZE));
    lines.push(border.clone());
    for row in state.grid.rows() {
        for band in 0..CELL_HEIGHT {
            let mut line = format!("{}|{RESET}", terminal::fg(BORDER));
            for cell in row {
                line.push_str(&render_cell(cell.as_ref(), band));
                line.push_str(&format!("{}|{RESET}", terminal::fg(BORDER)));
            }
            lines.push(line);
        }
        lines.push(border.clone());
    }

    lines.push(String::new());
    lines.push(status_message(state.status()).to_string());
    lines.push(
        "Controls: arrows/WASD/hjkl or mouse drag to move, r restart, ESC quit".to_string(),
    );
    lines
}

fn render_cell(tile: Option<&Tile>, band: usize) -> String
{
    let Some(tile) = tile else {
        return format!("{}{}{RESET}", terminal::bg(EMPTY_BG), " ".repeat(CELL_WIDTH));
    };

    let (background, text) = tile_colors(tile.value);
    let content = match band {
        0 if tile.is_merged => format!("{:>width$}", "+", width = CELL_WIDTH - 1) + " ",
        0 if tile.is_new => format!("{:>width$}", "*", width = CELL_WIDTH - 1) + " ",
        1 => format!("{:^width$}", tile.value, width = CELL_WIDTH),
        _ => " ".repeat(CELL_WIDTH),
    };
    let weight = if tile.is_new || tile.is_merged { BOLD } else { "" };
    format!(
        "{}{}{weight}{content}{RESET}",
        terminal::bg(background),
        terminal::fg(text)
    )
}

fn centered(line: &str, width: usize) -> String
{
    let pad = width.saturating_sub(terminal::visible_width(line)) / 2;
    format!("{}{line}", " ".repeat(pad))
}

pub fn status_message(status: GameStatus) -> &'static str
{
    match status {
        GameStatus::Playing => "Join the tiles to reach 2048.",
        GameStatus::Won => "You win! Press c to keep playing or r to restart.",
        GameStatus::Over => "Game over! Press r to restart.",
    }
}
