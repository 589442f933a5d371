//! Slide/merge rules of 2048 over a 4x4 grid.
//!
//! Every operation here is pure: it takes a grid by reference and hands back a
//! new one, so callers can keep the previous state around.

use crate::input::Direction;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SIZE: usize = 4;
pub const WIN_VALUE: u32 = 2048;
/// Largest tile a 4x4 board can ever hold.
pub const MAX_TILE: u32 = 1 << 17;

const FOUR_PROBABILITY: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile
{
    pub value: u32,
    pub id: u64,
    /// Spawned by the last turn.
    #[serde(default)]
    pub is_new: bool,
    /// Produced by a merge in the last turn.
    #[serde(default)]
    pub is_merged: bool,
}

impl Tile
{
    pub fn new(value: u32, id: u64) -> Self
    {
        Self {
            value,
            id,
            is_new: false,
            is_merged: false,
        }
    }
}

pub type Cell = Option<Tile>;

/// Row-major 4x4 board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid
{
    cells: [[Cell; SIZE]; SIZE],
}

/// Outcome of one sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveResult
{
    pub grid: Grid,
    pub score_delta: u32,
    pub moved: bool,
    pub merges: u32,
    /// A merge in this sweep produced exactly [`WIN_VALUE`].
    pub reached_win: bool,
}

impl Grid
{
    pub fn empty() -> Self
    {
        Self::default()
    }

    /// Builds a grid from plain values, `0` meaning empty. Ids are assigned in
    /// row-major order starting at 1.
    pub fn from_values(values: [[u32; SIZE]; SIZE]) -> Self
    {
        let mut grid = Self::empty();
        let mut next_id = 1;
        for (row, line) in values.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value != 0 {
                    grid.cells[row][col] = Some(Tile::new(value, next_id));
                    next_id += 1;
                }
            }
        }
        grid
    }

    pub fn values(&self) -> [[u32; SIZE]; SIZE]
    {
        let mut values = [[0; SIZE]; SIZE];
        for (row, line) in self.cells.iter().enumerate() {
            for (col, cell) in line.iter().enumerate() {
                values[row][col] = cell.map_or(0, |tile| tile.value);
            }
        }
        values
    }

    pub fn get(&self, row: usize, col: usize) -> Cell
    {
        self.cells[row][col]
    }

    pub fn rows(&self) -> &[[Cell; SIZE]; SIZE]
    {
        &self.cells
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile>
    {
        self.cells.iter().flatten().flatten()
    }

    pub fn count_tiles(&self) -> usize
    {
        self.tiles().count()
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)>
    {
        let mut empty = Vec::with_capacity(SIZE * SIZE);
        for row in 0..SIZE {
            for col in 0..SIZE {
                if self.cells[row][col].is_none() {
                    empty.push((row, col));
                }
            }
        }
        empty
    }

    pub fn max_value(&self) -> u32
    {
        self.tiles().map(|tile| tile.value).max().unwrap_or(0)
    }

    /// Every tile holds a power of two between 2 and [`MAX_TILE`].
    pub fn is_well_formed(&self) -> bool
    {
        self.tiles().all(|tile| {
            tile.value >= 2 && tile.value <= MAX_TILE && tile.value.is_power_of_two()
        })
    }

    /// Upper bound on the score that can lead to this board: building a tile
    /// of `2^k` out of spawned 2s pays `(k - 1) * 2^k`.
    pub fn max_score(&self) -> u64
    {
        self.tiles()
            .map(|tile| {
                let value = u64::from(tile.value);
                u64::from(tile.value.trailing_zeros().saturating_sub(1)) * value
            })
            .sum()
    }

    fn next_id(&self) -> u64
    {
        self.tiles().map(|tile| tile.id).max().unwrap_or(0) + 1
    }
}

/// Slides and merges every tile towards `direction`.
///
/// A no-op move hands back an identical copy of `grid`, render flags included.
pub fn slide(grid: &Grid, direction: Direction) -> MoveResult
{
    let (dx, dy) = direction.vector();
    let mut cells = grid.cells;
    for tile in cells.iter_mut().flatten().flatten() {
        tile.is_new = false;
        tile.is_merged = false;
    }

    let mut merged = [[false; SIZE]; SIZE];
    let mut score_delta = 0;
    let mut merges = 0;
    let mut moved = false;
    let mut reached_win = false;

    for row in traversal(dy) {
        for col in traversal(dx) {
            let Some(tile) = cells[row][col] else {
                continue;
            };

            let mut furthest = (row, col);
            let mut next = step((row, col), dx, dy);
            while let Some((next_row, next_col)) = next {
                if cells[next_row][next_col].is_some() {
                    break;
                }
                furthest = (next_row, next_col);
                next = step(furthest, dx, dy);
            }

            if let Some((next_row, next_col)) = next {
                let target = cells[next_row][next_col];
                if target.is_some_and(|other| other.value == tile.value)
                    && !merged[next_row][next_col]
                {
                    let value = tile.value * 2;
                    cells[next_row][next_col] = Some(Tile {
                        value,
                        id: tile.id,
                        is_new: false,
                        is_merged: true,
                    });
                    cells[row][col] = None;
                    merged[next_row][next_col] = true;
                    score_delta += value;
                    merges += 1;
                    moved = true;
                    if value == WIN_VALUE {
                        reached_win = true;
                    }
                    continue;
                }
            }

            if furthest != (row, col) {
                cells[furthest.0][furthest.1] = Some(tile);
                cells[row][col] = None;
                moved = true;
            }
        }
    }

    let grid = if moved {
        Grid { cells }
    } else {
        grid.clone()
    };

    MoveResult {
        grid,
        score_delta,
        moved,
        merges,
        reached_win,
    }
}

/// True while an empty cell or an adjacent equal pair exists.
pub fn has_moves_available(grid: &Grid) -> bool
{
    let values = grid.values();
    if values.iter().flatten().any(|&value| value == 0) {
        return true;
    }

    for row in 0..SIZE {
        for col in 0..SIZE {
            let value = values[row][col];
            // right and down cover every adjacent pair once
            for (next_row, next_col) in [(row, col + 1), (row + 1, col)] {
                if next_row < SIZE
                    && next_col < SIZE
                    && values[next_row][next_col] == value
                {
                    return true;
                }
            }
        }
    }

    false
}

/// Places a 2 (90%) or 4 (10%) on a uniformly chosen empty cell. A full grid
/// is returned unchanged.
pub fn spawn_tile<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Grid
{
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return grid.clone();
    }

    let (row, col) = empty[rng.gen_range(0..empty.len())];
    let value = if rng.gen_bool(FOUR_PROBABILITY) { 4 } else { 2 };
    let mut next = grid.clone();
    next.cells[row][col] = Some(Tile {
        value,
        id: grid.next_id(),
        is_new: true,
        is_merged: false,
    });
    next
}

// Cells nearest the destination edge come first.
fn traversal(delta: isize) -> [usize; SIZE]
{
    if delta == 1 { [3, 2, 1, 0] } else { [0, 1, 2, 3] }
}

fn step((row, col): (usize, usize), dx: isize, dy: isize) -> Option<(usize, usize)>
{
    let row = row.checked_add_signed(dy)?;
    let col = col.checked_add_signed(dx)?;
    (row < SIZE && col < SIZE).then_some((row, col))
}

#[cfg(test)]
mod tests
{
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single_row(row: [u32; SIZE]) -> Grid
    {
        Grid::from_values([row, [0; SIZE], [0; SIZE], [0; SIZE]])
    }

    fn transpose(values: [[u32; SIZE]; SIZE]) -> [[u32; SIZE]; SIZE]
    {
        let mut out = [[0; SIZE]; SIZE];
        for row in 0..SIZE {
            for col in 0..SIZE {
                out[col][row] = values[row][col];
            }
        }
        out
    }

    #[test]
    fn left_merges_leading_pair_only()
    {
        let result = slide(&single_row([2, 2, 4, 0]), Direction::Left);
        assert_eq!(result.grid.values()[0], [4, 4, 0, 0]);
        assert_eq!(result.score_delta, 4);
        assert_eq!(result.merges, 1);
        assert!(result.moved);
    }

    #[test]
    fn right_merges_across_gap()
    {
        let result = slide(&single_row([2, 0, 0, 2]), Direction::Right);
        assert_eq!(result.grid.values()[0], [0, 0, 0, 4]);
        assert_eq!(result.score_delta, 4);
        assert!(result.moved);
    }

    #[test]
    fn alternating_row_is_stuck()
    {
        let grid = single_row([2, 4, 2, 4]);
        let result = slide(&grid, Direction::Left);
        assert!(!result.moved);
        assert_eq!(result.score_delta, 0);
        assert_eq!(result.grid, grid);
    }

    #[test]
    fn merged_tile_does_not_merge_again()
    {
        let result = slide(&single_row([2, 2, 2, 2]), Direction::Left);
        assert_eq!(result.grid.values()[0], [4, 4, 0, 0]);
        assert_eq!(result.score_delta, 8);

        let result = slide(&single_row([4, 4, 8, 0]), Direction::Left);
        assert_eq!(result.grid.values()[0], [8, 8, 0, 0]);

        let result = slide(&single_row([2, 2, 2, 0]), Direction::Right);
        assert_eq!(result.grid.values()[0], [0, 0, 2, 4]);
    }

    #[test]
    fn vertical_moves_follow_columns()
    {
        let grid = Grid::from_values(transpose([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]));
        let up = slide(&grid, Direction::Up);
        assert_eq!(transpose(up.grid.values())[0], [4, 4, 0, 0]);

        let down = slide(&grid, Direction::Down);
        assert_eq!(transpose(down.grid.values())[0], [0, 0, 4, 4]);
        assert_eq!(down.score_delta, 4);
    }

    #[test]
    fn merge_keeps_moving_tile_identity_and_flags_it()
    {
        let grid = single_row([2, 2, 0, 0]);
        let moving_id = grid.get(0, 1).map(|tile| tile.id);
        let result = slide(&grid, Direction::Left);
        let merged = result.grid.get(0, 0).expect("merged tile");
        assert_eq!(Some(merged.id), moving_id);
        assert!(merged.is_merged);
        assert!(!merged.is_new);
    }

    #[test]
    fn slid_tile_keeps_identity()
    {
        let grid = single_row([0, 0, 8, 0]);
        let id = grid.get(0, 2).map(|tile| tile.id);
        let result = slide(&grid, Direction::Left);
        assert_eq!(result.grid.get(0, 0).map(|tile| tile.id), id);
        assert!(result.grid.get(0, 2).is_none());
    }

    #[test]
    fn reaching_win_value_is_reported()
    {
        let result = slide(&single_row([1024, 1024, 0, 0]), Direction::Right);
        assert!(result.reached_win);
        assert_eq!(result.score_delta, 2048);

        let result = slide(&single_row([2048, 2048, 0, 0]), Direction::Right);
        assert!(!result.reached_win);
    }

    #[test]
    fn input_grid_is_untouched()
    {
        let grid = single_row([2, 2, 4, 0]);
        let before = grid.clone();
        let _ = slide(&grid, Direction::Left);
        assert_eq!(grid, before);
    }

    #[test]
    fn moves_available_on_empty_cell_or_pair()
    {
        assert!(has_moves_available(&Grid::empty()));
        assert!(has_moves_available(&Grid::from_values([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 0],
        ])));
        assert!(has_moves_available(&Grid::from_values([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 4],
        ])));
        assert!(has_moves_available(&Grid::from_values([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 8],
            [4, 2, 4, 8],
        ])));
    }

    #[test]
    fn no_moves_on_locked_board()
    {
        let grid = Grid::from_values([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert!(!has_moves_available(&grid));
        for direction in Direction::ALL {
            assert!(!slide(&grid, direction).moved);
        }
    }

    #[test]
    fn spawn_fills_one_empty_cell()
    {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = single_row([2, 0, 0, 0]);
        let next = spawn_tile(&grid, &mut rng);
        assert_eq!(next.count_tiles(), 2);
        assert_eq!(next.get(0, 0), grid.get(0, 0));

        let spawned: Vec<&Tile> = next.tiles().filter(|tile| tile.is_new).collect();
        assert_eq!(spawned.len(), 1);
        assert!(matches!(spawned[0].value, 2 | 4));
        assert_eq!(spawned[0].id, 2);
    }

    #[test]
    fn spawn_on_full_grid_is_noop()
    {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = Grid::from_values([[2; SIZE]; SIZE]);
        assert_eq!(spawn_tile(&grid, &mut rng), grid);
    }

    #[test]
    fn spawn_values_are_mostly_twos()
    {
        let mut rng = StdRng::seed_from_u64(2048);
        let mut fours = 0;
        for _ in 0..2000 {
            let grid = spawn_tile(&Grid::empty(), &mut rng);
            match grid.max_value() {
                2 => {}
                4 => fours += 1,
                other => panic!("unexpected spawn value {other}"),
            }
        }
        assert!((100..300).contains(&fours), "fours = {fours}");
    }

    #[test]
    fn well_formed_rejects_odd_values()
    {
        assert!(single_row([2, 4, 8, 0]).is_well_formed());
        assert!(!single_row([3, 0, 0, 0]).is_well_formed());
        assert!(!single_row([1, 0, 0, 0]).is_well_formed());
        assert!(single_row([MAX_TILE, 0, 0, 0]).is_well_formed());
        assert!(!single_row([MAX_TILE * 2, 0, 0, 0]).is_well_formed());
        assert!(!single_row([1 << 31, 1 << 31, 0, 0]).is_well_formed());
    }

    #[test]
    fn max_score_counts_merge_chains()
    {
        assert_eq!(Grid::empty().max_score(), 0);
        assert_eq!(single_row([2, 2, 0, 0]).max_score(), 0);
        assert_eq!(single_row([4, 0, 0, 0]).max_score(), 4);
        assert_eq!(single_row([8, 2, 0, 0]).max_score(), 16);
        assert_eq!(single_row([2048, 0, 0, 0]).max_score(), 10 * 2048);
    }

    fn arb_grid() -> impl Strategy<Value = [[u32; SIZE]; SIZE]>
    {
        let cell = prop_oneof![
            3 => Just(0u32),
            2 => (1u32..=6).prop_map(|exp| 1 << exp),
        ];
        prop::array::uniform4(prop::array::uniform4(cell))
    }

    fn arb_direction() -> impl Strategy<Value = Direction>
    {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn tile_count_drops_by_merges(values in arb_grid(), direction in arb_direction())
        {
            let grid = Grid::from_values(values);
            let result = slide(&grid, direction);
            prop_assert_eq!(
                result.grid.count_tiles(),
                grid.count_tiles() - result.merges as usize
            );
        }

        #[test]
        fn score_is_sum_of_merge_results(values in arb_grid(), direction in arb_direction())
        {
            let grid = Grid::from_values(values);
            let result = slide(&grid, direction);
            let merged_sum: u32 = result
                .grid
                .tiles()
                .filter(|tile| tile.is_merged)
                .map(|tile| tile.value)
                .sum();
            prop_assert_eq!(result.score_delta, merged_sum);
            prop_assert_eq!(
                result.grid.tiles().filter(|tile| tile.is_merged).count(),
                result.merges as usize
            );
        }

        #[test]
        fn total_value_is_conserved(values in arb_grid(), direction in arb_direction())
        {
            let grid = Grid::from_values(values);
            let result = slide(&grid, direction);
            let before: u32 = grid.tiles().map(|tile| tile.value).sum();
            let after: u32 = result.grid.tiles().map(|tile| tile.value).sum();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn second_sweep_after_noop_is_noop(values in arb_grid(), direction in arb_direction())
        {
            let settled = slide(&Grid::from_values(values), direction).grid;
            let again = slide(&settled, direction);
            if !again.moved {
                prop_assert_eq!(&again.grid, &settled);
                prop_assert_eq!(again.score_delta, 0);
            }
        }

        #[test]
        fn moved_flag_matches_value_change(values in arb_grid(), direction in arb_direction())
        {
            let grid = Grid::from_values(values);
            let result = slide(&grid, direction);
            prop_assert_eq!(result.moved, result.grid.values() != grid.values());
        }
    }
}
