//! Random maze generation for the level editor.

use rand::Rng;

use crate::grid::{CellKind, Grid, MAX_SIDE, MIN_SIDE};

/// Wall density used when the caller has no preference.
pub const DEFAULT_WALL_DENSITY: f64 = 0.3;

/// Generates a random maze with start in the top-left corner and goal in the
/// bottom-right corner.
///
/// Each remaining cell becomes a wall with probability `wall_density`, except
/// the cells orthogonally next to the start and goal, which are always left
/// open. Dimensions are clamped to the editor's range and the density to
/// `0.0..=1.0`. The result is not guaranteed to be solvable.
pub fn generate<R: Rng + ?Sized>(rows: usize, cols: usize, wall_density: f64, rng: &mut R) -> Grid {
    let rows = rows.clamp(MIN_SIDE, MAX_SIDE);
    let cols = cols.clamp(MIN_SIDE, MAX_SIDE);
    let density = if wall_density.is_nan() {
        0.0
    } else {
        wall_density.clamp(0.0, 1.0)
    };

    let start = (0, 0);
    let goal = (rows - 1, cols - 1);
    let kept_open = [
        start,
        goal,
        (0, 1),
        (1, 0),
        (rows - 1, cols - 2),
        (rows - 2, cols - 1),
    ];

    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let kind = if kept_open.contains(&(row, col)) || !rng.gen_bool(density) {
                CellKind::Empty
            } else {
                CellKind::Wall
            };
            cells.push(kind);
        }
    }

    Grid::from_row_major(rows, cols, cells)
        .with_cell(start, CellKind::Start)
        .with_cell(goal, CellKind::Goal)
}
