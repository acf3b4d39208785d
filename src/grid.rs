//! Grid representation for wall-break maze levels.
//!
//! A grid is an immutable, rectangular, row-major matrix of cells. Cells are
//! addressed by zero-based `(row, column)` coordinates. Nothing in this crate
//! mutates a grid once it is built; search state that would "change" the maze
//! (broken walls) lives in the solver's per-path counters instead.
//!
//! Text form, one character per cell:
//! - `.` empty
//! - `#` wall
//! - `S` start
//! - `G` goal
//! - any ASCII lowercase letter or digit: a portal of that color

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A zero-based `(row, column)` cell position.
pub type Coord = (usize, usize);

/// Identifier shared by the cells of one portal pair.
pub type PortalColor = String;

/// Smallest side length the level editor accepts.
pub const MIN_SIDE: usize = 5;

/// Largest side length the level editor accepts.
pub const MAX_SIDE: usize = 30;

/// What occupies a single cell.
///
/// Serializes as `{"type": "portal", "portalColor": "blue"}` and friends, which
/// is the layout stored level documents use.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CellKind {
    Empty,
    Wall,
    Start,
    Goal,
    Portal {
        #[serde(rename = "portalColor")]
        color: PortalColor,
    },
}

impl CellKind {
    /// Creates a portal cell of the given color.
    pub fn portal(color: impl Into<PortalColor>) -> Self {
        Self::Portal {
            color: color.into(),
        }
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self, Self::Wall)
    }

    /// Returns the portal color, or `None` for non-portal cells.
    ///
    /// A portal with a blank color is not a portal and behaves as an empty
    /// cell everywhere.
    #[inline]
    pub fn portal_color(&self) -> Option<&str> {
        match self {
            Self::Portal { color } if !color.is_empty() => Some(color),
            _ => None,
        }
    }

    /// Parses a single text-form glyph.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            'S' => Some(Self::Start),
            'G' => Some(Self::Goal),
            c if is_portal_glyph(c) => Some(Self::portal(c)),
            _ => None,
        }
    }

    /// Glyph for everything but a colored portal, whose glyph depends on the
    /// other colors in the grid (see [`Grid::glyphs`]).
    fn plain_glyph(&self) -> char {
        match self {
            Self::Wall => '#',
            Self::Start => 'S',
            Self::Goal => 'G',
            Self::Empty | Self::Portal { .. } => '.',
        }
    }
}

#[inline]
fn is_portal_glyph(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// One of the four orthogonal moves, in the order the solver expands them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in expansion order. This order decides which of several
    /// equally short paths the solver returns.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Errors raised while building a grid from rows or text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell '{glyph}' at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

/// An immutable rectangular maze.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<CellKind>>", into = "Vec<Vec<CellKind>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major cells: `cells[row * cols + col]`.
    cells: Vec<CellKind>,
}

impl Grid {
    /// Builds a grid from explicit rows, rejecting empty or ragged input.
    pub fn new(rows: Vec<Vec<CellKind>>) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(GridError::Empty);
        }

        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count * cols);
        for (row, row_cells) in rows.into_iter().enumerate() {
            if row_cells.len() != cols {
                return Err(GridError::Ragged {
                    row,
                    expected: cols,
                    found: row_cells.len(),
                });
            }
            cells.extend(row_cells);
        }

        Ok(Self {
            rows: row_count,
            cols,
            cells,
        })
    }

    /// Builds a `rows` x `cols` grid with every cell set to `kind`.
    ///
    /// Both dimensions must be non-zero.
    pub fn filled(rows: usize, cols: usize, kind: CellKind) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![kind; rows * cols],
        })
    }

    /// Wraps already row-major cells. Callers guarantee non-zero dimensions
    /// and `cells.len() == rows * cols`.
    pub(crate) fn from_row_major(rows: usize, cols: usize, cells: Vec<CellKind>) -> Self {
        debug_assert!(rows > 0 && cols > 0 && cells.len() == rows * cols);
        Self { rows, cols, cells }
    }

    /// Returns a copy of this grid with one cell replaced.
    ///
    /// Out-of-bounds coordinates leave the grid unchanged.
    #[must_use]
    pub fn with_cell(mut self, (row, col): Coord, kind: CellKind) -> Self {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = kind;
        }
        self
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Returns the cell at `coord`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, (row, col): Coord) -> Option<&CellKind> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Iterates over every cell in row-major order with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &CellKind)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, kind)| ((index / cols, index % cols), kind))
    }

    /// Coordinates of every cell equal to `kind`, in row-major order.
    pub fn positions_of<'a>(&'a self, kind: &'a CellKind) -> impl Iterator<Item = Coord> + 'a {
        self.iter()
            .filter(move |(_, cell)| *cell == kind)
            .map(|(coord, _)| coord)
    }

    /// Returns the coordinate of `kind` if exactly one cell holds it.
    pub fn unique_position(&self, kind: &CellKind) -> Option<Coord> {
        let mut positions = self.positions_of(kind);
        let first = positions.next()?;
        match positions.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// The in-bounds neighbor of `coord` one step in `direction`.
    #[inline]
    pub fn neighbor(&self, (row, col): Coord, direction: Direction) -> Option<Coord> {
        let next = match direction {
            Direction::Up => (row.checked_sub(1)?, col),
            Direction::Down => (row + 1, col),
            Direction::Left => (row, col.checked_sub(1)?),
            Direction::Right => (row, col + 1),
        };
        (next.0 < self.rows && next.1 < self.cols).then_some(next)
    }

    /// Text-form glyph for every cell in row-major order.
    ///
    /// A single-character portal color keeps its character. Longer colors
    /// take their lowercased first character when no other color uses it,
    /// otherwise the first free letter or digit, so distinct colors never
    /// share a glyph. Only beyond 36 colors do the rest render as `?`.
    pub fn glyphs(&self) -> Vec<char> {
        let colors: BTreeSet<&str> = self.cells.iter().filter_map(CellKind::portal_color).collect();
        let mut assigned: BTreeMap<&str, char> = BTreeMap::new();
        let mut taken: BTreeSet<char> = BTreeSet::new();

        for &color in &colors {
            let mut chars = color.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if is_portal_glyph(c) {
                    assigned.insert(color, c);
                    taken.insert(c);
                }
            }
        }

        let mut pool = ('a'..='z').chain('0'..='9');
        for &color in &colors {
            if assigned.contains_key(color) {
                continue;
            }
            let preferred = color
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase())
                .filter(|c| is_portal_glyph(*c) && !taken.contains(c));
            let glyph = preferred
                .or_else(|| pool.by_ref().find(|c| !taken.contains(c)))
                .unwrap_or('?');
            taken.insert(glyph);
            assigned.insert(color, glyph);
        }

        self.cells
            .iter()
            .map(|cell| match cell.portal_color() {
                Some(color) => assigned.get(color).copied().unwrap_or('?'),
                None => cell.plain_glyph(),
            })
            .collect()
    }

    /// Whether both dimensions fall within the editor's accepted range.
    pub fn within_editor_bounds(&self) -> bool {
        (MIN_SIDE..=MAX_SIDE).contains(&self.rows) && (MIN_SIDE..=MAX_SIDE).contains(&self.cols)
    }
}

impl TryFrom<Vec<Vec<CellKind>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<CellKind>>) -> Result<Self, Self::Error> {
        Grid::new(rows)
    }
}

impl From<Grid> for Vec<Vec<CellKind>> {
    fn from(grid: Grid) -> Self {
        let cols = grid.cols;
        let mut rows = Vec::with_capacity(grid.rows);
        let mut cells = grid.cells.into_iter();
        for _ in 0..grid.rows {
            rows.push(cells.by_ref().take(cols).collect());
        }
        rows
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Parses the text form. Blank lines and surrounding whitespace on each
    /// line are ignored.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let rows = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, glyph)| {
                        CellKind::from_glyph(glyph)
                            .ok_or(GridError::UnknownGlyph { glyph, row, col })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Grid::new(rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.glyphs().chunks(self.cols) {
            for glyph in row {
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Formats the grid with a path drawn over it.
///
/// Intermediate path cells are marked `*`, except that walls the path breaks
/// through are marked `x`. Start, goal and portal glyphs are left visible.
pub fn format_path(grid: &Grid, path: &[Coord]) -> String {
    let mut glyphs = grid.glyphs();

    for &(row, col) in path {
        let Some(kind) = grid.get((row, col)) else {
            continue;
        };
        if kind.portal_color().is_some() {
            continue;
        }
        let glyph = &mut glyphs[row * grid.cols + col];
        match kind {
            CellKind::Wall => *glyph = 'x',
            CellKind::Start | CellKind::Goal => {}
            _ => *glyph = '*',
        }
    }

    let mut output = String::with_capacity(grid.rows * (grid.cols + 1));
    for row in glyphs.chunks(grid.cols) {
        output.extend(row);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let text = "S.#a\n#..G\na...\n";
        let grid: Grid = text.parse().unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn test_parse_ignores_indentation_and_blank_lines() {
        let grid: Grid = "\n    S.\n\n    .G\n".parse().unwrap();
        assert_eq!(grid.to_string(), "S.\n.G\n");
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = "S..\n.G\n".parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_glyph() {
        let err = "S.\n.X\n".parse::<Grid>().unwrap_err();
        assert_eq!(
            err,
            GridError::UnknownGlyph {
                glyph: 'X',
                row: 1,
                col: 1
            }
        );
        assert_eq!(err.to_string(), "unknown cell 'X' at row 1, column 1");
    }

    #[test]
    fn test_parse_rejects_empty_text() {
        assert_eq!("\n  \n".parse::<Grid>().unwrap_err(), GridError::Empty);
    }

    #[test]
    fn test_portal_glyphs_become_portal_colors() {
        let grid: Grid = "S3\n3G\n".parse().unwrap();
        assert_eq!(grid.get((0, 1)), Some(&CellKind::portal("3")));
        assert_eq!(grid.get((1, 0)).and_then(CellKind::portal_color), Some("3"));
    }

    #[test]
    fn test_neighbor_stays_in_bounds() {
        let grid = Grid::filled(2, 3, CellKind::Empty).unwrap();
        assert_eq!(grid.neighbor((0, 0), Direction::Up), None);
        assert_eq!(grid.neighbor((0, 0), Direction::Left), None);
        assert_eq!(grid.neighbor((0, 0), Direction::Down), Some((1, 0)));
        assert_eq!(grid.neighbor((1, 2), Direction::Down), None);
        assert_eq!(grid.neighbor((1, 2), Direction::Right), None);
        assert_eq!(grid.neighbor((1, 1), Direction::Right), Some((1, 2)));
    }

    #[test]
    fn test_unique_position_requires_exactly_one() {
        let one: Grid = "S.G".parse().unwrap();
        assert_eq!(one.unique_position(&CellKind::Start), Some((0, 0)));

        let two: Grid = "S.S".parse().unwrap();
        assert_eq!(two.unique_position(&CellKind::Start), None);
        assert_eq!(two.unique_position(&CellKind::Goal), None);
    }

    #[test]
    fn test_with_cell_ignores_out_of_bounds() {
        let grid = Grid::filled(2, 2, CellKind::Empty).unwrap();
        let same = grid.clone().with_cell((5, 5), CellKind::Wall);
        assert_eq!(same, grid);
    }

    #[test]
    fn test_json_layout_matches_level_documents() {
        let grid: Grid = "Sb\n#G\n".parse().unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(
            json,
            r#"[[{"type":"start"},{"type":"portal","portalColor":"b"}],[{"type":"wall"},{"type":"goal"}]]"#
        );
    }

    #[test]
    fn test_json_accepts_extra_fields_and_long_colors() {
        let json = r#"[
            [{"r":0,"c":0,"type":"start"},{"r":0,"c":1,"type":"portal","portalColor":"blue"}],
            [{"r":1,"c":0,"type":"empty"},{"r":1,"c":1,"type":"goal"}]
        ]"#;
        let grid: Grid = serde_json::from_str(json).unwrap();
        assert_eq!(grid.get((0, 1)), Some(&CellKind::portal("blue")));
        assert_eq!(grid.to_string(), "Sb\n.G\n");
    }

    #[test]
    fn test_json_rejects_ragged_rows() {
        let json = r#"[[{"type":"start"},{"type":"goal"}],[{"type":"empty"}]]"#;
        assert!(serde_json::from_str::<Grid>(json).is_err());
    }

    #[test]
    fn test_distinct_long_colors_keep_distinct_glyphs() {
        let grid: Grid = "S...\n....\n...G".parse().unwrap();
        let grid = grid
            .with_cell((0, 1), CellKind::portal("blue"))
            .with_cell((0, 3), CellKind::portal("blue"))
            .with_cell((1, 0), CellKind::portal("black"))
            .with_cell((1, 2), CellKind::portal("black"))
            .with_cell((2, 0), CellKind::portal("a"))
            .with_cell((2, 1), CellKind::portal("a"));

        assert_eq!(grid.to_string(), "Sc.c\nb.b.\naa.G\n");

        // reparsing keeps the same pairing under the new single-char names
        let reparsed: Grid = grid.to_string().parse().unwrap();
        let pairs = |g: &Grid| {
            let index = crate::portals::PortalIndex::build(g);
            index.iter().map(|(_, coords)| coords.to_vec()).collect::<BTreeSet<_>>()
        };
        assert_eq!(pairs(&reparsed), pairs(&grid));
    }

    #[test]
    fn test_blank_portal_color_is_an_empty_cell() {
        let grid: Grid = "S.G".parse().unwrap();
        let grid = grid.with_cell((0, 1), CellKind::portal(""));
        assert_eq!(grid.get((0, 1)).and_then(CellKind::portal_color), None);
        assert_eq!(grid.to_string(), "S.G\n");
        assert_eq!(format_path(&grid, &[(0, 0), (0, 1), (0, 2)]), "S*G\n");
    }

    #[test]
    fn test_format_path_marks_walked_and_broken_cells() {
        let grid: Grid = "S#.\n..G\n".parse().unwrap();
        let overlay = format_path(&grid, &[(0, 0), (0, 1), (0, 2), (1, 2)]);
        assert_eq!(overlay, "Sx*\n..G\n");
    }
}
