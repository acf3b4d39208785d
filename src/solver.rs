//! Breadth-first shortest-path search under a wall-break budget.
//!
//! The search runs over `(row, col, breaks_used)` states rather than plain
//! positions. Two arrivals at the same cell with different numbers of walls
//! broken are different states: the cheaper one may still afford a wall the
//! other cannot.
//!
//! Key properties:
//! - FIFO frontier, so the first goal state dequeued is a shortest path
//! - FxHashSet over the full composite state for deduplication
//! - Parent links in a flat arena instead of copying the path into every node
//! - Fixed neighbor order (up, down, left, right, portal) for reproducible ties

use std::collections::VecDeque;

use log::debug;
use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::grid::{CellKind, Coord, Direction, Grid};
use crate::portals::PortalIndex;

/// Why a solve produced no path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SolveFailure {
    /// The grid does not hold exactly one start and exactly one goal.
    #[error("missing start or goal")]
    MissingEndpoint,
    /// Every reachable state was explored without reaching the goal.
    #[error("no path found")]
    NoPath,
}

impl Serialize for SolveFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of a single solve.
///
/// `path_length` and `path` are only meaningful when `reachable` is true;
/// `error` is only set when it is false.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub reachable: bool,
    /// Steps taken, which is `path.len() - 1`.
    pub path_length: usize,
    /// Every visited coordinate from start to goal inclusive.
    pub path: Vec<Coord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SolveFailure>,
}

impl SolveResult {
    fn found(path: Vec<Coord>) -> Self {
        Self {
            reachable: true,
            path_length: path.len().saturating_sub(1),
            path,
            error: None,
        }
    }

    fn failed(failure: SolveFailure) -> Self {
        Self {
            reachable: false,
            path_length: 0,
            path: Vec::new(),
            error: Some(failure),
        }
    }

    /// Number of walls the returned path passes through.
    pub fn walls_broken(&self, grid: &Grid) -> usize {
        self.path
            .iter()
            .filter(|&&coord| grid.get(coord).is_some_and(CellKind::is_wall))
            .count()
    }
}

/// A transient node of the search: where we are and how many walls it took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SearchState {
    coord: Coord,
    breaks_used: u32,
}

/// A dequeued state plus the arena index of the state it was reached from.
#[derive(Clone, Copy)]
struct SearchNode {
    state: SearchState,
    parent: Option<usize>,
}

/// Most successors a state can have: four directions and one teleport.
const MAX_SUCCESSORS: usize = 5;

/// Expands `state` into its successors in expansion order.
///
/// A directional move onto a wall is only allowed while budget remains and
/// spends one break. The teleport edge is appended last and only for portals
/// whose color forms a proper pair.
#[inline]
fn successors(
    grid: &Grid,
    portals: &PortalIndex,
    state: SearchState,
    max_breaks: u32,
) -> impl Iterator<Item = SearchState> {
    let mut candidates = [None; MAX_SUCCESSORS];
    let mut count = 0;

    for direction in Direction::ALL {
        let Some(next) = grid.neighbor(state.coord, direction) else {
            continue;
        };
        let Some(kind) = grid.get(next) else {
            continue;
        };

        let breaks_used = if kind.is_wall() {
            if state.breaks_used >= max_breaks {
                continue;
            }
            state.breaks_used + 1
        } else {
            state.breaks_used
        };

        candidates[count] = Some(SearchState {
            coord: next,
            breaks_used,
        });
        count += 1;
    }

    let teleport = grid
        .get(state.coord)
        .and_then(CellKind::portal_color)
        .and_then(|color| portals.partner(color, state.coord));
    if let Some(destination) = teleport {
        candidates[count] = Some(SearchState {
            coord: destination,
            breaks_used: state.breaks_used,
        });
    }

    candidates.into_iter().flatten()
}

/// Walks parent links back from `leaf` and returns the path start-first.
fn reconstruct_path(arena: &[SearchNode], leaf: usize) -> Vec<Coord> {
    let mut path = Vec::new();
    let mut cursor = Some(leaf);
    while let Some(index) = cursor {
        let node = arena[index];
        path.push(node.state.coord);
        cursor = node.parent;
    }
    path.reverse();
    path
}

/// Finds a shortest start-to-goal path breaking at most `max_breaks` walls.
///
/// Fails fast with [`SolveFailure::MissingEndpoint`] unless the grid has
/// exactly one start and one goal. The search visits at most
/// `rows * cols * (max_breaks + 1)` states, so callers should keep the budget
/// within the grid area. The function is pure: equal inputs give equal
/// results, path included.
pub fn solve(grid: &Grid, portals: &PortalIndex, max_breaks: u32) -> SolveResult {
    let (Some(start), Some(goal)) = (
        grid.unique_position(&CellKind::Start),
        grid.unique_position(&CellKind::Goal),
    ) else {
        debug!("solve aborted: grid lacks a unique start or goal");
        return SolveResult::failed(SolveFailure::MissingEndpoint);
    };

    debug!(
        "solving {}x{} grid from {:?} to {:?} with {} break(s)",
        grid.rows(),
        grid.cols(),
        start,
        goal,
        max_breaks
    );

    let initial = SearchState {
        coord: start,
        breaks_used: 0,
    };

    let mut arena = vec![SearchNode {
        state: initial,
        parent: None,
    }];
    let mut visited: FxHashSet<SearchState> = FxHashSet::default();
    visited.insert(initial);
    let mut frontier = VecDeque::from([0usize]);

    while let Some(current) = frontier.pop_front() {
        let state = arena[current].state;

        if state.coord == goal {
            let result = SolveResult::found(reconstruct_path(&arena, current));
            debug!(
                "reached goal in {} step(s) using {} break(s) after {} state(s)",
                result.path_length,
                state.breaks_used,
                arena.len()
            );
            return result;
        }

        for next in successors(grid, portals, state, max_breaks) {
            // mark on enqueue so no state is queued twice
            if !visited.insert(next) {
                continue;
            }
            arena.push(SearchNode {
                state: next,
                parent: Some(current),
            });
            frontier.push_back(arena.len() - 1);
        }
    }

    debug!("no path after exploring {} state(s)", arena.len());
    SolveResult::failed(SolveFailure::NoPath)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve_text(text: &str, max_breaks: u32) -> (Grid, SolveResult) {
        let grid: Grid = text.parse().unwrap();
        let portals = PortalIndex::build(&grid);
        let result = solve(&grid, &portals, max_breaks);
        (grid, result)
    }

    /// Checks that consecutive path cells are either adjacent or a portal pair.
    fn assert_path_is_walkable(grid: &Grid, result: &SolveResult) {
        let portals = PortalIndex::build(grid);
        for pair in result.path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let manhattan = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            let teleport = grid
                .get(a)
                .and_then(CellKind::portal_color)
                .and_then(|color| portals.partner(color, a));
            assert!(
                manhattan == 1 || teleport == Some(b),
                "Step {a:?} -> {b:?} is neither a move nor a teleport"
            );
        }
    }

    #[test]
    fn test_detour_around_single_wall() {
        let (grid, zero) = solve_text("S..\n.#.\n..G", 0);
        assert!(zero.reachable);
        assert_eq!(zero.path_length, 4);
        assert_eq!(zero.path, vec![(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]);
        assert_eq!(zero.error, None);
        assert_path_is_walkable(&grid, &zero);

        // breaking the center wall is no shorter than the detour
        let (_, one) = solve_text("S..\n.#.\n..G", 1);
        assert!(one.reachable);
        assert_eq!(one.path_length, 4);
        assert_eq!(one.path, zero.path);
    }

    #[test]
    fn test_breaking_a_wall_shortens_path() {
        let text = "S#G\n.#.\n...";
        let (_, zero) = solve_text(text, 0);
        assert_eq!(zero.path_length, 6);

        let (grid, one) = solve_text(text, 1);
        assert_eq!(one.path_length, 2);
        assert_eq!(one.path, vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(one.walls_broken(&grid), 1);
    }

    #[test]
    fn test_portal_shortcut_through_walls() {
        let text = "Sa##aG";
        let (grid, zero) = solve_text(text, 0);
        assert!(zero.reachable, "teleport should bypass walls without breaks");
        assert_eq!(zero.path_length, 3);
        assert_eq!(zero.path, vec![(0, 0), (0, 1), (0, 4), (0, 5)]);
        assert_eq!(zero.walls_broken(&grid), 0);
    }

    #[test]
    fn test_teleport_costs_one_step_regardless_of_distance() {
        let (_, near) = solve_text("Sa#aG", 0);
        let (_, far) = solve_text("Sa########aG", 0);
        assert_eq!(near.path_length, 3);
        assert_eq!(far.path_length, 3);
    }

    #[test]
    fn test_malformed_portal_does_not_teleport() {
        // three portals of one color never pair up
        let (_, result) = solve_text("Sa#a#aG", 0);
        assert!(!result.reachable);
        assert_eq!(result.error, Some(SolveFailure::NoPath));

        // a lone portal is walkable like an empty cell
        let (_, lone) = solve_text("SaG", 0);
        assert!(lone.reachable);
        assert_eq!(lone.path_length, 2);
    }

    #[test]
    fn test_enclosed_goal_is_unreachable() {
        let text = "S....\n..###\n..#G#\n..###";
        let (_, result) = solve_text(text, 0);
        assert!(!result.reachable);
        assert_eq!(result.error, Some(SolveFailure::NoPath));
        assert_eq!(result.error.map(|e| e.to_string()).as_deref(), Some("no path found"));
        assert!(result.path.is_empty());

        let (_, broken) = solve_text(text, 1);
        assert!(broken.reachable, "one break opens the enclosure");
    }

    #[test]
    fn test_missing_or_duplicate_endpoints_fail_fast() {
        for text in ["....\n...G", "S...\n....", "S..S\n...G", "S...\nG..G"] {
            let (_, result) = solve_text(text, 3);
            assert!(!result.reachable, "{text:?} should not be solvable");
            assert_eq!(result.error, Some(SolveFailure::MissingEndpoint));
            assert_eq!(
                result.error.map(|e| e.to_string()).as_deref(),
                Some("missing start or goal")
            );
        }
    }

    #[test]
    fn test_revisits_cell_with_fewer_breaks() {
        // (0,2) is first reached by breaking (0,1); only the later arrival
        // with the break still unspent can go on through (0,3)
        let text = "S#.#G\n...##";
        let (grid, result) = solve_text(text, 1);
        assert!(result.reachable);
        assert_eq!(result.path_length, 6);
        assert_eq!(
            result.path,
            vec![(0, 0), (1, 0), (1, 1), (1, 2), (0, 2), (0, 3), (0, 4)]
        );
        assert_path_is_walkable(&grid, &result);
        assert_eq!(result.walls_broken(&grid), 1);

        let (_, zero) = solve_text(text, 0);
        assert!(!zero.reachable);
    }

    #[test]
    fn test_budget_is_monotonic() {
        let text = "S#.#.\n.#.#.\n.###.\n##.##\n....G";
        let mut previous: Option<SolveResult> = None;
        for budget in 0..=4 {
            let (_, result) = solve_text(text, budget);
            if let Some(prev) = &previous {
                if prev.reachable {
                    assert!(result.reachable, "budget {budget} lost reachability");
                    assert!(
                        result.path_length <= prev.path_length,
                        "budget {budget} produced a longer path"
                    );
                }
            }
            previous = Some(result);
        }
    }

    #[test]
    fn test_solve_is_deterministic() {
        let text = "S.a..\n.#.#.\n..#..\na....\n...#G";
        let (_, first) = solve_text(text, 2);
        let (_, second) = solve_text(text, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let (_, result) = solve_text("SG", 0);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"reachable":true,"pathLength":1,"path":[[0,0],[0,1]]}"#);

        let (_, failed) = solve_text("S#G", 0);
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(
            json,
            r#"{"reachable":false,"pathLength":0,"path":[],"error":"no path found"}"#
        );
    }
}
