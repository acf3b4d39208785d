//! Level validation and par computation.
//!
//! Validation runs in two stages. Structural checks (start count, goal count,
//! portal pairing) are all evaluated so one editing pass can fix every
//! problem. Only a structurally sound grid is then solved twice: once with no
//! wall breaks and once with the level's full budget.

use log::{debug, info};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::grid::{CellKind, Grid};
use crate::portals::PortalIndex;
use crate::solver::{solve, SolveResult};

/// A user-facing reason a level was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Map must have exactly one Start (found {0}).")]
    StartCount(usize),
    #[error("Map must have exactly one Goal (found {0}).")]
    GoalCount(usize),
    #[error("Portal {color} must have exactly 2 locations. Found {count}.")]
    PortalCount { color: String, count: usize },
    #[error("Goal is not reachable even with {0} wall breaks.")]
    Unreachable(u32),
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Verdict for a level plus, when valid, both solver runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_break_solution: Option<SolveResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k_break_solution: Option<SolveResult>,
}

/// Published par step counts for the two play modes of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Par {
    /// Par without breaking walls; `None` when that mode has no solution.
    pub no_wall_break: Option<usize>,
    /// Par with the full break budget.
    pub wall_break: usize,
}

impl ValidationResult {
    fn rejected(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
            zero_break_solution: None,
            k_break_solution: None,
        }
    }

    /// The par pair for a valid level, `None` otherwise.
    pub fn par(&self) -> Option<Par> {
        if !self.valid {
            return None;
        }
        let wall_break = self.k_break_solution.as_ref()?.path_length;
        let no_wall_break = self
            .zero_break_solution
            .as_ref()
            .filter(|solution| solution.reachable)
            .map(|solution| solution.path_length);
        Some(Par {
            no_wall_break,
            wall_break,
        })
    }
}

/// Collects every structural problem in `grid` without short-circuiting.
pub fn structural_errors(grid: &Grid, portals: &PortalIndex) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let starts = grid.positions_of(&CellKind::Start).count();
    if starts != 1 {
        errors.push(ValidationError::StartCount(starts));
    }

    let goals = grid.positions_of(&CellKind::Goal).count();
    if goals != 1 {
        errors.push(ValidationError::GoalCount(goals));
    }

    for (color, locations) in portals.iter() {
        if locations.len() != 2 {
            errors.push(ValidationError::PortalCount {
                color: color.to_owned(),
                count: locations.len(),
            });
        }
    }

    errors
}

/// Validates `grid` for a level whose break budget is `k`.
///
/// A level is valid when it is structurally sound and the goal is reachable
/// within `k` breaks. Reachability without breaks is reported but never
/// rejects a level.
pub fn validate(grid: &Grid, k: u32) -> ValidationResult {
    let portals = PortalIndex::build(grid);

    let errors = structural_errors(grid, &portals);
    if !errors.is_empty() {
        info!("level rejected with {} structural error(s)", errors.len());
        for error in &errors {
            debug!("structural error: {error}");
        }
        return ValidationResult::rejected(errors);
    }

    let zero_break_solution = solve(grid, &portals, 0);
    let k_break_solution = solve(grid, &portals, k);

    if !k_break_solution.reachable {
        info!("level rejected: goal unreachable with {k} break(s)");
        return ValidationResult::rejected(vec![ValidationError::Unreachable(k)]);
    }

    info!(
        "level valid: par {} without breaks, {} with {k} break(s)",
        if zero_break_solution.reachable {
            zero_break_solution.path_length.to_string()
        } else {
            "none".to_owned()
        },
        k_break_solution.path_length
    );

    ValidationResult {
        valid: true,
        errors: Vec::new(),
        zero_break_solution: Some(zero_break_solution),
        k_break_solution: Some(k_break_solution),
    }
}
