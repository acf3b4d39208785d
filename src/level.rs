//! Publishable level records.
//!
//! A level is a validated grid together with its break budget and the two
//! par values players are scored against. Levels are stored as JSON documents
//! with the same field names the level service uses.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Grid, MAX_SIDE, MIN_SIDE};
use crate::portals::PortalIndex;
use crate::solver::{solve, SolveResult};
use crate::validator::{validate, ValidationError};

/// Errors raised while publishing, loading or saving a level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level name must not be blank")]
    BlankName,
    #[error("level description must not be blank")]
    BlankDescription,
    #[error(
        "grid is {rows}x{cols}, each side must be between {min} and {max}",
        min = MIN_SIDE,
        max = MAX_SIDE
    )]
    Dimensions { rows: usize, cols: usize },
    #[error("break budget {k} exceeds the {max} cells of the grid")]
    BudgetTooLarge { k: u32, max: usize },
    #[error("level failed validation: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),
    #[error("level file I/O failed")]
    Io(#[from] std::io::Error),
    #[error("level JSON is malformed")]
    Json(#[from] serde_json::Error),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The two ways a level can be played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Walls cannot be broken.
    NoWallBreak,
    /// Up to `k` walls may be broken.
    WallBreak,
}

/// Everything an author supplies before a level is checked and published.
#[derive(Clone, Debug)]
pub struct LevelDraft {
    pub name: String,
    pub description: String,
    pub creator: String,
    pub maze: Grid,
    pub k: u32,
}

/// A published level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub description: String,
    pub creator: String,
    pub maze: Grid,
    pub k: u32,
    /// Par for [`Mode::NoWallBreak`]; `None` when that mode is unsolvable.
    /// Stored as `0` in that case, since every real path takes a step.
    #[serde(rename = "parNWB", with = "par_or_zero")]
    pub par_nwb: Option<usize>,
    /// Par for [`Mode::WallBreak`].
    #[serde(rename = "parWB")]
    pub par_wb: usize,
}

/// Stored level documents require a number for every par, with `0` meaning
/// the mode has no par.
mod par_or_zero {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(par: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(par.map_or(0, |steps| steps as u64))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let steps = Option::<usize>::deserialize(deserializer)?;
        Ok(steps.filter(|&steps| steps > 0))
    }
}

impl Level {
    /// Checks a draft against the publishing rules and computes its par values.
    pub fn publish(draft: LevelDraft) -> Result<Self, LevelError> {
        if draft.name.trim().is_empty() {
            return Err(LevelError::BlankName);
        }
        if draft.description.trim().is_empty() {
            return Err(LevelError::BlankDescription);
        }
        if !draft.maze.within_editor_bounds() {
            return Err(LevelError::Dimensions {
                rows: draft.maze.rows(),
                cols: draft.maze.cols(),
            });
        }
        let max = draft.maze.area();
        if usize::try_from(draft.k).map_or(true, |k| k > max) {
            return Err(LevelError::BudgetTooLarge { k: draft.k, max });
        }

        let verdict = validate(&draft.maze, draft.k);
        let Some(par) = verdict.par() else {
            return Err(LevelError::Invalid(verdict.errors));
        };

        info!(
            "published level {:?} by {} with k = {}",
            draft.name, draft.creator, draft.k
        );

        Ok(Self {
            name: draft.name,
            description: draft.description,
            creator: draft.creator,
            maze: draft.maze,
            k: draft.k,
            par_nwb: par.no_wall_break,
            par_wb: par.wall_break,
        })
    }

    /// Reads a level from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the level as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }

    /// Break budget a player has in `mode`.
    pub fn budget(&self, mode: Mode) -> u32 {
        match mode {
            Mode::NoWallBreak => 0,
            Mode::WallBreak => self.k,
        }
    }

    /// Par step count for `mode`, if that mode has one.
    pub fn par(&self, mode: Mode) -> Option<usize> {
        match mode {
            Mode::NoWallBreak => self.par_nwb,
            Mode::WallBreak => Some(self.par_wb),
        }
    }

    /// Shortest path for `mode` on the level as published.
    pub fn hint(&self, mode: Mode) -> SolveResult {
        solve(&self.maze, &PortalIndex::build(&self.maze), self.budget(mode))
    }
}
