//! Wall-Break Maze Library
//!
//! Decides whether a maze level is solvable when up to `k` walls may be broken
//! and paired portals teleport for one step, and computes the par step counts
//! a level is published with.
//!
//! The pieces, leaves first:
//! - [`grid`]: the immutable level layout
//! - [`portals`]: color to coordinates index, built once per grid
//! - [`solver`]: breadth-first search over `(position, breaks used)` states
//! - [`validator`]: structural checks plus the zero-break and k-break solves
//!
//! [`level`] and [`generator`] build on these for publishing and random maps.
//! Every operation is a pure function of its inputs, so calls are safe to run
//! in parallel on independent grids.

pub mod generator;
pub mod grid;
pub mod level;
pub mod portals;
pub mod solver;
pub mod validator;

pub use grid::{CellKind, Coord, Grid};
pub use portals::PortalIndex;
pub use solver::{solve, SolveFailure, SolveResult};
pub use validator::{validate, Par, ValidationError, ValidationResult};
