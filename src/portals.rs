//! Portal pairing index.
//!
//! Built with one scan of a grid. The index records every portal cell under
//! its color without judging whether the color is well formed; the solver and
//! the validator each apply their own policy to colors that do not occur
//! exactly twice.

use std::collections::BTreeMap;

use crate::grid::{Coord, Grid, PortalColor};

/// Mapping from portal color to the coordinates holding that color.
///
/// Colors are kept in ascending order so anything reported per color comes
/// out in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortalIndex {
    locations: BTreeMap<PortalColor, Vec<Coord>>,
}

impl PortalIndex {
    /// Scans `grid` once and groups portal coordinates by color.
    pub fn build(grid: &Grid) -> Self {
        let mut locations: BTreeMap<PortalColor, Vec<Coord>> = BTreeMap::new();
        for (coord, kind) in grid.iter() {
            if let Some(color) = kind.portal_color() {
                locations.entry(color.to_owned()).or_default().push(coord);
            }
        }
        Self { locations }
    }

    /// Coordinates holding `color`, in row-major order. Empty if unknown.
    pub fn locations(&self, color: &str) -> &[Coord] {
        self.locations.get(color).map_or(&[], Vec::as_slice)
    }

    /// Iterates over `(color, coordinates)` in ascending color order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Coord])> {
        self.locations
            .iter()
            .map(|(color, coords)| (color.as_str(), coords.as_slice()))
    }

    /// Number of distinct colors seen.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The teleport destination from `from` through a portal of `color`.
    ///
    /// Only a color with exactly two cells forms a pair; any other count
    /// yields `None` and the cell behaves like an ordinary passable cell.
    pub fn partner(&self, color: &str, from: Coord) -> Option<Coord> {
        match self.locations(color) {
            &[a, b] if a == from => Some(b),
            &[a, b] if b == from => Some(a),
            _ => None,
        }
    }
}
