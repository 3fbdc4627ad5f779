//! Single-slot storage for a saved grid layout.

use life_grid_core::LifeError;

use crate::grid::Grid;

/// Holds at most one value copy of a grid.
#[derive(Clone, Debug, Default)]
pub(crate) struct SnapshotStore {
    saved: Option<Grid>,
}

impl SnapshotStore {
    /// Captures a deep copy of the grid, replacing any earlier snapshot.
    pub(crate) fn save(&mut self, grid: &Grid) {
        self.saved = Some(grid.clone());
    }

    /// Produces a fresh copy of the saved grid.
    pub(crate) fn restore(&self) -> Result<Grid, LifeError> {
        self.saved.clone().ok_or(LifeError::NoSnapshot)
    }

    pub(crate) fn has_snapshot(&self) -> bool {
        self.saved.is_some()
    }
}
