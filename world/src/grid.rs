//! Dense toroidal cell storage owned by the world.

use life_grid_core::{CellState, GridBounds, GridPos, GridView, LifeError};

/// Rectangular block of cells stored row-major.
///
/// The cell vector always holds exactly `bounds.cell_count()` entries; every
/// operation that changes the extent reallocates storage in the same step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Grid {
    bounds: GridBounds,
    cells: Vec<CellState>,
}

impl Grid {
    /// Allocates an empty grid centred on the world origin.
    pub(crate) fn new(width: u32, height: u32) -> Result<Self, LifeError> {
        let bounds = GridBounds::centered(width, height)?;
        Ok(Self::with_bounds(bounds))
    }

    /// Allocates an empty grid covering the provided bounds.
    pub(crate) fn with_bounds(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: vec![CellState::Empty; bounds.cell_count()],
        }
    }

    pub(crate) fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Reads a cell, wrapping the position onto the torus first.
    pub(crate) fn get(&self, pos: GridPos) -> CellState {
        self.view().state(pos)
    }

    /// Writes an in-bounds cell and returns its previous state.
    pub(crate) fn set(&mut self, pos: GridPos, state: CellState) -> Result<CellState, LifeError> {
        let slot = self
            .bounds
            .index(pos)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(LifeError::InvalidPosition { pos })?;
        Ok(std::mem::replace(slot, state))
    }

    /// Reallocates the grid with new extents. Every cell becomes empty.
    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), LifeError> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    pub(crate) fn fill(&mut self, state: CellState) {
        self.cells.fill(state);
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [CellState] {
        &mut self.cells
    }

    /// Swaps in a complete next generation, returning the previous buffer.
    pub(crate) fn replace_cells(
        &mut self,
        cells: Vec<CellState>,
    ) -> Result<Vec<CellState>, LifeError> {
        if cells.len() != self.cells.len() {
            return Err(LifeError::CellCountMismatch {
                expected: self.cells.len(),
                received: cells.len(),
            });
        }
        Ok(std::mem::replace(&mut self.cells, cells))
    }

    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.bounds)
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.view().alive_count()
    }
}
