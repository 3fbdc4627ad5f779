#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure generation system that applies Conway's rules to a frozen grid view.

use life_grid_core::{neighbors, CellState, Command, Event, GridPos, GridView};

/// Pure system that answers generation requests with computed commits.
#[derive(Debug, Default)]
pub struct Generation;

impl Generation {
    /// Creates a new generation system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Consumes world events and the live grid view to emit generation commits.
    ///
    /// Only the most recent outstanding [`Event::GenerationRequested`] is
    /// answered. A request followed in the same batch by an event that
    /// invalidates the live grid (a stop, reset, reseed or restore) is dropped.
    pub fn handle(&self, events: &[Event], view: GridView<'_>, out: &mut Vec<Command>) {
        let mut pending = None;
        for event in events {
            match event {
                Event::GenerationRequested { generation } => pending = Some(*generation),
                Event::RunStopped { .. }
                | Event::RunFinished { .. }
                | Event::GridCreated { .. }
                | Event::GridCleared { .. }
                | Event::GridRandomized { .. }
                | Event::LayoutRestored { .. } => pending = None,
                _ => {}
            }
        }

        let Some(generation) = pending else {
            return;
        };

        out.push(Command::CommitGeneration {
            generation,
            cells: next_generation(view),
        });
    }
}

/// Computes the generation that follows `view`, in storage order.
///
/// Reads only from the provided view, so every cell observes the same prior
/// generation regardless of evaluation order.
#[must_use]
pub fn next_generation(view: GridView<'_>) -> Vec<CellState> {
    view.iter()
        .map(|(pos, state)| next_state(state, alive_neighbors(view, pos)))
        .collect()
}

/// Counts living neighbors of an in-bounds position.
///
/// Wrapped neighbor positions that coincide on tiny grids are counted once
/// per occurrence.
#[must_use]
pub fn alive_neighbors(view: GridView<'_>, pos: GridPos) -> usize {
    let bounds = view.bounds();
    neighbors(pos, &bounds)
        .into_iter()
        .filter(|neighbor| view.state(*neighbor).is_alive())
        .count()
}

/// Applies the survival and birth rules to a single cell.
#[must_use]
pub const fn next_state(current: CellState, alive_neighbors: usize) -> CellState {
    match (current, alive_neighbors) {
        (CellState::Alive, 2 | 3) => CellState::Alive,
        (CellState::Empty, 3) => CellState::Alive,
        _ => CellState::Empty,
    }
}
