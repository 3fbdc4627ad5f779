#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for the toroidal life engine.
//!
//! The [`World`] owns the live grid, the generation counter, the run state
//! and the saved layout. Every mutation flows through [`apply`]; reads go
//! through the [`query`] module.

mod grid;
mod snapshot;

use life_grid_core::{
    AliveDensity, CellState, Command, Event, GridBounds, GridPos, LifeError, RunState,
    DEFAULT_GRID_EXTENT,
};
use life_grid_system_seeding::{Seeder, DEFAULT_SEED};
use log::{debug, info, warn};

use crate::{grid::Grid, snapshot::SnapshotStore};

/// Parameters used to construct a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Initial number of columns.
    pub width: u32,
    /// Initial number of rows.
    pub height: u32,
    /// Seed for the random stream consumed by [`Command::Randomize`].
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_EXTENT,
            height: DEFAULT_GRID_EXTENT,
            seed: DEFAULT_SEED,
        }
    }
}

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    bounds: GridBounds,
    generation: u64,
    run_state: RunState,
    snapshots: SnapshotStore,
    seeder: Seeder,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an idle world holding an empty grid of the default extent.
    #[must_use]
    pub fn new() -> Self {
        let grid = Grid::with_bounds(GridBounds::default());
        Self::from_parts(grid, Seeder::default())
    }

    /// Creates an idle world from explicit configuration.
    pub fn with_config(config: WorldConfig) -> Result<Self, LifeError> {
        let grid = Grid::new(config.width, config.height)?;
        Ok(Self::from_parts(grid, Seeder::from_seed(config.seed)))
    }

    fn from_parts(grid: Grid, seeder: Seeder) -> Self {
        Self {
            bounds: grid.bounds(),
            grid,
            generation: 0,
            run_state: RunState::Idle,
            snapshots: SnapshotStore::default(),
            seeder,
        }
    }

    /// Re-derives the controller-level extent from the live grid.
    ///
    /// Called after every operation that may change the grid's shape so that
    /// [`query::bounds`] never disagrees with the stored cells.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = self.grid.bounds();
    }

    fn is_running(&self) -> bool {
        matches!(self.run_state, RunState::Running { .. })
    }

    fn ensure_idle(&self) -> Result<(), LifeError> {
        if self.is_running() {
            Err(LifeError::SimulationRunning)
        } else {
            Ok(())
        }
    }

    fn stop_run(&mut self, out_events: &mut Vec<Event>) {
        if self.is_running() {
            self.run_state = RunState::Idle;
            info!("simulation stopped at generation {}", self.generation);
            out_events.push(Event::RunStopped {
                generation: self.generation,
            });
        }
    }

    fn create_grid(
        &mut self,
        width: u32,
        height: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), LifeError> {
        self.grid.resize(width, height)?;
        info!("creating a {width} x {height} grid");
        self.stop_run(out_events);
        self.generation = 0;
        self.recalculate_bounds();
        out_events.push(Event::GridCreated {
            bounds: self.bounds,
        });
        Ok(())
    }

    fn clear(&mut self, out_events: &mut Vec<Event>) {
        info!("clearing grid");
        self.stop_run(out_events);
        self.grid.fill(CellState::Empty);
        self.generation = 0;
        out_events.push(Event::GridCleared {
            bounds: self.bounds,
        });
    }

    fn randomize(&mut self, density: AliveDensity, out_events: &mut Vec<Event>) {
        self.stop_run(out_events);
        self.recalculate_bounds();
        let alive = self.seeder.populate(self.grid.cells_mut(), density);
        info!(
            "randomized grid with density {}: {alive} of {} cells alive",
            density.get(),
            self.bounds.cell_count()
        );
        out_events.push(Event::GridRandomized { alive });
    }

    fn write_cell(
        &mut self,
        pos: GridPos,
        state: CellState,
        out_events: &mut Vec<Event>,
    ) -> Result<(), LifeError> {
        self.ensure_idle()?;
        let previous = self.grid.set(pos, state)?;
        if previous != state {
            out_events.push(Event::CellChanged { pos, state });
        }
        Ok(())
    }

    fn save(&mut self, out_events: &mut Vec<Event>) {
        self.recalculate_bounds();
        self.snapshots.save(&self.grid);
        debug!("saved {}x{} layout", self.bounds.width(), self.bounds.height());
        out_events.push(Event::LayoutSaved {
            bounds: self.bounds,
        });
    }

    fn restore(&mut self, out_events: &mut Vec<Event>) -> Result<(), LifeError> {
        let restored = self.snapshots.restore()?;
        info!("restoring grid to saved layout");
        self.stop_run(out_events);
        self.grid = restored;
        self.recalculate_bounds();
        out_events.push(Event::LayoutRestored {
            bounds: self.bounds,
        });
        Ok(())
    }

    fn simulate(&mut self, generations: u32, out_events: &mut Vec<Event>) -> Result<(), LifeError> {
        self.ensure_idle()?;
        if generations == 0 {
            return Ok(());
        }
        self.run_state = RunState::Running {
            remaining: generations,
        };
        info!("simulating {generations} generations from generation {}", self.generation);
        out_events.push(Event::RunStarted { generations });
        Ok(())
    }

    fn tick(&self, out_events: &mut Vec<Event>) {
        if self.is_running() {
            out_events.push(Event::GenerationRequested {
                generation: self.generation + 1,
            });
        }
    }

    fn commit_generation(
        &mut self,
        generation: u64,
        cells: Vec<CellState>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), LifeError> {
        let RunState::Running { remaining } = self.run_state else {
            warn!("discarding generation {generation}: no run in progress");
            return Err(LifeError::SimulationIdle);
        };

        let expected = self.generation + 1;
        if generation != expected {
            warn!("discarding generation {generation}: expected {expected}");
            return Err(LifeError::StaleGeneration {
                expected,
                received: generation,
            });
        }

        let _ = self.grid.replace_cells(cells)?;
        self.generation = generation;
        let alive = self.grid.alive_count();
        debug!("simulated generation {generation}: {alive} cells alive");
        out_events.push(Event::GenerationAdvanced { generation, alive });

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.run_state = RunState::Idle;
            info!("simulation finished at generation {generation}");
            out_events.push(Event::RunFinished { generation });
        } else {
            self.run_state = RunState::Running { remaining };
        }
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and append no events.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), LifeError> {
    match command {
        Command::CreateGrid { width, height } => world.create_grid(width, height, out_events),
        Command::Clear => {
            world.clear(out_events);
            Ok(())
        }
        Command::Randomize { density } => {
            world.randomize(density, out_events);
            Ok(())
        }
        Command::SetCell { pos, state } => world.write_cell(pos, state, out_events),
        Command::ToggleCell { pos } => {
            let state = world.grid.get(pos).toggled();
            world.write_cell(pos, state, out_events)
        }
        Command::Save => {
            world.save(out_events);
            Ok(())
        }
        Command::Restore => world.restore(out_events),
        Command::Simulate { generations } => world.simulate(generations, out_events),
        Command::Tick => {
            world.tick(out_events);
            Ok(())
        }
        Command::Stop => {
            world.stop_run(out_events);
            Ok(())
        }
        Command::CommitGeneration { generation, cells } => {
            world.commit_generation(generation, cells, out_events)
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use life_grid_core::{CellState, GridBounds, GridPos, GridView, RunState};

    use super::World;

    /// Returns the state of a cell, wrapping the position onto the torus.
    #[must_use]
    pub fn cell_state(world: &World, pos: GridPos) -> CellState {
        world.grid.get(pos)
    }

    /// Extent and origin of the live grid.
    #[must_use]
    pub fn bounds(world: &World) -> GridBounds {
        world.bounds
    }

    /// Number of generations committed since the grid was last created or cleared.
    #[must_use]
    pub fn generation(world: &World) -> u64 {
        world.generation
    }

    /// Reports whether a run is in progress.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.is_running()
    }

    /// Current run state including the generations left in the run.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.run_state
    }

    /// Captures a read-only view of the live cells.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Number of living cells in the live grid.
    #[must_use]
    pub fn alive_count(world: &World) -> usize {
        world.grid.alive_count()
    }

    /// Reports whether a layout has been saved.
    #[must_use]
    pub fn has_snapshot(world: &World) -> bool {
        world.snapshots.has_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events).expect("command accepted");
        events
    }

    fn small_world() -> World {
        World::with_config(WorldConfig {
            width: 4,
            height: 4,
            seed: 5,
        })
        .expect("valid config")
    }

    fn set_alive(world: &mut World, x: i32, y: i32) {
        let _ = run(
            world,
            Command::SetCell {
                pos: GridPos::new(x, y),
                state: CellState::Alive,
            },
        );
    }

    #[test]
    fn new_world_is_idle_and_empty() {
        let world = World::new();
        let bounds = query::bounds(&world);
        assert_eq!((bounds.width(), bounds.height()), (75, 75));
        assert_eq!(bounds.origin(), GridPos::new(-37, -37));
        assert_eq!(query::generation(&world), 0);
        assert!(!query::is_running(&world));
        assert_eq!(query::alive_count(&world), 0);
        assert!(!query::has_snapshot(&world));
    }

    #[test]
    fn create_grid_resets_cells_and_counter() {
        let mut world = small_world();
        set_alive(&mut world, 0, 0);
        let _ = run(&mut world, Command::Simulate { generations: 1 });
        let _ = run(
            &mut world,
            Command::CommitGeneration {
                generation: 1,
                cells: vec![CellState::Alive; 16],
            },
        );
        assert_eq!(query::generation(&world), 1);

        let events = run(
            &mut world,
            Command::CreateGrid {
                width: 6,
                height: 3,
            },
        );

        let bounds = query::bounds(&world);
        assert_eq!(events, vec![Event::GridCreated { bounds }]);
        assert_eq!((bounds.width(), bounds.height()), (6, 3));
        assert_eq!(bounds.origin(), GridPos::new(-3, -1));
        assert_eq!(query::alive_count(&world), 0);
        assert_eq!(query::generation(&world), 0);
    }

    #[test]
    fn create_grid_stops_active_run() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Simulate { generations: 5 });
        let events = run(
            &mut world,
            Command::CreateGrid {
                width: 5,
                height: 5,
            },
        );
        assert_eq!(events[0], Event::RunStopped { generation: 0 });
        assert!(!query::is_running(&world));
    }

    #[test]
    fn invalid_dimensions_leave_world_untouched() {
        let mut world = small_world();
        set_alive(&mut world, 1, 1);
        let _ = run(&mut world, Command::Simulate { generations: 2 });

        let mut events = Vec::new();
        let result = apply(
            &mut world,
            Command::CreateGrid {
                width: 0,
                height: 8,
            },
            &mut events,
        );

        assert_eq!(
            result,
            Err(LifeError::InvalidDimension {
                width: 0,
                height: 8
            })
        );
        assert!(events.is_empty());
        assert!(query::is_running(&world));
        assert_eq!(query::bounds(&world).width(), 4);
        assert_eq!(query::cell_state(&world, GridPos::new(1, 1)), CellState::Alive);
    }

    #[test]
    fn clear_empties_grid_and_resets_counter() {
        let mut world = small_world();
        let _ = run(
            &mut world,
            Command::Randomize {
                density: AliveDensity::new(1.0).expect("valid density"),
            },
        );
        let _ = run(&mut world, Command::Simulate { generations: 3 });
        let _ = run(
            &mut world,
            Command::CommitGeneration {
                generation: 1,
                cells: vec![CellState::Alive; 16],
            },
        );

        let events = run(&mut world, Command::Clear);

        assert_eq!(
            events,
            vec![
                Event::RunStopped { generation: 1 },
                Event::GridCleared {
                    bounds: query::bounds(&world)
                },
            ]
        );
        assert_eq!(query::alive_count(&world), 0);
        assert_eq!(query::generation(&world), 0);
    }

    #[test]
    fn randomize_honours_density_extremes() {
        let mut world = small_world();
        let events = run(
            &mut world,
            Command::Randomize {
                density: AliveDensity::new(1.0).expect("valid density"),
            },
        );
        assert_eq!(events, vec![Event::GridRandomized { alive: 16 }]);

        let events = run(
            &mut world,
            Command::Randomize {
                density: AliveDensity::new(0.0).expect("valid density"),
            },
        );
        assert_eq!(events, vec![Event::GridRandomized { alive: 0 }]);
        assert_eq!(query::alive_count(&world), 0);
    }

    #[test]
    fn randomize_stops_active_run() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Simulate { generations: 3 });
        let requested = run(&mut world, Command::Tick);
        assert_eq!(requested, vec![Event::GenerationRequested { generation: 1 }]);

        let events = run(
            &mut world,
            Command::Randomize {
                density: AliveDensity::new(1.0).expect("valid density"),
            },
        );

        assert_eq!(
            events,
            vec![
                Event::RunStopped { generation: 0 },
                Event::GridRandomized { alive: 16 },
            ]
        );
        assert!(!query::is_running(&world));
        let mut rejected = Vec::new();
        assert_eq!(
            apply(
                &mut world,
                Command::CommitGeneration {
                    generation: 1,
                    cells: vec![CellState::Empty; 16],
                },
                &mut rejected,
            ),
            Err(LifeError::SimulationIdle)
        );
        assert!(rejected.is_empty());
        assert_eq!(query::alive_count(&world), 16);
    }

    #[test]
    fn randomize_is_reproducible_for_equal_seeds() {
        let mut first = World::with_config(WorldConfig {
            width: 30,
            height: 20,
            seed: 99,
        })
        .expect("valid config");
        let mut second = World::with_config(WorldConfig {
            width: 30,
            height: 20,
            seed: 99,
        })
        .expect("valid config");

        let _ = run(
            &mut first,
            Command::Randomize {
                density: AliveDensity::default(),
            },
        );
        let _ = run(
            &mut second,
            Command::Randomize {
                density: AliveDensity::default(),
            },
        );

        assert_eq!(
            query::grid_view(&first).cells(),
            query::grid_view(&second).cells()
        );
    }

    #[test]
    fn set_cell_reports_only_changes() {
        let mut world = small_world();
        let pos = GridPos::new(-2, 1);
        let events = run(
            &mut world,
            Command::SetCell {
                pos,
                state: CellState::Alive,
            },
        );
        assert_eq!(
            events,
            vec![Event::CellChanged {
                pos,
                state: CellState::Alive
            }]
        );

        let repeated = run(
            &mut world,
            Command::SetCell {
                pos,
                state: CellState::Alive,
            },
        );
        assert!(repeated.is_empty());
    }

    #[test]
    fn set_cell_rejects_out_of_bounds_positions() {
        let mut world = small_world();
        let pos = GridPos::new(2, 0);
        let mut events = Vec::new();
        let result = apply(
            &mut world,
            Command::SetCell {
                pos,
                state: CellState::Alive,
            },
            &mut events,
        );
        assert_eq!(result, Err(LifeError::InvalidPosition { pos }));
        assert!(events.is_empty());
        assert_eq!(query::alive_count(&world), 0);
    }

    #[test]
    fn edits_are_rejected_while_running() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Simulate { generations: 2 });

        let mut events = Vec::new();
        let result = apply(
            &mut world,
            Command::ToggleCell {
                pos: GridPos::new(0, 0),
            },
            &mut events,
        );

        assert_eq!(result, Err(LifeError::SimulationRunning));
        assert_eq!(query::alive_count(&world), 0);
    }

    #[test]
    fn toggle_flips_cell_state() {
        let mut world = small_world();
        let pos = GridPos::new(1, -2);
        let _ = run(&mut world, Command::ToggleCell { pos });
        assert_eq!(query::cell_state(&world, pos), CellState::Alive);
        let _ = run(&mut world, Command::ToggleCell { pos });
        assert_eq!(query::cell_state(&world, pos), CellState::Empty);
    }

    #[test]
    fn cell_state_wraps_positions() {
        let mut world = small_world();
        set_alive(&mut world, -2, -2);
        assert_eq!(query::cell_state(&world, GridPos::new(2, 2)), CellState::Alive);
        assert_eq!(query::cell_state(&world, GridPos::new(-6, 6)), CellState::Alive);
    }

    #[test]
    fn restore_without_snapshot_is_rejected() {
        let mut world = small_world();
        set_alive(&mut world, 0, 0);
        let _ = run(&mut world, Command::Simulate { generations: 4 });

        let mut events = Vec::new();
        let result = apply(&mut world, Command::Restore, &mut events);

        assert_eq!(result, Err(LifeError::NoSnapshot));
        assert!(events.is_empty());
        assert!(query::is_running(&world));
        assert_eq!(query::alive_count(&world), 1);
    }

    #[test]
    fn save_and_restore_round_trip() {
        let mut world = small_world();
        set_alive(&mut world, 0, 0);
        set_alive(&mut world, 1, -2);
        let _ = run(&mut world, Command::Save);
        let saved_cells = query::grid_view(&world).cells().to_vec();
        let saved_bounds = query::bounds(&world);

        let _ = run(
            &mut world,
            Command::CreateGrid {
                width: 9,
                height: 7,
            },
        );
        set_alive(&mut world, 3, 3);

        let events = run(&mut world, Command::Restore);

        assert_eq!(
            events,
            vec![Event::LayoutRestored {
                bounds: saved_bounds
            }]
        );
        assert_eq!(query::bounds(&world), saved_bounds);
        assert_eq!(query::grid_view(&world).cells(), saved_cells.as_slice());
    }

    #[test]
    fn restore_can_repeat_after_mutation() {
        let mut world = small_world();
        set_alive(&mut world, -1, -1);
        let _ = run(&mut world, Command::Save);

        let _ = run(&mut world, Command::Restore);
        set_alive(&mut world, 1, 1);
        let _ = run(&mut world, Command::Restore);

        assert_eq!(query::alive_count(&world), 1);
        assert_eq!(query::cell_state(&world, GridPos::new(1, 1)), CellState::Empty);
    }

    #[test]
    fn restore_stops_active_run() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Save);
        let _ = run(&mut world, Command::Simulate { generations: 3 });
        let events = run(&mut world, Command::Restore);
        assert_eq!(events[0], Event::RunStopped { generation: 0 });
        assert!(!query::is_running(&world));
    }

    #[test]
    fn tick_requests_next_generation_only_while_running() {
        let mut world = small_world();
        assert!(run(&mut world, Command::Tick).is_empty());

        let _ = run(&mut world, Command::Simulate { generations: 2 });
        assert_eq!(
            run(&mut world, Command::Tick),
            vec![Event::GenerationRequested { generation: 1 }]
        );
    }

    #[test]
    fn zero_generation_run_is_a_no_op() {
        let mut world = small_world();
        assert!(run(&mut world, Command::Simulate { generations: 0 }).is_empty());
        assert_eq!(query::run_state(&world), RunState::Idle);
    }

    #[test]
    fn commits_apply_in_order_and_finish_run() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Simulate { generations: 2 });
        assert_eq!(query::run_state(&world), RunState::Running { remaining: 2 });

        let first = run(
            &mut world,
            Command::CommitGeneration {
                generation: 1,
                cells: vec![CellState::Alive; 16],
            },
        );
        assert_eq!(
            first,
            vec![Event::GenerationAdvanced {
                generation: 1,
                alive: 16
            }]
        );
        assert_eq!(query::run_state(&world), RunState::Running { remaining: 1 });

        let second = run(
            &mut world,
            Command::CommitGeneration {
                generation: 2,
                cells: vec![CellState::Empty; 16],
            },
        );
        assert_eq!(
            second,
            vec![
                Event::GenerationAdvanced {
                    generation: 2,
                    alive: 0
                },
                Event::RunFinished { generation: 2 },
            ]
        );
        assert!(!query::is_running(&world));
        assert_eq!(query::generation(&world), 2);
    }

    #[test]
    fn out_of_order_commit_is_rejected() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Simulate { generations: 3 });

        let mut events = Vec::new();
        let result = apply(
            &mut world,
            Command::CommitGeneration {
                generation: 2,
                cells: vec![CellState::Alive; 16],
            },
            &mut events,
        );

        assert_eq!(
            result,
            Err(LifeError::StaleGeneration {
                expected: 1,
                received: 2
            })
        );
        assert!(events.is_empty());
        assert_eq!(query::alive_count(&world), 0);
    }

    #[test]
    fn commit_after_stop_leaves_prior_generation() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Simulate { generations: 3 });
        let _ = run(&mut world, Command::Tick);
        let stopped = run(&mut world, Command::Stop);
        assert_eq!(stopped, vec![Event::RunStopped { generation: 0 }]);

        let mut events = Vec::new();
        let result = apply(
            &mut world,
            Command::CommitGeneration {
                generation: 1,
                cells: vec![CellState::Alive; 16],
            },
            &mut events,
        );

        assert_eq!(result, Err(LifeError::SimulationIdle));
        assert_eq!(query::alive_count(&world), 0);
        assert_eq!(query::generation(&world), 0);
    }

    #[test]
    fn commit_with_wrong_cell_count_is_rejected() {
        let mut world = small_world();
        let _ = run(&mut world, Command::Simulate { generations: 1 });
        let mut events = Vec::new();
        let result = apply(
            &mut world,
            Command::CommitGeneration {
                generation: 1,
                cells: vec![CellState::Alive; 15],
            },
            &mut events,
        );
        assert_eq!(
            result,
            Err(LifeError::CellCountMismatch {
                expected: 16,
                received: 15
            })
        );
        assert_eq!(query::generation(&world), 0);
        assert!(query::is_running(&world));
    }

    #[test]
    fn stop_is_silent_when_idle() {
        let mut world = small_world();
        assert!(run(&mut world, Command::Stop).is_empty());
    }

    #[test]
    fn recalculate_bounds_tracks_grid_extent() {
        let mut world = small_world();
        world.grid = Grid::new(8, 2).expect("valid grid");
        world.recalculate_bounds();
        let bounds = query::bounds(&world);
        assert_eq!((bounds.width(), bounds.height()), (8, 2));
    }
}
