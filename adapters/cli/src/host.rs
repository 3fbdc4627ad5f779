use std::{thread, time::Duration};

use anyhow::{Context, Result};
use glam::Vec2;
use life_grid_core::{Command, Event, RunState};
use life_grid_rendering::{cell_at_world_point, CameraZoom, Frame, RenderingBackend};
use life_grid_system_generation::Generation;
use life_grid_world::{self as world, query, World};
use log::{debug, info, warn};

use crate::config::SimulationConfig;

/// Owns the world and drives commands through it and the generation system.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    generation: Generation,
    zoom: CameraZoom,
}

impl Simulation {
    /// Creates the grid, seeds it and saves the starting layout.
    pub(crate) fn new(config: &SimulationConfig) -> Result<Self> {
        let world_config = config.world_config();
        let world = World::with_config(world_config).with_context(|| {
            format!(
                "failed to create a {}x{} grid",
                world_config.width, world_config.height
            )
        })?;
        let mut simulation = Self {
            world,
            generation: Generation::new(),
            zoom: CameraZoom::default(),
        };

        if !simulation
            .zoom
            .frame_grid(world_config.width, world_config.height)
        {
            debug!("grid too large to frame, keeping field of view");
        }
        let _ = simulation.submit(Command::Randomize {
            density: config.density()?,
        })?;
        let _ = simulation.submit(Command::Save)?;
        info!(
            "seeded {}x{} grid with {} living cells",
            world_config.width,
            world_config.height,
            query::alive_count(&simulation.world)
        );
        Ok(simulation)
    }

    /// Applies a command and settles every generation commit it triggers.
    pub(crate) fn submit(&mut self, command: Command) -> Result<Vec<Event>> {
        let mut log = Vec::new();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events).context("world rejected command")?;

        loop {
            let mut commands = Vec::new();
            self.generation
                .handle(&events, query::grid_view(&self.world), &mut commands);
            log.append(&mut events);
            if commands.is_empty() {
                break;
            }
            for command in commands {
                world::apply(&mut self.world, command, &mut events)
                    .context("world rejected generation commit")?;
            }
        }

        for event in &log {
            debug!("{event:?}");
        }
        Ok(log)
    }

    /// Toggles the cell under a world-space point when no run is active.
    ///
    /// Returns `false` when the point misses the grid.
    pub(crate) fn toggle_at(&mut self, point: Vec2) -> Result<bool> {
        let Some(pos) = cell_at_world_point(point, query::bounds(&self.world)) else {
            warn!("ignoring toggle at ({}, {}) outside the grid", point.x, point.y);
            return Ok(false);
        };
        let _ = self.submit(Command::ToggleCell { pos })?;
        Ok(true)
    }

    /// Simulates `generations` units, presenting a frame after each one.
    ///
    /// Returns the generation counter once the run finishes.
    pub(crate) fn run(
        &mut self,
        generations: u32,
        tick: Duration,
        backend: &mut dyn RenderingBackend,
    ) -> Result<u64> {
        self.present(backend)?;
        let _ = self.submit(Command::Simulate { generations })?;

        while query::is_running(&self.world) {
            if !tick.is_zero() {
                thread::sleep(tick);
            }
            self.zoom.advance(tick);
            let _ = self.submit(Command::Tick)?;
            self.present(backend)?;
            if let RunState::Running { remaining } = query::run_state(&self.world) {
                debug!("{remaining} generations left in run");
            }
        }

        Ok(query::generation(&self.world))
    }

    /// Restores the layout saved at startup.
    pub(crate) fn rewind(&mut self) -> Result<()> {
        let _ = self.submit(Command::Restore)?;
        Ok(())
    }

    /// Captures the live grid and hands it to the backend.
    pub(crate) fn present(&self, backend: &mut dyn RenderingBackend) -> Result<()> {
        let frame = Frame::capture(
            query::grid_view(&self.world),
            query::generation(&self.world),
        );
        backend.present(&frame, &self.zoom)
    }
}
