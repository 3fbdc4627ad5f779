#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that seeds a toroidal grid and runs Conway's Game of Life.

mod config;
mod host;
mod terminal;

use std::io;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use life_grid_rendering::RenderingBackend;
use log::info;

use crate::{
    config::{Args, SimulationConfig},
    host::Simulation,
    terminal::{HeadlessBackend, TerminalBackend},
};

/// Entry point for the life grid command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = SimulationConfig::resolve(&args)?;
    let mut simulation = Simulation::new(&config)?;

    for point in &args.toggles {
        let _ = simulation.toggle_at(*point)?;
    }

    let mut backend: Box<dyn RenderingBackend> = if args.quiet {
        Box::new(HeadlessBackend)
    } else {
        Box::new(TerminalBackend::new(io::stdout()))
    };

    let generation = simulation.run(config.generations, config.tick(), backend.as_mut())?;
    info!("run finished at generation {generation}");

    if args.rewind {
        simulation.rewind()?;
        simulation.present(backend.as_mut())?;
        info!("restored starting layout");
    }

    Ok(())
}
