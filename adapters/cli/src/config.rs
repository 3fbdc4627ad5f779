use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use life_grid_core::{extent_from_index, AliveDensity, DEFAULT_ALIVE_DENSITY};
use life_grid_world::WorldConfig;
use serde::Deserialize;

/// Dimension index that maps to the default 75 cell extent.
const DEFAULT_EXTENT_INDEX: u32 = 14;

/// Command-line arguments accepted by the life grid binary.
#[derive(Debug, Parser)]
#[command(name = "life-grid", about = "Runs Conway's Game of Life on a toroidal grid")]
pub(crate) struct Args {
    /// TOML file providing simulation settings.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Dimension index selecting the grid width.
    #[arg(long, value_name = "INDEX")]
    pub(crate) width_index: Option<u32>,
    /// Dimension index selecting the grid height.
    #[arg(long, value_name = "INDEX")]
    pub(crate) height_index: Option<u32>,
    /// Probability that a seeded cell starts alive.
    #[arg(long)]
    pub(crate) density: Option<f64>,
    /// Seed for the randomizer.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Number of generations to simulate.
    #[arg(long)]
    pub(crate) generations: Option<u32>,
    /// Delay between generations in milliseconds.
    #[arg(long, value_name = "MILLIS")]
    pub(crate) tick_ms: Option<u64>,
    /// Toggles the cell under a world-space point `X,Y` before the run starts.
    #[arg(
        long = "toggle",
        value_name = "X,Y",
        value_parser = parse_point,
        allow_hyphen_values = true
    )]
    pub(crate) toggles: Vec<Vec2>,
    /// Restores the saved starting layout once the run finishes.
    #[arg(long)]
    pub(crate) rewind: bool,
    /// Suppresses frame output.
    #[arg(long)]
    pub(crate) quiet: bool,
}

/// Simulation settings resolved from defaults, an optional file and flags.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    pub(crate) width_index: u32,
    pub(crate) height_index: u32,
    pub(crate) density: f64,
    pub(crate) seed: u64,
    pub(crate) generations: u32,
    pub(crate) tick_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width_index: DEFAULT_EXTENT_INDEX,
            height_index: DEFAULT_EXTENT_INDEX,
            density: DEFAULT_ALIVE_DENSITY,
            seed: WorldConfig::default().seed,
            generations: 100,
            tick_ms: 100,
        }
    }
}

impl SimulationConfig {
    /// Builds the effective configuration; flags override file values.
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        let _ = config.density()?;
        Ok(config)
    }

    /// Reads a TOML configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config file at {}", path.display()))
    }

    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse simulation config toml contents")
    }

    fn apply_overrides(&mut self, args: &Args) {
        if let Some(index) = args.width_index {
            self.width_index = index;
        }
        if let Some(index) = args.height_index {
            self.height_index = index;
        }
        if let Some(density) = args.density {
            self.density = density;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if let Some(generations) = args.generations {
            self.generations = generations;
        }
        if let Some(tick_ms) = args.tick_ms {
            self.tick_ms = tick_ms;
        }
    }

    pub(crate) const fn width(&self) -> u32 {
        extent_from_index(self.width_index)
    }

    pub(crate) const fn height(&self) -> u32 {
        extent_from_index(self.height_index)
    }

    pub(crate) fn density(&self) -> Result<AliveDensity> {
        AliveDensity::new(self.density)
            .with_context(|| format!("density {} is not a probability", self.density))
    }

    pub(crate) const fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub(crate) const fn world_config(&self) -> WorldConfig {
        WorldConfig {
            width: self.width(),
            height: self.height(),
            seed: self.seed,
        }
    }
}

fn parse_point(value: &str) -> std::result::Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `X,Y`, received `{value}`"))?;
    let x: f32 = x
        .trim()
        .parse()
        .map_err(|error| format!("invalid x coordinate `{x}`: {error}"))?;
    let y: f32 = y
        .trim()
        .parse()
        .map_err(|error| format!("invalid y coordinate `{y}`: {error}"))?;
    Ok(Vec2::new(x, y))
}
