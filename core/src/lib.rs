#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the toroidal life engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! [`GridView`] snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Largest width or height accepted for a grid.
pub const MAX_GRID_EXTENT: u32 = 16_384;

/// Width and height of the grid a fresh world starts with.
pub const DEFAULT_GRID_EXTENT: u32 = 75;

/// Alive probability applied when no density is configured explicitly.
pub const DEFAULT_ALIVE_DENSITY: f64 = 0.07;

/// State of a single simulated cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Dead cell.
    #[default]
    Empty,
    /// Living cell.
    Alive,
}

impl CellState {
    /// Reports whether the cell is alive.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// Returns the opposite state, used by click-to-toggle editing.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Empty => Self::Alive,
            Self::Alive => Self::Empty,
        }
    }
}

/// Location of a single cell expressed in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: i32,
    y: i32,
}

impl GridPos {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, increasing to the right.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, increasing upwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// Rectangular extent of a grid anchored at its origin cell.
///
/// Cells occupy `[x_min, x_max) × [y_min, y_max)`. Both extents are always
/// positive and never exceed [`MAX_GRID_EXTENT`], and `x_max`/`y_max` always
/// fit in `i32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGridBounds")]
pub struct GridBounds {
    origin: GridPos,
    width: u32,
    height: u32,
}

impl GridBounds {
    /// Creates bounds of the given extent centred on the world origin.
    ///
    /// The origin is `(-(width / 2), -(height / 2))` using integer division,
    /// so odd extents place one extra column right of and one extra row
    /// above the centre.
    pub fn centered(width: u32, height: u32) -> Result<Self, LifeError> {
        validate_extent(width, height)?;
        let origin = GridPos::new(-extent_to_i32(width / 2), -extent_to_i32(height / 2));
        Ok(Self {
            origin,
            width,
            height,
        })
    }

    /// Creates bounds anchored at an explicit origin.
    ///
    /// Rejects origins whose far edge would not fit in `i32`.
    pub fn from_origin_and_size(origin: GridPos, width: u32, height: u32) -> Result<Self, LifeError> {
        validate_extent(width, height)?;
        let fits = origin.x.checked_add(extent_to_i32(width)).is_some()
            && origin.y.checked_add(extent_to_i32(height)).is_some();
        if !fits {
            return Err(LifeError::BoundsOverflow { origin });
        }
        Ok(Self {
            origin,
            width,
            height,
        })
    }

    /// World coordinate of grid-space `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> GridPos {
        self.origin
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Smallest column contained in the bounds.
    #[must_use]
    pub const fn x_min(&self) -> i32 {
        self.origin.x
    }

    /// First column past the bounds.
    #[must_use]
    pub const fn x_max(&self) -> i32 {
        self.origin.x + extent_to_i32(self.width)
    }

    /// Smallest row contained in the bounds.
    #[must_use]
    pub const fn y_min(&self) -> i32 {
        self.origin.y
    }

    /// First row past the bounds.
    #[must_use]
    pub const fn y_max(&self) -> i32 {
        self.origin.y + extent_to_i32(self.height)
    }

    /// Total number of cells covered by the bounds.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reports whether the position lies inside the bounds.
    #[must_use]
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.x_min() && pos.x < self.x_max() && pos.y >= self.y_min() && pos.y < self.y_max()
    }

    /// Maps any position onto the torus described by the bounds.
    #[must_use]
    pub fn wrap(&self, pos: GridPos) -> GridPos {
        GridPos::new(
            wrap_axis(pos.x, self.x_min(), self.width),
            wrap_axis(pos.y, self.y_min(), self.height),
        )
    }

    /// Row-major storage index of an in-bounds position.
    #[must_use]
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let column = usize::try_from(pos.x - self.x_min()).ok()?;
        let row = usize::try_from(pos.y - self.y_min()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    /// Iterates every position in storage order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let bounds = *self;
        (bounds.y_min()..bounds.y_max())
            .flat_map(move |y| (bounds.x_min()..bounds.x_max()).map(move |x| GridPos::new(x, y)))
    }
}

impl Default for GridBounds {
    /// Bounds of a centred [`DEFAULT_GRID_EXTENT`] square.
    fn default() -> Self {
        let half = extent_to_i32(DEFAULT_GRID_EXTENT / 2);
        Self {
            origin: GridPos::new(-half, -half),
            width: DEFAULT_GRID_EXTENT,
            height: DEFAULT_GRID_EXTENT,
        }
    }
}

/// Unvalidated wire form of [`GridBounds`].
#[derive(Deserialize)]
struct RawGridBounds {
    origin: GridPos,
    width: u32,
    height: u32,
}

impl TryFrom<RawGridBounds> for GridBounds {
    type Error = LifeError;

    fn try_from(raw: RawGridBounds) -> Result<Self, Self::Error> {
        Self::from_origin_and_size(raw.origin, raw.width, raw.height)
    }
}

fn validate_extent(width: u32, height: u32) -> Result<(), LifeError> {
    if width == 0 || height == 0 || width > MAX_GRID_EXTENT || height > MAX_GRID_EXTENT {
        return Err(LifeError::InvalidDimension { width, height });
    }
    Ok(())
}

const fn extent_to_i32(extent: u32) -> i32 {
    // Extents are capped at MAX_GRID_EXTENT, well inside i32.
    extent as i32
}

fn wrap_axis(value: i32, min: i32, extent: u32) -> i32 {
    let offset = (i64::from(value) - i64::from(min)).rem_euclid(i64::from(extent));
    min + i32::try_from(offset).unwrap_or(0)
}

/// Returns the eight toroidal neighbors of an in-bounds position.
///
/// Candidates are produced per axis as `{p - 1, p, p + 1}`, wrapping
/// `p - 1` below the minimum to the last row or column and `p + 1` past the
/// maximum to the first. The 3×3 product is walked x-major (columns left to
/// right, rows bottom to top) and the centre entry is skipped.
///
/// Positions are neither deduplicated nor filtered: on grids narrower than
/// three cells the same physical cell may appear several times, and on an
/// axis of extent one the wrapped candidates alias `pos` itself.
#[must_use]
pub fn neighbors(pos: GridPos, bounds: &GridBounds) -> [GridPos; 8] {
    let columns = axis_candidates(pos.x, bounds.x_min(), bounds.x_max());
    let rows = axis_candidates(pos.y, bounds.y_min(), bounds.y_max());

    let mut out = [pos; 8];
    let mut slot = 0;
    for (column_index, x) in columns.into_iter().enumerate() {
        for (row_index, y) in rows.into_iter().enumerate() {
            if column_index == 1 && row_index == 1 {
                continue;
            }
            out[slot] = GridPos::new(x, y);
            slot += 1;
        }
    }
    out
}

fn axis_candidates(value: i32, min: i32, max: i32) -> [i32; 3] {
    let before = if value - 1 < min { max - 1 } else { value - 1 };
    let after = if value + 1 > max - 1 { min } else { value + 1 };
    [before, value, after]
}

/// Translates a dimension selector index into a grid extent.
///
/// Index 0 maps to 5, indices 1 through 19 step by 5 up to 100, and every
/// later index steps by 50 starting at 150. Width and height share this
/// table.
#[must_use]
pub const fn extent_from_index(index: u32) -> u32 {
    match index {
        0 => 5,
        1..=19 => (index + 1) * 5,
        _ => (index - 17).saturating_mul(50),
    }
}

/// Probability that a seeded cell starts alive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AliveDensity(f64);

impl AliveDensity {
    /// Validates a probability in `0.0..=1.0`.
    pub fn new(value: f64) -> Result<Self, LifeError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(LifeError::InvalidDensity { density: value })
        }
    }

    /// Underlying probability.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }
}

impl Default for AliveDensity {
    fn default() -> Self {
        Self(DEFAULT_ALIVE_DENSITY)
    }
}

impl TryFrom<f64> for AliveDensity {
    type Error = LifeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AliveDensity> for f64 {
    fn from(density: AliveDensity) -> Self {
        density.0
    }
}

/// Whether a sequence of generations is currently being driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// No run in progress; edits are accepted.
    #[default]
    Idle,
    /// A run is in progress with the given number of generations left.
    Running {
        /// Generations still to be committed before the run finishes.
        remaining: u32,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid with an empty one of the given extent.
    CreateGrid {
        /// Number of columns.
        width: u32,
        /// Number of rows.
        height: u32,
    },
    /// Sets every cell to empty and resets the generation counter.
    Clear,
    /// Reseeds every cell independently with the given alive probability.
    Randomize {
        /// Probability that each cell starts alive.
        density: AliveDensity,
    },
    /// Writes a single cell. Rejected while a run is in progress.
    SetCell {
        /// In-bounds position to write.
        pos: GridPos,
        /// State to store.
        state: CellState,
    },
    /// Flips a single cell between empty and alive.
    ToggleCell {
        /// In-bounds position to flip.
        pos: GridPos,
    },
    /// Captures the current grid into the snapshot store.
    Save,
    /// Replaces the grid with a copy of the stored snapshot.
    Restore,
    /// Starts a run of the given number of generations.
    Simulate {
        /// Generations to commit before the run finishes.
        generations: u32,
    },
    /// Scheduler heartbeat; requests the next generation while running.
    Tick,
    /// Cancels the active run between two generations.
    Stop,
    /// Installs a computed generation.
    CommitGeneration {
        /// Generation number the cells belong to.
        generation: u64,
        /// Next-generation cells in storage order.
        cells: Vec<CellState>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A fresh empty grid replaced the previous one.
    GridCreated {
        /// Bounds of the new grid.
        bounds: GridBounds,
    },
    /// Every cell was reset to empty.
    GridCleared {
        /// Bounds of the cleared grid.
        bounds: GridBounds,
    },
    /// The grid was reseeded.
    GridRandomized {
        /// Number of cells that came out alive.
        alive: usize,
    },
    /// A single cell was edited.
    CellChanged {
        /// Edited position.
        pos: GridPos,
        /// New state of the cell.
        state: CellState,
    },
    /// The snapshot store captured the current grid.
    LayoutSaved {
        /// Bounds of the captured grid.
        bounds: GridBounds,
    },
    /// The grid was replaced by a copy of the snapshot.
    LayoutRestored {
        /// Bounds of the restored grid.
        bounds: GridBounds,
    },
    /// A run of generations began.
    RunStarted {
        /// Generations requested for the run.
        generations: u32,
    },
    /// The world awaits the computation of the given generation.
    GenerationRequested {
        /// Generation number that should be computed next.
        generation: u64,
    },
    /// A generation was committed.
    GenerationAdvanced {
        /// Generation number that is now live.
        generation: u64,
        /// Number of living cells in the committed generation.
        alive: usize,
    },
    /// The run committed its final generation.
    RunFinished {
        /// Generation number that ended the run.
        generation: u64,
    },
    /// The run was cancelled before committing every generation.
    RunStopped {
        /// Last generation committed before the cancellation.
        generation: u64,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum LifeError {
    /// Grid extents must be positive and at most [`MAX_GRID_EXTENT`].
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimension {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Densities must lie in `0.0..=1.0`.
    #[error("alive density {density} is outside 0.0..=1.0")]
    InvalidDensity {
        /// Rejected probability.
        density: f64,
    },
    /// The far edge of the grid lies past the coordinate range.
    #[error("grid anchored at ({}, {}) extends past the coordinate range", .origin.x(), .origin.y())]
    BoundsOverflow {
        /// Rejected origin.
        origin: GridPos,
    },
    /// Restore was requested before any layout was saved.
    #[error("no layout has been saved")]
    NoSnapshot,
    /// A write targeted a position outside the grid.
    #[error("position ({}, {}) lies outside the grid", .pos.x(), .pos.y())]
    InvalidPosition {
        /// Rejected position.
        pos: GridPos,
    },
    /// The command is not allowed while a run is in progress.
    #[error("the simulation is running")]
    SimulationRunning,
    /// A generation was committed while no run is in progress.
    #[error("no run is in progress")]
    SimulationIdle,
    /// A computed generation does not follow the live one.
    #[error("generation {received} does not follow the live generation (expected {expected})")]
    StaleGeneration {
        /// Generation number the world would accept.
        expected: u64,
        /// Generation number carried by the commit.
        received: u64,
    },
    /// A computed generation does not cover the grid.
    #[error("generation carries {received} cells but the grid holds {expected}")]
    CellCountMismatch {
        /// Number of cells in the live grid.
        expected: usize,
        /// Number of cells in the commit.
        received: usize,
    },
}

/// Read-only view of a grid's cells.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellState],
    bounds: GridBounds,
}

impl<'a> GridView<'a> {
    /// Captures a view backed by the provided storage-ordered cells.
    #[must_use]
    pub fn new(cells: &'a [CellState], bounds: GridBounds) -> Self {
        Self { cells, bounds }
    }

    /// Bounds of the viewed grid.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Returns the state at a position, wrapping it onto the torus first.
    #[must_use]
    pub fn state(&self, pos: GridPos) -> CellState {
        self.bounds
            .index(self.bounds.wrap(pos))
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or_default()
    }

    /// Storage-ordered cells.
    #[must_use]
    pub fn cells(&self) -> &'a [CellState] {
        self.cells
    }

    /// Iterates positions paired with their states in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, CellState)> + 'a {
        self.bounds.positions().zip(self.cells.iter().copied())
    }

    /// Number of living cells.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }
}
