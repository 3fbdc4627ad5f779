#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for life grid adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use life_grid_core::{CellState, GridBounds, GridPos, GridView};
use std::{fmt, time::Duration};

/// Field of view used before any grid has been framed.
pub const DEFAULT_FIELD_OF_VIEW: f32 = 65.0;

/// Framing thresholds as `(max width, max height, field of view)`.
const FRAMING_TABLE: [(u32, u32, f32); 11] = [
    (20, 10, 65.0),
    (30, 20, 101.0),
    (45, 30, 120.0),
    (60, 40, 135.0),
    (75, 50, 142.0),
    (100, 75, 153.0),
    (150, 100, 160.0),
    (300, 200, 170.0),
    (450, 300, 172.5),
    (600, 400, 175.5),
    (750, 500, 176.5),
];

/// Looks up the camera field of view that frames a grid of the given extent.
///
/// Returns `None` when the grid is larger than every framing threshold, in
/// which case callers keep their previous target.
#[must_use]
pub fn target_field_of_view(width: u32, height: u32) -> Option<f32> {
    FRAMING_TABLE
        .iter()
        .find(|(max_width, max_height, _)| width <= *max_width && height <= *max_height)
        .map(|(_, _, fov)| *fov)
}

/// Smoothly interpolated camera zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraZoom {
    current: f32,
    target: f32,
}

impl CameraZoom {
    /// Fraction of the remaining distance covered per second of frame time.
    pub const ZOOM_RATE: f32 = 3.5;

    /// Relative distance from the target below which the zoom is settled.
    pub const SETTLE_TOLERANCE: f32 = 0.005;

    /// Field of view presented on the current frame.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Field of view the camera is easing towards.
    #[must_use]
    pub const fn target(&self) -> f32 {
        self.target
    }

    /// Retargets the zoom so a grid of the given extent fits on screen.
    ///
    /// Returns `false` and keeps the previous target when the grid exceeds
    /// every framing threshold.
    pub fn frame_grid(&mut self, width: u32, height: u32) -> bool {
        match target_field_of_view(width, height) {
            Some(target) => {
                self.target = target;
                true
            }
            None => false,
        }
    }

    /// Reports whether the current field of view is within tolerance of the target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.current > self.target * (1.0 - Self::SETTLE_TOLERANCE)
            && self.current < self.target * (1.0 + Self::SETTLE_TOLERANCE)
    }

    /// Eases the current field of view towards the target by one frame.
    pub fn advance(&mut self, dt: Duration) {
        if self.is_settled() {
            return;
        }

        let step = (dt.as_secs_f32() * Self::ZOOM_RATE).clamp(0.0, 1.0);
        self.current += (self.target - self.current) * step;
    }
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self {
            current: DEFAULT_FIELD_OF_VIEW,
            target: DEFAULT_FIELD_OF_VIEW,
        }
    }
}

/// Maps a world-space point onto the cell that contains it.
///
/// Cells are one world unit wide with their lower-left corner at their
/// coordinate. Points outside the grid map to `None`; nothing wraps.
#[must_use]
pub fn cell_at_world_point(point: Vec2, bounds: GridBounds) -> Option<GridPos> {
    if !point.is_finite() {
        return None;
    }

    let floored = point.floor();
    let pos = GridPos::new(floored.x as i32, floored.y as i32);
    bounds.contains(pos).then_some(pos)
}

/// Glyph drawn for a living cell.
pub const ALIVE_GLYPH: char = '#';

/// Glyph drawn for an empty cell.
pub const EMPTY_GLYPH: char = '.';

/// Text rendering of a single generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    bounds: GridBounds,
    generation: u64,
    alive: usize,
    rows: Vec<String>,
}

impl Frame {
    /// Renders the provided view, placing the highest row first.
    #[must_use]
    pub fn capture(view: GridView<'_>, generation: u64) -> Self {
        let bounds = view.bounds();
        let rows = (bounds.y_min()..bounds.y_max())
            .rev()
            .map(|y| {
                (bounds.x_min()..bounds.x_max())
                    .map(|x| glyph(view.state(GridPos::new(x, y))))
                    .collect()
            })
            .collect();

        Self {
            bounds,
            generation,
            alive: view.alive_count(),
            rows,
        }
    }

    /// Bounds of the rendered grid.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Generation counter at the time of capture.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of living cells in the frame.
    #[must_use]
    pub const fn alive(&self) -> usize {
        self.alive
    }

    /// Rendered rows ordered from the top of the grid downwards.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

const fn glyph(state: CellState) -> char {
    match state {
        CellState::Alive => ALIVE_GLYPH,
        CellState::Empty => EMPTY_GLYPH,
    }
}

/// Rendering backend capable of presenting life grid frames.
pub trait RenderingBackend {
    /// Presents a captured frame viewed through the provided camera zoom.
    fn present(&mut self, frame: &Frame, zoom: &CameraZoom) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_table_picks_smallest_fitting_threshold() {
        assert_eq!(target_field_of_view(5, 5), Some(65.0));
        assert_eq!(target_field_of_view(20, 10), Some(65.0));
        assert_eq!(target_field_of_view(21, 10), Some(101.0));
        assert_eq!(target_field_of_view(20, 11), Some(101.0));
        assert_eq!(target_field_of_view(75, 75), Some(153.0));
        assert_eq!(target_field_of_view(450, 300), Some(172.5));
        assert_eq!(target_field_of_view(750, 500), Some(176.5));
    }

    #[test]
    fn framing_table_has_no_entry_for_huge_grids() {
        assert_eq!(target_field_of_view(751, 10), None);
        assert_eq!(target_field_of_view(10, 501), None);
    }

    #[test]
    fn zoom_keeps_previous_target_when_grid_is_too_large() {
        let mut zoom = CameraZoom::default();
        assert!(zoom.frame_grid(75, 75));
        assert!(!zoom.frame_grid(800, 800));
        assert_eq!(zoom.target(), 153.0);
    }

    #[test]
    fn zoom_eases_towards_target_and_settles() {
        let mut zoom = CameraZoom::default();
        assert!(zoom.frame_grid(100, 75));
        assert!(!zoom.is_settled());

        let before = zoom.current();
        zoom.advance(Duration::from_millis(16));
        assert!(zoom.current() > before);
        assert!(zoom.current() < zoom.target());

        for _ in 0..600 {
            zoom.advance(Duration::from_millis(16));
        }
        assert!(zoom.is_settled());
    }

    #[test]
    fn settled_zoom_does_not_move() {
        let mut zoom = CameraZoom::default();
        assert!(zoom.frame_grid(12, 8));
        zoom.advance(Duration::from_secs(1));
        assert_eq!(zoom.current(), DEFAULT_FIELD_OF_VIEW);
    }

    #[test]
    fn long_frames_never_overshoot() {
        let mut zoom = CameraZoom::default();
        assert!(zoom.frame_grid(300, 200));
        zoom.advance(Duration::from_secs(10));
        assert_eq!(zoom.current(), 170.0);
    }

    #[test]
    fn world_points_map_to_containing_cell() {
        let bounds = GridBounds::centered(4, 4).expect("valid bounds");
        assert_eq!(
            cell_at_world_point(Vec2::new(-1.5, 0.25), bounds),
            Some(GridPos::new(-2, 0))
        );
        assert_eq!(
            cell_at_world_point(Vec2::new(1.99, 1.99), bounds),
            Some(GridPos::new(1, 1))
        );
        assert_eq!(cell_at_world_point(Vec2::new(2.0, 0.0), bounds), None);
        assert_eq!(cell_at_world_point(Vec2::new(0.0, -2.01), bounds), None);
        assert_eq!(cell_at_world_point(Vec2::new(f32::NAN, 0.0), bounds), None);
    }

    #[test]
    fn cell_centres_map_back_to_their_cell() {
        let bounds = GridBounds::centered(5, 3).expect("valid bounds");
        for pos in bounds.positions() {
            let centre = Vec2::new(pos.x() as f32 + 0.5, pos.y() as f32 + 0.5);
            assert_eq!(cell_at_world_point(centre, bounds), Some(pos));
        }
    }

    #[test]
    fn frame_places_highest_row_first() {
        let bounds = GridBounds::centered(3, 2).expect("valid bounds");
        let mut cells = vec![CellState::Empty; bounds.cell_count()];
        let top_left = bounds
            .index(GridPos::new(bounds.x_min(), bounds.y_max() - 1))
            .expect("in bounds");
        cells[top_left] = CellState::Alive;

        let frame = Frame::capture(GridView::new(&cells, bounds), 7);

        assert_eq!(frame.rows(), ["#..".to_owned(), "...".to_owned()]);
        assert_eq!(frame.generation(), 7);
        assert_eq!(frame.alive(), 1);
        assert_eq!(frame.to_string(), "#..\n...\n");
    }
}
