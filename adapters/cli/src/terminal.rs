use std::io::Write;

use anyhow::{Context, Result};
use life_grid_rendering::{CameraZoom, Frame, RenderingBackend};

/// Backend that prints each frame as text to a writer.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    writer: W,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) const fn new(writer: W) -> Self {
        Self { writer }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, frame: &Frame, zoom: &CameraZoom) -> Result<()> {
        writeln!(
            self.writer,
            "generation {} | {}x{} | alive {} | fov {:.1}",
            frame.generation(),
            frame.bounds().width(),
            frame.bounds().height(),
            frame.alive(),
            zoom.current()
        )
        .and_then(|()| write!(self.writer, "{frame}"))
        .and_then(|()| self.writer.flush())
        .context("failed to write frame to terminal")
    }
}

/// Backend that discards frames, used with `--quiet`.
#[derive(Debug, Default)]
pub(crate) struct HeadlessBackend;

impl RenderingBackend for HeadlessBackend {
    fn present(&mut self, _frame: &Frame, _zoom: &CameraZoom) -> Result<()> {
        Ok(())
    }
}
