// Copyright (c) 2026 rezky_nightky

//! Seams between the snow simulation and whatever it is drawn on.

use std::time::Duration;

use crate::color::Rgb;
use crate::config::Position;
use crate::driver::Scheduler;
use crate::error::Result;

/// Pixel size assumed for a cell when the terminal does not report one.
pub const DEFAULT_CELL_WIDTH: u16 = 8;
pub const DEFAULT_CELL_HEIGHT: u16 = 16;

/// The visible area: a grid of cells, each `cell_width` x `cell_height` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub cell_width: u16,
    pub cell_height: u16,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
        }
    }

    /// Derives the cell size from the window's pixel size, if the terminal knows it.
    pub fn with_pixels(cols: u16, rows: u16, px_width: u16, px_height: u16) -> Self {
        let mut vp = Self::new(cols, rows);
        if cols > 0 && rows > 0 && px_width >= cols && px_height >= rows {
            vp.cell_width = px_width / cols;
            vp.cell_height = px_height / rows;
        }
        vp
    }

    pub fn width_px(&self) -> u32 {
        self.cols as u32 * self.cell_width as u32
    }

    pub fn height_px(&self) -> u32 {
        self.rows as u32 * self.cell_height as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Resize,
    Stop,
}

/// A canvas-like drawing target measured in pixels.
pub trait Surface {
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, viewport: Viewport);
    fn clear(&mut self);
    fn set_fill(&mut self, color: Rgb);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn present(&mut self) -> Result<()>;
}

/// The environment the snow runs in.
pub trait Host {
    type Surface: Surface;

    fn supports_surface(&self) -> bool;
    fn viewport(&self) -> Result<Viewport>;
    fn scheduler(&self) -> Scheduler;
    /// Creates a surface covering `viewport` and attaches it to the display.
    fn create_surface(&mut self, viewport: Viewport, position: Position) -> Result<Self::Surface>;
    /// Waits up to `timeout` for the next event.
    fn poll_event(&mut self, timeout: Duration) -> Result<Option<HostEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_falls_back_to_defaults() {
        let vp = Viewport::with_pixels(80, 24, 0, 0);
        assert_eq!((vp.cell_width, vp.cell_height), (8, 16));
        assert_eq!((vp.width_px(), vp.height_px()), (640, 384));
    }

    #[test]
    fn pixel_size_from_window() {
        let vp = Viewport::with_pixels(100, 50, 1000, 1100);
        assert_eq!((vp.cell_width, vp.cell_height), (10, 22));
        assert_eq!((vp.width_px(), vp.height_px()), (1000, 1100));
    }
}
