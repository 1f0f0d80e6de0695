// Copyright (c) 2026 rezky_nightky

//! Pixel-space rectangles rasterised onto braille dots, 2x4 per cell.

use crossterm::style::Color;

use crate::cell::Cell;
use crate::frame::Frame;
use crate::surface::Viewport;

const DOTS_X: u32 = 2;
const DOTS_Y: u32 = 4;

// Braille bit for the dot at [column][row].
const BRAILLE_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];
const BRAILLE_BASE: u32 = 0x2800;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyphs {
    Braille,
    Ascii,
}

impl Glyphs {
    pub fn for_mask(self, mask: u8) -> char {
        if mask == 0 {
            return ' ';
        }
        match self {
            Glyphs::Braille => char::from_u32(BRAILLE_BASE + mask as u32).unwrap_or('*'),
            Glyphs::Ascii => match mask.count_ones() {
                1 | 2 => '.',
                3..=5 => '*',
                _ => '#',
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Raster {
    viewport: Viewport,
    masks: Vec<u8>,
}

impl Raster {
    pub fn new(viewport: Viewport) -> Self {
        let len = viewport.cols as usize * viewport.rows as usize;
        Self {
            viewport,
            masks: vec![0; len],
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn size(&self) -> (u32, u32) {
        (self.viewport.width_px(), self.viewport.height_px())
    }

    pub fn clear(&mut self) {
        self.masks.fill(0);
    }

    pub fn mask_at(&self, col: u16, row: u16) -> u8 {
        if col >= self.viewport.cols || row >= self.viewport.rows {
            return 0;
        }
        self.masks[row as usize * self.viewport.cols as usize + col as usize]
    }

    /// Lights every dot the rectangle `[x, x+w) x [y, y+h)` overlaps; the rest is clipped.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let (width, height) = self.size();
        let x0 = x.max(0.0);
        let y0 = y.max(0.0);
        let x1 = (x + w).min(width as f64);
        let y1 = (y + h).min(height as f64);
        if !(x0 < x1 && y0 < y1) {
            return;
        }

        let dot_w = self.viewport.cell_width as f64 / DOTS_X as f64;
        let dot_h = self.viewport.cell_height as f64 / DOTS_Y as f64;
        let dots_wide = self.viewport.cols as u32 * DOTS_X;
        let dots_high = self.viewport.rows as u32 * DOTS_Y;

        let dx0 = (x0 / dot_w).floor() as u32;
        let dy0 = (y0 / dot_h).floor() as u32;
        let dx1 = ((x1 / dot_w).ceil() as u32).min(dots_wide);
        let dy1 = ((y1 / dot_h).ceil() as u32).min(dots_high);

        let cols = self.viewport.cols as usize;
        for dy in dy0..dy1 {
            let row = (dy / DOTS_Y) as usize;
            for dx in dx0..dx1 {
                let col = (dx / DOTS_X) as usize;
                let bit = BRAILLE_BITS[(dx % DOTS_X) as usize][(dy % DOTS_Y) as usize];
                self.masks[row * cols + col] |= bit;
            }
        }
    }

    /// Writes every cell into `frame`; the frame keeps track of what changed.
    pub fn render(&self, frame: &mut Frame, fg: Option<Color>, glyphs: Glyphs) {
        let cols = self.viewport.cols.min(frame.width);
        let rows = self.viewport.rows.min(frame.height);
        for row in 0..rows {
            for col in 0..cols {
                let mask = self.mask_at(col, row);
                let cell = if mask == 0 {
                    Cell::BLANK
                } else {
                    Cell {
                        ch: glyphs.for_mask(mask),
                        fg,
                    }
                };
                frame.set(col, row, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 8x16 px cells: each dot is 4x4 px.
    fn raster(cols: u16, rows: u16) -> Raster {
        Raster::new(Viewport::new(cols, rows))
    }

    #[test]
    fn one_pixel_lights_one_dot() {
        let mut r = raster(4, 2);
        r.fill_rect(5.0, 9.0, 1.0, 1.0);
        // dot (1, 2) of cell (0, 0)
        assert_eq!(r.mask_at(0, 0), 0x20);
        assert_eq!(r.masks.iter().filter(|&&m| m != 0).count(), 1);
    }

    #[test]
    fn square_spanning_dots_lights_each_overlapped_dot() {
        let mut r = raster(4, 2);
        r.fill_rect(6.0, 2.0, 4.0, 4.0);
        // x 6..10 covers dot columns 1 and 2, y 2..6 covers dot rows 0 and 1
        assert_eq!(r.mask_at(0, 0), 0x08 | 0x10);
        assert_eq!(r.mask_at(1, 0), 0x01 | 0x02);
    }

    #[test]
    fn rectangles_outside_are_clipped() {
        let mut r = raster(2, 1);
        r.fill_rect(-10.0, 3.0, 4.0, 4.0);
        r.fill_rect(16.0, 3.0, 4.0, 4.0);
        r.fill_rect(3.0, 16.0, 4.0, 4.0);
        assert!(r.masks.iter().all(|&m| m == 0));

        r.fill_rect(14.0, 14.0, 10.0, 10.0);
        assert_eq!(r.mask_at(1, 0), 0x80);
    }

    #[test]
    fn glyphs_for_masks() {
        assert_eq!(Glyphs::Braille.for_mask(0), ' ');
        assert_eq!(Glyphs::Braille.for_mask(0x01), '\u{2801}');
        assert_eq!(Glyphs::Braille.for_mask(0xff), '\u{28ff}');
        assert_eq!(Glyphs::Ascii.for_mask(0x01), '.');
        assert_eq!(Glyphs::Ascii.for_mask(0x0f), '*');
        assert_eq!(Glyphs::Ascii.for_mask(0xff), '#');
    }

    #[test]
    fn render_marks_only_changed_cells() {
        let mut r = raster(3, 1);
        let mut frame = Frame::new(3, 1);
        r.render(&mut frame, None, Glyphs::Ascii);
        frame.clear_dirty();

        r.fill_rect(9.0, 1.0, 2.0, 2.0);
        r.render(&mut frame, Some(Color::White), Glyphs::Ascii);
        assert_eq!(frame.dirty_indices(), &[1]);
        assert_eq!(frame.get(1, 0).unwrap().fg, Some(Color::White));

        frame.clear_dirty();
        r.clear();
        r.render(&mut frame, Some(Color::White), Glyphs::Ascii);
        assert_eq!(frame.dirty_indices(), &[1]);
        assert_eq!(*frame.get(1, 0).unwrap(), Cell::BLANK);
    }
}
