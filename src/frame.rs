// Copyright (c) 2026 rezky_nightky

use crate::cell::Cell;

/// Cell grid with change tracking, so the terminal only rewrites what moved.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }

        for &i in &self.dirty {
            if let Some(v) = self.dirty_map.get_mut(i) {
                *v = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(Cell::BLANK)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == cell {
            return;
        }
        self.cells[i] = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flake() -> Cell {
        Cell { ch: '*', fg: None }
    }

    #[test]
    fn new_frame_needs_a_full_draw() {
        let mut f = Frame::new(3, 2);
        assert!(f.is_dirty_all());
        f.set(1, 1, flake());
        assert!(f.dirty_indices().is_empty());
        f.clear_dirty();
        assert!(!f.is_dirty_all());
        assert_eq!(f.get(1, 1).unwrap().ch, '*');
    }

    #[test]
    fn only_changed_cells_are_marked() {
        let mut f = Frame::new(3, 2);
        f.clear_dirty();

        f.set(0, 0, Cell::BLANK);
        assert!(f.dirty_indices().is_empty());

        f.set(2, 1, flake());
        f.set(2, 1, flake());
        assert_eq!(f.dirty_indices(), &[5]);

        f.set(5, 5, flake());
        assert_eq!(f.dirty_indices(), &[5]);

        f.clear_dirty();
        f.set(2, 1, Cell::BLANK);
        assert_eq!(f.dirty_indices(), &[5]);
    }
}
