// Copyright (c) 2026 rezky_nightky

use std::collections::VecDeque;
use std::time::Duration;

use crate::color::Rgb;
use crate::config::Position;
use crate::driver::Scheduler;
use crate::error::Result;
use crate::surface::{Host, HostEvent, Surface, Viewport};

/// Remembers every draw call instead of showing anything.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub size: (u32, u32),
    pub fill: Option<Rgb>,
    pub rects: Vec<(f64, f64, f64, f64)>,
    pub clears: usize,
    pub presents: usize,
}

impl RecordingSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            size: (viewport.width_px(), viewport.height_px()),
            ..Self::default()
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, viewport: Viewport) {
        self.size = (viewport.width_px(), viewport.height_px());
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.rects.clear();
    }

    fn set_fill(&mut self, color: Rgb) {
        self.fill = Some(color);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.rects.push((x, y, w, h));
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }
}

/// Scripted host. Once the script runs dry it idles for the whole timeout.
pub struct StubHost {
    pub supported: bool,
    pub viewport: Viewport,
    pub scheduler: Scheduler,
    pub attached: Vec<Position>,
    pub events: VecDeque<HostEvent>,
}

impl StubHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            supported: true,
            viewport,
            scheduler: Scheduler::refresh(60.0),
            attached: Vec::new(),
            events: VecDeque::new(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Viewport::new(80, 24))
        }
    }
}

impl Host for StubHost {
    type Surface = RecordingSurface;

    fn supports_surface(&self) -> bool {
        self.supported
    }

    fn viewport(&self) -> Result<Viewport> {
        Ok(self.viewport)
    }

    fn scheduler(&self) -> Scheduler {
        self.scheduler
    }

    fn create_surface(&mut self, viewport: Viewport, position: Position) -> Result<RecordingSurface> {
        self.attached.push(position);
        Ok(RecordingSurface::new(viewport))
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<HostEvent>> {
        if let Some(ev) = self.events.pop_front() {
            return Ok(Some(ev));
        }
        std::thread::sleep(timeout);
        Ok(None)
    }
}
