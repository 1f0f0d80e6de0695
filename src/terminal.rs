// Copyright (c) 2026 rezky_nightky

use std::env;
use std::io::{stdout, IsTerminal, Result as IoResult, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::color::{ColorMode, Rgb};
use crate::config::Position;
use crate::driver::Scheduler;
use crate::error::Result;
use crate::frame::Frame;
use crate::raster::{Glyphs, Raster};
use crate::surface::{Host, HostEvent, Surface, Viewport};

pub struct Terminal {
    stdout: Stdout,
    alternate: bool,
    last: Option<Frame>,
    run_buf: String,
}

impl Terminal {
    pub fn new(position: Position) -> IoResult<Self> {
        let alternate = position == Position::Fixed;
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: IoResult<()> = (|| {
            if alternate {
                out.execute(terminal::EnterAlternateScreen)?;
            }
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(ResetColor)?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out, alternate);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            alternate,
            last: None,
            run_buf: String::with_capacity(64),
        })
    }

    /// Writes the cells of `frame` that differ from what is already on screen.
    pub fn draw(&mut self, frame: &mut Frame) -> IoResult<()> {
        let same_shape = self
            .last
            .as_ref()
            .is_some_and(|l| l.width == frame.width && l.height == frame.height);

        if !same_shape || frame.is_dirty_all() {
            self.draw_full(frame)?;
        } else if !frame.dirty_indices().is_empty() {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame) -> IoResult<()> {
        let mut cur_fg: Option<Option<Color>> = None;
        let mut last = Frame::new(frame.width, frame.height);

        self.stdout
            .queue(terminal::Clear(terminal::ClearType::All))?;
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                if cur_fg != Some(cell.fg) {
                    self.stdout
                        .queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                    cur_fg = Some(cell.fg);
                }
                self.stdout.queue(Print(cell.ch))?;
                last.set(x, y, cell);
            }
        }

        last.clear_dirty();
        self.last = Some(last);
        Ok(())
    }

    fn draw_dirty(&mut self, frame: &Frame) -> IoResult<()> {
        let Some(last) = self.last.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;

        let mut dirty = frame.dirty_indices().to_vec();
        dirty.sort_unstable();

        let mut cur_fg: Option<Option<Color>> = None;
        let mut cur_pos: Option<(u16, u16)> = None;
        let mut i = 0usize;
        while i < dirty.len() {
            let idx0 = dirty[i];
            let (x0, y0) = ((idx0 % width) as u16, (idx0 / width) as u16);
            let cell0 = frame.cell_at_index(idx0);
            if last.cell_at_index(idx0) == cell0 {
                i += 1;
                continue;
            }
            last.set(x0, y0, cell0);

            // Same-colored neighbours on one row go out in a single print.
            self.run_buf.clear();
            self.run_buf.push(cell0.ch);
            let mut run_len: u16 = 1;
            let mut j = i + 1;
            while j < dirty.len() {
                let idx1 = dirty[j];
                if idx1 != dirty[j - 1] + 1 || idx1 / width != idx0 / width {
                    break;
                }
                let cell1: Cell = frame.cell_at_index(idx1);
                if cell1.fg != cell0.fg || last.cell_at_index(idx1) == cell1 {
                    break;
                }
                last.set((idx1 % width) as u16, y0, cell1);
                self.run_buf.push(cell1.ch);
                run_len = run_len.saturating_add(1);
                j += 1;
            }

            if cur_pos != Some((x0, y0)) {
                self.stdout.queue(cursor::MoveTo(x0, y0))?;
            }
            if cur_fg != Some(cell0.fg) {
                self.stdout
                    .queue(SetForegroundColor(cell0.fg.unwrap_or(Color::Reset)))?;
                cur_fg = Some(cell0.fg);
            }
            self.stdout.queue(Print(self.run_buf.as_str()))?;

            let next_x = x0.saturating_add(run_len);
            cur_pos = (next_x < frame.width).then_some((next_x, y0));
            i = j;
        }

        last.clear_dirty();
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout, self.alternate);
    }
}

fn restore(out: &mut Stdout, alternate: bool) {
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    if alternate {
        let _ = out.execute(terminal::LeaveAlternateScreen);
    } else {
        let _ = out.execute(cursor::MoveTo(0, 0));
        let _ = out.execute(terminal::Clear(terminal::ClearType::All));
    }
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

/// The terminal screen as a pixel surface.
pub struct TerminalSurface {
    term: Terminal,
    raster: Raster,
    frame: Frame,
    fg: Option<Color>,
    color_mode: ColorMode,
    glyphs: Glyphs,
}

impl Surface for TerminalSurface {
    fn size(&self) -> (u32, u32) {
        self.raster.size()
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport == self.raster.viewport() {
            return;
        }
        self.raster = Raster::new(viewport);
        self.frame = Frame::new(viewport.cols, viewport.rows);
    }

    fn clear(&mut self) {
        self.raster.clear();
    }

    fn set_fill(&mut self, color: Rgb) {
        self.fg = color.to_terminal(self.color_mode);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.raster.fill_rect(x, y, w, h);
    }

    fn present(&mut self) -> Result<()> {
        self.raster.render(&mut self.frame, self.fg, self.glyphs);
        self.term.draw(&mut self.frame)?;
        Ok(())
    }
}

pub struct TerminalHost {
    color_mode: ColorMode,
    glyphs: Glyphs,
    scheduler: Scheduler,
}

impl TerminalHost {
    pub fn new(color_mode: ColorMode, glyphs: Glyphs, scheduler: Scheduler) -> Self {
        Self {
            color_mode,
            glyphs,
            scheduler,
        }
    }
}

impl Host for TerminalHost {
    type Surface = TerminalSurface;

    fn supports_surface(&self) -> bool {
        let term = env::var("TERM").unwrap_or_default();
        stdout().is_terminal() && !term.eq_ignore_ascii_case("dumb")
    }

    fn viewport(&self) -> Result<Viewport> {
        let (cols, rows) = terminal::size()?;
        let vp = match terminal::window_size() {
            Ok(ws) => Viewport::with_pixels(cols, rows, ws.width, ws.height),
            Err(_) => Viewport::new(cols, rows),
        };
        Ok(vp)
    }

    fn scheduler(&self) -> Scheduler {
        self.scheduler
    }

    fn create_surface(&mut self, viewport: Viewport, position: Position) -> Result<TerminalSurface> {
        let term = Terminal::new(position)?;
        Ok(TerminalSurface {
            term,
            raster: Raster::new(viewport),
            frame: Frame::new(viewport.cols, viewport.rows),
            fg: None,
            color_mode: self.color_mode,
            glyphs: self.glyphs,
        })
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<HostEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let ev = match event::read()? {
            Event::Resize(_, _) => Some(HostEvent::Resize),
            Event::Key(k) if k.kind == KeyEventKind::Press => match (k.code, k.modifiers) {
                (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Some(HostEvent::Stop),
                (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                    Some(HostEvent::Stop)
                }
                _ => None,
            },
            _ => None,
        };
        Ok(ev)
    }
}
