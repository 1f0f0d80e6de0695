// Copyright (c) 2026 rezky_nightky

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::color::Rgb;
use crate::config::SnowConfig;
use crate::driver::{Animation, Scheduler};
use crate::error::Result;
use crate::flake::Flake;
use crate::surface::{Host, Surface, Viewport};

/// Owns the surface and a fixed set of flakes, and repaints them every frame.
pub struct SnowController<S> {
    surface: S,
    flakes: Vec<Flake>,
    width: u32,
    height: u32,

    color: Rgb,
    max_speed: f64,
    max_size: u32,
    max_count: usize,

    rng: StdRng,
    animation: Option<Animation>,
}

fn random_coord<R: Rng + ?Sized>(rng: &mut R, bound: u32) -> f64 {
    if bound == 0 {
        return 0.0;
    }
    rng.random_range(0..bound) as f64
}

impl<S: Surface> SnowController<S> {
    pub fn new(surface: S, config: &SnowConfig, rng: StdRng) -> Self {
        let (width, height) = surface.size();
        let mut snow = Self {
            surface,
            flakes: Vec::with_capacity(config.max_flakes),
            width,
            height,
            color: config.color,
            max_speed: config.max_speed,
            max_size: config.max_size,
            max_count: config.max_flakes,
            rng,
            animation: None,
        };
        snow.generate_flakes();
        snow
    }

    pub fn generate_flakes(&mut self) {
        self.flakes.clear();
        for _ in 0..self.max_count {
            let x = random_coord(&mut self.rng, self.width);
            let y = random_coord(&mut self.rng, self.height);
            self.flakes
                .push(Flake::new(x, y, self.max_speed, self.max_size, &mut self.rng));
        }
    }

    pub fn update_flakes(&mut self, delta_ms: f64) {
        let (w, h) = (self.width as f64, self.height as f64);
        for flake in &mut self.flakes {
            flake.advance(delta_ms);
            if !flake.is_visible(w, h) {
                let x = random_coord(&mut self.rng, self.width);
                flake.reset(x, 0.0, &mut self.rng);
            }
        }
    }

    pub fn draw_frame(&mut self) {
        self.surface.clear();
        self.surface.set_fill(self.color);
        for flake in &self.flakes {
            let s = flake.size as f64;
            self.surface.fill_rect(flake.x, flake.y, s, s);
        }
    }

    pub fn tick(&mut self, elapsed_ms: f64) -> Result<()> {
        self.update_flakes(elapsed_ms);
        self.draw_frame();
        self.surface.present()
    }

    pub fn register_animation(&mut self, scheduler: Scheduler, now: Instant) {
        self.animation = Some(Animation::start(scheduler, now));
    }

    /// Runs one scheduled frame; does nothing once stopped.
    pub fn frame(&mut self, now: Instant) -> Result<()> {
        let Some(animation) = self.animation.as_mut() else {
            return Ok(());
        };
        let elapsed = animation.begin_frame(now);
        self.tick(elapsed)
    }

    pub fn next_frame(&self) -> Option<Instant> {
        self.animation.as_ref().map(Animation::next_frame)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn stop(&mut self) {
        if self.animation.take().is_some() {
            debug!("animation stopped");
        }
    }

    /// Flakes keep their positions; ones left outside get recycled on their own.
    pub fn resize(&mut self, viewport: Viewport) {
        self.surface.resize(viewport);
        let (width, height) = self.surface.size();
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }

    #[cfg(test)]
    pub fn flakes_mut(&mut self) -> &mut [Flake] {
        &mut self.flakes
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

/// A snow effect, or nothing when the host cannot draw it.
pub enum Snowfall<S> {
    Active(SnowController<S>),
    Disabled,
}

impl<S: Surface> Snowfall<S> {
    pub fn init<H>(host: &mut H, config: SnowConfig) -> Result<Self>
    where
        H: Host<Surface = S>,
    {
        if !host.supports_surface() {
            warn!("snowfall is aborting: no drawing surface available (stdout must be a capable terminal)");
            return Ok(Snowfall::Disabled);
        }

        let viewport = host.viewport()?;
        let surface = host.create_surface(viewport, config.position)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut snow = SnowController::new(surface, &config, rng);
        let scheduler = host.scheduler();
        snow.register_animation(scheduler, Instant::now());

        let (width, height) = snow.size();
        info!(
            flakes = config.max_flakes,
            width,
            height,
            ?scheduler,
            "snowfall started"
        );
        Ok(Snowfall::Active(snow))
    }

    pub fn is_animating(&self) -> bool {
        match self {
            Snowfall::Active(snow) => snow.is_animating(),
            Snowfall::Disabled => false,
        }
    }

    pub fn next_frame(&self) -> Option<Instant> {
        match self {
            Snowfall::Active(snow) => snow.next_frame(),
            Snowfall::Disabled => None,
        }
    }

    pub fn frame(&mut self, now: Instant) -> Result<()> {
        match self {
            Snowfall::Active(snow) => snow.frame(now),
            Snowfall::Disabled => Ok(()),
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if let Snowfall::Active(snow) = self {
            snow.resize(viewport);
        }
    }

    pub fn stop(&mut self) {
        if let Snowfall::Active(snow) = self {
            snow.stop();
        }
    }

    pub fn flakes(&self) -> &[Flake] {
        match self {
            Snowfall::Active(snow) => snow.flakes(),
            Snowfall::Disabled => &[],
        }
    }
}
