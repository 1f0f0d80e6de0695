// Copyright (c) 2026 rezky_nightky

use rand::Rng;

/// Slowest fall rate a flake can get, in px/ms.
pub const MIN_SPEED: f64 = 0.1;
/// Smallest edge length a flake can get, in px.
pub const MIN_SIZE: u32 = 1;

/// One snowflake: a square of `size` pixels falling straight down at `speed` px/ms.
#[derive(Clone, Debug, PartialEq)]
pub struct Flake {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub size: u32,
    max_speed: f64,
    max_size: u32,
}

impl Flake {
    pub fn new<R: Rng + ?Sized>(x: f64, y: f64, max_speed: f64, max_size: u32, rng: &mut R) -> Self {
        let mut flake = Self {
            x,
            y,
            speed: MIN_SPEED,
            size: MIN_SIZE,
            max_speed,
            max_size,
        };
        flake.reset(x, y, rng);
        flake
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, x: f64, y: f64, rng: &mut R) {
        self.x = x;
        self.y = y;
        self.speed = (rng.random::<f64>() * self.max_speed).max(MIN_SPEED);
        self.size = ((rng.random::<f64>() * self.max_size as f64).floor() as u32).max(MIN_SIZE);
    }

    pub fn advance(&mut self, delta_ms: f64) {
        self.y += delta_ms * self.speed;
    }

    /// Strict on every edge: a flake sitting exactly on the top or left
    /// border counts as gone.
    pub fn is_visible(&self, width: f64, height: f64) -> bool {
        self.x > 0.0 && self.y > 0.0 && self.x < width && self.y < height
    }
}
