// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;

use clap::Parser;

use crate::color::Rgb;

pub const DEFAULT_MAX_FLAKES: usize = 300;
pub const DEFAULT_MAX_SPEED: f64 = 0.5;
pub const DEFAULT_MAX_SIZE: u32 = 4;

pub const PRESET_MAX_FLAKES: usize = 350;
pub const PRESET_MAX_SPEED: f64 = 0.6;
pub const PRESET_MAX_SIZE: u32 = 5;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  snowfall --max-flakes 350 --max-size 5 --max-speed 0.6 --color '#aaa' --position fixed --fps 60";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

pub fn default_params_usage_for_help() -> String {
    if !color_enabled_stdout() {
        return DEFAULT_PARAMS_USAGE.to_string();
    }
    match DEFAULT_PARAMS_USAGE.split_once('\n') {
        Some((heading, rest)) => format!("\x1b[1;36m{}\x1b[0m\n{}", heading, rest),
        None => DEFAULT_PARAMS_USAGE.to_string(),
    }
}

/// Where the snow is drawn relative to what is already on screen.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Overlay on the alternate screen, pinned to the viewport.
    #[default]
    #[value(name = "fixed")]
    Fixed,
    /// Drawn on the primary screen, leaving the alternate screen alone.
    #[value(name = "absolute")]
    Absolute,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnowConfig {
    pub max_flakes: usize,
    pub color: Rgb,
    pub position: Position,
    /// px/ms
    pub max_speed: f64,
    /// px
    pub max_size: u32,
    pub seed: Option<u64>,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            max_flakes: DEFAULT_MAX_FLAKES,
            color: Rgb::default(),
            position: Position::Fixed,
            max_speed: DEFAULT_MAX_SPEED,
            max_size: DEFAULT_MAX_SIZE,
            seed: None,
        }
    }
}

impl SnowConfig {
    /// What the binary starts with when given nothing.
    pub fn preset() -> Self {
        Self {
            max_flakes: PRESET_MAX_FLAKES,
            max_speed: PRESET_MAX_SPEED,
            max_size: PRESET_MAX_SIZE,
            ..Self::default()
        }
    }
}

/// Older callers pass just a count.
impl From<usize> for SnowConfig {
    fn from(max_flakes: usize) -> Self {
        Self {
            max_flakes,
            ..Self::default()
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "snowfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        value_name = "COUNT",
        help = "Number of flakes; on its own it keeps every other default (legacy form)"
    )]
    pub count: Option<usize>,

    #[arg(
        short = 'n',
        long = "max-flakes",
        help_heading = "SNOW",
        help = "Number of flakes (min 0 max 100000)"
    )]
    pub max_flakes: Option<usize>,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "SNOW",
        help = "Flake color: #rgb, #rrggbb or a name such as white, snow, silver"
    )]
    pub color: Option<String>,

    #[arg(
        short = 'p',
        long = "position",
        value_enum,
        help_heading = "SNOW",
        help = "fixed draws on the alternate screen, absolute over the current one"
    )]
    pub position: Option<Position>,

    #[arg(
        short = 'S',
        long = "max-speed",
        help_heading = "SNOW",
        help = "Fastest fall speed in px/ms (min 0.1 max 100)"
    )]
    pub max_speed: Option<f64>,

    #[arg(
        short = 's',
        long = "max-size",
        help_heading = "SNOW",
        help = "Flake size upper bound in px, exclusive (min 1 max 64)"
    )]
    pub max_size: Option<u32>,

    #[arg(
        long = "seed",
        help_heading = "SNOW",
        help = "Seed for the random number generator"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "timer-fallback",
        help_heading = "PERFORMANCE",
        help = "Skip refresh pacing and repaint on a fixed 100ms timer"
    )]
    pub timer_fallback: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "ascii",
        help_heading = "APPEARANCE",
        help = "Draw with ASCII instead of braille (default when LANG is not UTF-8)"
    )]
    pub ascii: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

impl Args {
    /// The bare count picks the plain defaults, otherwise the preset; flags win over both.
    pub fn snow_config(&self, color: Option<Rgb>) -> SnowConfig {
        let mut cfg = match self.count {
            Some(n) => SnowConfig::from(n),
            None => SnowConfig::preset(),
        };
        if let Some(n) = self.max_flakes {
            cfg.max_flakes = n;
        }
        if let Some(c) = color {
            cfg.color = c;
        }
        if let Some(p) = self.position {
            cfg.position = p;
        }
        if let Some(s) = self.max_speed {
            cfg.max_speed = s;
        }
        if let Some(s) = self.max_size {
            cfg.max_size = s;
        }
        cfg.seed = self.seed;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("snowfall").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn no_arguments_uses_preset() {
        let cfg = parse(&[]).snow_config(None);
        assert_eq!(cfg, SnowConfig::preset());
        assert_eq!(cfg.max_flakes, 350);
        assert_eq!(cfg.max_size, 5);
        assert_eq!(cfg.max_speed, 0.6);
    }

    #[test]
    fn bare_count_keeps_plain_defaults() {
        let cfg = parse(&["120"]).snow_config(None);
        assert_eq!(cfg, SnowConfig::from(120));
        assert_eq!(cfg.max_speed, DEFAULT_MAX_SPEED);
        assert_eq!(cfg.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(cfg.position, Position::Fixed);
    }

    #[test]
    fn flags_override_base() {
        let args = parse(&[
            "--max-flakes",
            "10",
            "--position",
            "absolute",
            "--max-speed",
            "1.5",
            "-s",
            "8",
            "--seed",
            "9",
        ]);
        let cfg = args.snow_config(Some(Rgb::new(255, 255, 255)));
        assert_eq!(cfg.max_flakes, 10);
        assert_eq!(cfg.position, Position::Absolute);
        assert_eq!(cfg.max_speed, 1.5);
        assert_eq!(cfg.max_size, 8);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.color, Rgb::new(255, 255, 255));
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = SnowConfig::default();
        assert_eq!(cfg.max_flakes, 300);
        assert_eq!(cfg.color, Rgb::new(0xaa, 0xaa, 0xaa));
        assert_eq!(cfg.position, Position::Fixed);
        assert_eq!(cfg.max_speed, 0.5);
        assert_eq!(cfg.max_size, 4);
    }
}
