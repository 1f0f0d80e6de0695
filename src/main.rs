// Copyright (c) 2026 rezky_nightky

mod cell;
mod color;
mod config;
mod driver;
mod error;
mod flake;
mod frame;
mod raster;
mod snowfall;
mod surface;
mod terminal;
#[cfg(test)]
mod testing;

use std::env;
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::color::{detect_color_mode, ColorMode, Rgb};
use crate::config::{color_enabled_stdout, default_params_usage_for_help, Args};
use crate::raster::Glyphs;
use crate::snowfall::Snowfall;
use crate::terminal::{restore_terminal_best_effort, TerminalHost};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u32_range(name: &str, v: u32, min: u32, max: u32) -> u32 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_usize_max(name: &str, v: usize, max: usize) -> usize {
    if v > max {
        eprintln!("failed to apply {} {} (min 0 max {})", name, v, max);
        std::process::exit(1);
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn resolve_color_mode(args: &Args) -> ColorMode {
    match args.colormode {
        None => detect_color_mode(),
        Some(bits) => ColorMode::from_bits(bits).unwrap_or_else(|| {
            eprintln!("invalid --colormode: {} (allowed: 0,16,8,256,24,32)", bits);
            std::process::exit(1);
        }),
    }
}

fn install_signal_handlers() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn main() -> ExitCode {
    install_signal_handlers();
    init_logging();

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let color = match args.color.as_deref().map(str::parse::<Rgb>).transpose() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut config = args.snow_config(color);
    config.max_flakes = require_usize_max("--max-flakes", config.max_flakes, 100_000);
    config.max_speed = require_f64_range("--max-speed", config.max_speed, 0.1, 100.0);
    config.max_size = require_u32_range("--max-size", config.max_size, 1, 64);
    let fps = require_f64_range("--fps", args.fps, 1.0, 240.0);

    let until = args.duration.and_then(|s| {
        if !s.is_finite() || s <= 0.0 {
            return None;
        }
        let s = require_f64_range("--duration", s, 0.1, 86400.0);
        Some(Instant::now() + Duration::from_secs_f64(s))
    });

    let glyphs = if args.ascii || default_to_ascii() {
        Glyphs::Ascii
    } else {
        Glyphs::Braille
    };
    let term_name = env::var("TERM").unwrap_or_default();
    let scheduler = driver::preferred_scheduler(fps, args.timer_fallback, &term_name);
    let color_mode = resolve_color_mode(&args);
    info!(color_mode = color_mode.label(), ?glyphs, "terminal capabilities");
    let mut host = TerminalHost::new(color_mode, glyphs, scheduler);

    let result = (|| -> crate::error::Result<()> {
        let mut snow = Snowfall::init(&mut host, config)?;
        driver::run(&mut host, &mut snow, until)?;
        debug!(flakes = snow.flakes().len(), "snowfall finished");
        Ok(())
    })();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            restore_terminal_best_effort();
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
