// Copyright (c) 2026 rezky_nightky

use std::env;
use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }

    /// Maps the `--colormode` flag value.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(ColorMode::Mono),
            16 => Some(ColorMode::Color16),
            8 | 256 => Some(ColorMode::Color256),
            24 | 32 => Some(ColorMode::TrueColor),
            _ => None,
        }
    }
}

pub fn detect_color_mode() -> ColorMode {
    let colorterm = env::var("COLORTERM").unwrap_or_default();
    let term = env::var("TERM").unwrap_or_default();
    color_mode_from_env(&colorterm, &term)
}

fn color_mode_from_env(colorterm: &str, term: &str) -> ColorMode {
    let colorterm = colorterm.to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = term.to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    if term == "linux" || term.starts_with("vt") {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

/// Fill color as configured, independent of what the terminal can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_terminal(self, mode: ColorMode) -> Option<Color> {
        let Rgb { r, g, b } = self;
        match mode {
            ColorMode::Mono => None,
            ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
            ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        // #aaa
        Rgb::new(0xaa, 0xaa, 0xaa)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const NAMED: &[(&str, Rgb)] = &[
    ("white", Rgb::new(255, 255, 255)),
    ("snow", Rgb::new(255, 250, 250)),
    ("ghostwhite", Rgb::new(248, 248, 255)),
    ("whitesmoke", Rgb::new(245, 245, 245)),
    ("gainsboro", Rgb::new(220, 220, 220)),
    ("lightgray", Rgb::new(211, 211, 211)),
    ("lightgrey", Rgb::new(211, 211, 211)),
    ("silver", Rgb::new(192, 192, 192)),
    ("darkgray", Rgb::new(169, 169, 169)),
    ("darkgrey", Rgb::new(169, 169, 169)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("lightblue", Rgb::new(173, 216, 230)),
    ("lightcyan", Rgb::new(224, 255, 255)),
    ("azure", Rgb::new(240, 255, 255)),
    ("aliceblue", Rgb::new(240, 248, 255)),
    ("skyblue", Rgb::new(135, 206, 235)),
];

fn hex_digit(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || Error::InvalidColor(s.to_string());

        if let Some(hex) = raw.strip_prefix('#') {
            let digits = hex
                .bytes()
                .map(hex_digit)
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(invalid)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
                [r1, r0, g1, g0, b1, b0] => {
                    Ok(Rgb::new(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0))
                }
                _ => Err(invalid()),
            };
        }

        let name = raw.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, rgb)| rgb)
            .ok_or_else(invalid)
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    // Grayscale ramp 232..=255 covers 8..=238 in steps of 10.
    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    if avg < 8 || avg > 238 {
        return cube_idx;
    }
    let gray_idx = 232 + ((avg - 8) / 10).min(23);
    let v = 8 + 10 * (gray_idx - 232);
    if dist2(r, g, b, v, v, v) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, (cr, cg, cb))| dist2(r, g, b, *cr, *cg, *cb))
        .map(|&(c, _)| c)
        .unwrap_or(Color::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!("#aaa".parse::<Rgb>().unwrap(), Rgb::new(170, 170, 170));
        assert_eq!("#1E90ff".parse::<Rgb>().unwrap(), Rgb::new(30, 144, 255));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Snow".parse::<Rgb>().unwrap(), Rgb::new(255, 250, 250));
        assert_eq!(" grey ".parse::<Rgb>().unwrap(), Rgb::new(128, 128, 128));
    }

    #[test]
    fn rejects_garbage() {
        assert!("#abcd".parse::<Rgb>().is_err());
        assert!("#ggg".parse::<Rgb>().is_err());
        assert!("chartreuse-ish".parse::<Rgb>().is_err());
    }

    #[test]
    fn default_is_neutral_gray() {
        assert_eq!(Rgb::default().to_string(), "#aaaaaa");
    }

    #[test]
    fn terminal_color_follows_mode() {
        let c = Rgb::new(255, 255, 255);
        assert_eq!(c.to_terminal(ColorMode::Mono), None);
        assert_eq!(c.to_terminal(ColorMode::Color16), Some(Color::White));
        assert_eq!(c.to_terminal(ColorMode::Color256), Some(Color::AnsiValue(231)));
        assert_eq!(
            c.to_terminal(ColorMode::TrueColor),
            Some(Color::Rgb {
                r: 255,
                g: 255,
                b: 255
            })
        );
    }

    #[test]
    fn neutral_gray_lands_on_grayscale_ramp() {
        let idx = rgb_to_ansi256(0xaa, 0xaa, 0xaa);
        assert!((232..=255).contains(&idx) || idx == 145);
    }

    #[test]
    fn color_mode_detection() {
        assert_eq!(color_mode_from_env("truecolor", "xterm"), ColorMode::TrueColor);
        assert_eq!(color_mode_from_env("", "dumb"), ColorMode::Mono);
        assert_eq!(color_mode_from_env("", "xterm-256color"), ColorMode::Color256);
        assert_eq!(color_mode_from_env("", "linux"), ColorMode::Color16);
    }
}
