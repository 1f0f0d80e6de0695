// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid color: {0} (expected #rgb, #rrggbb or a color name)")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
