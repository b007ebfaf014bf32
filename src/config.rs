// this_file: src/config.rs

//! Rendering configuration and canvas sizing.
//!
//! Configuration can be built in code or loaded from JSON. Every field has a
//! default, so `{}` is a valid configuration.

use crate::color::Color;
use crate::encode::OutputFormat;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of font slots a context holds by default.
pub const SN_FONTS: usize = 5;

/// Default line height in pixels.
pub const DEFAULT_LINE_HEIGHT: u32 = 32;

/// Largest canvas edge accepted, in pixels.
pub const MAX_CANVAS_EDGE: u32 = 16_384;

/// Rendering parameters shared by a [`Context`](crate::Context).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Height of one text line in pixels; also the outline pixel size
    pub line_height: u32,
    /// Maximum number of registered fonts
    pub max_fonts: usize,
    /// Initial foreground color
    pub pencil: Color,
    /// Initial background color
    pub fill: Color,
    /// Apply pair kerning between consecutive glyphs
    pub kerning: bool,
    /// Serialized image format
    pub format: OutputFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_height: DEFAULT_LINE_HEIGHT,
            max_fonts: SN_FONTS,
            pencil: Color::new(0, 255, 255),
            fill: Color::new(25, 23, 36),
            kerning: false,
            format: OutputFormat::Png,
        }
    }
}

impl RenderConfig {
    /// Parse a JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Check invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        if self.line_height == 0 {
            return Err(Error::Config("line_height must be positive".into()));
        }
        if self.line_height > MAX_CANVAS_EDGE {
            return Err(Error::Config(format!(
                "line_height {} exceeds {}",
                self.line_height, MAX_CANVAS_EDGE
            )));
        }
        if self.max_fonts == 0 {
            return Err(Error::Config("max_fonts must be positive".into()));
        }
        Ok(())
    }

    /// Width of one grid cell: half the line height, at least one pixel.
    pub fn cell_width(&self) -> u32 {
        (self.line_height / 2).max(1)
    }
}

/// Requested canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasSize {
    /// Explicit pixel dimensions
    Pixels {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Terminal-like grid of `cell_width x line_height` cells
    Grid {
        /// Number of text rows
        rows: u32,
        /// Number of text columns
        cols: u32,
    },
}

impl CanvasSize {
    /// Resolve to `(width, height)` in pixels.
    pub fn resolve(&self, config: &RenderConfig) -> Result<(u32, u32)> {
        let (width, height) = match *self {
            Self::Pixels { width, height } => (width, height),
            Self::Grid { rows, cols } => {
                let width = cols.checked_mul(config.cell_width());
                let height = rows.checked_mul(config.line_height);
                match width.zip(height) {
                    Some(dims) => dims,
                    None => {
                        return Err(Error::InvalidParameter(format!(
                            "Grid {}x{} overflows pixel dimensions",
                            rows, cols
                        )))
                    }
                }
            }
        };

        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter(format!(
                "Canvas must be non-empty, got {}x{}",
                width, height
            )));
        }
        if width > MAX_CANVAS_EDGE || height > MAX_CANVAS_EDGE {
            return Err(Error::InvalidParameter(format!(
                "Canvas {}x{} exceeds maximum edge {}",
                width, height, MAX_CANVAS_EDGE
            )));
        }
        Ok((width, height))
    }
}
