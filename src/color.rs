// this_file: src/color.rs
//! RGB color value type.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An opaque 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in buffer order.
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build a color from the first three bytes of a pixel.
    pub fn from_pixel(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2])
    }

    /// Blend `self` over `bg` with 8-bit coverage.
    ///
    /// `coverage == 0` returns `bg` unchanged, `coverage == 255` returns `self`.
    #[inline]
    pub fn blend_over(self, bg: Self, coverage: u8) -> Self {
        Self::new(
            blend_channel(bg.r, self.r, coverage),
            blend_channel(bg.g, self.g, coverage),
            blend_channel(bg.b, self.b, coverage),
        )
    }
}

/// `(bg * (255 - h) + fg * h) / 255` in integer arithmetic.
#[inline]
pub fn blend_channel(bg: u8, fg: u8, h: u8) -> u8 {
    let h = u32::from(h);
    let mixed = (u32::from(bg) * (255 - h) + u32::from(fg) * h) / 255;
    // mixed never exceeds 255: it is a convex combination of two u8 values
    mixed as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(Error::InvalidParameter(format!(
                "Color must be #rrggbb, got '{}'",
                s
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| {
                Error::InvalidParameter(format!("Invalid color '{}': {}", s, e))
            })
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
