// this_file: src/synthetic.rs

//! In-memory font engine with hand-built glyphs.
//!
//! Used by tests and benchmarks to drive the compositor with exact masks and
//! metrics, without real font files. Faces are looked up by
//! [`FontSource::name`].

use crate::engine::{FontEngine, FontFace, FontSource, GlyphIndex, GlyphRaster, PixelFormat};
use crate::error::{Error, LoadFailure, Result};
use crate::units::F26Dot6;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A hand-built glyph. Metrics are whole pixels.
#[derive(Debug, Clone)]
pub struct SyntheticGlyph {
    /// Raster width
    pub width: u32,
    /// Raster height
    pub height: u32,
    /// Pixel data in `format` layout
    pub data: Vec<u8>,
    /// Pixel layout
    pub format: PixelFormat,
    /// Left bearing in pixels
    pub bearing_x: i32,
    /// Top bearing (above baseline) in pixels
    pub bearing_y: i32,
    /// Advance in pixels
    pub advance: i32,
}

impl SyntheticGlyph {
    /// Solid `width x height` block of `coverage`, sitting on the baseline.
    pub fn solid(width: u32, height: u32, coverage: u8) -> Self {
        Self::from_mask(width, height, vec![coverage; (width * height) as usize])
    }

    /// Gray glyph with an explicit row-major mask.
    pub fn from_mask(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
            format: PixelFormat::Gray,
            bearing_x: 0,
            bearing_y: height as i32,
            advance: width as i32,
        }
    }

    /// Opaque BGRA glyph, as a color strike would produce.
    pub fn color(width: u32, height: u32) -> Self {
        Self {
            data: vec![255; (width * height) as usize * PixelFormat::Bgra.bytes_per_pixel()],
            format: PixelFormat::Bgra,
            ..Self::solid(width, height, 0)
        }
    }

    /// Override bearings.
    pub fn with_bearing(mut self, x: i32, y: i32) -> Self {
        self.bearing_x = x;
        self.bearing_y = y;
        self
    }

    /// Override the advance.
    pub fn with_advance(mut self, advance: i32) -> Self {
        self.advance = advance;
        self
    }

    fn raster(&self) -> GlyphRaster {
        GlyphRaster {
            width: self.width,
            height: self.height,
            format: self.format,
            bearing_x: F26Dot6::from_pixels(self.bearing_x),
            bearing_y: F26Dot6::from_pixels(self.bearing_y),
            advance_x: F26Dot6::from_pixels(self.advance),
            data: self.data.clone(),
        }
    }
}

/// Description of a synthetic face.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFont {
    glyphs: HashMap<char, SyntheticGlyph>,
    color: bool,
    strikes: Vec<u32>,
    native_size: Option<u32>,
    kerning: HashMap<(char, char), i32>,
    reject_sizing: bool,
}

impl SyntheticFont {
    /// Empty outline face.
    pub fn new() -> Self {
        Self::default()
    }

    /// Face carrying a color table with the given strike sizes.
    pub fn color(strikes: &[u32]) -> Self {
        Self {
            color: true,
            strikes: strikes.to_vec(),
            ..Self::default()
        }
    }

    /// Add a glyph for `ch`.
    pub fn glyph(mut self, ch: char, glyph: SyntheticGlyph) -> Self {
        self.glyphs.insert(ch, glyph);
        self
    }

    /// Produce glyphs at a fixed native size regardless of the requested one.
    pub fn native_size(mut self, pixels: u32) -> Self {
        self.native_size = Some(pixels);
        self
    }

    /// Add a kerning pair in pixels.
    pub fn kern(mut self, left: char, right: char, pixels: i32) -> Self {
        self.kerning.insert((left, right), pixels);
        self
    }

    /// Make `set_pixel_size` fail.
    pub fn reject_sizing(mut self) -> Self {
        self.reject_sizing = true;
        self
    }
}

/// Engine serving [`SyntheticFont`]s by name.
#[derive(Debug, Clone, Default)]
pub struct SyntheticEngine {
    fonts: HashMap<String, SyntheticFont>,
    live: Arc<AtomicUsize>,
}

impl SyntheticEngine {
    /// Engine with no fonts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font under `name`.
    pub fn with_font(mut self, name: impl Into<String>, font: SyntheticFont) -> Self {
        self.fonts.insert(name.into(), font);
        self
    }

    /// Number of faces loaded and not yet dropped.
    pub fn live_faces(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl FontEngine for SyntheticEngine {
    type Face = SyntheticFace;

    fn load_face(&self, source: &FontSource) -> Result<SyntheticFace> {
        let name = source.name();
        let font = self
            .fonts
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::load(&name, LoadFailure::NotFound))?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(SyntheticFace {
            font,
            pixel_size: 0,
            strike: None,
            live: Arc::clone(&self.live),
        })
    }
}

/// Face handle produced by [`SyntheticEngine`].
#[derive(Debug)]
pub struct SyntheticFace {
    font: SyntheticFont,
    pixel_size: u32,
    strike: Option<usize>,
    live: Arc<AtomicUsize>,
}

impl SyntheticFace {
    fn index_of(&self, ch: char) -> GlyphIndex {
        if self.font.glyphs.contains_key(&ch) {
            GlyphIndex(ch as u32)
        } else {
            GlyphIndex::MISSING
        }
    }
}

impl FontFace for SyntheticFace {
    fn has_color_table(&self) -> bool {
        self.font.color
    }

    fn strike_count(&self) -> usize {
        self.font.strikes.len()
    }

    fn select_fixed_strike(&mut self, index: usize) -> Result<()> {
        if index >= self.font.strikes.len() {
            return Err(Error::load("synthetic", LoadFailure::NoColorStrike));
        }
        self.strike = Some(index);
        Ok(())
    }

    fn set_pixel_size(&mut self, pixels: u32) -> Result<()> {
        if self.font.reject_sizing {
            return Err(Error::load(
                "synthetic",
                LoadFailure::Sizing(format!("{}px rejected", pixels)),
            ));
        }
        self.pixel_size = pixels;
        Ok(())
    }

    fn native_line_height(&self) -> u32 {
        match self.strike {
            Some(i) => self.font.strikes[i],
            None => self.font.native_size.unwrap_or(self.pixel_size),
        }
    }

    fn glyph_index(&self, codepoint: char) -> GlyphIndex {
        self.index_of(codepoint)
    }

    fn render_glyph(&mut self, glyph: GlyphIndex) -> Result<GlyphRaster> {
        char::from_u32(glyph.0)
            .and_then(|ch| self.font.glyphs.get(&ch))
            .map(SyntheticGlyph::raster)
            .ok_or_else(|| Error::UnsupportedOperation(format!("no synthetic glyph {}", glyph.0)))
    }

    fn kerning(&self, left: GlyphIndex, right: GlyphIndex) -> F26Dot6 {
        let pair = char::from_u32(left.0).zip(char::from_u32(right.0));
        pair.and_then(|p| self.font.kerning.get(&p))
            .map_or(F26Dot6::ZERO, |px| F26Dot6::from_pixels(*px))
    }
}

impl Drop for SyntheticFace {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_font_is_not_found() {
        let engine = SyntheticEngine::new();
        let err = engine.load_face(&FontSource::path("nope")).unwrap_err();
        assert!(matches!(
            err,
            Error::ResourceLoad {
                kind: LoadFailure::NotFound,
                ..
            }
        ));
        assert_eq!(engine.live_faces(), 0);
    }

    #[test]
    fn faces_are_counted_until_dropped() {
        let engine = SyntheticEngine::new().with_font("a", SyntheticFont::new());
        let face = engine.load_face(&FontSource::path("a")).unwrap();
        assert_eq!(engine.live_faces(), 1);
        drop(face);
        assert_eq!(engine.live_faces(), 0);
    }

    #[test]
    fn glyph_metrics_are_fixed_point() {
        let engine = SyntheticEngine::new().with_font(
            "a",
            SyntheticFont::new().glyph('x', SyntheticGlyph::solid(3, 4, 9).with_advance(5)),
        );
        let mut face = engine.load_face(&FontSource::path("a")).unwrap();
        let idx = face.glyph_index('x');
        assert!(!idx.is_missing());
        assert!(face.glyph_index('y').is_missing());
        let raster = face.render_glyph(idx).unwrap();
        assert_eq!(raster.advance_x, F26Dot6(5 * 64));
        assert_eq!(raster.bearing_y, F26Dot6(4 * 64));
        assert_eq!(raster.data.len(), 12);
    }
}
