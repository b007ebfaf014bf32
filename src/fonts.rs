// this_file: src/fonts.rs

//! Production font engine built on skrifa.
//!
//! [`SkrifaEngine`] opens faces from disk (through [`FontLoader`]) or from
//! memory. [`SkrifaFace`] rasterizes outline glyphs with zeno and reads color
//! glyphs from `CBDT`/`sbix` strikes. Font collections always use face 0.

use crate::engine::{FontEngine, FontFace, FontSource, GlyphIndex, GlyphRaster, PixelFormat};
use crate::error::{Error, LoadFailure, Result};
use crate::font_loader::{validate_font_data, FontLoader};
use crate::rasterize::rasterize_outline;
use crate::units::F26Dot6;
use skrifa::bitmap::BitmapData;
use skrifa::instance::{LocationRef, Size};
use skrifa::raw::tables::kern::{Kern, SubtableKind};
use skrifa::raw::types::Tag;
use skrifa::raw::TableProvider;
use skrifa::{FontRef, GlyphId, MetadataProvider};
use std::cell::RefCell;
use std::sync::Arc;

/// Tables that mark a face as carrying color bitmap glyphs.
const COLOR_BITMAP_TABLES: [&[u8; 4]; 2] = [b"CBDT", b"sbix"];

/// Opens skrifa-backed faces.
#[derive(Debug, Default)]
pub struct SkrifaEngine {
    loader: RefCell<FontLoader>,
}

impl SkrifaEngine {
    /// Create an engine with an empty file cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FontEngine for SkrifaEngine {
    type Face = SkrifaFace;

    fn load_face(&self, source: &FontSource) -> Result<SkrifaFace> {
        let (origin, data) = match source {
            FontSource::Path(path) => {
                let data = self.loader.borrow_mut().load_font_data(path)?;
                (path.to_string(), data)
            }
            FontSource::Bytes { name, data } => {
                validate_font_data(name, data)?;
                (name.clone(), Arc::clone(data))
            }
        };
        SkrifaFace::new(origin, data)
    }
}

/// How glyphs are currently produced.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SizeMode {
    Unsized,
    Outline { ppem: u32 },
    Strike { ppem: f32 },
}

/// An opened face. Owns a shared reference to the font bytes.
#[derive(Debug)]
pub struct SkrifaFace {
    origin: String,
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    mode: SizeMode,
}

impl SkrifaFace {
    fn new(origin: String, data: Arc<Vec<u8>>) -> Result<Self> {
        let font = FontRef::from_index(&data, 0).map_err(|e| {
            Error::load(&origin, LoadFailure::UnsupportedFormat(e.to_string()))
        })?;
        let units_per_em = font.head().map(|h| h.units_per_em()).map_err(|e| {
            Error::load(
                &origin,
                LoadFailure::UnsupportedFormat(format!("missing head table: {}", e)),
            )
        })?;
        log::debug!(
            "Opened face {} ({} upem, kern table: {})",
            origin,
            units_per_em,
            font.kern().is_ok()
        );
        Ok(Self {
            origin,
            data,
            units_per_em,
            mode: SizeMode::Unsized,
        })
    }

    fn font(&self) -> Result<FontRef<'_>> {
        FontRef::from_index(&self.data, 0).map_err(|e| {
            Error::load(&self.origin, LoadFailure::UnsupportedFormat(e.to_string()))
        })
    }

    fn current_ppem(&self) -> f32 {
        match self.mode {
            SizeMode::Unsized => 0.0,
            SizeMode::Outline { ppem } => ppem as f32,
            SizeMode::Strike { ppem } => ppem,
        }
    }

    fn advance(&self, font: &FontRef<'_>, gid: GlyphId) -> F26Dot6 {
        let size = Size::new(self.current_ppem());
        font.glyph_metrics(size, LocationRef::default())
            .advance_width(gid)
            .map_or(F26Dot6::ZERO, F26Dot6::from_f32)
    }

    fn render_outline(&self, font: &FontRef<'_>, gid: GlyphId, ppem: u32) -> Result<GlyphRaster> {
        let mask = rasterize_outline(font, gid, ppem as f32)?;
        if mask.data.is_empty() {
            return Ok(GlyphRaster::empty(self.advance(font, gid)));
        }
        Ok(GlyphRaster {
            width: mask.width,
            height: mask.height,
            format: PixelFormat::Gray,
            bearing_x: F26Dot6::from_pixels(mask.left),
            bearing_y: F26Dot6::from_pixels(mask.top),
            advance_x: self.advance(font, gid),
            data: mask.data,
        })
    }

    fn render_strike(&self, font: &FontRef<'_>, gid: GlyphId, ppem: f32) -> Result<GlyphRaster> {
        let strikes = font.bitmap_strikes();
        let bitmap = strikes
            .glyph_for_size(Size::new(ppem), gid)
            .ok_or_else(|| Error::Render {
                glyph: gid.to_u32(),
                reason: format!("glyph missing from {}ppem strike", ppem),
            })?;

        let (width, height, data) = match bitmap.data {
            BitmapData::Bgra(bytes) => (bitmap.width, bitmap.height, bytes.to_vec()),
            BitmapData::Png(bytes) => decode_png_bgra(gid, bytes)?,
            _ => {
                return Err(Error::Render {
                    glyph: gid.to_u32(),
                    reason: "monochrome strike data is not supported".into(),
                })
            }
        };
        let expected = width as usize * height as usize * PixelFormat::Bgra.bytes_per_pixel();
        if data.len() != expected {
            return Err(Error::Render {
                glyph: gid.to_u32(),
                reason: format!(
                    "strike bitmap is {} bytes, expected {} for {}x{}",
                    data.len(),
                    expected,
                    width,
                    height
                ),
            });
        }

        Ok(GlyphRaster {
            width,
            height,
            format: PixelFormat::Bgra,
            bearing_x: F26Dot6::from_f32(bitmap.inner_bearing_x),
            bearing_y: F26Dot6::from_f32(bitmap.inner_bearing_y),
            advance_x: self.advance(font, gid),
            data,
        })
    }
}

impl FontFace for SkrifaFace {
    fn has_color_table(&self) -> bool {
        self.font().is_ok_and(|font| {
            COLOR_BITMAP_TABLES
                .iter()
                .any(|tag| font.table_data(Tag::new(tag)).is_some())
        })
    }

    fn strike_count(&self) -> usize {
        self.font()
            .map(|font| font.bitmap_strikes().iter().count())
            .unwrap_or(0)
    }

    fn select_fixed_strike(&mut self, index: usize) -> Result<()> {
        let ppem = {
            let font = self.font()?;
            let strike = font.bitmap_strikes().iter().nth(index);
            strike
                .map(|s| s.ppem())
                .ok_or_else(|| Error::load(&self.origin, LoadFailure::NoColorStrike))?
        };
        log::debug!("Face {} using strike {} ({}ppem)", self.origin, index, ppem);
        self.mode = SizeMode::Strike { ppem };
        Ok(())
    }

    fn set_pixel_size(&mut self, pixels: u32) -> Result<()> {
        if pixels == 0 {
            return Err(Error::load(
                &self.origin,
                LoadFailure::Sizing("pixel size must be positive".into()),
            ));
        }
        if self.font()?.outline_glyphs().format().is_none() {
            return Err(Error::load(
                &self.origin,
                LoadFailure::Sizing("face has no scalable outlines".into()),
            ));
        }
        self.mode = SizeMode::Outline { ppem: pixels };
        Ok(())
    }

    fn native_line_height(&self) -> u32 {
        self.current_ppem().round() as u32
    }

    fn glyph_index(&self, codepoint: char) -> GlyphIndex {
        self.font()
            .ok()
            .and_then(|font| font.charmap().map(codepoint))
            .map_or(GlyphIndex::MISSING, |gid| GlyphIndex(gid.to_u32()))
    }

    fn render_glyph(&mut self, glyph: GlyphIndex) -> Result<GlyphRaster> {
        let font = self.font()?;
        let gid = GlyphId::new(glyph.0);
        match self.mode {
            SizeMode::Unsized => Err(Error::load(
                &self.origin,
                LoadFailure::Sizing("no size selected".into()),
            )),
            SizeMode::Outline { ppem } => self.render_outline(&font, gid, ppem),
            SizeMode::Strike { ppem } => self.render_strike(&font, gid, ppem),
        }
    }

    fn kerning(&self, left: GlyphIndex, right: GlyphIndex) -> F26Dot6 {
        let Ok(font) = self.font() else {
            return F26Dot6::ZERO;
        };
        let Ok(kern) = font.kern() else {
            return F26Dot6::ZERO;
        };
        let units = kern_adjustment(&kern, GlyphId::new(left.0), GlyphId::new(right.0));
        units_to_pixels(units, self.current_ppem(), self.units_per_em)
    }
}

/// Decode an embedded PNG strike glyph into BGRA.
fn decode_png_bgra(gid: GlyphId, bytes: &[u8]) -> Result<(u32, u32, Vec<u8>)> {
    let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| Error::Render {
            glyph: gid.to_u32(),
            reason: format!("bad PNG strike data: {}", e),
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
    Ok((width, height, data))
}

/// Total horizontal `kern` adjustment for a glyph pair, in font units.
///
/// Covers OpenType and Apple tables. Vertical, cross-stream, variation and
/// state-machine subtables are skipped; the rest are summed.
fn kern_adjustment(kern: &Kern<'_>, left: GlyphId, right: GlyphId) -> i32 {
    kern.subtables()
        .filter_map(|subtable| subtable.ok())
        .filter(|s| s.is_horizontal() && !s.is_cross_stream() && !s.is_variable())
        .filter_map(|s| match s.kind().ok()? {
            SubtableKind::Format0(t) => t.kerning(left, right),
            SubtableKind::Format2(t) => t.kerning(left, right),
            SubtableKind::Format3(t) => t.kerning(left, right),
            SubtableKind::Format1(_) => None,
        })
        .sum()
}

/// Convert font units to 26.6 pixels at `ppem`.
fn units_to_pixels(units: i32, ppem: f32, units_per_em: u16) -> F26Dot6 {
    if units == 0 {
        return F26Dot6::ZERO;
    }
    let upem = f32::from(units_per_em.max(1));
    F26Dot6::from_f32(units as f32 * ppem / upem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CanvasSize, RenderConfig};
    use crate::context::Context;
    use crate::registry::FontRole;
    use camino::Utf8PathBuf;
    use skrifa::raw::{FontData, FontRead};

    const SYSTEM_MONO: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";
    const SYSTEM_SANS: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    fn system_font(path: &str) -> Option<Utf8PathBuf> {
        let path = Utf8PathBuf::from(path);
        if path.exists() {
            Some(path)
        } else {
            eprintln!("Skipping test: font file not found at {}", path);
            None
        }
    }

    fn pair_bytes(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
        let mut sorted = pairs.to_vec();
        sorted.sort_by_key(|&(l, r, _)| (l, r));
        let mut t = Vec::new();
        t.extend_from_slice(&(sorted.len() as u16).to_be_bytes());
        t.extend_from_slice(&[0; 6]);
        for (l, r, v) in sorted {
            t.extend_from_slice(&l.to_be_bytes());
            t.extend_from_slice(&r.to_be_bytes());
            t.extend_from_slice(&v.to_be_bytes());
        }
        t
    }

    /// OpenType version 0 table with one format 0 subtable.
    fn ot_kern(pairs: &[(u16, u16, i16)], coverage: u16) -> Vec<u8> {
        let body = pair_bytes(pairs);
        let mut t = Vec::new();
        t.extend_from_slice(&0u16.to_be_bytes());
        t.extend_from_slice(&1u16.to_be_bytes());
        t.extend_from_slice(&0u16.to_be_bytes());
        t.extend_from_slice(&((6 + body.len()) as u16).to_be_bytes());
        t.extend_from_slice(&coverage.to_be_bytes());
        t.extend_from_slice(&body);
        t
    }

    /// Apple version 1.0 table with one format 0 subtable.
    fn aat_kern(pairs: &[(u16, u16, i16)], coverage: u8) -> Vec<u8> {
        let body = pair_bytes(pairs);
        let mut t = Vec::new();
        t.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        t.extend_from_slice(&1u32.to_be_bytes());
        t.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
        t.extend_from_slice(&[coverage, 0]);
        t.extend_from_slice(&0u16.to_be_bytes());
        t.extend_from_slice(&body);
        t
    }

    fn adjustment(table: &[u8], left: u32, right: u32) -> i32 {
        let kern = Kern::read(FontData::new(table)).unwrap();
        kern_adjustment(&kern, GlyphId::new(left), GlyphId::new(right))
    }

    #[test]
    fn opentype_kern_pairs_are_read() {
        let table = ot_kern(&[(57, 36, 12), (36, 57, -80)], 0x0001);
        assert_eq!(adjustment(&table, 36, 57), -80);
        assert_eq!(adjustment(&table, 57, 36), 12);
        assert_eq!(adjustment(&table, 36, 36), 0);
    }

    #[test]
    fn apple_kern_pairs_are_read() {
        let table = aat_kern(&[(36, 57, -80)], 0x00);
        assert!(matches!(
            Kern::read(FontData::new(&table)).unwrap(),
            Kern::Aat(_)
        ));
        assert_eq!(adjustment(&table, 36, 57), -80);
    }

    #[test]
    fn cross_stream_and_vertical_subtables_are_skipped() {
        assert_eq!(adjustment(&ot_kern(&[(1, 2, 5)], 0x0005), 1, 2), 0);
        assert_eq!(adjustment(&ot_kern(&[(1, 2, 5)], 0x0000), 1, 2), 0);
        assert_eq!(adjustment(&aat_kern(&[(1, 2, 5)], 0x40), 1, 2), 0);
        assert_eq!(adjustment(&aat_kern(&[(1, 2, 5)], 0x80), 1, 2), 0);
    }

    #[test]
    fn kern_units_scale_to_pixels() {
        // -131 units at 32px on a 2048 upem face is -2.046875px
        assert_eq!(units_to_pixels(-131, 32.0, 2048), F26Dot6(-131));
        // -80 * 16 / 1000 = -1.28px -> -81.92 rounds to -82
        assert_eq!(units_to_pixels(-80, 16.0, 1000), F26Dot6(-82));
        assert_eq!(units_to_pixels(0, 16.0, 1000), F26Dot6::ZERO);
    }

    #[test]
    fn engine_rejects_garbage_bytes() {
        let engine = SkrifaEngine::new();
        let err = engine
            .load_face(&FontSource::bytes("junk", b"OTTOnot really a font".to_vec()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResourceLoad {
                kind: LoadFailure::UnsupportedFormat(_),
                ..
            }
        ));
    }

    #[test]
    fn system_mono_renders_outline_glyphs() {
        let Some(path) = system_font(SYSTEM_MONO) else {
            return;
        };

        let engine = SkrifaEngine::new();
        let mut face = engine.load_face(&FontSource::Path(path)).unwrap();
        assert!(!face.has_color_table());
        face.set_pixel_size(32).unwrap();
        assert_eq!(face.native_line_height(), 32);

        let idx = face.glyph_index('s');
        assert!(!idx.is_missing());
        let raster = face.render_glyph(idx).unwrap();
        assert_eq!(raster.format, PixelFormat::Gray);
        assert!(raster.width > 0 && raster.height > 0);
        assert_eq!(raster.data.len(), (raster.width * raster.height) as usize);
        assert!(raster.bearing_y.raw() > 0);
        assert!(raster.advance_x.raw() > 0);
        assert!(raster.data.iter().any(|&a| a > 0));
    }

    #[test]
    fn unsized_face_refuses_to_render() {
        let Some(path) = system_font(SYSTEM_MONO) else {
            return;
        };
        let engine = SkrifaEngine::new();
        let mut face = engine.load_face(&FontSource::Path(path)).unwrap();
        let idx = face.glyph_index('a');
        assert!(matches!(
            face.render_glyph(idx),
            Err(Error::ResourceLoad {
                kind: LoadFailure::Sizing(_),
                ..
            })
        ));
    }

    #[test]
    fn space_renders_as_empty_raster_with_advance() {
        let Some(path) = system_font(SYSTEM_MONO) else {
            return;
        };
        let mut face = SkrifaEngine::new()
            .load_face(&FontSource::Path(path))
            .unwrap();
        face.set_pixel_size(32).unwrap();
        let raster = face.render_glyph(face.glyph_index(' ')).unwrap();
        assert_eq!((raster.width, raster.height), (0, 0));
        assert!(raster.data.is_empty());
        assert!(raster.advance_x.raw() > 0);
    }

    #[test]
    fn face_kerning_reads_kern_table() {
        let Some(path) = system_font(SYSTEM_SANS) else {
            return;
        };
        let mut face = SkrifaEngine::new()
            .load_face(&FontSource::Path(path))
            .unwrap();
        face.set_pixel_size(32).unwrap();
        let a = face.glyph_index('A');
        let v = face.glyph_index('V');
        // A-V is -131 units on a 2048 upem face
        assert_eq!(face.kerning(a, v), F26Dot6(-131));
        assert_eq!(face.kerning(a, a), F26Dot6::ZERO);
        assert_eq!(face.kerning(a, GlyphIndex::MISSING), F26Dot6::ZERO);
    }

    #[test]
    fn grid_kerning_moves_second_glyph() {
        let Some(path) = system_font(SYSTEM_SANS) else {
            return;
        };
        let draw = |kerning: bool| {
            let config = RenderConfig {
                line_height: 32,
                kerning,
                ..RenderConfig::default()
            };
            let mut ctx = Context::new(
                SkrifaEngine::new(),
                config,
                CanvasSize::Grid { rows: 1, cols: 4 },
            )
            .unwrap();
            ctx.add_font(&FontSource::Path(path.clone()), FontRole::Regular)
                .unwrap();
            ctx.draw_text(0, 0, "AV").unwrap()
        };
        // -2.046875px rounds toward zero after ceiling conversion
        assert_eq!(draw(true), draw(false) - 2);
    }
}
