// this_file: src/compositor.rs

//! Glyph compositing.
//!
//! Turns one codepoint into blended pixels: resolve the glyph in the active
//! face, rasterize it, anchor it to the line baseline and blend its coverage
//! into the bitmap with the pencil color. Pixels outside the bitmap are
//! dropped.
//!
//! The baseline sits `line_height` pixels below the top of the cell, so a
//! glyph's top row lands at `origin_y + line_height - bearing_y`.

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::engine::{FontFace, GlyphIndex, GlyphRaster, PixelFormat};
use crate::error::{Error, Result};
use crate::registry::FontSlot;

/// Draws glyphs from one face into one bitmap.
#[derive(Debug)]
pub struct Compositor<'a, F> {
    bitmap: &'a mut Bitmap,
    slot: &'a mut FontSlot<F>,
    pencil: Color,
    line_height: u32,
}

impl<'a, F: FontFace> Compositor<'a, F> {
    /// Bind a bitmap, a font slot and drawing state.
    pub fn new(bitmap: &'a mut Bitmap, slot: &'a mut FontSlot<F>, pencil: Color, line_height: u32) -> Self {
        Self {
            bitmap,
            slot,
            pencil,
            line_height,
        }
    }

    /// Resolve `codepoint` in the active face.
    pub fn glyph_index(&self, codepoint: char) -> Result<GlyphIndex> {
        let index = self.slot.face().glyph_index(codepoint);
        if index.is_missing() {
            log::warn!(
                "No glyph for {:?} (U+{:04X}) in {} font {}",
                codepoint,
                u32::from(codepoint),
                self.slot.role(),
                self.slot.origin()
            );
            return Err(Error::GlyphNotFound {
                codepoint,
                role: self.slot.role(),
            });
        }
        Ok(index)
    }

    /// Composite `codepoint` with its cell origin at `(origin_x, origin_y)`.
    ///
    /// Returns the horizontal advance in pixels.
    pub fn composite(&mut self, origin_x: i32, origin_y: i32, codepoint: char) -> Result<i32> {
        let index = self.glyph_index(codepoint)?;
        let raster = self.slot.face_mut().render_glyph(index)?;

        if raster.format == PixelFormat::Bgra {
            log::warn!(
                "Refusing to composite color glyph {:?} from {} font",
                codepoint,
                self.slot.role()
            );
            return Err(Error::UnsupportedOperation(format!(
                "compositing color glyph U+{:04X} from {} font",
                u32::from(codepoint),
                self.slot.role()
            )));
        }

        let scale = self.slot.scale(self.line_height);
        let bearing_x = scale.apply(raster.bearing_x);
        let bearing_y = scale.apply(raster.bearing_y);
        let line_height = i32::try_from(self.line_height).unwrap_or(i32::MAX);

        let draw_x = origin_x.saturating_add(bearing_x);
        let draw_y = origin_y.saturating_add(line_height).saturating_sub(bearing_y);
        blend_mask(self.bitmap, &raster, draw_x, draw_y, self.pencil);

        let advance = scale.apply(raster.advance_x);
        log::trace!(
            "Glyph {:?} {}x{} at ({}, {}), advance {}",
            codepoint,
            raster.width,
            raster.height,
            draw_x,
            draw_y,
            advance
        );
        Ok(advance)
    }

    /// Scaled pair kerning between two codepoints, zero if either is missing.
    pub fn kerning(&self, left: char, right: char) -> i32 {
        let face = self.slot.face();
        let (l, r) = (face.glyph_index(left), face.glyph_index(right));
        if l.is_missing() || r.is_missing() {
            return 0;
        }
        self.slot.scale(self.line_height).apply(face.kerning(l, r))
    }
}

/// Blend a gray coverage raster into `bitmap` with its top-left at `(x, y)`.
///
/// Only the overlap between the raster and the bitmap is touched.
pub fn blend_mask(bitmap: &mut Bitmap, raster: &GlyphRaster, x: i32, y: i32, fg: Color) {
    let (x, y) = (i64::from(x), i64::from(y));
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(raster.width)).min(i64::from(bitmap.width()));
    let y1 = (y + i64::from(raster.height)).min(i64::from(bitmap.height()));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    // All bounds are now within [0, bitmap edge], which fits in u32.
    for py in y0..y1 {
        let gy = (py - y) as u32;
        for px in x0..x1 {
            let gx = (px - x) as u32;
            let coverage = raster.coverage(gx, gy);
            if coverage != 0 {
                bitmap.blend_pixel(px as u32, py as u32, fg, coverage);
            }
        }
    }
}
