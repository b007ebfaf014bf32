// this_file: src/rasterize.rs
//! CPU outline rasterization using skrifa and zeno

use crate::error::{Error, Result};
use log::trace;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};
use zeno::{Command, Mask, Transform};

/// Coverage mask for one outline glyph, positioned relative to the pen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineMask {
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Pixels from the pen position to the left edge
    pub left: i32,
    /// Pixels from the baseline up to the top edge
    pub top: i32,
    /// Alpha mask data (8-bit coverage, row-major)
    pub data: Vec<u8>,
}

impl OutlineMask {
    fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            left: 0,
            top: 0,
            data: Vec::new(),
        }
    }
}

/// Rasterize the outline of `glyph_id` at `ppem` pixels per em.
///
/// Glyphs without an outline (space, or bitmap-only fonts) produce an
/// empty mask.
pub fn rasterize_outline(font: &FontRef<'_>, glyph_id: GlyphId, ppem: f32) -> Result<OutlineMask> {
    let Some(glyph) = font.outline_glyphs().get(glyph_id) else {
        trace!("Glyph {} has no outline", glyph_id);
        return Ok(OutlineMask::empty());
    };

    let mut pen = ZenoPen::new();
    let settings = DrawSettings::unhinted(Size::new(ppem), LocationRef::default());
    glyph
        .draw(settings, &mut pen)
        .map_err(|e| Error::Render {
            glyph: glyph_id.to_u32(),
            reason: format!("failed to draw outline: {}", e),
        })?;

    let Some(bounds) = pen.bounds else {
        return Ok(OutlineMask::empty());
    };

    // Pen coordinates are y-down with the baseline at y = 0.
    let left = bounds.x_min.floor();
    let top_row = bounds.y_min.floor();
    let width = (bounds.x_max.ceil() - left).max(0.0) as u32;
    let height = (bounds.y_max.ceil() - top_row).max(0.0) as u32;
    if width == 0 || height == 0 {
        return Ok(OutlineMask::empty());
    }

    let (data, _placement) = Mask::new(&pen.commands)
        .size(width, height)
        .transform(Some(Transform::translation(-left, -top_row)))
        .render();

    trace!(
        "Rasterized glyph {} at {}ppem: {}x{} at ({}, {})",
        glyph_id,
        ppem,
        width,
        height,
        left,
        -top_row
    );

    Ok(OutlineMask {
        width,
        height,
        left: left as i32,
        top: -top_row as i32,
        data,
    })
}

/// Axis-aligned bounds of every point the pen visited
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingBox {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

/// Adapter implementing skrifa's OutlinePen to build zeno paths.
///
/// Flips Y into raster orientation and tracks control-point bounds.
struct ZenoPen {
    commands: Vec<Command>,
    bounds: Option<BoundingBox>,
}

impl ZenoPen {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
            bounds: None,
        }
    }

    fn point(&mut self, x: f32, y: f32) -> [f32; 2] {
        let y = -y;
        let b = self.bounds.get_or_insert(BoundingBox {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        });
        b.x_min = b.x_min.min(x);
        b.y_min = b.y_min.min(y);
        b.x_max = b.x_max.max(x);
        b.y_max = b.y_max.max(y);
        [x, y]
    }
}

impl OutlinePen for ZenoPen {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.commands.push(Command::MoveTo(p.into()));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.commands.push(Command::LineTo(p.into()));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let c = self.point(cx0, cy0);
        let p = self.point(x, y);
        self.commands.push(Command::QuadTo(c.into(), p.into()));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let c0 = self.point(cx0, cy0);
        let c1 = self.point(cx1, cy1);
        let p = self.point(x, y);
        self.commands
            .push(Command::CurveTo(c0.into(), c1.into(), p.into()));
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pen_flips_y_and_tracks_bounds() {
        let mut pen = ZenoPen::new();
        pen.move_to(1.0, 0.0);
        pen.line_to(4.0, 10.0);
        pen.quad_to(6.0, 12.0, 5.0, -2.0);
        pen.close();

        let b = pen.bounds.unwrap();
        assert_eq!(b.x_min, 1.0);
        assert_eq!(b.x_max, 6.0);
        assert_eq!(b.y_min, -12.0);
        assert_eq!(b.y_max, 2.0);
        assert_eq!(pen.commands.len(), 4);
    }

    #[test]
    fn empty_pen_has_no_bounds() {
        let pen = ZenoPen::new();
        assert!(pen.bounds.is_none());
        assert!(OutlineMask::empty().data.is_empty());
    }

    #[test]
    fn square_path_fills_mask() {
        // 4x4 square sitting on the baseline
        let mut pen = ZenoPen::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(4.0, 0.0);
        pen.line_to(4.0, 4.0);
        pen.line_to(0.0, 4.0);
        pen.close();

        let b = pen.bounds.unwrap();
        let (data, _) = Mask::new(&pen.commands)
            .size(4, 4)
            .transform(Some(Transform::translation(-b.x_min, -b.y_min)))
            .render();
        assert_eq!(data.len(), 16);
        assert!(data.iter().all(|&a| a >= 250), "mask: {:?}", data);
    }
}
