// this_file: src/engine.rs

//! Font-rendering collaborator interface.
//!
//! The compositor never parses fonts itself. It talks to a [`FontEngine`]
//! that opens faces and to the [`FontFace`] handles it returns, which map
//! codepoints to glyphs and rasterize them into [`GlyphRaster`]s. Releasing
//! a face is dropping its handle.

use crate::error::Result;
use crate::units::F26Dot6;
use camino::Utf8PathBuf;
use std::fmt;
use std::sync::Arc;

/// Where a face comes from.
#[derive(Clone)]
pub enum FontSource {
    /// Font file on disk
    Path(Utf8PathBuf),
    /// Font data already in memory, with a label for diagnostics
    Bytes {
        /// Label used in logs and errors
        name: String,
        /// Raw font file contents
        data: Arc<Vec<u8>>,
    },
}

impl FontSource {
    /// Source backed by a file path.
    pub fn path(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Source backed by in-memory data.
    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            name: name.into(),
            data: Arc::new(data.into()),
        }
    }

    /// Human-readable label (the path, or the given name).
    pub fn name(&self) -> String {
        match self {
            Self::Path(p) => p.to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Bytes { name, data } => f
                .debug_struct("Bytes")
                .field("name", name)
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// Glyph index within a face. Index 0 means "not present".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphIndex(pub u32);

impl GlyphIndex {
    /// The missing-glyph index.
    pub const MISSING: Self = Self(0);

    /// Return true when the codepoint had no mapping.
    pub fn is_missing(self) -> bool {
        self.0 == 0
    }
}

/// Pixel layout of a rendered glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One byte of coverage per pixel
    Gray,
    /// Four bytes of premultiplied BGRA per pixel (color bitmap glyphs)
    Bgra,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Bgra => 4,
        }
    }
}

/// One rendered glyph as produced by a face.
///
/// Bearings are measured from the pen position on the baseline:
/// `bearing_x` to the left edge of the raster and `bearing_y` up to its top
/// row. All metrics are 26.6 fixed point.
#[derive(Debug, Clone)]
pub struct GlyphRaster {
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// Layout of `data`
    pub format: PixelFormat,
    /// Horizontal offset from origin to the left edge
    pub bearing_x: F26Dot6,
    /// Vertical offset from baseline up to the top edge
    pub bearing_y: F26Dot6,
    /// Horizontal advance
    pub advance_x: F26Dot6,
    /// Row-major pixel data, `width * height * format.bytes_per_pixel()` bytes
    pub data: Vec<u8>,
}

impl GlyphRaster {
    /// Raster with no pixels, only an advance (e.g. a space).
    pub fn empty(advance_x: F26Dot6) -> Self {
        Self {
            width: 0,
            height: 0,
            format: PixelFormat::Gray,
            bearing_x: F26Dot6::ZERO,
            bearing_y: F26Dot6::ZERO,
            advance_x,
            data: Vec::new(),
        }
    }

    /// Coverage at `(x, y)` in raster coordinates, for gray rasters.
    #[inline]
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        let idx = y as usize * self.width as usize + x as usize;
        self.data.get(idx).copied().unwrap_or(0)
    }
}

/// Opens font faces.
pub trait FontEngine {
    /// Face handle type. Dropping it releases the face.
    type Face: FontFace;

    /// Open the face described by `source`.
    fn load_face(&self, source: &FontSource) -> Result<Self::Face>;
}

/// An opened face.
pub trait FontFace {
    /// Return true if the face carries a color bitmap table.
    fn has_color_table(&self) -> bool;

    /// Number of fixed-size bitmap strikes.
    fn strike_count(&self) -> usize;

    /// Render subsequent glyphs from the strike at `index`.
    fn select_fixed_strike(&mut self, index: usize) -> Result<()>;

    /// Render subsequent glyphs from outlines at `pixels` per em.
    fn set_pixel_size(&mut self, pixels: u32) -> Result<()>;

    /// Pixel size glyphs are currently produced at.
    fn native_line_height(&self) -> u32;

    /// Map a codepoint to a glyph index, [`GlyphIndex::MISSING`] if absent.
    fn glyph_index(&self, codepoint: char) -> GlyphIndex;

    /// Rasterize a glyph at the current size.
    fn render_glyph(&mut self, glyph: GlyphIndex) -> Result<GlyphRaster>;

    /// Pair kerning between two glyphs at the current size.
    fn kerning(&self, _left: GlyphIndex, _right: GlyphIndex) -> F26Dot6 {
        F26Dot6::ZERO
    }
}
