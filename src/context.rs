// this_file: src/context.rs

//! Top-level rendering context.
//!
//! A [`Context`] owns one bitmap, the font registry and the current pencil
//! and fill colors. Dropping it releases every registered face together with
//! the pixel buffer.

use crate::bitmap::Bitmap;
use crate::color::Color;
use crate::compositor::Compositor;
use crate::config::{CanvasSize, RenderConfig};
use crate::encode::{self, OutputFormat};
use crate::engine::{FontEngine, FontSource};
use crate::error::Result;
use crate::layout::Grid;
use crate::logging::Timer;
use crate::registry::{FontRegistry, FontRole};
use crate::sink::OutputSink;

/// Bitmap-backed drawing surface with its fonts.
pub struct Context<E: FontEngine> {
    engine: E,
    config: RenderConfig,
    bitmap: Bitmap,
    fonts: FontRegistry<E::Face>,
    pencil: Color,
    fill: Color,
}

impl<E: FontEngine> Context<E> {
    /// Create a context with a canvas of `size`, cleared to the configured
    /// fill color and holding no fonts.
    pub fn new(engine: E, config: RenderConfig, size: CanvasSize) -> Result<Self> {
        config.validate()?;
        let (width, height) = size.resolve(&config)?;
        let mut bitmap = Bitmap::allocate(width, height)?;
        bitmap.fill(config.fill);
        log::debug!(
            "Created {}x{} context, line height {}px",
            width,
            height,
            config.line_height
        );

        Ok(Self {
            engine,
            fonts: FontRegistry::new(config.max_fonts),
            pencil: config.pencil,
            fill: config.fill,
            bitmap,
            config,
        })
    }

    /// Register a font for `role`. The first font added becomes active.
    pub fn add_font(&mut self, source: &FontSource, role: FontRole) -> Result<()> {
        self.fonts
            .add(&self.engine, source, role, self.config.line_height)
    }

    /// Select the font used by subsequent draws.
    pub fn set_active(&mut self, role: FontRole) -> Result<()> {
        self.fonts.set_active(role)
    }

    /// Foreground color for subsequent glyphs.
    pub fn set_pencil(&mut self, color: Color) {
        self.pencil = color;
    }

    /// Current foreground color.
    pub fn pencil(&self) -> Color {
        self.pencil
    }

    /// Remember `color` for [`Context::clear`] without painting.
    pub fn set_fill(&mut self, color: Color) {
        self.fill = color;
    }

    /// Current background color.
    pub fn fill_color(&self) -> Color {
        self.fill
    }

    /// Paint the whole canvas with `color` and remember it as the fill.
    pub fn fill(&mut self, color: Color) {
        self.fill = color;
        self.bitmap.fill(color);
    }

    /// Paint the whole canvas with the remembered fill color.
    pub fn clear(&mut self) {
        self.bitmap.fill(self.fill);
    }

    /// Replace the canvas with one of `size`, cleared to the fill color.
    ///
    /// Prior drawing is lost. On failure the old canvas is kept.
    pub fn resize(&mut self, size: CanvasSize) -> Result<()> {
        let (width, height) = size.resolve(&self.config)?;
        self.bitmap.resize(width, height)?;
        self.bitmap.fill(self.fill);
        log::debug!("Resized context to {}x{}", width, height);
        Ok(())
    }

    /// Composite one glyph with its cell origin at pixel `(x, y)`.
    ///
    /// Returns the glyph advance in pixels.
    pub fn draw_glyph(&mut self, x: i32, y: i32, codepoint: char) -> Result<i32> {
        let slot = self.fonts.active_mut()?;
        Compositor::new(&mut self.bitmap, slot, self.pencil, self.config.line_height)
            .composite(x, y, codepoint)
    }

    /// Draw UTF-8 `text` starting at grid cell `(row, col)`.
    ///
    /// Returns the pen x position after the last glyph. The first error
    /// aborts the run; glyphs already drawn stay in the bitmap.
    pub fn draw_text(&mut self, row: u32, col: u32, text: impl AsRef<[u8]>) -> Result<i32> {
        let text = text.as_ref();
        let _timer = Timer::new(format!("draw_text({}, {}, {} bytes)", row, col, text.len()));
        let grid = Grid::from_config(&self.config);
        let slot = self.fonts.active_mut()?;
        let mut compositor =
            Compositor::new(&mut self.bitmap, slot, self.pencil, self.config.line_height);
        grid.draw_text(&mut compositor, row, col, text)
    }

    /// Serialize the canvas in the configured format.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.encode_as(self.config.format)
    }

    /// Serialize the canvas as `format`.
    pub fn encode_as(&self, format: OutputFormat) -> Result<Vec<u8>> {
        self.encode_into(format, OutputSink::new())
    }

    /// Serialize the canvas as `format` through `sink`.
    pub fn encode_into(&self, format: OutputFormat, sink: OutputSink) -> Result<Vec<u8>> {
        let _timer = Timer::new(format!("encode {}", format));
        encode::encode_into(&self.bitmap, format, sink)
    }

    /// Read access to the canvas.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Configuration the context was built with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Registered fonts.
    pub fn fonts(&self) -> &FontRegistry<E::Face> {
        &self.fonts
    }

    /// Font engine used to load faces.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: FontEngine> std::fmt::Debug for Context<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("bitmap", &self.bitmap)
            .field("fonts", &self.fonts.roles().collect::<Vec<_>>())
            .field("active", &self.fonts.active_role())
            .field("pencil", &self.pencil)
            .field("fill", &self.fill)
            .finish()
    }
}
