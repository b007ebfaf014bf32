// this_file: src/bitmap.rs

//! Owned RGB24 framebuffer.
//!
//! The buffer is row-major with no padding and no alpha channel. Its length
//! is always `width * height * 3`. Resizing replaces the buffer outright;
//! previous pixels are not preserved and callers must redraw.

use crate::color::Color;
use crate::error::{Error, Result};

/// Bytes per RGB24 pixel.
pub const BYTES_PER_PIXEL: usize = 3;

/// Fixed-format RGB24 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Allocate a `width x height` bitmap.
    ///
    /// Content is zeroed here, but callers should treat it as unspecified
    /// and fill before drawing.
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        let pixels = alloc_pixels(width, height)?;
        log::debug!("Allocated {}x{} bitmap ({} bytes)", width, height, pixels.len());
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Replace the buffer with a fresh `width x height` allocation.
    ///
    /// Old contents are discarded. On failure the bitmap is left untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let pixels = alloc_pixels(width, height)?;
        log::debug!(
            "Resized bitmap {}x{} -> {}x{}, contents discarded",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.pixels = pixels;
        Ok(())
    }

    /// Write `color` to every pixel.
    pub fn fill(&mut self, color: Color) {
        let rgb = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgb);
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Raw RGB24 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.stride())
    }

    /// Color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = self.index(x, y);
        Color::from_pixel(&self.pixels[idx..idx + BYTES_PER_PIXEL])
    }

    /// Overwrite the color at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the bitmap.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.pixels[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&color.to_bytes());
    }

    /// Blend `fg` over the pixel at `(x, y)` with the given coverage.
    #[inline]
    pub(crate) fn blend_pixel(&mut self, x: u32, y: u32, fg: Color, coverage: u8) {
        let idx = self.index(x, y);
        let px = &mut self.pixels[idx..idx + BYTES_PER_PIXEL];
        let out = fg.blend_over(Color::from_pixel(px), coverage);
        px.copy_from_slice(&out.to_bytes());
    }

    /// Return true when every pixel equals `color`.
    pub fn is_uniform(&self, color: Color) -> bool {
        let rgb = color.to_bytes();
        self.pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .all(|px| px == rgb)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} bitmap",
            x,
            y,
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Allocate `width * height * 3` bytes, reporting overflow and allocator
/// refusal as [`Error::OutOfMemory`].
fn alloc_pixels(width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidParameter(format!(
            "Bitmap dimensions must be non-zero, got {}x{}",
            width, height
        )));
    }
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or(Error::OutOfMemory {
            requested: usize::MAX,
        })?;

    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory { requested: len })?;
    pixels.resize(len, 0);
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sizes_buffer_exactly() {
        let bmp = Bitmap::allocate(7, 5).unwrap();
        assert_eq!(bmp.as_bytes().len(), 7 * 5 * 3);
        assert_eq!(bmp.stride(), 21);
        assert_eq!(bmp.rows().count(), 5);
    }

    #[test]
    fn allocate_rejects_zero_dimensions() {
        assert!(matches!(
            Bitmap::allocate(0, 10),
            Err(Error::InvalidParameter(_))
        ));
        assert!(Bitmap::allocate(10, 0).is_err());
    }

    #[test]
    fn allocate_reports_oom_for_absurd_sizes() {
        let result = Bitmap::allocate(u32::MAX, u32::MAX);
        assert!(matches!(result, Err(Error::OutOfMemory { .. })));
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut bmp = Bitmap::allocate(9, 4).unwrap();
        for color in [Color::BLACK, Color::WHITE, Color::new(25, 23, 36)] {
            bmp.fill(color);
            assert!(bmp.is_uniform(color));
            assert_eq!(bmp.pixel(8, 3), color);
        }
    }

    #[test]
    fn resize_replaces_contents() {
        let mut bmp = Bitmap::allocate(4, 4).unwrap();
        bmp.fill(Color::WHITE);
        bmp.resize(6, 2).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (6, 2));
        assert_eq!(bmp.as_bytes().len(), 6 * 2 * 3);
        assert!(!bmp.is_uniform(Color::WHITE));
    }

    #[test]
    fn failed_resize_keeps_old_buffer() {
        let mut bmp = Bitmap::allocate(3, 3).unwrap();
        bmp.fill(Color::WHITE);
        assert!(bmp.resize(0, 3).is_err());
        assert_eq!((bmp.width(), bmp.height()), (3, 3));
        assert!(bmp.is_uniform(Color::WHITE));
    }

    #[test]
    fn set_and_blend_pixel() {
        let mut bmp = Bitmap::allocate(2, 2).unwrap();
        bmp.fill(Color::BLACK);
        bmp.set_pixel(1, 0, Color::new(10, 20, 30));
        assert_eq!(bmp.pixel(1, 0), Color::new(10, 20, 30));
        bmp.blend_pixel(0, 1, Color::WHITE, 255);
        assert_eq!(bmp.pixel(0, 1), Color::WHITE);
        bmp.blend_pixel(1, 1, Color::WHITE, 0);
        assert_eq!(bmp.pixel(1, 1), Color::BLACK);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_pixel_panics() {
        let bmp = Bitmap::allocate(2, 2).unwrap();
        let _ = bmp.pixel(2, 0);
    }
}
