// this_file: src/layout.rs

//! Grid layout: text rows on a fixed cell grid.
//!
//! Rows are `line_height` pixels tall and columns are `cell_width` pixels
//! wide. A text run starts at its cell origin and then advances by each
//! glyph's own advance, so proportional faces overrun the grid freely.

use crate::compositor::Compositor;
use crate::config::RenderConfig;
use crate::engine::FontFace;
use crate::error::{Error, Result};
use std::str::{Chars, Utf8Chunks};

/// Cell geometry and per-run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Row height in pixels
    pub line_height: u32,
    /// Column width in pixels
    pub cell_width: u32,
    /// Apply pair kerning between consecutive glyphs
    pub kerning: bool,
}

impl Grid {
    /// Grid geometry for `config`.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            line_height: config.line_height,
            cell_width: config.cell_width(),
            kerning: config.kerning,
        }
    }

    /// Pixel origin of the cell at `(row, col)`.
    pub fn cell_origin(&self, row: u32, col: u32) -> (i32, i32) {
        let x = u64::from(col) * u64::from(self.cell_width);
        let y = u64::from(row) * u64::from(self.line_height);
        (saturate(x), saturate(y))
    }

    /// Draw `text` starting at cell `(row, col)`.
    ///
    /// Glyphs are drawn one at a time as the text is decoded. The first
    /// decoding or compositing error stops the run and is returned; glyphs
    /// drawn before it stay drawn. On success returns the final pen x
    /// position in pixels.
    pub fn draw_text<F: FontFace>(
        &self,
        compositor: &mut Compositor<'_, F>,
        row: u32,
        col: u32,
        text: &[u8],
    ) -> Result<i32> {
        let (mut x, y) = self.cell_origin(row, col);
        let mut previous: Option<char> = None;

        for codepoint in Codepoints::new(text) {
            let codepoint = codepoint?;
            if self.kerning {
                if let Some(left) = previous {
                    x = x.saturating_add(compositor.kerning(left, codepoint));
                }
            }
            let advance = compositor.composite(x, y, codepoint)?;
            x = x.saturating_add(advance);
            previous = Some(codepoint);
        }
        Ok(x)
    }
}

fn saturate(v: u64) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Lazy UTF-8 decoder over raw bytes.
///
/// Yields every scalar up to the first malformed sequence, then a single
/// [`Error::Decoding`] carrying its byte offset, then stops.
#[derive(Debug)]
pub struct Codepoints<'a> {
    chunks: Utf8Chunks<'a>,
    chars: Chars<'a>,
    pending: Option<Error>,
    offset: usize,
    len: usize,
    done: bool,
}

impl<'a> Codepoints<'a> {
    /// Decode `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            chunks: bytes.utf8_chunks(),
            chars: "".chars(),
            pending: None,
            offset: 0,
            len: bytes.len(),
            done: false,
        }
    }
}

impl Iterator for Codepoints<'_> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(c) = self.chars.next() {
                return Some(Ok(c));
            }
            if let Some(err) = self.pending.take() {
                self.done = true;
                return Some(Err(err));
            }

            let Some(chunk) = self.chunks.next() else {
                self.done = true;
                return None;
            };
            let valid = chunk.valid();
            let invalid = chunk.invalid();
            self.chars = valid.chars();
            if !invalid.is_empty() {
                let at = self.offset + valid.len();
                let reason = if at + invalid.len() == self.len {
                    format!("truncated sequence {:02x?}", invalid)
                } else {
                    format!("invalid sequence {:02x?}", invalid)
                };
                self.pending = Some(Error::Decoding { offset: at, reason });
            }
            self.offset += valid.len() + invalid.len();
        }
    }
}
