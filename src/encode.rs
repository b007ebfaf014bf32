// this_file: src/encode.rs

//! Image serialization through [`OutputSink`].
//!
//! The `image` crate encoders write into the sink chunk by chunk. Any encoder
//! failure is converted into a crate [`Error`] here and nowhere else.

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::sink::OutputSink;
use image::codecs::png::PngEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, ImageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Serialized image formats. Both are 8-bit RGB, non-interlaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG
    #[default]
    Png,
    /// Binary netpbm pixmap (P6)
    Ppm,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Ppm => "ppm",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "ppm" | "pnm" => Ok(Self::Ppm),
            other => Err(Error::InvalidParameter(format!(
                "Unknown output format '{}' (expected png or ppm)",
                other
            ))),
        }
    }
}

/// Encode `bitmap` as `format` into a fresh, unbounded sink.
pub fn encode(bitmap: &Bitmap, format: OutputFormat) -> Result<Vec<u8>> {
    encode_into(bitmap, format, OutputSink::new())
}

/// Encode `bitmap` into `sink` and hand back its bytes.
///
/// A sink allocation failure is reported as [`Error::OutOfMemory`] and no
/// bytes are returned.
pub fn encode_into(bitmap: &Bitmap, format: OutputFormat, mut sink: OutputSink) -> Result<Vec<u8>> {
    let (width, height) = (bitmap.width(), bitmap.height());
    let result = match format {
        OutputFormat::Png => PngEncoder::new(&mut sink).write_image(
            bitmap.as_bytes(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Ppm => PnmEncoder::new(&mut sink)
            .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
            .write_image(bitmap.as_bytes(), width, height, ExtendedColorType::Rgb8),
    };

    if sink.is_failed() {
        return sink.into_bytes();
    }
    result.map_err(encoding_error)?;

    let bytes = sink.into_bytes()?;
    log::debug!(
        "Encoded {}x{} bitmap as {} ({} bytes)",
        width,
        height,
        format,
        bytes.len()
    );
    Ok(bytes)
}

fn encoding_error(e: ImageError) -> Error {
    Error::Encoding(e.to_string())
}
