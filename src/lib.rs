// this_file: src/lib.rs
//! Snapline - render short text snippets into RGB images
//!
//! This library provides:
//! - An owned RGB24 bitmap with coverage blending
//! - A role-keyed font registry over a pluggable font engine
//! - Glyph compositing anchored to a fixed line baseline
//! - Grid layout of UTF-8 text runs
//! - PNG and PPM encoding through a growable output sink
//!
//! ```no_run
//! use snapline::{CanvasSize, Context, FontRole, FontSource, RenderConfig, SkrifaEngine};
//!
//! # fn main() -> snapline::Result<()> {
//! let mut ctx = Context::new(
//!     SkrifaEngine::new(),
//!     RenderConfig::default(),
//!     CanvasSize::Grid { rows: 1, cols: 12 },
//! )?;
//! ctx.add_font(&FontSource::path("DejaVuSansMono.ttf"), FontRole::Regular)?;
//! ctx.draw_text(0, 0, "hello, world")?;
//! let png = ctx.encode()?;
//! # let _ = png;
//! # Ok(())
//! # }
//! ```

pub mod bitmap;
pub mod color;
pub mod compositor;
pub mod config;
pub mod context;
pub mod encode;
pub mod engine;
pub mod error;
pub mod font_loader;
pub mod fonts;
pub mod layout;
pub mod logging;
pub mod rasterize;
pub mod registry;
pub mod sink;
pub mod synthetic;
pub mod units;

// Re-export commonly used types
pub use bitmap::Bitmap;
pub use color::Color;
pub use config::{CanvasSize, RenderConfig, SN_FONTS};
pub use context::Context;
pub use encode::OutputFormat;
pub use engine::{FontEngine, FontFace, FontSource};
pub use error::{Error, LoadFailure, Result};
pub use fonts::SkrifaEngine;
pub use registry::FontRole;
pub use sink::OutputSink;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
