// this_file: src/font_loader.rs
//! Font file loading and validation

use crate::error::{Error, LoadFailure, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use read_fonts::FontRef;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;

/// Maximum accepted font file size (50MB)
pub const MAX_FONT_SIZE: usize = 50 * 1024 * 1024;

/// Reads font files and keeps their bytes for reuse across faces
#[derive(Debug, Default)]
pub struct FontLoader {
    /// Previously loaded fonts by path as given
    cache: HashMap<Utf8PathBuf, Arc<Vec<u8>>>,
}

impl FontLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate font data from a file path
    pub fn load_font_data(&mut self, path: &Utf8Path) -> Result<Arc<Vec<u8>>> {
        if let Some(data) = self.cache.get(path) {
            debug!("Using cached font: {}", path);
            return Ok(Arc::clone(data));
        }

        info!("Loading font: {}", path);
        let data = fs::read(path).map_err(|e| {
            let kind = match e.kind() {
                ErrorKind::NotFound => LoadFailure::NotFound,
                _ => LoadFailure::Unreadable(e.to_string()),
            };
            Error::load(path.as_str(), kind)
        })?;

        let data = Arc::new(data);
        validate_font_data(path.as_str(), &data)?;
        self.cache.insert(path.to_path_buf(), Arc::clone(&data));
        Ok(data)
    }

    /// Number of cached fonts
    pub fn cache_count(&self) -> usize {
        self.cache.len()
    }
}

/// Check size, signature and parseability of raw font data
pub fn validate_font_data(origin: &str, data: &[u8]) -> Result<()> {
    let unsupported = |reason: String| Error::load(origin, LoadFailure::UnsupportedFormat(reason));

    if data.is_empty() {
        return Err(unsupported("font file is empty".into()));
    }
    if data.len() > MAX_FONT_SIZE {
        warn!("Rejecting oversized font {} ({} bytes)", origin, data.len());
        return Err(unsupported(format!(
            "font file too large: {} bytes (max: {} bytes)",
            data.len(),
            MAX_FONT_SIZE
        )));
    }
    if !is_valid_font_signature(data) {
        return Err(unsupported("invalid signature (expected TTF/OTF/TTC)".into()));
    }
    FontRef::from_index(data, 0)
        .map_err(|e| unsupported(format!("failed to parse font: {}", e)))?;
    Ok(())
}

/// Check if data starts with an sfnt or collection signature
fn is_valid_font_signature(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    matches!(
        &data[0..4],
        // TrueType
        b"\x00\x01\x00\x00" |
        // Apple TrueType
        b"true" |
        // OpenType
        b"OTTO" |
        // TrueType Collection
        b"ttcf"
    )
}
