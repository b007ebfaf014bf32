// this_file: src/error.rs
//! Error types for the snapline library

use crate::registry::FontRole;
use thiserror::Error;

/// Main error type for snapline operations
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer (bitmap or encoded output) could not be allocated
    #[error("Out of memory: failed to allocate {requested} bytes")]
    OutOfMemory {
        /// Size of the allocation that failed
        requested: usize,
    },

    /// A font face could not be opened or sized
    #[error("Failed to load font {origin}: {kind}")]
    ResourceLoad {
        /// Path or label of the font source
        origin: String,
        /// What went wrong
        kind: LoadFailure,
    },

    /// The active face has no glyph for the codepoint
    #[error("Glyph not found for {codepoint:?} (U+{:04X}) in {role} font", scalar(.codepoint))]
    GlyphNotFound {
        /// Codepoint that failed to map
        codepoint: char,
        /// Role of the face that was searched
        role: FontRole,
    },

    /// The font engine failed to rasterize a glyph
    #[error("Failed to render glyph {glyph}: {reason}")]
    Render {
        /// Glyph index
        glyph: u32,
        /// Engine-reported cause
        reason: String,
    },

    /// Requested behavior exists in the data but is not implemented
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Malformed UTF-8 text input
    #[error("Invalid UTF-8 at byte {offset}: {reason}")]
    Decoding {
        /// Byte offset of the first invalid sequence
        offset: usize,
        /// Description of the malformed sequence
        reason: String,
    },

    /// Image serialization failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Every font slot is already in use
    #[error("Font registry is full (capacity {capacity})")]
    RegistryFull {
        /// Configured number of slots
        capacity: usize,
    },

    /// A font is already registered for the role
    #[error("Font role {role} is already registered")]
    RoleTaken {
        /// Occupied role
        role: FontRole,
    },

    /// No font is registered for the role
    #[error("Font role {role} is not registered")]
    RoleMissing {
        /// Requested role
        role: FontRole,
    },

    /// Drawing was attempted before any font was activated
    #[error("No active font")]
    NoActiveFont,

    /// Invalid input parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration parsing or validation error
    #[error("Config error: {0}")]
    Config(String),

    /// IO operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reason a font resource failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The font file does not exist
    #[error("file not found")]
    NotFound,

    /// The font file exists but could not be read
    #[error("unreadable: {0}")]
    Unreadable(String),

    /// The data is not a font the engine understands
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The face has a color bitmap table but no strikes
    #[error("color font has no fixed-size strike")]
    NoColorStrike,

    /// The face rejected the requested size
    #[error("cannot size face: {0}")]
    Sizing(String),
}

impl Error {
    /// Build a [`Error::ResourceLoad`] for the given origin.
    pub fn load(origin: impl Into<String>, kind: LoadFailure) -> Self {
        Self::ResourceLoad {
            origin: origin.into(),
            kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

fn scalar(c: &char) -> u32 {
    u32::from(*c)
}

/// Result type alias for snapline operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_not_found_reports_codepoint() {
        let err = Error::GlyphNotFound {
            codepoint: 'A',
            role: FontRole::Bold,
        };
        let msg = err.to_string();
        assert!(msg.contains("U+0041"), "unexpected message: {}", msg);
        assert!(msg.contains("bold"), "unexpected message: {}", msg);
    }

    #[test]
    fn load_failures_are_distinct() {
        let missing = Error::load("a.ttf", LoadFailure::NotFound);
        let strike = Error::load("a.ttf", LoadFailure::NoColorStrike);
        assert!(matches!(
            missing,
            Error::ResourceLoad {
                kind: LoadFailure::NotFound,
                ..
            }
        ));
        assert_ne!(missing.to_string(), strike.to_string());
    }
}
