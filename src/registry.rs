// this_file: src/registry.rs

//! Role-keyed font slots.
//!
//! Each slot binds a [`FontRole`] to one opened face and the sizing strategy
//! chosen when it was registered. Faces carrying color bitmap tables are
//! pinned to their first fixed strike; everything else is scaled to the line
//! height. The strategy never changes afterwards.

use crate::config::SN_FONTS;
use crate::engine::{FontEngine, FontFace, FontSource};
use crate::error::{Error, LoadFailure, Result};
use crate::units::Scale;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Purpose of a registered face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontRole {
    /// Upright, normal weight
    Regular,
    /// Bold weight
    Bold,
    /// Italic style
    Italic,
    /// Bold weight, italic style
    BoldItalic,
    /// Color emoji
    Emoji,
}

impl FontRole {
    /// Every role, in registration order of preference.
    pub const ALL: [Self; 5] = [
        Self::Regular,
        Self::Bold,
        Self::Italic,
        Self::BoldItalic,
        Self::Emoji,
    ];

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::BoldItalic => "bold-italic",
            Self::Emoji => "emoji",
        }
    }
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| Error::InvalidParameter(format!("Unknown font role '{}'", s)))
    }
}

/// How glyphs are sized for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingStrategy {
    /// Outlines scaled to `pixel_size` per em
    Scalable {
        /// Requested pixel size
        pixel_size: u32,
    },
    /// Pre-rendered bitmap strike
    FixedStrike {
        /// Strike index within the face
        index: usize,
    },
}

/// One registered face.
#[derive(Debug)]
pub struct FontSlot<F> {
    role: FontRole,
    origin: String,
    strategy: SizingStrategy,
    face: F,
}

impl<F: FontFace> FontSlot<F> {
    /// Role this slot serves.
    pub fn role(&self) -> FontRole {
        self.role
    }

    /// Path or label the face was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Sizing strategy fixed at registration.
    pub fn strategy(&self) -> SizingStrategy {
        self.strategy
    }

    /// Return true for fixed-strike (color) faces.
    pub fn is_fixed_strike(&self) -> bool {
        matches!(self.strategy, SizingStrategy::FixedStrike { .. })
    }

    /// The face handle.
    pub fn face(&self) -> &F {
        &self.face
    }

    /// Mutable face handle, for rendering.
    pub fn face_mut(&mut self) -> &mut F {
        &mut self.face
    }

    /// Scale from the face's native size to `line_height`.
    pub fn scale(&self, line_height: u32) -> Scale {
        Scale::new(line_height, self.face.native_line_height())
    }
}

/// Capacity-bounded, role-keyed collection of font slots.
#[derive(Debug)]
pub struct FontRegistry<F> {
    slots: SmallVec<[FontSlot<F>; SN_FONTS]>,
    capacity: usize,
    active: Option<usize>,
}

impl<F: FontFace> FontRegistry<F> {
    /// Empty registry holding at most `capacity` faces.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: SmallVec::new(),
            capacity,
            active: None,
        }
    }

    /// Load `source` through `engine` and register it for `role`.
    ///
    /// The first registered face becomes active. On any failure the
    /// registry is unchanged and the partially opened face is released.
    pub fn add<E>(
        &mut self,
        engine: &E,
        source: &FontSource,
        role: FontRole,
        line_height: u32,
    ) -> Result<()>
    where
        E: FontEngine<Face = F>,
    {
        if self.get(role).is_some() {
            return Err(Error::RoleTaken { role });
        }
        if self.slots.len() >= self.capacity {
            return Err(Error::RegistryFull {
                capacity: self.capacity,
            });
        }

        let origin = source.name();
        let mut face = engine.load_face(source)?;
        let strategy = prepare_face(&mut face, &origin, line_height)?;

        log::info!("Registered {} font {} ({:?})", role, origin, strategy);
        self.slots.push(FontSlot {
            role,
            origin,
            strategy,
            face,
        });
        if self.active.is_none() {
            self.active = Some(self.slots.len() - 1);
        }
        Ok(())
    }

    /// Make `role` the compositing target.
    pub fn set_active(&mut self, role: FontRole) -> Result<()> {
        let idx = self
            .slots
            .iter()
            .position(|slot| slot.role == role)
            .ok_or(Error::RoleMissing { role })?;
        self.active = Some(idx);
        log::debug!("Active font is now {}", role);
        Ok(())
    }

    /// Role of the active slot, if any.
    pub fn active_role(&self) -> Option<FontRole> {
        self.active.map(|idx| self.slots[idx].role)
    }

    /// The active slot.
    pub fn active(&self) -> Result<&FontSlot<F>> {
        self.active
            .map(|idx| &self.slots[idx])
            .ok_or(Error::NoActiveFont)
    }

    /// The active slot, mutably.
    pub fn active_mut(&mut self) -> Result<&mut FontSlot<F>> {
        match self.active {
            Some(idx) => Ok(&mut self.slots[idx]),
            None => Err(Error::NoActiveFont),
        }
    }

    /// Slot registered for `role`.
    pub fn get(&self, role: FontRole) -> Option<&FontSlot<F>> {
        self.slots.iter().find(|slot| slot.role == role)
    }

    /// Registered roles in registration order.
    pub fn roles(&self) -> impl Iterator<Item = FontRole> + '_ {
        self.slots.iter().map(|slot| slot.role)
    }

    /// Number of registered faces.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Return true when no face is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of faces.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Choose and apply the sizing strategy for a freshly opened face.
fn prepare_face<F: FontFace>(face: &mut F, origin: &str, line_height: u32) -> Result<SizingStrategy> {
    if face.has_color_table() {
        if face.strike_count() == 0 {
            return Err(Error::load(origin, LoadFailure::NoColorStrike));
        }
        face.select_fixed_strike(0)?;
        log::debug!("Font {} has color bitmaps, using first strike", origin);
        return Ok(SizingStrategy::FixedStrike { index: 0 });
    }

    face.set_pixel_size(line_height)?;
    Ok(SizingStrategy::Scalable {
        pixel_size: line_height,
    })
}
