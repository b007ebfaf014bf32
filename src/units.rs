// this_file: src/units.rs

//! Fixed-point metric conversion.
//!
//! Font engines report bearings and advances in 26.6 fixed point
//! (1/64 pixel). All conversions to integer pixels go through [`Scale`],
//! which always rounds toward positive infinity.

use std::fmt;

/// 26.6 fixed-point value (1/64 pixel units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct F26Dot6(pub i32);

impl F26Dot6 {
    /// Zero.
    pub const ZERO: Self = Self(0);
    /// One 26.6 unit per 1/64 pixel.
    pub const ONE_PIXEL: i32 = 64;

    /// Raw 26.6 value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whole pixels.
    pub const fn from_pixels(px: i32) -> Self {
        Self(px * Self::ONE_PIXEL)
    }

    /// Nearest 26.6 value to a float pixel amount.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f32(px: f32) -> Self {
        Self((px * Self::ONE_PIXEL as f32).round() as i32)
    }

    /// Pixels, rounded up.
    pub fn ceil_pixels(self) -> i32 {
        Scale::IDENTITY.apply(self)
    }
}

impl fmt::Display for F26Dot6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}px", f64::from(self.0) / 64.0)
    }
}

/// Ratio between the configured line height and a face's native size.
///
/// Both terms are kept as integers so conversions are exact up to the final
/// ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    numerator: i64,
    denominator: i64,
}

impl Scale {
    /// 1:1 scale.
    pub const IDENTITY: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    /// `line_height / native_line_height`, both in pixels.
    ///
    /// A zero native height falls back to identity.
    pub fn new(line_height: u32, native_line_height: u32) -> Self {
        if native_line_height == 0 {
            return Self::IDENTITY;
        }
        Self {
            numerator: i64::from(line_height),
            denominator: i64::from(native_line_height),
        }
    }

    /// Return true when the scale leaves values unchanged.
    pub fn is_identity(&self) -> bool {
        self.numerator == self.denominator
    }

    /// Convert a 26.6 value to scaled whole pixels, rounding up.
    pub fn apply(&self, value: F26Dot6) -> i32 {
        let num = i64::from(value.0) * self.numerator;
        let den = self.denominator * i64::from(F26Dot6::ONE_PIXEL);
        let px = ceil_div(num, den);
        px.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

/// Signed division rounding toward positive infinity. `den` must be positive.
fn ceil_div(num: i64, den: i64) -> i64 {
    let q = num / den;
    if num % den > 0 {
        q + 1
    } else {
        q
    }
}
