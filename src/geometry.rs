//! Pixel extents, crop rectangles, and dimension validation.
//!
//! Pure value types with no allocation. Every [`Dimensions`] that reaches the
//! planner has strictly positive integer extents; raw numeric input goes
//! through [`Dimensions::from_f64`] first.

#[cfg(not(feature = "std"))]
use num_traits::Float;

/// Width × height in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions without validation. The planner rejects zero extents.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Validate raw numeric extents.
    ///
    /// Rejects values that are non-finite, not strictly positive, fractional,
    /// or too large for a `u32` pixel count.
    pub fn from_f64(width: f64, height: f64, role: DimensionRole) -> Result<Self, PlanError> {
        match (pixel_extent(width), pixel_extent(height)) {
            (Some(w), Some(h)) => Ok(Self::new(w, h)),
            _ => Err(PlanError::InvalidDimensions {
                role,
                width,
                height,
            }),
        }
    }

    /// Check that both extents are non-zero.
    pub fn validate(self, role: DimensionRole) -> Result<Self, PlanError> {
        if self.width == 0 || self.height == 0 {
            return Err(PlanError::InvalidDimensions {
                role,
                width: self.width as f64,
                height: self.height as f64,
            });
        }
        Ok(self)
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Whether this box is relatively wider than `other`.
    ///
    /// Exact: compares `self.w * other.h` against `self.h * other.w` in 64-bit
    /// integers, so equal ratios are never reported as wider.
    pub fn is_wider_than(self, other: Self) -> bool {
        self.width as u64 * other.height as u64 > self.height as u64 * other.width as u64
    }
}

impl core::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

fn pixel_extent(v: f64) -> Option<u32> {
    if !v.is_finite() || v <= 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

/// Axis-aligned sub-rectangle of a source image, origin at the top-left.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CropRect {
    /// Left edge (origin x).
    pub x: u32,
    /// Top edge (origin y).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// Create a new rect.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Extent of the rect.
    pub const fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Whether this rect lies entirely within `source`.
    pub fn fits_within(&self, source: Dimensions) -> bool {
        self.x as u64 + self.width as u64 <= source.width as u64
            && self.y as u64 + self.height as u64 <= source.height as u64
    }

    /// Whether this rect covers the full source (no actual crop).
    pub fn is_full(&self, source: Dimensions) -> bool {
        self.x == 0 && self.y == 0 && self.width == source.width && self.height == source.height
    }
}

/// Which input a dimension error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DimensionRole {
    /// The image being transformed.
    Source,
    /// The requested output box.
    Target,
}

impl core::fmt::Display for DimensionRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Target => "target",
        })
    }
}

/// Planning error.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// A width or height is zero, negative, non-finite, or fractional.
    #[error("invalid {role} dimensions {width}x{height}: extents must be positive whole pixels")]
    InvalidDimensions {
        role: DimensionRole,
        width: f64,
        height: f64,
    },
}
