//! Crop and resize planning.
//!
//! [`plan`] turns source dimensions, a target box, and a [`Mode`] into a
//! [`TransformPlan`]. The plan is pure geometry; executing it is the job of an
//! image engine that consumes [`TransformPlan::operations`].
//!
//! # Example
//!
//! ```
//! use imgplan::{CropRect, Dimensions, Mode, plan};
//!
//! let p = plan(Dimensions::new(1600, 900), Dimensions::new(400, 400), Mode::Crop).unwrap();
//! assert_eq!(p.crop_rect(), Some(CropRect::new(350, 0, 900, 900)));
//! assert_eq!(p.output(), Dimensions::new(400, 400));
//! ```

use crate::geometry::{CropRect, DimensionRole, Dimensions, PlanError};

/// How to bring a source image to the target box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Crop a centered region at the target aspect ratio, then scale it to
    /// exactly the target size.
    Crop,
    /// Scale the whole image to fit within the target, preserving aspect
    /// ratio. One axis may come out smaller than the target.
    Resize,
}

impl Mode {
    /// Lowercase name, as accepted by [`FromStr`](core::str::FromStr).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Resize => "resize",
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized mode name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode, expected `crop` or `resize`")]
pub struct UnknownMode;

impl core::str::FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("crop") {
            Ok(Self::Crop)
        } else if s.eq_ignore_ascii_case("resize") {
            Ok(Self::Resize)
        } else {
            Err(UnknownMode)
        }
    }
}

/// Crop-mode plan: cut `crop` out of the source, then scale it to `output`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CropPlan {
    /// Region of the source to keep.
    pub crop: CropRect,
    /// Final size. Always the requested target.
    pub output: Dimensions,
}

/// Resize-mode plan: scale the whole source to `output`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResizePlan {
    /// Final size, within the target box.
    pub output: Dimensions,
}

/// Geometric instructions for one transform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransformPlan {
    Crop(CropPlan),
    Resize(ResizePlan),
}

impl TransformPlan {
    /// Mode that produced this plan.
    pub fn mode(&self) -> Mode {
        match self {
            Self::Crop(_) => Mode::Crop,
            Self::Resize(_) => Mode::Resize,
        }
    }

    /// Final output dimensions.
    pub fn output(&self) -> Dimensions {
        match self {
            Self::Crop(p) => p.output,
            Self::Resize(p) => p.output,
        }
    }

    /// Crop rectangle, if this is a crop plan.
    pub fn crop_rect(&self) -> Option<CropRect> {
        match self {
            Self::Crop(p) => Some(p.crop),
            Self::Resize(_) => None,
        }
    }

    /// Executor steps in order: crop then resize, or resize alone.
    ///
    /// A crop plan always emits its crop, even when it covers the full
    /// source, so executors see one fixed sequence per mode.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + use<> {
        let (crop, output) = match *self {
            Self::Crop(p) => (Some(Operation::Crop(p.crop)), p.output),
            Self::Resize(p) => (None, p.output),
        };
        [crop, Some(Operation::Resize(output))].into_iter().flatten()
    }
}

/// A single step for an image executor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Cut out a region in source pixel coordinates.
    Crop(CropRect),
    /// Scale the current image to exactly these dimensions.
    Resize(Dimensions),
}

/// Compute the transform plan for a source image.
///
/// Fails with [`PlanError::InvalidDimensions`] when either box has a zero
/// extent.
pub fn plan(source: Dimensions, target: Dimensions, mode: Mode) -> Result<TransformPlan, PlanError> {
    let source = source.validate(DimensionRole::Source)?;
    let target = target.validate(DimensionRole::Target)?;
    Ok(match mode {
        Mode::Crop => TransformPlan::Crop(CropPlan {
            crop: centered_crop(source, target),
            output: target,
        }),
        Mode::Resize => TransformPlan::Resize(ResizePlan {
            output: fit_within(source, target),
        }),
    })
}

// ============================================================================
// Internal geometry
// ============================================================================

/// Largest centered region of `source` with the target's aspect ratio.
///
/// Extents are floored, then the origin is floored from the floored extents,
/// so the rect never leaves the source.
fn centered_crop(source: Dimensions, target: Dimensions) -> CropRect {
    let (sw, sh) = (source.width as u64, source.height as u64);
    let (tw, th) = (target.width as u64, target.height as u64);

    let (cw, ch) = if source.is_wider_than(target) {
        // Keep full height: width = sh * (tw / th).
        (floor_div(sh * tw, th), source.height)
    } else {
        // Keep full width: height = sw / (tw / th).
        (source.width, floor_div(sw * th, tw))
    };

    CropRect {
        x: (source.width - cw) / 2,
        y: (source.height - ch) / 2,
        width: cw,
        height: ch,
    }
}

/// Largest box with the source's aspect ratio that fits in `target`.
/// One axis matches the target; the other is floored.
fn fit_within(source: Dimensions, target: Dimensions) -> Dimensions {
    let (sw, sh) = (source.width as u64, source.height as u64);
    let (tw, th) = (target.width as u64, target.height as u64);

    if source.is_wider_than(target) {
        // height = tw / (sw / sh)
        Dimensions::new(target.width, floor_div(tw * sh, sw))
    } else {
        // width = th * (sw / sh)
        Dimensions::new(floor_div(th * sw, sh), target.height)
    }
}

/// `floor(num / den)` for the derived axis, raised to at least one pixel.
///
/// Callers only pass quotients bounded by an existing `u32` extent.
fn floor_div(num: u64, den: u64) -> u32 {
    ((num / den) as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h)
    }

    // ── centered_crop ───────────────────────────────────────────────────

    #[test]
    fn crop_wider_source_keeps_height() {
        assert_eq!(centered_crop(d(1600, 900), d(400, 400)), CropRect::new(350, 0, 900, 900));
    }

    #[test]
    fn crop_taller_source_keeps_width() {
        // 500×1000 to 4:3 → height 375, centered at (1000-375)/2 = 312
        assert_eq!(centered_crop(d(500, 1000), d(400, 300)), CropRect::new(0, 312, 500, 375));
    }

    #[test]
    fn crop_floors_fractional_extent() {
        // 1000×500 to 4:3 → width 500 * 4/3 = 666.67 → 666, x = 334/2 = 167
        assert_eq!(centered_crop(d(1000, 500), d(400, 300)), CropRect::new(167, 0, 666, 500));
    }

    #[test]
    fn crop_odd_remainder_floors_origin() {
        // 101×50 to 1:1 → 50×50, x = floor(51/2) = 25
        assert_eq!(centered_crop(d(101, 50), d(10, 10)), CropRect::new(25, 0, 50, 50));
    }

    #[test]
    fn crop_same_ratio_is_full_source() {
        let r = centered_crop(d(1600, 900), d(16, 9));
        assert!(r.is_full(d(1600, 900)));
    }

    #[test]
    fn crop_same_ratio_irrational_float() {
        // 3:7 has no exact binary fraction; integer math still yields the full source.
        let r = centered_crop(d(300, 700), d(3, 7));
        assert_eq!(r, CropRect::new(0, 0, 300, 700));
    }

    #[test]
    fn crop_degenerate_extent_is_one_pixel() {
        // 1000×1 source, 1:100 target → width would floor to 0.
        let r = centered_crop(d(1000, 1), d(1, 100));
        assert_eq!(r.width, 1);
        assert_eq!(r.height, 1);
        assert!(r.fits_within(d(1000, 1)));
    }

    // ── fit_within ──────────────────────────────────────────────────────

    #[test]
    fn fit_wider_source() {
        assert_eq!(fit_within(d(1600, 900), d(400, 400)), d(400, 225));
    }

    #[test]
    fn fit_taller_source() {
        assert_eq!(fit_within(d(300, 600), d(100, 100)), d(50, 100));
    }

    #[test]
    fn fit_same_ratio_fills_target() {
        assert_eq!(fit_within(d(1000, 500), d(400, 200)), d(400, 200));
    }

    #[test]
    fn fit_upscales_small_source() {
        assert_eq!(fit_within(d(20, 10), d(400, 400)), d(400, 200));
    }

    #[test]
    fn fit_floors() {
        // 1000×333 into 100×100 → 100 × 33.3 → 33
        assert_eq!(fit_within(d(1000, 333), d(100, 100)), d(100, 33));
    }

    #[test]
    fn fit_degenerate_extent_is_one_pixel() {
        assert_eq!(fit_within(d(10_000, 1), d(100, 100)), d(100, 1));
    }

    #[test]
    fn extreme_extents_do_not_overflow() {
        const M: u32 = u32::MAX;
        assert_eq!(fit_within(d(M, 1), d(M, M)), d(M, 1));
        assert_eq!(fit_within(d(1, M), d(M, M)), d(1, M));
        assert_eq!(fit_within(d(M - 1, M), d(M, M - 1)), d(M - 2, M - 1));
        assert_eq!(fit_within(d(M, M), d(M, M)), d(M, M));
    }

    // ── plan ────────────────────────────────────────────────────────────

    #[test]
    fn plan_at_u32_max() {
        const M: u32 = u32::MAX;
        let mid = (M - 1) / 2;
        for (source, target, rect) in [
            (d(M, M), d(1, M), CropRect::new(mid, 0, 1, M)),
            (d(M, M), d(M, 1), CropRect::new(0, mid, M, 1)),
            (d(1, M), d(M, M), CropRect::new(0, mid, 1, 1)),
            (d(M, M), d(M, M), CropRect::new(0, 0, M, M)),
        ] {
            let p = plan(source, target, Mode::Crop).unwrap();
            assert_eq!(p.crop_rect(), Some(rect), "{source} -> {target}");
            assert!(rect.fits_within(source));
            assert_eq!(p.output(), target);
        }

        let p = plan(d(M - 1, M), d(M, M - 1), Mode::Resize).unwrap();
        assert_eq!(p.output(), d(M - 2, M - 1));
    }

    #[test]
    fn plan_rejects_zero_source() {
        for mode in [Mode::Crop, Mode::Resize] {
            let err = plan(d(0, 900), d(400, 400), mode).unwrap_err();
            assert!(matches!(
                err,
                PlanError::InvalidDimensions {
                    role: DimensionRole::Source,
                    ..
                }
            ));
        }
    }

    #[test]
    fn plan_rejects_zero_target() {
        let err = plan(d(1600, 900), d(400, 0), Mode::Resize).unwrap_err();
        assert!(matches!(
            err,
            PlanError::InvalidDimensions {
                role: DimensionRole::Target,
                ..
            }
        ));
    }

    #[test]
    fn operations_order() {
        let p = plan(d(1600, 900), d(400, 400), Mode::Crop).unwrap();
        let mut ops = p.operations();
        assert_eq!(ops.next(), Some(Operation::Crop(CropRect::new(350, 0, 900, 900))));
        assert_eq!(ops.next(), Some(Operation::Resize(d(400, 400))));
        assert_eq!(ops.next(), None);

        let p = plan(d(1600, 900), d(400, 400), Mode::Resize).unwrap();
        let mut ops = p.operations();
        assert_eq!(ops.next(), Some(Operation::Resize(d(400, 225))));
        assert_eq!(ops.next(), None);
    }

    #[test]
    fn mode_from_str() {
        assert_eq!("crop".parse::<Mode>(), Ok(Mode::Crop));
        assert_eq!(" Resize ".parse::<Mode>(), Ok(Mode::Resize));
        assert_eq!("fit".parse::<Mode>(), Err(UnknownMode));
        assert_eq!(Mode::Resize.to_string(), "resize");
    }
}
