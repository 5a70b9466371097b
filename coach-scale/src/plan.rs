// SPDX-License-Identifier: MIT
//! # Width-Ceiling Scale Planning
//!
//! Frames are shrunk against a *width ceiling*: when an image is wider than the
//! ceiling it is scaled down so its width equals the ceiling and its height
//! follows proportionally. Images already at or below the ceiling keep their
//! dimensions (they are still re-encoded by the caller).
//!
//! - All computations use floating-point for precision but round to integers
//! - No upscaling: images narrower than the ceiling are left unchanged
//! - Clamp to minimum 1px to prevent zero-sized output

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Complete scaling plan computed from an input size and a width ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Width ceiling used for planning
    pub max_width: u32,
    /// Final computed output dimensions
    pub out: Size,
}

impl ScalePlan {
    /// True when the plan leaves the pixel dimensions untouched.
    pub fn is_identity(&self) -> bool {
        self.input == self.out
    }
}

/// Compute a scaling plan that fits `input` under `max_width`.
///
/// # Arguments
/// * `input` - Source image dimensions
/// * `max_width` - Width ceiling in pixels (a ceiling of 0 is treated as 1)
///
/// # Performance
/// O(1) computation with minimal floating-point operations
pub fn build_plan(input: Size, max_width: u32) -> ScalePlan {
    let (w, h) = fit_width(input, max_width.max(1));
    ScalePlan {
        input,
        max_width,
        out: Size { w, h },
    }
}

/// Fit image under a width ceiling while preserving aspect ratio.
/// Never upscales - returns original dimensions if already narrow enough.
fn fit_width(input: Size, max_width: u32) -> (u32, u32) {
    if input.w <= max_width {
        return (input.w, input.h);
    }
    let s = max_width as f64 / input.w as f64;
    (max_width, ((input.h as f64 * s).round() as u32).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_frame_is_clamped_to_ceiling() {
        let plan = build_plan(Size { w: 1920, h: 1080 }, 512);
        assert_eq!(plan.out, Size { w: 512, h: 288 });
        assert!(!plan.is_identity());
    }

    #[test]
    fn narrow_frame_is_never_upscaled() {
        let plan = build_plan(Size { w: 320, h: 240 }, 512);
        assert_eq!(plan.out, Size { w: 320, h: 240 });
        assert!(plan.is_identity());
    }

    #[test]
    fn portrait_frame_keeps_aspect() {
        let plan = build_plan(Size { w: 1080, h: 1920 }, 270);
        assert_eq!(plan.out, Size { w: 270, h: 480 });
    }

    #[test]
    fn extreme_aspect_never_collapses_to_zero() {
        let plan = build_plan(Size { w: 10_000, h: 2 }, 256);
        assert_eq!(plan.out.w, 256);
        assert_eq!(plan.out.h, 1);
    }
}
