// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGB8 in → RGB8 out, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{ResizeOptions, Resizer};

use crate::plan::{ScalePlan, Size};

#[derive(Debug)]
pub enum ScaleError {
    BufferTooSmall,
    InvalidQuality(u8),
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Decode(image::ImageError),
    Encode(image::ImageError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::BufferTooSmall => write!(f, "Output buffer too small"),
            ScaleError::InvalidQuality(q) => write!(f, "JPEG quality {} outside 1..=100", q),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
            ScaleError::Decode(e) => write!(f, "Image decode error: {}", e),
            ScaleError::Encode(e) => write!(f, "JPEG encode error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            ScaleError::Decode(e) | ScaleError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

/// Main scaling entry point.
/// `src_rgb` must be tightly packed (`src.w * 3` bytes per row).
/// `dst` must hold at least `plan.out.w * plan.out.h * 3` bytes (RGB).
pub fn scale_rgb_cpu(
    resizer: &mut Resizer,
    src_rgb: &[u8],
    src: Size,
    plan: &ScalePlan,
    dst: &mut [u8],
) -> Result<(), ScaleError> {
    let dst_len = (plan.out.w as usize) * (plan.out.h as usize) * 3;
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }

    let src_view = TypedImageRef::<U8x3>::from_buffer(src.w, src.h, src_rgb)?;
    let mut dst_image = TypedImage::<U8x3>::from_buffer(plan.out.w, plan.out.h, &mut dst[..dst_len])?;

    // Lanczos3 convolution is the crate default; frames are photographic so keep it.
    let opts = ResizeOptions::new();
    resizer.resize_typed::<U8x3>(&src_view, &mut dst_image, &opts)?;

    Ok(())
}
