// SPDX-License-Identifier: MIT
//! # JPEG Re-encoding
//!
//! Decodes a frame, applies the width ceiling through [`crate::cpu`], and
//! writes a baseline JPEG at the requested quality. Re-encoding always
//! happens, even when the plan keeps the dimensions, because lowering quality
//! is the other half of every compression round.

use fast_image_resize::Resizer;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

use crate::cpu::{ScaleError, scale_rgb_cpu};
use crate::plan::{Size, build_plan};

/// Width ceiling and JPEG quality for one re-encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JpegParams {
    /// Frames wider than this are scaled down to it
    pub max_width: u32,
    /// JPEG quality, 1 (smallest) to 100 (best)
    pub quality: u8,
}

/// Result of a re-encode: the new file bytes and their pixel dimensions.
#[derive(Debug)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub size: Size,
}

/// Decode `input` (any format the `image` crate was built with), fit it under
/// `params.max_width` and encode it as JPEG at `params.quality`.
pub fn reencode_jpeg(
    resizer: &mut Resizer,
    input: &[u8],
    params: JpegParams,
) -> Result<Encoded, ScaleError> {
    if !(1..=100).contains(&params.quality) {
        return Err(ScaleError::InvalidQuality(params.quality));
    }

    let rgb = image::load_from_memory(input)
        .map_err(ScaleError::Decode)?
        .to_rgb8();
    let src = Size {
        w: rgb.width(),
        h: rgb.height(),
    };
    let plan = build_plan(src, params.max_width);

    let scaled;
    let pixels: &[u8] = if plan.is_identity() {
        rgb.as_raw()
    } else {
        let mut dst = vec![0u8; (plan.out.w as usize) * (plan.out.h as usize) * 3];
        scale_rgb_cpu(resizer, rgb.as_raw(), src, &plan, &mut dst)?;
        scaled = dst;
        &scaled
    };

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, params.quality)
        .encode(pixels, plan.out.w, plan.out.h, ExtendedColorType::Rgb8)
        .map_err(ScaleError::Encode)?;

    Ok(Encoded {
        bytes,
        size: plan.out,
    })
}
