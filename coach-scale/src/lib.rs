// SPDX-License-Identifier: MIT
//! # coach-scale: Frame Shrinking for Vision-Model Payloads
//!
//! This crate turns extracted video frames into smaller JPEGs so a batch of
//! them fits under a request byte budget. It is the image half of the
//! adaptive compressor in `slope_coach`; the feedback loop that decides
//! *which* width and quality to use lives there, this crate only executes
//! one width/quality setting on one image.
//!
//! ## Key Components
//!
//! - [`plan`]: Width-ceiling plan computation (aspect preserving, never upscales)
//! - [`cpu`]: CPU resize of packed RGB8 buffers using SIMD via `fast_image_resize`
//! - [`jpeg`]: Decode → optional resize → JPEG encode at a given quality
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use coach_scale::jpeg::{JpegParams, reencode_jpeg};
//!
//! let original = std::fs::read("frame_001.jpg")?;
//! let mut resizer = fast_image_resize::Resizer::new();
//! let encoded = reencode_jpeg(
//!     &mut resizer,
//!     &original,
//!     JpegParams { max_width: 512, quality: 70 },
//! )?;
//! std::fs::write("frame_001.jpg", &encoded.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cpu;
pub mod jpeg;
pub mod plan;

pub use cpu::ScaleError;
pub use plan::{ScalePlan, Size, build_plan};
