//! # Adaptive Frame Compression
//!
//! Shrinks the extracted frames in place until their aggregate size fits the
//! request budget or the width floor is reached.
//!
//! ## Algorithm
//!
//! 1. **Initial pass** ([`Compressor::compress_initial`]): every frame is
//!    capped at 512px wide and re-encoded at quality 70, regardless of budget.
//! 2. **Budget loop** ([`Compressor::compress_to_budget`]): measure the total
//!    size, feed it to [`CompressionState::advance`], and if not done re-apply
//!    the new (smaller) width ceiling and (lower) quality to every frame.
//!
//! The loop is best effort. Width strictly decreases each round and is clamped
//! to `min_width`, so it always terminates, at the latest after
//! [`CompressionState::round_limit`] rounds, possibly still over budget.
//!
//! Frames are processed sequentially; each round's decision depends on the
//! aggregate size of all of them.

use std::fs;

use coach_scale::jpeg::{JpegParams, reencode_jpeg};
use fast_image_resize::Resizer;
use tracing::{debug, info, warn};

use crate::config::CompressionConfig;
use crate::error::{CoachError, CoachResult};
use crate::extract::FrameSet;

/// Width/quality ratchet of the budget loop.
///
/// `advance` is a pure function of the state and a measured size, so
/// convergence can be tested without touching the filesystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionState {
    pub target_bytes: u64,
    /// Current width ceiling in pixels.
    pub width: u32,
    pub quality: u8,
    pub min_width: u32,
    pub min_quality: u8,
    pub shrink_factor: f64,
    pub quality_step: u8,
    /// Completed shrink rounds.
    pub round: u32,
}

impl CompressionState {
    /// Starting state: the initial-pass width/quality, zero rounds.
    pub fn new(config: &CompressionConfig) -> Self {
        Self {
            target_bytes: config.budget_bytes,
            width: config.initial_width,
            quality: config.initial_quality,
            min_width: config.min_width,
            min_quality: config.min_quality,
            shrink_factor: config.shrink_factor,
            quality_step: config.quality_step,
            round: 0,
        }
    }

    /// One step of the loop given the size measured after the previous round.
    ///
    /// Returns the next state and whether the loop is done. Done means the
    /// budget is met or the width has reached the floor; in that case the
    /// state is returned unchanged.
    pub fn advance(self, measured_bytes: u64) -> (Self, bool) {
        if measured_bytes <= self.target_bytes || self.width <= self.min_width {
            return (self, true);
        }
        let shrunk = (self.width as f64 * self.shrink_factor).floor() as u32;
        // width > min_width here, so width - 1 >= min_width.
        let width = shrunk.min(self.width - 1).max(self.min_width);
        let quality = self
            .quality
            .saturating_sub(self.quality_step)
            .max(self.min_quality);
        (
            Self {
                width,
                quality,
                round: self.round + 1,
                ..self
            },
            false,
        )
    }

    /// Upper bound on rounds from the current width to the floor:
    /// `ceil(ln(min_width / width) / ln(shrink_factor))`.
    pub fn round_limit(&self) -> u32 {
        if self.width <= self.min_width {
            return 0;
        }
        let ratio = self.min_width as f64 / self.width as f64;
        (ratio.ln() / self.shrink_factor.ln()).ceil() as u32
    }
}

/// Outcome of the budget loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionReport {
    pub rounds: u32,
    pub width: u32,
    pub quality: u8,
    pub start_bytes: u64,
    pub final_bytes: u64,
    pub within_budget: bool,
}

/// Re-encodes frame files in place.
pub struct Compressor {
    resizer: Resizer,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
        }
    }

    /// Single pass at a fixed width ceiling and quality, independent of budget.
    pub fn compress_initial(&mut self, frames: &FrameSet, width: u32, quality: u8) -> CoachResult<u64> {
        self.apply(frames, JpegParams { max_width: width, quality })?;
        let total = frames.total_bytes()?;
        info!(frames = frames.len(), width, quality, bytes = total, "initial compression pass done");
        Ok(total)
    }

    /// Run the budget loop starting from `state`.
    pub fn compress_to_budget(
        &mut self,
        frames: &FrameSet,
        mut state: CompressionState,
    ) -> CoachResult<CompressionReport> {
        let start_bytes = frames.total_bytes()?;
        let mut measured = start_bytes;
        let last_round = state.round + state.round_limit();

        loop {
            let (next, done) = state.advance(measured);
            if done || next.round > last_round {
                break;
            }
            state = next;
            self.apply(
                frames,
                JpegParams {
                    max_width: state.width,
                    quality: state.quality,
                },
            )?;
            measured = frames.total_bytes()?;
            debug!(
                round = state.round,
                width = state.width,
                quality = state.quality,
                bytes = measured,
                target = state.target_bytes,
                "compression round"
            );
        }

        let report = CompressionReport {
            rounds: state.round,
            width: state.width,
            quality: state.quality,
            start_bytes,
            final_bytes: measured,
            within_budget: measured <= state.target_bytes,
        };
        if report.within_budget {
            info!(rounds = report.rounds, bytes = report.final_bytes, width = report.width, quality = report.quality, "frames within budget");
        } else {
            warn!(
                rounds = report.rounds,
                bytes = report.final_bytes,
                target = state.target_bytes,
                width = report.width,
                "width floor reached above budget; continuing"
            );
        }
        Ok(report)
    }

    fn apply(&mut self, frames: &FrameSet, params: JpegParams) -> CoachResult<()> {
        for frame in frames.frames() {
            let input = fs::read(&frame.path)
                .map_err(|e| CoachError::io_at("read frame", &frame.path, e))?;
            let encoded = reencode_jpeg(&mut self.resizer, &input, params)
                .map_err(|e| CoachError::compression(Some(&frame.path), e))?;
            fs::write(&frame.path, &encoded.bytes)
                .map_err(|e| CoachError::io_at("write frame", &frame.path, e))?;
        }
        Ok(())
    }
}
