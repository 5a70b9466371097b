//! # Frame Extraction
//!
//! Samples still frames from a downloaded video. The pipeline only depends on
//! the [`FrameExtractor`] trait; [`ffmpeg::FfmpegExtractor`] is the production
//! implementation and tests substitute a double that stages fixture images.
//!
//! Frames are written as `frame_001.jpg`, `frame_002.jpg`, … so lexicographic
//! order of the file names is capture order.

pub mod ffmpeg;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoachError, CoachResult};

pub use ffmpeg::FfmpegExtractor;

/// Output file pattern handed to the decode tool.
pub const FRAME_PATTERN: &str = "frame_%03d.jpg";

/// One extracted still.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 0-based position in capture order.
    pub index: usize,
    pub path: PathBuf,
}

impl Frame {
    /// Capture time of this frame in seconds for a given sampling interval.
    pub fn timestamp(&self, interval: f64) -> f64 {
        self.index as f64 * interval
    }
}

/// Frames from one video, ordered by capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    frames: Vec<Frame>,
    interval: f64,
}

impl FrameSet {
    /// Build a set from paths already in capture order.
    pub fn new(paths: Vec<PathBuf>, interval: f64) -> Self {
        let frames = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Frame { index, path })
            .collect();
        Self { frames, interval }
    }

    /// Build a set from paths sampled at `rate` frames per second.
    pub fn sampled_at(paths: Vec<PathBuf>, rate: f64) -> Self {
        Self::new(paths, 1.0 / rate)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Seconds between consecutive frames.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Sum of the frames' current on-disk sizes.
    pub fn total_bytes(&self) -> CoachResult<u64> {
        self.frames.iter().try_fold(0u64, |acc, frame| {
            let len = fs::metadata(&frame.path)
                .map_err(|e| CoachError::io_at("stat frame", &frame.path, e))?
                .len();
            Ok(acc + len)
        })
    }
}

/// Narrow seam around the external decode tool.
pub trait FrameExtractor {
    /// Sample `video` at `rate` frames per second into `output_dir`, writing at
    /// most `max_frames` images, and return them in capture order.
    fn extract(
        &self,
        video: &Path,
        output_dir: &Path,
        rate: f64,
        max_frames: usize,
    ) -> CoachResult<FrameSet>;
}

/// List the `.jpg` files of `dir` in lexicographic order, keeping at most `max_frames`.
pub fn collect_frames(dir: &Path, max_frames: usize) -> CoachResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| CoachError::io_at("list frames", dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| CoachError::io_at("list frames", dir, e))?
            .path();
        let is_jpg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"));
        if is_jpg && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    paths.truncate(max_frames);
    Ok(paths)
}
