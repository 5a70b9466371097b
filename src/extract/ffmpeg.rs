// # FFmpeg Frame Extractor
//
// Runs the decode tool as a child process:
//
// ```text
// ffmpeg -hide_banner -loglevel error -y -i <video> \
//        -vf fps=<rate> -frames:v <max> <dir>/frame_%03d.jpg
// ```
//
// Exit status is the only success signal; on failure the tail of stderr is
// attached to the error so corrupt-container and missing-codec cases are
// distinguishable in logs.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use super::{FRAME_PATTERN, FrameExtractor, FrameSet, collect_frames};
use crate::error::{CoachError, CoachResult};

/// Bytes of stderr kept in an extraction error.
const STDERR_TAIL: usize = 600;

/// Frame extractor backed by an `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    bin: String,
}

impl FfmpegExtractor {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Argument vector for one extraction run.
    pub fn args(video: &Path, output_dir: &Path, rate: f64, max_frames: usize) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            video.display().to_string(),
            "-vf".to_string(),
            format!("fps={}", rate),
            "-frames:v".to_string(),
            max_frames.to_string(),
            output_dir.join(FRAME_PATTERN).display().to_string(),
        ]
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(
        &self,
        video: &Path,
        output_dir: &Path,
        rate: f64,
        max_frames: usize,
    ) -> CoachResult<FrameSet> {
        let args = Self::args(video, output_dir, rate, max_frames);
        debug!(bin = %self.bin, args = ?args, "spawning ffmpeg for frame extraction");

        let output = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                CoachError::extraction(format!("failed to start {} (is it installed and on PATH?): {}", self.bin, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = tail(stderr.trim(), STDERR_TAIL);
            error!(video = %video.display(), status = ?output.status, stderr = %tail, "ffmpeg frame extraction failed");
            return Err(CoachError::extraction_exit(
                output.status.code(),
                if tail.is_empty() {
                    format!("{} exited with {}", self.bin, output.status)
                } else {
                    tail.to_string()
                },
            )
            .with_metadata("video", video.display().to_string()));
        }

        let paths = collect_frames(output_dir, max_frames)?;
        info!(frames = paths.len(), rate, max_frames, "frames extracted");
        Ok(FrameSet::sampled_at(paths, rate))
    }
}

fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
