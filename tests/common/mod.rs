//! Shared fixtures and collaborator doubles for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use slope_coach::client::{AnalysisResult, Usage, VisionModel};
use slope_coach::config::CoachConfig;
use slope_coach::download::{VideoFetcher, VideoSource};
use slope_coach::error::{CoachError, CoachResult};
use slope_coach::extract::{FrameExtractor, FrameSet, collect_frames};
use slope_coach::payload::{ChatRequest, ContentPart, MessageContent};
use slope_coach::pipeline::Pipeline;

pub const VIDEO_URL: &str = "https://cdn.example.com/runs/slalom.mp4";
pub const MODEL_REPLY: &str = r#"{"issue_count": 0, "issues": [], "score": 90, "score_reason": "clean"}"#;

/// High-entropy JPEG so re-encoding has detail to discard.
pub fn noisy_jpeg(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761) | 1;
    let img = RgbImage::from_fn(width, height, |x, y| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let n = (state >> 24) as u8;
        Rgb([n, (x as u8) ^ n, (y as u8).wrapping_add(n / 2)])
    });
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 95)
        .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// Write `count` numbered fixture frames into `dir` and return their paths.
pub fn write_frames(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    (1..=count)
        .map(|i| {
            let path = dir.join(format!("frame_{:03}.jpg", i));
            fs::write(&path, noisy_jpeg(width, height, i as u32)).unwrap();
            path
        })
        .collect()
}

pub fn frame_widths(frames: &FrameSet) -> Vec<u32> {
    frames
        .frames()
        .iter()
        .map(|f| image::image_dimensions(&f.path).unwrap().0)
        .collect()
}

/// Writes a few placeholder bytes, or fails like an unreachable host.
pub struct FakeFetcher {
    pub fail: bool,
}

impl VideoFetcher for FakeFetcher {
    fn fetch(&self, source: &VideoSource, dest: &Path) -> CoachResult<u64> {
        if self.fail {
            return Err(CoachError::download(source.url().as_str(), "HTTP status 404 Not Found"));
        }
        fs::write(dest, b"not really a video").unwrap();
        Ok(18)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ExtractMode {
    /// Stage this many fixture frames of the given size (capped by `max_frames`).
    Frames { count: usize, width: u32, height: u32 },
    /// Stage undecodable `.jpg` files.
    Corrupt { count: usize },
    /// Succeed with nothing written.
    Empty,
    /// Behave like a decode tool exiting non-zero.
    Fail,
}

pub struct FakeExtractor {
    pub mode: ExtractMode,
}

impl FrameExtractor for FakeExtractor {
    fn extract(
        &self,
        video: &Path,
        output_dir: &Path,
        rate: f64,
        max_frames: usize,
    ) -> CoachResult<FrameSet> {
        assert!(video.is_file(), "extractor ran before the video was downloaded");
        match self.mode {
            ExtractMode::Frames { count, width, height } => {
                write_frames(output_dir, count.min(max_frames), width, height);
            }
            ExtractMode::Corrupt { count } => {
                for i in 1..=count.min(max_frames) {
                    fs::write(output_dir.join(format!("frame_{:03}.jpg", i)), b"garbage").unwrap();
                }
            }
            ExtractMode::Empty => {}
            ExtractMode::Fail => {
                return Err(CoachError::extraction_exit(Some(1), "moov atom not found"));
            }
        }
        Ok(FrameSet::sampled_at(collect_frames(output_dir, max_frames)?, rate))
    }
}

/// Records every request it receives and replies with [`MODEL_REPLY`].
#[derive(Clone, Default)]
pub struct FakeModel {
    pub fail: bool,
    pub seen: Arc<Mutex<Vec<ChatRequest>>>,
}

impl FakeModel {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ChatRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

impl VisionModel for FakeModel {
    fn analyze(&self, request: &ChatRequest) -> CoachResult<AnalysisResult> {
        self.seen.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(CoachError::remote_call("rate limit exceeded", Some(429)));
        }
        Ok(AnalysisResult {
            content: MODEL_REPLY.to_string(),
            usage: Usage {
                prompt_tokens: 1000,
                completion_tokens: 50,
                total_tokens: 1050,
            },
            model: request.model.clone(),
        })
    }
}

/// Data URLs of the images in a request's user message, in order.
pub fn image_urls(request: &ChatRequest) -> Vec<String> {
    request
        .messages
        .iter()
        .filter_map(|m| match &m.content {
            MessageContent::Parts(parts) => Some(parts),
            MessageContent::Text(_) => None,
        })
        .flatten()
        .filter_map(|p| match p {
            ContentPart::ImageUrl { image_url } => Some(image_url.url.clone()),
            ContentPart::Text { .. } => None,
        })
        .collect()
}

pub fn config_in(root: &Path) -> CoachConfig {
    CoachConfig {
        workspace_root: root.to_path_buf(),
        ..CoachConfig::default()
    }
}

pub fn pipeline(root: &Path, fetch_fails: bool, mode: ExtractMode, model: FakeModel) -> Pipeline {
    Pipeline::new(
        config_in(root),
        Box::new(FakeFetcher { fail: fetch_fails }),
        Box::new(FakeExtractor { mode }),
        Box::new(model),
    )
}

/// Entries left under a workspace root.
pub fn leftovers(root: &Path) -> Vec<PathBuf> {
    match fs::read_dir(root) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}
