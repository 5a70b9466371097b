//! # Slope Coach
//!
//! Turns a ski or snowboard video URL into machine-readable technique feedback
//! from a vision-capable language model.
//!
//! ## Architecture
//!
//! - `download`: fetch the source video into the request workspace
//! - `extract`: sample still frames with an external decode tool
//! - `compress`: shrink the frames in place until they fit the payload budget
//! - `payload`: encode frames and build the coaching prompt
//! - `client`: the single remote model call
//! - `pipeline`: sequences the stages inside a self-cleaning `workspace`
//! - `server`: `POST /analyze` HTTP layer
//!
//! ## Example
//!
//! ```rust,no_run
//! use slope_coach::{AnalysisContext, CoachConfig, analyze_video};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoachConfig::from_env();
//! let result = analyze_video(&config, "https://example.com/run.mp4", "run-1", &AnalysisContext::default())?;
//! println!("{}", result.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod compress;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
#[cfg(test)]
mod http_stub;
pub mod logging;
pub mod payload;
pub mod pipeline;
pub mod server;
pub mod workspace;

pub use client::{AnalysisResult, OpenAiClient, Usage, VisionModel};
pub use compress::{CompressionReport, CompressionState, Compressor};
pub use config::{CoachConfig, CompressionConfig, ExtractionConfig, ModelConfig};
pub use download::{HttpFetcher, VideoFetcher, VideoSource};
pub use error::{CoachError, CoachResult, ErrorContext};
pub use extract::{FfmpegExtractor, Frame, FrameExtractor, FrameSet};
pub use payload::{ActivityCategory, AnalysisContext, AnalysisFocus, Payload, build_payload};
pub use pipeline::Pipeline;
pub use workspace::Workspace;

/// Run the full pipeline once with production collaborators.
///
/// Blocking; do not call from inside an async runtime.
pub fn analyze_video(
    config: &CoachConfig,
    video_url: &str,
    video_id: &str,
    ctx: &AnalysisContext,
) -> CoachResult<AnalysisResult> {
    Pipeline::from_config(config.clone())?.run(video_url, video_id, ctx)
}
