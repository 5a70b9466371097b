//! # Pipeline Configuration
//!
//! Configuration structures and validation for the technique-analysis pipeline.
//! The same [`CoachConfig`] is shared by the CLI, the HTTP layer and tests; it
//! is an explicit value passed into constructors, never a process-wide global.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Default | Description |
//! |-----------|---------|-------------|
//! | `extraction.rate` | 1.5 | Frames sampled per second of video |
//! | `extraction.max_frames` | 20 | Upper bound on extracted frames (1-20) |
//! | `compression.initial_width` / `initial_quality` | 512 / 70 | Single-pass shrink before the budget loop |
//! | `compression.budget_bytes` | 650 KiB | Aggregate frame size the loop aims for |
//! | `compression.shrink_factor` | 0.85 | Width multiplier per round |
//! | `compression.quality_step` | 5 | Quality decrement per round |
//! | `compression.min_quality` / `min_width` | 50 / 256 | Floors that bound the loop |
//! | `model.model` | `gpt-4o` | Vision-capable chat model |
//! | `model.temperature` | 0.2 | Sampling temperature |
//!
//! ## Environment
//!
//! [`CoachConfig::from_env`] reads `OPENAI_API_KEY`, `COACH_API_BASE`,
//! `COACH_MODEL`, `COACH_TEMPERATURE`, `COACH_WORKSPACE_ROOT`, `COACH_FFMPEG`,
//! `COACH_BIND` and `COACH_PORT`. Unset or unparsable values fall back to the
//! defaults above.
//!
//! ## Examples
//!
//! ```rust
//! use slope_coach::config::CoachConfig;
//!
//! let config = CoachConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.extraction.max_frames, 20);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Hard ceiling on frames per request.
pub const MAX_FRAMES_LIMIT: usize = 20;

/// Frame sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Sampling rate in frames per second.
    pub rate: f64,
    /// Maximum number of frames written by the extractor.
    pub max_frames: usize,
    /// Decode tool binary (resolved through `PATH` when not absolute).
    pub ffmpeg_bin: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            rate: 1.5,
            max_frames: MAX_FRAMES_LIMIT,
            ffmpeg_bin: "ffmpeg".to_string(),
        }
    }
}

/// Parameters of the single-pass and adaptive compression stages.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionConfig {
    pub initial_width: u32,
    pub initial_quality: u8,
    pub budget_bytes: u64,
    pub shrink_factor: f64,
    pub quality_step: u8,
    pub min_quality: u8,
    pub min_width: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            initial_width: 512,
            initial_quality: 70,
            budget_bytes: 650 * 1024,
            shrink_factor: 0.85,
            quality_step: 5,
            min_quality: 50,
            min_width: 256,
        }
    }
}

/// Vision-model endpoint settings.
///
/// The API key is held here rather than in process state; `Debug` output masks it.
#[derive(Clone, PartialEq)]
pub struct ModelConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Whole-request timeout for the analysis call.
    pub request_timeout: Duration,
    /// Whole-request timeout for downloading the source video.
    pub download_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            request_timeout: Duration::from_secs(180),
            download_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(15),
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .field("download_timeout", &self.download_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Top-level configuration for the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachConfig {
    /// Directory under which per-request workspaces are created.
    pub workspace_root: PathBuf,
    pub extraction: ExtractionConfig,
    pub compression: CompressionConfig,
    pub model: ModelConfig,
    /// HTTP bind address
    pub bind_address: String,
    /// HTTP port
    pub port: u16,
}

impl Default for CoachConfig {
    /// `temp/` workspaces under the working directory, loopback-only HTTP on port 5000.
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("temp"),
            extraction: ExtractionConfig::default(),
            compression: CompressionConfig::default(),
            model: ModelConfig::default(),
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl CoachConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Load configuration from a provided variable map (useful for testing).
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

        Self {
            workspace_root: get("COACH_WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
            extraction: ExtractionConfig {
                ffmpeg_bin: get("COACH_FFMPEG").unwrap_or(defaults.extraction.ffmpeg_bin),
                ..defaults.extraction
            },
            compression: defaults.compression,
            model: ModelConfig {
                api_base: get("COACH_API_BASE").unwrap_or(defaults.model.api_base),
                api_key: get("OPENAI_API_KEY"),
                model: get("COACH_MODEL").unwrap_or(defaults.model.model),
                temperature: get("COACH_TEMPERATURE")
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(defaults.model.temperature),
                ..defaults.model
            },
            bind_address: get("COACH_BIND").unwrap_or(defaults.bind_address),
            port: get("COACH_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Validates the configuration parameters.
    ///
    /// The API key is deliberately not required here; the analysis client
    /// rejects a missing key when it is constructed.
    pub fn validate(&self) -> Result<(), String> {
        let e = &self.extraction;
        if !(e.rate.is_finite() && e.rate > 0.0) {
            return Err("Sampling rate must be a positive number of frames per second".to_string());
        }
        if !(1..=MAX_FRAMES_LIMIT).contains(&e.max_frames) {
            return Err(format!("max_frames must be between 1 and {}", MAX_FRAMES_LIMIT));
        }

        let c = &self.compression;
        if c.budget_bytes == 0 {
            return Err("Compression budget must be greater than 0 bytes".to_string());
        }
        if !(c.shrink_factor > 0.0 && c.shrink_factor < 1.0) {
            return Err("Shrink factor must be strictly between 0 and 1".to_string());
        }
        if c.min_width == 0 || c.initial_width < c.min_width {
            return Err("Width floor must be at least 1 and not above the initial width".to_string());
        }
        if c.min_quality == 0 || c.min_quality > c.initial_quality || c.initial_quality > 100 {
            return Err("Quality must satisfy 1 <= min_quality <= initial_quality <= 100".to_string());
        }

        let m = &self.model;
        if m.api_base.trim().is_empty() {
            return Err("API base URL must not be empty".to_string());
        }
        if m.model.trim().is_empty() {
            return Err("Model name must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&m.temperature) {
            return Err("Temperature must be between 0.0 and 2.0".to_string());
        }
        Ok(())
    }
}
