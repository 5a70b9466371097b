//! # Pipeline Orchestrator
//!
//! Sequences one request end to end:
//!
//! ```text
//! download -> extract -> initial compress -> budget loop -> assemble -> call
//! ```
//!
//! Every stage runs inside a [`Workspace`] guard, so the request directory is
//! removed however `run` returns. Any stage failure aborts the rest.

use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::client::{AnalysisResult, OpenAiClient, VisionModel};
use crate::compress::{CompressionState, Compressor};
use crate::config::CoachConfig;
use crate::download::{HttpFetcher, VideoFetcher, VideoSource};
use crate::error::{CoachError, CoachResult};
use crate::extract::{FfmpegExtractor, FrameExtractor};
use crate::payload::{AnalysisContext, build_payload};
use crate::workspace::Workspace;

/// Collaborator bundle for one or more sequential runs.
pub struct Pipeline {
    config: CoachConfig,
    fetcher: Box<dyn VideoFetcher + Send + Sync>,
    extractor: Box<dyn FrameExtractor + Send + Sync>,
    model: Box<dyn VisionModel + Send + Sync>,
}

impl Pipeline {
    pub fn new(
        config: CoachConfig,
        fetcher: Box<dyn VideoFetcher + Send + Sync>,
        extractor: Box<dyn FrameExtractor + Send + Sync>,
        model: Box<dyn VisionModel + Send + Sync>,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            model,
        }
    }

    /// Production collaborators: HTTP download, `ffmpeg`, OpenAI-compatible model.
    ///
    /// Builds blocking HTTP clients, so call it off any async executor thread.
    pub fn from_config(config: CoachConfig) -> CoachResult<Self> {
        config
            .validate()
            .map_err(|reason| CoachError::config("config", reason))?;
        let fetcher = HttpFetcher::new(&config.model)?;
        let extractor = FfmpegExtractor::new(config.extraction.ffmpeg_bin.clone());
        let model = OpenAiClient::new(&config.model)?;
        Ok(Self::new(
            config,
            Box::new(fetcher),
            Box::new(extractor),
            Box::new(model),
        ))
    }

    /// Analyse the video at `video_url` inside workspace `workspace_id`.
    pub fn run(
        &self,
        video_url: &str,
        workspace_id: &str,
        ctx: &AnalysisContext,
    ) -> CoachResult<AnalysisResult> {
        let _span = info_span!("pipeline", video_id = workspace_id).entered();
        let started = Instant::now();

        let source = VideoSource::parse(video_url)?;
        let workspace = Workspace::create(&self.config.workspace_root, workspace_id)?;

        let result = self.run_in(&source, &workspace, ctx);
        match &result {
            Ok(analysis) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                total_tokens = analysis.usage.total_tokens,
                "analysis complete"
            ),
            Err(e) => warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                kind = e.category(),
                stage = e.context().operation.as_deref().unwrap_or("setup"),
                error = %e,
                "analysis failed"
            ),
        }
        result
    }

    fn run_in(
        &self,
        source: &VideoSource,
        workspace: &Workspace,
        ctx: &AnalysisContext,
    ) -> CoachResult<AnalysisResult> {
        let video_path = workspace.path().join(source.file_name());
        self.fetcher
            .fetch(source, &video_path)
            .map_err(|e| e.with_operation("download"))?;

        let extraction = &self.config.extraction;
        let frames = workspace
            .frames_dir()
            .and_then(|dir| {
                self.extractor
                    .extract(&video_path, &dir, extraction.rate, extraction.max_frames)
            })
            .map_err(|e| e.with_operation("extract"))?;
        if frames.is_empty() {
            return Err(CoachError::no_frames(extraction.rate).with_operation("extract"));
        }

        let compression = &self.config.compression;
        let mut compressor = Compressor::new();
        compressor
            .compress_initial(&frames, compression.initial_width, compression.initial_quality)
            .and_then(|_| compressor.compress_to_budget(&frames, CompressionState::new(compression)))
            .map_err(|e| e.with_operation("compress"))?;

        let payload = build_payload(&frames, ctx, &self.config.model)
            .map_err(|e| e.with_operation("assemble"))?;
        self.model
            .analyze(&payload.request)
            .map_err(|e| e.with_operation("analyze"))
    }
}
