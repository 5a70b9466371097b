//! HTTP layer.
//!
//! `POST /analyze` runs one pipeline per request on the blocking pool and maps
//! the outcome to `200 {video_id, status: "success", analysis_result}` or
//! `500 {video_id, status: "error", message}`. `GET /health` is a liveness check.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::CoachConfig;
use crate::error::{CoachError, CoachResult};
use crate::payload::AnalysisContext;
use crate::pipeline::Pipeline;

/// Builds the collaborators for one request. Called on a blocking thread.
pub type PipelineFactory = Arc<dyn Fn(&CoachConfig) -> CoachResult<Pipeline> + Send + Sync>;

/// State shared by all routes.
#[derive(Clone)]
pub struct AppState {
    config: Arc<CoachConfig>,
    factory: PipelineFactory,
}

impl AppState {
    /// Production state: every request gets fresh HTTP, ffmpeg and model collaborators.
    pub fn new(config: CoachConfig) -> Self {
        Self::with_factory(config, Arc::new(|config: &CoachConfig| Pipeline::from_config(config.clone())))
    }

    pub fn with_factory(config: CoachConfig, factory: PipelineFactory) -> Self {
        Self {
            config: Arc::new(config),
            factory,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub standard: Option<String>,
    /// Analysis focus (`fluidity` or `edge-control`).
    #[serde(default, rename = "type")]
    pub focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub video_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalyzeResponse {
    fn success(video_id: String, analysis_result: String) -> Self {
        Self {
            video_id,
            status: "success".to_string(),
            analysis_result: Some(analysis_result),
            message: None,
        }
    }

    fn failure(video_id: String, message: String) -> Self {
        Self {
            video_id,
            status: "error".to_string(),
            analysis_result: None,
            message: Some(message),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> (StatusCode, Json<AnalyzeResponse>) {
    let video_id = body
        .video_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(video_id = %video_id, url = ?body.video_url, "analyze request");

    let id = video_id.clone();
    let outcome = tokio::task::spawn_blocking(move || run_request(&state, &body, &id)).await;

    match outcome {
        Ok(Ok(content)) => (StatusCode::OK, Json(AnalyzeResponse::success(video_id, content))),
        Ok(Err(e)) => {
            error!(video_id = %video_id, kind = e.category(), error = %e, "analyze request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalyzeResponse::failure(video_id, e.to_string())),
            )
        }
        Err(join) => {
            error!(video_id = %video_id, error = %join, "analysis worker aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalyzeResponse::failure(video_id, format!("analysis worker aborted: {}", join))),
            )
        }
    }
}

fn run_request(state: &AppState, body: &AnalyzeRequest, video_id: &str) -> CoachResult<String> {
    let video_url = body
        .video_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| CoachError::validation("video_url", "is required", ""))?;
    let ctx = AnalysisContext::from_fields(
        body.category.as_deref(),
        body.standard.as_deref(),
        body.focus.as_deref(),
    )?;
    let pipeline = (state.factory)(&state.config)?;
    Ok(pipeline.run(video_url, video_id, &ctx)?.content)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: CoachConfig) -> Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    let app = router(AppState::new(config));

    info!("coaching server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
