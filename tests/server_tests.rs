mod common;

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::*;
use slope_coach::config::CoachConfig;
use slope_coach::pipeline::Pipeline;
use slope_coach::server::{AnalyzeResponse, AppState, PipelineFactory, router};

fn app(root: PathBuf, mode: ExtractMode, model: FakeModel) -> axum::Router {
    let config = config_in(&root);
    let factory: PipelineFactory = Arc::new(move |config: &CoachConfig| {
        Ok(Pipeline::new(
            config.clone(),
            Box::new(FakeFetcher { fail: false }),
            Box::new(FakeExtractor { mode }),
            Box::new(model.clone()),
        ))
    });
    router(AppState::with_factory(config, factory))
}

async fn post_analyze(app: axum::Router, body: serde_json::Value) -> (StatusCode, AnalyzeResponse) {
    let response = app
        .oneshot(
            Request::post("/analyze")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let root = tempfile::tempdir().unwrap();
    let response = app(root.path().to_path_buf(), ExtractMode::Empty, FakeModel::default())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
}

#[tokio::test]
async fn analyze_success_echoes_id_and_raw_result() {
    let root = tempfile::tempdir().unwrap();
    let app = app(
        root.path().to_path_buf(),
        ExtractMode::Frames { count: 2, width: 160, height: 90 },
        FakeModel::default(),
    );

    let (status, body) = post_analyze(
        app,
        serde_json::json!({
            "video_url": VIDEO_URL,
            "video_id": "lesson-42",
            "category": "ski",
            "standard": "PSIA",
            "type": "fluidity"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.video_id, "lesson-42");
    assert_eq!(body.status, "success");
    assert_eq!(body.analysis_result.as_deref(), Some(MODEL_REPLY));
    assert!(body.message.is_none());
    assert!(leftovers(root.path()).is_empty());
}

#[tokio::test]
async fn missing_video_id_gets_a_generated_one() {
    let root = tempfile::tempdir().unwrap();
    let app = app(
        root.path().to_path_buf(),
        ExtractMode::Frames { count: 1, width: 160, height: 90 },
        FakeModel::default(),
    );

    let (status, body) = post_analyze(app, serde_json::json!({ "video_url": VIDEO_URL })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(uuid::Uuid::parse_str(&body.video_id).is_ok());
}

#[tokio::test]
async fn pipeline_failure_maps_to_500() {
    let root = tempfile::tempdir().unwrap();
    let app = app(root.path().to_path_buf(), ExtractMode::Fail, FakeModel::default());

    let (status, body) = post_analyze(
        app,
        serde_json::json!({ "video_url": VIDEO_URL, "video_id": "broken" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.video_id, "broken");
    assert_eq!(body.status, "error");
    assert!(body.message.unwrap().contains("Frame extraction failed"));
    assert!(body.analysis_result.is_none());
    assert!(leftovers(root.path()).is_empty());
}

#[tokio::test]
async fn missing_url_and_unknown_focus_are_errors() {
    let root = tempfile::tempdir().unwrap();
    let model = FakeModel::default();

    let (status, body) = post_analyze(
        app(root.path().to_path_buf(), ExtractMode::Empty, model.clone()),
        serde_json::json!({ "video_id": "no-url" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.message.unwrap().contains("video_url"));

    let (status, _) = post_analyze(
        app(root.path().to_path_buf(), ExtractMode::Empty, model.clone()),
        serde_json::json!({ "video_url": VIDEO_URL, "type": "speed" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(model.calls(), 0);
}
