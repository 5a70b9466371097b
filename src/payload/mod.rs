//! # Payload Assembly
//!
//! Turns a compressed [`FrameSet`] and an [`AnalysisContext`] into one
//! [`ChatRequest`]: a system message carrying the coaching framing and a user
//! message mixing the instruction text with the frames as base64 data URLs.
//!
//! The only I/O is reading the frame files. Output is deterministic.

pub mod context;
pub mod prompt;
pub mod request;

use std::fs;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::error::{CoachError, CoachResult};
use crate::extract::FrameSet;

pub use context::{ActivityCategory, AnalysisContext, AnalysisFocus};
pub use request::{ChatMessage, ChatRequest, ContentPart, ImageUrl, MessageContent, Role};

/// Assembled request plus the observability-only token estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub request: ChatRequest,
    pub estimated_image_tokens: usize,
}

/// Rough token cost of one base64 image: a quarter of its encoded length.
pub fn estimate_tokens(base64_len: usize) -> usize {
    base64_len / 4
}

pub fn build_payload(
    frames: &FrameSet,
    ctx: &AnalysisContext,
    model: &ModelConfig,
) -> CoachResult<Payload> {
    let mut parts = Vec::with_capacity(frames.len() + 1);
    parts.push(ContentPart::Text {
        text: prompt::user_prompt(ctx, frames.len(), frames.interval()),
    });

    let mut estimated_image_tokens = 0;
    for frame in frames.frames() {
        let bytes = fs::read(&frame.path)
            .map_err(|e| CoachError::io_at("read frame", &frame.path, e))?;
        let encoded = STANDARD.encode(&bytes);
        let tokens = estimate_tokens(encoded.len());
        debug!(frame = frame.index + 1, bytes = bytes.len(), tokens, "frame encoded");
        estimated_image_tokens += tokens;
        parts.push(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/jpeg;base64,{}", encoded),
            },
        });
    }

    info!(
        frames = frames.len(),
        estimated_image_tokens,
        category = %ctx.category,
        standard = %ctx.standard,
        focus = %ctx.focus,
        "payload assembled"
    );

    Ok(Payload {
        request: ChatRequest {
            model: model.model.clone(),
            temperature: model.temperature,
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: MessageContent::Text(prompt::system_prompt(ctx)),
                },
                ChatMessage {
                    role: Role::User,
                    content: MessageContent::Parts(parts),
                },
            ],
        },
        estimated_image_tokens,
    })
}
