//! # Pipeline Error Handling
//!
//! Every stage of the analysis pipeline reports failure through [`CoachError`].
//! All variants are fatal to the request that produced them: nothing in the
//! pipeline retries, and the HTTP layer only ever shows the `Display` text.
//!
//! ## Error Taxonomy
//!
//! | Variant | Raised by | Typical cause |
//! |---------|-----------|---------------|
//! | `Download` | video fetcher | DNS/TLS failure, non-2xx status, short read |
//! | `Extraction` | frame extractor | ffmpeg missing, corrupt container, unsupported codec |
//! | `NoFrames` | orchestrator | extractor succeeded but produced no images |
//! | `Compression` | adaptive compressor | decode/resize/encode failure on a frame |
//! | `RemoteCall` | analysis client | auth, rate limit, network, malformed response |
//! | `Config` / `Validation` | config + request parsing | bad settings or request fields |
//! | `Io` | any stage | filesystem errors around the workspace |
//!
//! ## Usage
//!
//! ```rust
//! use slope_coach::error::CoachError;
//!
//! let error = CoachError::extraction("ffmpeg exited with status 1")
//!     .with_operation("extract_frames")
//!     .with_metadata("video", "input.mp4");
//!
//! assert_eq!(error.category(), "extraction");
//! ```

use std::{collections::HashMap, error::Error as StdError, fmt, path::Path};

/// Metadata about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The pipeline stage being performed when the error occurred
    pub operation: Option<String>,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base error type for the analysis pipeline
#[derive(Debug)]
pub enum CoachError {
    /// Fetching the source video failed
    Download {
        url: String,
        reason: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
    /// The frame extraction process failed
    Extraction {
        reason: String,
        exit_code: Option<i32>,
        context: ErrorContext,
    },
    /// Extraction succeeded but produced no frames
    NoFrames {
        rate: f64,
        context: ErrorContext,
    },
    /// Decoding, resizing or encoding a frame failed
    Compression {
        frame: Option<String>,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
    /// The vision model call failed
    RemoteCall {
        reason: String,
        status: Option<u16>,
        source: Option<Box<dyn StdError + Send + Sync>>,
        context: ErrorContext,
    },
    /// Configuration errors
    Config {
        field: String,
        reason: String,
        context: ErrorContext,
    },
    /// Request validation errors
    Validation {
        field: String,
        constraint: String,
        value: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: String,
        source: std::io::Error,
        context: ErrorContext,
    },
}

impl CoachError {
    /// Create a download error
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
            source: None,
            context: ErrorContext::new(),
        }
    }

    /// Create a download error wrapping the transport failure
    pub fn download_from(
        url: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Download {
            url: url.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
            context: ErrorContext::new(),
        }
    }

    /// Create an extraction error
    pub fn extraction(reason: impl Into<String>) -> Self {
        Self::Extraction {
            reason: reason.into(),
            exit_code: None,
            context: ErrorContext::new(),
        }
    }

    /// Create an extraction error for a process that exited unsuccessfully
    pub fn extraction_exit(exit_code: Option<i32>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            reason: reason.into(),
            exit_code,
            context: ErrorContext::new(),
        }
    }

    /// Create an empty frame set error
    pub fn no_frames(rate: f64) -> Self {
        Self::NoFrames {
            rate,
            context: ErrorContext::new(),
        }
    }

    /// Create a compression error for one frame
    pub fn compression(
        frame: Option<&Path>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Compression {
            frame: frame.map(|p| p.display().to_string()),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Create a remote call error without an underlying cause
    pub fn remote_call(reason: impl Into<String>, status: Option<u16>) -> Self {
        Self::RemoteCall {
            reason: reason.into(),
            status,
            source: None,
            context: ErrorContext::new(),
        }
    }

    /// Create a remote call error wrapping the transport failure
    pub fn remote_call_from(source: impl StdError + Send + Sync + 'static) -> Self {
        Self::RemoteCall {
            reason: source.to_string(),
            status: None,
            source: Some(Box::new(source)),
            context: ErrorContext::new(),
        }
    }

    /// Create a configuration error
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error tied to a path
    pub fn io_at(operation: impl Into<String>, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.display().to_string(),
            source,
            context: ErrorContext::new(),
        }
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Download { context, .. } => context,
            Self::Extraction { context, .. } => context,
            Self::NoFrames { context, .. } => context,
            Self::Compression { context, .. } => context,
            Self::RemoteCall { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Download { context, .. } => context,
            Self::Extraction { context, .. } => context,
            Self::NoFrames { context, .. } => context,
            Self::Compression { context, .. } => context,
            Self::RemoteCall { context, .. } => context,
            Self::Config { context, .. } => context,
            Self::Validation { context, .. } => context,
            Self::Io { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Download { .. } => "download",
            Self::Extraction { .. } => "extraction",
            Self::NoFrames { .. } => "no_frames",
            Self::Compression { .. } => "compression",
            Self::RemoteCall { .. } => "remote_call",
            Self::Config { .. } => "config",
            Self::Validation { .. } => "validation",
            Self::Io { .. } => "io",
        }
    }
}

impl fmt::Display for CoachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoachError::Download { url, reason, .. } => {
                write!(f, "Failed to download video from {}: {}", url, reason)
            }
            CoachError::Extraction {
                reason, exit_code, ..
            } => {
                if let Some(code) = exit_code {
                    write!(f, "Frame extraction failed (exit code {}): {}", code, reason)
                } else {
                    write!(f, "Frame extraction failed: {}", reason)
                }
            }
            CoachError::NoFrames { rate, .. } => {
                write!(
                    f,
                    "Frame extraction produced no frames at {} fps; the video may be too short or empty",
                    rate
                )
            }
            CoachError::Compression { frame, source, .. } => {
                if let Some(frame) = frame {
                    write!(f, "Compression failed for '{}': {}", frame, source)
                } else {
                    write!(f, "Compression failed: {}", source)
                }
            }
            CoachError::RemoteCall { reason, status, .. } => {
                if let Some(status) = status {
                    write!(f, "Analysis call failed (HTTP {}): {}", status, reason)
                } else {
                    write!(f, "Analysis call failed: {}", reason)
                }
            }
            CoachError::Config { field, reason, .. } => {
                write!(f, "Configuration error in '{}': {}", field, reason)
            }
            CoachError::Validation {
                field,
                constraint,
                value,
                ..
            } => {
                write!(
                    f,
                    "Validation failed for '{}': {} (value: {})",
                    field, constraint, value
                )
            }
            CoachError::Io {
                operation,
                path,
                source,
                ..
            } => write!(f, "I/O error during {} on '{}': {}", operation, path, source),
        }
    }
}

impl StdError for CoachError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Compression { source, .. } => Some(source.as_ref()),
            Self::Download {
                source: Some(source),
                ..
            }
            | Self::RemoteCall {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type CoachResult<T> = Result<T, CoachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = CoachError::config("model.api_key", "missing");
        assert_eq!(error.category(), "config");
        assert_eq!(
            error.to_string(),
            "Configuration error in 'model.api_key': missing"
        );
    }

    #[test]
    fn test_error_context_builders() {
        let error = CoachError::extraction_exit(Some(1), "moov atom not found")
            .with_operation("extract_frames")
            .with_metadata("rate", "1.5");

        assert_eq!(error.category(), "extraction");
        assert_eq!(error.context().operation.as_deref(), Some("extract_frames"));
        assert_eq!(error.context().metadata.get("rate").map(String::as_str), Some("1.5"));
        assert!(error.to_string().contains("exit code 1"));
    }

    #[test]
    fn test_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = CoachError::io_at("read frame", Path::new("frame_001.jpg"), io);
        assert!(error.source().is_some());
        assert!(error.to_string().contains("frame_001.jpg"));

        let remote = CoachError::remote_call("rate limited", Some(429));
        assert!(remote.source().is_none());
        assert!(remote.to_string().contains("HTTP 429"));
    }
}
