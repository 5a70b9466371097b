//! # Configuration Module
//!
//! This module provides configuration structures for the analysis pipeline,
//! the vision-model client and the HTTP layer.

pub mod config;

pub use config::{CoachConfig, CompressionConfig, ExtractionConfig, ModelConfig};
