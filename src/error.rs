//! Error types for the analysis pipeline.

use thiserror::Error;

/// Failure raised by an FFT primitive for a single frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Transform length must be a non-zero power of two, got {0}")]
    InvalidLength(usize),

    #[error("Transform produced non-finite output at bin {0}")]
    NonFinite(usize),

    #[error("Transform failed: {0}")]
    Other(String),
}

/// Error type for pitchscope operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid analyzer resolution: {0}. Must be between 4 and 16")]
    InvalidResolution(u32),

    #[error("Invalid smoothing: {0}. Must be between 0.0 and 1.0")]
    InvalidSmoothing(f32),

    #[error("Invalid peak threshold: {0}. Must be finite and non-negative")]
    InvalidThreshold(f32),

    #[error("Degenerate range: start={start}, end={end}")]
    DegenerateRange { start: f64, end: f64 },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported audio: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
