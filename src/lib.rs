//! Spectral analysis of musical audio: windowed transforms around a
//! playhead, temporal smoothing, and prominence-based note detection.

pub mod audio;
pub mod error;
pub mod util;

pub use audio::analyzer::{FrameOutcome, SpectralAnalyzer};
pub use audio::features::{describe_frame, FrameReport};
pub use audio::peaks::{Peak, PeakDetector};
pub use audio::playhead::{Playhead, PositionProvider};
pub use audio::scale::BandScale;
pub use audio::source::{AudioFile, SampleSource};
pub use error::{AnalysisError, Result};
