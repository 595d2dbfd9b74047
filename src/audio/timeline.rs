//! Offline analysis of a whole span of a buffer.
//!
//! Frames are independent until smoothing, so the transforms run on the
//! rayon pool and only the blend is done in order.

use rayon::prelude::*;

use crate::error::Result;
use crate::util::range::NumberRange;

use super::analyzer::{blend_into, compute_frame, validate_resolution, validate_smoothing, FrameOutcome};
use super::fft::RustFftTransform;
use super::source::SampleSlice;
use super::window::{blackman_window, frame_len};

/// Smoothed analyzer state after one frame of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame {
    pub time: f64,
    pub outcome: FrameOutcome,
    pub magnitudes: Vec<f32>,
    pub raw: Vec<f32>,
}

/// Frame times from `span.start` to `span.end` inclusive, `1 / fps` apart.
pub fn frame_times(span: NumberRange, fps: f64) -> Vec<f64> {
    if fps.is_nan() || fps <= 0.0 || span.end < span.start || !span.length().is_finite() {
        return Vec::new();
    }
    let count = (span.length() * fps + 1e-9).floor() as usize + 1;
    (0..count).map(|i| span.start + i as f64 / fps).collect()
}

/// Analyzes every time in `times`, in order, the way repeated calls to
/// `SpectralAnalyzer::re_analyze` would.
pub fn analyze_timeline(
    source: &SampleSlice<'_>,
    times: &[f64],
    resolution: u32,
    smoothing: f32,
) -> Result<Vec<TimelineFrame>> {
    let resolution = validate_resolution(resolution)?;
    let smoothing = validate_smoothing(smoothing)?;
    let window = blackman_window(frame_len(resolution));

    log::info!(
        "Analyzing {} frames at resolution {} ({} bins)...",
        times.len(),
        resolution,
        1usize << resolution
    );

    // One planner per worker thread
    let frames: Vec<_> = times
        .par_iter()
        .map_init(RustFftTransform::new, |transform, &time| {
            compute_frame(source, time, resolution, &window, transform)
        })
        .collect();

    let mut smoothed = Vec::new();
    let mut raw = Vec::new();
    let mut failures = 0usize;
    let mut timeline = Vec::with_capacity(frames.len());

    for (&time, frame) in times.iter().zip(frames) {
        let outcome = match frame {
            Ok(frame) => {
                raw = frame.raw;
                blend_into(&mut smoothed, frame.magnitudes, smoothing)
            }
            Err(err) => {
                log::warn!("Transform failed at {:.3}s, keeping previous frame: {}", time, err);
                failures += 1;
                FrameOutcome::TransformFailed
            }
        };
        timeline.push(TimelineFrame {
            time,
            outcome,
            magnitudes: smoothed.clone(),
            raw: raw.clone(),
        });
    }

    if failures > 0 {
        log::warn!("{} of {} frames failed to transform", failures, timeline.len());
    }
    Ok(timeline)
}
