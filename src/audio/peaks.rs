//! Prominence-based peak picking on a magnitude spectrum.
//!
//! A bin is a candidate when it is strictly greater than both neighbours
//! (plateaus never qualify). Its prominence depth is the largest drop seen
//! while walking outward in either direction for as long as the values keep
//! falling. Candidates deeper than the threshold become peaks.

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::util::convert::ValueConvertor;
use crate::util::range::IntRange;
use crate::util::stats::{CumulativeResultFinder, MaximumFinder};
use crate::util::view::SubarrayView;

use super::notes::nearest_pitch;

/// Minimum depth on a 0–1 normalized log-magnitude scale.
pub const DEFAULT_PEAK_THRESHOLD: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peak {
    pub bin: usize,
    pub frequency: f64,
    pub magnitude: f32,
    pub prominence: f32,
    pub pitch: i32,
}

/// Amplitude and phase of one retained spectral peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partial {
    pub frequency: f64,
    pub amplitude: f32,
    pub phase: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetector {
    threshold: f32,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PEAK_THRESHOLD,
        }
    }
}

impl PeakDetector {
    pub fn new(threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AnalysisError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Peaks among the interior bins of `bins`; the range endpoints are
    /// never peaks themselves but bound the prominence walk.
    pub fn detect(
        &self,
        values: &[f32],
        bins: IntRange,
        bin_to_frequency: &ValueConvertor,
    ) -> Vec<Peak> {
        let view = SubarrayView::new(values, bins);
        let data = view.as_slice();
        let mut peaks = Vec::new();

        for i in 1..data.len().saturating_sub(1) {
            let value = data[i];
            if !(value > data[i - 1] && value > data[i + 1]) {
                continue;
            }

            let prominence = prominence_depth(data, i);
            if prominence <= self.threshold as f64 {
                continue;
            }

            let bin = view.backing_index(i);
            let frequency = bin_to_frequency.convert_forwards(bin as f64);
            peaks.push(Peak {
                bin,
                frequency,
                magnitude: value,
                prominence: prominence as f32,
                pitch: nearest_pitch(frequency),
            });
        }

        log::trace!("{} peaks above {:.3} in bins {:?}", peaks.len(), self.threshold, bins);
        peaks
    }
}

fn prominence_depth(data: &[f32], peak: usize) -> f64 {
    let value = data[peak];
    let mut depth = MaximumFinder::seeded(0.0);

    let mut pos = peak + 1;
    while pos < data.len() && data[pos] < data[pos - 1] {
        depth.accept((value - data[pos]) as f64);
        pos += 1;
    }

    let mut pos = peak;
    while pos > 0 && data[pos - 1] < data[pos] {
        depth.accept((value - data[pos - 1]) as f64);
        pos -= 1;
    }

    depth.get()
}

/// Splits an interleaved `(re, im)` frame into real and imaginary arrays
/// that are zero everywhere except at the given peaks.
pub fn retain_peaks(raw: &[f32], peaks: &[Peak]) -> (Vec<f32>, Vec<f32>) {
    let bins = raw.len() / 2;
    let mut real = vec![0.0; bins];
    let mut imag = vec![0.0; bins];
    for peak in peaks.iter().filter(|p| p.bin < bins) {
        real[peak.bin] = raw[2 * peak.bin];
        imag[peak.bin] = raw[2 * peak.bin + 1];
    }
    (real, imag)
}

pub fn partials(raw: &[f32], peaks: &[Peak]) -> Vec<Partial> {
    peaks
        .iter()
        .filter(|p| 2 * p.bin + 1 < raw.len())
        .map(|p| {
            let (re, im) = (raw[2 * p.bin], raw[2 * p.bin + 1]);
            Partial {
                frequency: p.frequency,
                amplitude: re.hypot(im),
                phase: im.atan2(re),
            }
        })
        .collect()
}
