use serde::Serialize;

use crate::util::convert::ValueConvertor;
use crate::util::range::{IntRange, NumberRange};

use super::analyzer::{
    bin_index_range_for_frequencies, bin_index_to_frequency_convertor, FrameOutcome,
    SpectralAnalyzer,
};
use super::fft::SpectrumTransform;
use super::notes::note_name;
use super::peaks::{partials, Partial, Peak, PeakDetector};
use super::scale::BandScale;

/// Notes found in one analysis frame, ready for printing or serialization.
#[derive(Clone, Debug, Serialize)]
pub struct FrameReport {
    /// Playback time in seconds
    pub time: f64,
    /// How the analyzer state changed for this frame
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: FrameOutcome,
    /// Bin range searched for peaks
    pub bins: IntRange,
    /// Accepted peaks, ascending by bin
    pub peaks: Vec<Peak>,
    /// Note names for peaks with a named pitch
    pub notes: Vec<String>,
    /// Raw amplitude/phase at each peak
    pub partials: Vec<Partial>,
}

fn serialize_outcome<S: serde::Serializer>(outcome: &FrameOutcome, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(match outcome {
        FrameOutcome::NotLoaded => "not_loaded",
        FrameOutcome::TransformFailed => "transform_failed",
        FrameOutcome::Replaced => "replaced",
        FrameOutcome::Smoothed => "smoothed",
    })
}

/// One magnitude frame plus what is needed to put Hz on its bins.
#[derive(Debug, Clone, Copy)]
pub struct Spectrum<'a> {
    pub magnitudes: &'a [f32],
    pub raw: &'a [f32],
    pub sample_rate: u32,
}

impl Spectrum<'_> {
    pub fn bin_index_to_frequency_convertor(&self) -> ValueConvertor {
        bin_index_to_frequency_convertor(self.sample_rate, self.magnitudes.len())
    }

    pub fn bin_index_range_for_frequencies(&self, frequencies: &NumberRange) -> IntRange {
        bin_index_range_for_frequencies(self.sample_rate, self.magnitudes.len(), frequencies)
    }
}

/// Runs peak detection on the analyzer's current (smoothed) frame.
pub fn describe_frame<T: SpectrumTransform>(
    analyzer: &SpectralAnalyzer<T>,
    scale: &BandScale,
    detector: &PeakDetector,
    time: f64,
    outcome: FrameOutcome,
) -> FrameReport {
    let spectrum = Spectrum {
        magnitudes: analyzer.analysis_data(),
        raw: analyzer.raw_analysis_data(),
        sample_rate: analyzer.sample_rate(),
    };
    describe_spectrum(&spectrum, scale, detector, time, outcome)
}

/// Peaks, note names and partials for one frame.
///
/// The magnitudes are log-compressed and normalized over the scale's band
/// first. A band with nothing to normalize (silence) yields no peaks.
pub fn describe_spectrum(
    spectrum: &Spectrum<'_>,
    scale: &BandScale,
    detector: &PeakDetector,
    time: f64,
    outcome: FrameOutcome,
) -> FrameReport {
    let bins = spectrum.bin_index_range_for_frequencies(&scale.band());

    let peaks = if bins.is_empty() {
        Vec::new()
    } else {
        match scale.normalize(spectrum.magnitudes, bins) {
            Ok(normalized) => detector.detect(
                &normalized,
                bins,
                &spectrum.bin_index_to_frequency_convertor(),
            ),
            Err(err) => {
                log::debug!("No peaks at {:.3}s: {}", time, err);
                Vec::new()
            }
        }
    };

    let notes = peaks.iter().filter_map(|p| note_name(p.pitch)).collect();
    let partials = partials(spectrum.raw, &peaks);

    FrameReport {
        time,
        outcome,
        bins,
        peaks,
        notes,
        partials,
    }
}
