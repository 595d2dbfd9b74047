//! Real-time spectral analyzer: window a block of samples around the
//! playhead, transform it, and blend the magnitudes into the previous frame.

use crate::error::{AnalysisError, Result, TransformError};
use crate::util::convert::{convert_range_backwards, ValueConvertor};
use crate::util::range::{IntRange, NumberRange};

use super::fft::{RustFftTransform, SpectrumTransform};
use super::playhead::PositionProvider;
use super::source::SampleSource;
use super::window::{apply_window, frame_len, WindowCache};

pub const MIN_RESOLUTION: u32 = 4;
pub const MAX_RESOLUTION: u32 = 16;
pub const DEFAULT_RESOLUTION: u32 = 12;
pub const DEFAULT_SMOOTHING: f32 = 0.8;

/// One analysis pass: `raw` is interleaved `(re, im)` with `2 * bins`
/// values, `magnitudes` holds `bins` values.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFrame {
    pub raw: Vec<f32>,
    pub magnitudes: Vec<f32>,
}

/// What a call to [`SpectralAnalyzer::re_analyze`] did to the visible data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No audio loaded yet; nothing changed.
    NotLoaded,
    /// The transform failed; the previous frame stays visible.
    TransformFailed,
    /// Bin count changed (or first frame): new data replaced the old.
    Replaced,
    /// New data was blended into the previous frame.
    Smoothed,
}

pub fn validate_resolution(resolution: u32) -> Result<u32> {
    if (MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
        Ok(resolution)
    } else {
        Err(AnalysisError::InvalidResolution(resolution))
    }
}

pub fn validate_smoothing(smoothing: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&smoothing) {
        Ok(smoothing)
    } else {
        Err(AnalysisError::InvalidSmoothing(smoothing))
    }
}

/// Windows and transforms the `2^(resolution + 1)` samples around `time`,
/// keeping the `2^resolution` bins below Nyquist.
pub fn compute_frame<S, T>(
    source: &S,
    time: f64,
    resolution: u32,
    window: &[f32],
    transform: &mut T,
) -> std::result::Result<SpectralFrame, TransformError>
where
    S: SampleSource + ?Sized,
    T: SpectrumTransform + ?Sized,
{
    let num_bins = 1usize << resolution;
    let mut samples = source.get_data(time, num_bins);
    apply_window(&mut samples, window);

    let mut raw = transform.forward(&samples)?;
    if raw.len() < 2 * num_bins {
        return Err(TransformError::Other(format!(
            "expected at least {} values, got {}",
            2 * num_bins,
            raw.len()
        )));
    }
    raw.truncate(2 * num_bins);

    let magnitudes = raw.chunks_exact(2).map(|c| c[0].hypot(c[1])).collect();
    Ok(SpectralFrame { raw, magnitudes })
}

/// Exponential smoothing of `next` into `previous`.
///
/// A length mismatch means the resolution changed, so the old frame is
/// discarded. Non-finite previous bins take the new value as-is.
pub fn blend_into(previous: &mut Vec<f32>, next: Vec<f32>, smoothing: f32) -> FrameOutcome {
    if previous.len() != next.len() {
        *previous = next;
        return FrameOutcome::Replaced;
    }

    for (prev, new) in previous.iter_mut().zip(next) {
        *prev = if prev.is_finite() {
            *prev * smoothing + new * (1.0 - smoothing)
        } else {
            new
        };
    }
    FrameOutcome::Smoothed
}

/// Width in Hz of one of `num_bins` bins spanning `[0, Nyquist)`.
/// Zero when there are no bins.
pub fn frequency_bin_size(sample_rate: u32, num_bins: usize) -> f64 {
    if num_bins == 0 {
        return 0.0;
    }
    sample_rate as f64 / 2.0 / num_bins as f64
}

pub fn bin_index_to_frequency_convertor(sample_rate: u32, num_bins: usize) -> ValueConvertor {
    ValueConvertor::linear(frequency_bin_size(sample_rate, num_bins), 0.0)
}

/// Rounds `frequencies` outward to bin indices and trims to `[0, num_bins)`.
pub fn bin_index_range_for_frequencies(
    sample_rate: u32,
    num_bins: usize,
    frequencies: &NumberRange,
) -> IntRange {
    if num_bins == 0 {
        return IntRange::for_indices_of(0);
    }
    let convertor = bin_index_to_frequency_convertor(sample_rate, num_bins);
    let bins = convert_range_backwards(&convertor, frequencies);
    IntRange::smallest_range_containing(&bins).trimmed_to_range(&IntRange::for_indices_of(num_bins))
}

pub struct SpectralAnalyzer<T = RustFftTransform> {
    resolution: u32,
    smoothing: f32,
    sample_rate: u32,
    windows: WindowCache,
    transform: T,
    analysis: Vec<f32>,
    raw: Vec<f32>,
}

impl SpectralAnalyzer<RustFftTransform> {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            smoothing: DEFAULT_SMOOTHING,
            sample_rate,
            windows: WindowCache::new(),
            transform: RustFftTransform::new(),
            analysis: Vec::new(),
            raw: Vec::new(),
        }
    }

    pub fn with_settings(sample_rate: u32, resolution: u32, smoothing: f32) -> Result<Self> {
        Self::with_transform(RustFftTransform::new(), sample_rate, resolution, smoothing)
    }
}

impl<T: SpectrumTransform> SpectralAnalyzer<T> {
    pub fn with_transform(
        transform: T,
        sample_rate: u32,
        resolution: u32,
        smoothing: f32,
    ) -> Result<Self> {
        Ok(Self {
            resolution: validate_resolution(resolution)?,
            smoothing: validate_smoothing(smoothing)?,
            sample_rate,
            windows: WindowCache::new(),
            transform,
            analysis: Vec::new(),
            raw: Vec::new(),
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Switches to a new resolution in one step: validates it, prepares
    /// the window table, and drops the smoothing state and raw frame that
    /// belonged to the old bin count. On error nothing changes.
    pub fn reconfigure(&mut self, resolution: u32) -> Result<()> {
        let resolution = validate_resolution(resolution)?;
        if resolution == self.resolution {
            return Ok(());
        }
        self.windows.get(resolution);
        self.resolution = resolution;
        self.analysis.clear();
        self.raw.clear();
        log::debug!(
            "Analyzer resolution set to {} ({} bins, {} window tables)",
            resolution,
            self.num_bins(),
            self.windows.table_count()
        );
        Ok(())
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> Result<()> {
        self.smoothing = validate_smoothing(smoothing)?;
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Current smoothed magnitude frame.
    pub fn analysis_data(&self) -> &[f32] {
        &self.analysis
    }

    /// Current interleaved `(re, im)` frame.
    pub fn raw_analysis_data(&self) -> &[f32] {
        &self.raw
    }

    /// Nyquist frequency.
    pub fn max_frequency(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    pub fn num_bins(&self) -> usize {
        1usize << self.resolution
    }

    pub fn frequency_bin_size(&self) -> f64 {
        frequency_bin_size(self.sample_rate, self.num_bins())
    }

    pub fn bin_index_to_frequency_convertor(&self) -> ValueConvertor {
        bin_index_to_frequency_convertor(self.sample_rate, self.num_bins())
    }

    /// Smallest bin range covering `frequencies`, trimmed to `[0, num_bins)`.
    pub fn bin_index_range_for_frequencies(&self, frequencies: &NumberRange) -> IntRange {
        bin_index_range_for_frequencies(self.sample_rate, self.num_bins(), frequencies)
    }

    /// Advances one frame using the samples around the current playhead.
    pub fn re_analyze<S, P>(&mut self, source: &S, position: &P) -> FrameOutcome
    where
        S: SampleSource + ?Sized,
        P: PositionProvider + ?Sized,
    {
        if !source.is_loaded() {
            return FrameOutcome::NotLoaded;
        }
        if source.sample_rate() != self.sample_rate {
            log::debug!(
                "Analyzer sample rate {} -> {}",
                self.sample_rate,
                source.sample_rate()
            );
            self.sample_rate = source.sample_rate();
            // bins now stand for different frequencies
            self.analysis.clear();
            self.raw.clear();
        }

        let resolution = self.resolution;
        let window = self.windows.get(resolution);
        debug_assert_eq!(window.len(), frame_len(resolution));

        let frame = match compute_frame(
            source,
            position.position(),
            resolution,
            &window,
            &mut self.transform,
        ) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("Spectrum transform failed, keeping previous frame: {}", err);
                return FrameOutcome::TransformFailed;
            }
        };

        self.raw = frame.raw;
        blend_into(&mut self.analysis, frame.magnitudes, self.smoothing)
    }
}

impl<T> std::fmt::Debug for SpectralAnalyzer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralAnalyzer")
            .field("resolution", &self.resolution)
            .field("smoothing", &self.smoothing)
            .field("sample_rate", &self.sample_rate)
            .field("bins", &self.analysis.len())
            .field("window_tables", &self.windows.table_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode::DecodedAudio;
    use crate::audio::notes::frequency_to_pitch;
    use crate::audio::source::AudioFile;
    use std::collections::VecDeque;

    /// Replays canned transform results, one per call.
    struct ScriptedTransform {
        results: VecDeque<std::result::Result<Vec<f32>, TransformError>>,
    }

    impl SpectrumTransform for ScriptedTransform {
        fn forward(&mut self, samples: &[f32]) -> std::result::Result<Vec<f32>, TransformError> {
            self.results
                .pop_front()
                .unwrap_or_else(|| Ok(vec![0.0; 2 * samples.len()]))
        }
    }

    /// Interleaved output whose first `bins` magnitudes all equal `value`.
    fn flat_spectrum(bins: usize, value: f32) -> Vec<f32> {
        let mut out = vec![0.0; 4 * bins];
        for i in 0..bins {
            out[2 * i] = value;
        }
        out
    }

    fn silent_file(sample_rate: u32) -> AudioFile {
        AudioFile::new(DecodedAudio::mono(vec![0.0; sample_rate as usize], sample_rate))
    }

    fn scripted(results: Vec<std::result::Result<Vec<f32>, TransformError>>) -> SpectralAnalyzer<ScriptedTransform> {
        let transform = ScriptedTransform {
            results: results.into(),
        };
        SpectralAnalyzer::with_transform(transform, 8000, 4, 0.5).unwrap()
    }

    #[test]
    fn derived_values_at_resolution_12() {
        let analyzer = SpectralAnalyzer::with_settings(44100, 12, 0.8).unwrap();
        assert_eq!(analyzer.num_bins(), 4096);
        assert_eq!(analyzer.max_frequency(), 22050.0);
        // Nyquist spread over 4096 bins
        assert!((analyzer.frequency_bin_size() - 5.383).abs() < 1e-3);
        assert_eq!(frequency_to_pitch().convert_forwards(440.0).round(), 69.0);

        let conv = analyzer.bin_index_to_frequency_convertor();
        assert!((conv.convert_forwards(4096.0) - 22050.0).abs() < 1e-9);
        assert_eq!(frequency_to_pitch().convert_forwards(conv.convert_forwards(81.74)).round(), 69.0);
    }

    #[test]
    fn invalid_settings_are_rejected_without_change() {
        let mut analyzer = SpectralAnalyzer::new(44100);
        for bad in [0, 3, 17, 32] {
            assert!(matches!(
                analyzer.reconfigure(bad),
                Err(AnalysisError::InvalidResolution(r)) if r == bad
            ));
        }
        assert_eq!(analyzer.resolution(), DEFAULT_RESOLUTION);

        for bad in [-0.1, 1.01, f32::NAN] {
            assert!(analyzer.set_smoothing(bad).is_err());
        }
        assert_eq!(analyzer.smoothing(), DEFAULT_SMOOTHING);

        assert!(analyzer.reconfigure(4).is_ok());
        assert!(analyzer.reconfigure(16).is_ok());
        assert!(analyzer.set_smoothing(0.0).is_ok());
        assert!(analyzer.set_smoothing(1.0).is_ok());
        assert!(SpectralAnalyzer::with_settings(44100, 20, 0.5).is_err());
    }

    #[test]
    fn unloaded_source_is_skipped() {
        let mut analyzer = scripted(vec![]);
        let outcome = analyzer.re_analyze(&AudioFile::loading(8000), &0.0);
        assert_eq!(outcome, FrameOutcome::NotLoaded);
        assert!(analyzer.analysis_data().is_empty());
    }

    #[test]
    fn consecutive_frames_are_blended() {
        let mut previous = vec![1.0, 1.0, 1.0];
        let outcome = blend_into(&mut previous, vec![0.0, 0.0, 0.0], 0.5);
        assert_eq!(outcome, FrameOutcome::Smoothed);
        assert_eq!(previous, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn non_finite_history_is_not_blended() {
        let mut previous = vec![f32::NAN, f32::INFINITY, 2.0];
        blend_into(&mut previous, vec![4.0, 4.0, 4.0], 0.5);
        assert_eq!(previous, vec![4.0, 4.0, 3.0]);
    }

    #[test]
    fn analyzer_smooths_same_sized_frames() {
        let mut analyzer = scripted(vec![Ok(flat_spectrum(16, 1.0)), Ok(flat_spectrum(16, 0.0))]);
        let file = silent_file(8000);

        assert_eq!(analyzer.re_analyze(&file, &0.5), FrameOutcome::Replaced);
        assert_eq!(analyzer.analysis_data(), &[1.0; 16]);
        assert_eq!(analyzer.raw_analysis_data().len(), 32);

        assert_eq!(analyzer.re_analyze(&file, &0.5), FrameOutcome::Smoothed);
        assert_eq!(analyzer.analysis_data(), &[0.5; 16]);
    }

    #[test]
    fn transform_failure_keeps_previous_frame() {
        let mut analyzer = scripted(vec![
            Ok(flat_spectrum(16, 3.0)),
            Err(TransformError::Other("kernel unavailable".into())),
        ]);
        let file = silent_file(8000);

        analyzer.re_analyze(&file, &0.1);
        let raw_before = analyzer.raw_analysis_data().to_vec();

        assert_eq!(analyzer.re_analyze(&file, &0.1), FrameOutcome::TransformFailed);
        assert_eq!(analyzer.analysis_data(), &[3.0; 16]);
        assert_eq!(analyzer.raw_analysis_data(), raw_before.as_slice());

        // next frame proceeds normally
        assert_eq!(analyzer.re_analyze(&file, &0.1), FrameOutcome::Smoothed);
    }

    #[test]
    fn resolution_change_replaces_instead_of_blending() {
        let mut analyzer = scripted(vec![Ok(flat_spectrum(16, 1.0)), Ok(flat_spectrum(32, 7.0))]);
        let file = silent_file(8000);

        analyzer.re_analyze(&file, &0.2);
        analyzer.reconfigure(5).unwrap();
        assert_eq!(analyzer.num_bins(), 32);

        assert_eq!(analyzer.re_analyze(&file, &0.2), FrameOutcome::Replaced);
        assert_eq!(analyzer.analysis_data(), &[7.0; 32]);
        assert_eq!(analyzer.raw_analysis_data().len(), 64);
    }

    #[test]
    fn bin_range_rounds_outward_and_trims() {
        let analyzer = SpectralAnalyzer::with_settings(44100, 12, 0.8).unwrap();
        let bins = analyzer.bin_index_range_for_frequencies(&NumberRange::new(100.0, 200.0));
        assert_eq!(bins, IntRange::new(18, 38));

        let bins = analyzer.bin_index_range_for_frequencies(&NumberRange::new(-50.0, 50_000.0));
        assert_eq!(bins, IntRange::new(0, 4095));
    }

    #[test]
    fn sine_peaks_at_its_frequency_bin() {
        let sample_rate = 8000;
        let samples: Vec<f32> = (0..sample_rate * 2)
            .map(|i| (std::f32::consts::TAU * 440.0 * i as f32 / sample_rate as f32).sin())
            .collect();
        let file = AudioFile::new(DecodedAudio::mono(samples, sample_rate));

        let mut analyzer = SpectralAnalyzer::with_settings(44100, 10, 0.0).unwrap();
        assert_eq!(analyzer.re_analyze(&file, &1.0), FrameOutcome::Replaced);
        assert_eq!(analyzer.sample_rate(), 8000);
        assert_eq!(analyzer.analysis_data().len(), 1024);

        let (peak_bin, _) = analyzer
            .analysis_data()
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        let expected = 440.0 / analyzer.frequency_bin_size();
        assert!((peak_bin as f64 - expected).abs() <= 1.0, "peak at {}", peak_bin);
    }

    #[test]
    fn sample_rate_change_discards_smoothing_state() {
        let mut analyzer = scripted(vec![Ok(flat_spectrum(16, 1.0)), Ok(flat_spectrum(16, 5.0))]);

        assert_eq!(analyzer.re_analyze(&silent_file(8000), &0.2), FrameOutcome::Replaced);
        assert_eq!(analyzer.re_analyze(&silent_file(16000), &0.2), FrameOutcome::Replaced);
        assert_eq!(analyzer.sample_rate(), 16000);
        assert_eq!(analyzer.analysis_data(), &[5.0; 16]);
        assert!((analyzer.frequency_bin_size() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn reconfigure_prepares_the_window_table() {
        let mut analyzer = SpectralAnalyzer::new(44100);
        assert_eq!(analyzer.windows.table_count(), 0);
        analyzer.reconfigure(8).unwrap();
        assert_eq!(analyzer.windows.table_count(), 1);
        // failed reconfigure builds nothing
        assert!(analyzer.reconfigure(2).is_err());
        assert_eq!(analyzer.windows.table_count(), 1);
    }

    #[test]
    fn free_bin_helpers_handle_empty_frames() {
        assert_eq!(frequency_bin_size(44100, 0), 0.0);
        assert!(bin_index_range_for_frequencies(44100, 0, &NumberRange::new(27.5, 4200.0)).is_empty());
        assert_eq!(
            bin_index_range_for_frequencies(44100, 4096, &NumberRange::new(100.0, 200.0)),
            IntRange::new(18, 38)
        );
    }
}
