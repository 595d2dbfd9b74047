use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::TransformError;

/// Forward FFT primitive consumed as a black box by the analyzer.
pub trait SpectrumTransform {
    /// Transforms `samples.len()` real samples (a power of two) into an
    /// interleaved `(re, im)` array of twice that length.
    fn forward(&mut self, samples: &[f32]) -> Result<Vec<f32>, TransformError>;
}

/// [`SpectrumTransform`] backed by `rustfft`. Plans are cached by the
/// planner, so repeated calls at one size are cheap.
pub struct RustFftTransform {
    planner: FftPlanner<f32>,
}

impl RustFftTransform {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }
}

impl Default for RustFftTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RustFftTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustFftTransform").finish_non_exhaustive()
    }
}

impl SpectrumTransform for RustFftTransform {
    fn forward(&mut self, samples: &[f32]) -> Result<Vec<f32>, TransformError> {
        let n = samples.len();
        if n == 0 || !n.is_power_of_two() {
            return Err(TransformError::InvalidLength(n));
        }

        let fft = self.planner.plan_fft_forward(n);
        let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        fft.process(&mut buffer);

        let mut interleaved = Vec::with_capacity(2 * n);
        for (bin, c) in buffer.iter().enumerate() {
            if !c.re.is_finite() || !c.im.is_finite() {
                return Err(TransformError::NonFinite(bin));
            }
            interleaved.push(c.re);
            interleaved.push(c.im);
        }
        Ok(interleaved)
    }
}
