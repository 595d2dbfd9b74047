//! The frequency band notes are searched in, and the log/normalization
//! scale magnitudes are put on before peak picking.

use crate::error::{AnalysisError, Result};
use crate::util::convert::ValueConvertor;
use crate::util::range::{IntRange, NumberRange};
use crate::util::stats::{CumulativeResultFinder, MinMaxFinder};
use crate::util::view::SubarrayViewMut;

/// A0, the lowest piano key.
pub const MIN_FREQUENCY: f64 = 27.5;
pub const MAX_FREQUENCY: f64 = 4200.0;

#[derive(Debug, Clone)]
pub struct BandScale {
    band: NumberRange,
    display: ValueConvertor,
}

impl BandScale {
    /// `band` must be a positive, non-empty frequency interval.
    pub fn new(band: NumberRange) -> Result<Self> {
        if !(band.start > 0.0 && band.end > band.start) {
            return Err(AnalysisError::DegenerateRange {
                start: band.start,
                end: band.end,
            });
        }
        let display = ValueConvertor::normalizing_after(&band, &ValueConvertor::log())?;
        Ok(Self { band, display })
    }

    pub fn band(&self) -> NumberRange {
        self.band
    }

    /// Frequency (Hz) to horizontal position in `[0, 1]` on a log axis.
    pub fn display_fraction(&self) -> &ValueConvertor {
        &self.display
    }

    /// Natural-log magnitudes inside `bins`, rescaled so the quietest finite
    /// bin is 0 and the loudest is 1. Bins outside the range, and bins
    /// whose log is not finite, read as 0.
    ///
    /// A band with no finite values, or a perfectly flat one, is a
    /// degenerate range.
    pub fn normalize(&self, magnitudes: &[f32], bins: IntRange) -> Result<Vec<f32>> {
        let mut scaled = vec![0.0f32; magnitudes.len()];
        let mut view = SubarrayViewMut::new(&mut scaled, bins);
        let offset = view.backing_range().start.max(0) as usize;

        let mut extent = MinMaxFinder::new();
        view.modify_each(|_, i| {
            let value = magnitudes[offset + i].ln();
            if value.is_finite() {
                extent.accept(value as f64);
            }
            value
        });

        let normalizing = ValueConvertor::normalizing(&extent.get())?;
        view.modify_each(|&value, _| {
            if value.is_finite() {
                normalizing.convert_forwards(value as f64) as f32
            } else {
                0.0
            }
        });
        Ok(scaled)
    }
}

impl Default for BandScale {
    fn default() -> Self {
        let band = NumberRange::new(MIN_FREQUENCY, MAX_FREQUENCY);
        Self {
            band,
            display: ValueConvertor::log().composed_with(&ValueConvertor::linear(
                1.0 / (MAX_FREQUENCY / MIN_FREQUENCY).ln(),
                -MIN_FREQUENCY.ln() / (MAX_FREQUENCY / MIN_FREQUENCY).ln(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_fraction_spans_the_band() {
        let scale = BandScale::default();
        let fraction = scale.display_fraction();
        assert!(fraction.convert_forwards(MIN_FREQUENCY).abs() < 1e-12);
        assert!((fraction.convert_forwards(MAX_FREQUENCY) - 1.0).abs() < 1e-12);

        let fitted = BandScale::new(NumberRange::new(MIN_FREQUENCY, MAX_FREQUENCY)).unwrap();
        for f in [40.0, 440.0, 3000.0] {
            let a = fitted.display_fraction().convert_forwards(f);
            let b = fraction.convert_forwards(f);
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn invalid_bands_are_rejected() {
        assert!(BandScale::new(NumberRange::new(0.0, 100.0)).is_err());
        assert!(BandScale::new(NumberRange::new(500.0, 500.0)).is_err());
        assert!(BandScale::new(NumberRange::new(800.0, 200.0)).is_err());
    }

    #[test]
    fn normalize_maps_band_to_unit_interval() {
        let e = std::f32::consts::E;
        let magnitudes = [100.0, 1.0, e, e * e, 0.0, 1000.0];
        let scaled = BandScale::default()
            .normalize(&magnitudes, IntRange::new(1, 4))
            .unwrap();
        assert_eq!(scaled.len(), magnitudes.len());
        assert_eq!(scaled[0], 0.0);
        assert!(scaled[1].abs() < 1e-6);
        assert!((scaled[2] - 0.5).abs() < 1e-6);
        assert!((scaled[3] - 1.0).abs() < 1e-6);
        // ln(0) is not finite
        assert_eq!(scaled[4], 0.0);
        assert_eq!(scaled[5], 0.0);
    }

    #[test]
    fn silent_band_is_degenerate() {
        let result = BandScale::default().normalize(&[0.0; 8], IntRange::new(0, 7));
        assert!(matches!(result, Err(AnalysisError::DegenerateRange { .. })));
    }
}
