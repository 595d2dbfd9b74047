//! Composable, invertible scalar unit conversions.
//!
//! Every mapping in the pipeline (bin index to Hz, Hz to pitch number,
//! magnitude to display fraction) is a [`ValueConvertor`] built from linear
//! and logarithmic primitives.

use crate::error::{AnalysisError, Result};
use crate::util::range::NumberRange;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueConvertor {
    /// `forward(x) = x * factor + offset`
    Linear { factor: f64, offset: f64 },
    /// `forward = ln`, `backward = exp`
    Log,
    /// `forward = exp`, `backward = ln`
    Exp,
    /// Applies each stage in order going forward, in reverse going backward.
    Chain(Vec<ValueConvertor>),
}

impl ValueConvertor {
    pub fn linear(factor: f64, offset: f64) -> Self {
        Self::Linear { factor, offset }
    }

    /// `forward(x) = (x + offset) * factor`
    pub fn linear_offset_first(factor: f64, offset: f64) -> Self {
        Self::Linear {
            factor,
            offset: factor * offset,
        }
    }

    pub fn log() -> Self {
        Self::Log
    }

    pub fn exp() -> Self {
        Self::Exp
    }

    pub fn identity() -> Self {
        Self::Chain(Vec::new())
    }

    pub fn convert_forwards(&self, x: f64) -> f64 {
        match self {
            Self::Linear { factor, offset } => x * factor + offset,
            Self::Log => x.ln(),
            Self::Exp => x.exp(),
            Self::Chain(stages) => stages.iter().fold(x, |acc, s| s.convert_forwards(acc)),
        }
    }

    pub fn convert_backwards(&self, y: f64) -> f64 {
        match self {
            Self::Linear { factor, offset } => (y - offset) / factor,
            Self::Log => y.exp(),
            Self::Exp => y.ln(),
            Self::Chain(stages) => stages
                .iter()
                .rev()
                .fold(y, |acc, s| s.convert_backwards(acc)),
        }
    }

    /// Forward applies `self` then `other`; backward undoes `other` first.
    pub fn composed_with(&self, other: &ValueConvertor) -> Self {
        let mut stages = self.stages();
        stages.extend(other.stages());
        Self::Chain(stages)
    }

    pub fn inverted(&self) -> Self {
        match self {
            Self::Linear { factor, offset } => Self::Linear {
                factor: 1.0 / factor,
                offset: -offset / factor,
            },
            Self::Log => Self::Exp,
            Self::Exp => Self::Log,
            Self::Chain(stages) => Self::Chain(stages.iter().rev().map(Self::inverted).collect()),
        }
    }

    fn stages(&self) -> Vec<ValueConvertor> {
        match self {
            Self::Chain(stages) => stages.clone(),
            other => vec![other.clone()],
        }
    }

    /// The linear map taking `source.start` to `dest.start` and
    /// `source.end` to `dest.end`.
    pub fn fitting_range_to(source: &NumberRange, dest: &NumberRange) -> Result<Self> {
        let factor = dest.length() / source.length();
        if source.length() == 0.0 || !source.length().is_finite() || !factor.is_finite() {
            return Err(AnalysisError::DegenerateRange {
                start: source.start,
                end: source.end,
            });
        }
        Ok(Self::linear(factor, dest.start - source.start * factor))
    }

    pub fn normalizing(source: &NumberRange) -> Result<Self> {
        Self::fitting_range_to(source, &NumberRange::new(0.0, 1.0))
    }

    /// `transform` followed by a linear fit computed in its output space.
    pub fn fitting_range_to_after(
        source: &NumberRange,
        dest: &NumberRange,
        transform: &ValueConvertor,
    ) -> Result<Self> {
        let fit = Self::fitting_range_to(&convert_range_forwards(transform, source), dest)?;
        Ok(transform.composed_with(&fit))
    }

    pub fn normalizing_after(source: &NumberRange, transform: &ValueConvertor) -> Result<Self> {
        Self::fitting_range_to_after(source, &NumberRange::new(0.0, 1.0), transform)
    }
}

pub fn convert_range_forwards(convertor: &ValueConvertor, range: &NumberRange) -> NumberRange {
    range
        .map_start(|x| convertor.convert_forwards(x))
        .map_end(|x| convertor.convert_forwards(x))
}

pub fn convert_range_backwards(convertor: &ValueConvertor, range: &NumberRange) -> NumberRange {
    range
        .map_start(|x| convertor.convert_backwards(x))
        .map_end(|x| convertor.convert_backwards(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn linear_round_trip() {
        for (factor, offset) in [(2.0, 3.0), (-0.5, 10.0), (1e-3, -7.25), (10.766, 0.0)] {
            let conv = ValueConvertor::linear(factor, offset);
            for x in [-1e6, -3.5, 0.0, 0.1, 42.0, 1e9] {
                assert!(close(conv.convert_backwards(conv.convert_forwards(x)), x));
            }
        }
    }

    #[test]
    fn offset_first_applies_before_factor() {
        let conv = ValueConvertor::linear_offset_first(2.0, 3.0);
        assert_eq!(conv.convert_forwards(1.0), 8.0);
        assert_eq!(conv.convert_backwards(8.0), 1.0);
    }

    #[test]
    fn fitting_maps_endpoints() {
        let source = NumberRange::new(-2.0, 6.0);
        let dest = NumberRange::new(100.0, 50.0);
        let conv = ValueConvertor::fitting_range_to(&source, &dest).unwrap();
        assert!(close(conv.convert_forwards(source.start), dest.start));
        assert!(close(conv.convert_forwards(source.end), dest.end));
    }

    #[test]
    fn normalizing_maps_to_unit_interval() {
        let conv = ValueConvertor::normalizing(&NumberRange::new(10.0, 20.0)).unwrap();
        assert!(close(conv.convert_forwards(10.0), 0.0));
        assert!(close(conv.convert_forwards(15.0), 0.5));
        assert!(close(conv.convert_forwards(20.0), 1.0));
    }

    #[test]
    fn degenerate_source_is_rejected() {
        let point = NumberRange::new(3.0, 3.0);
        let err = ValueConvertor::fitting_range_to(&point, &NumberRange::new(0.0, 1.0));
        assert!(matches!(err, Err(AnalysisError::DegenerateRange { .. })));
        assert!(ValueConvertor::normalizing_after(&NumberRange::new(-1.0, -1.0), &ValueConvertor::log()).is_err());
        // an empty min/max accumulation spans [+inf, -inf]
        let empty = NumberRange::new(f64::INFINITY, f64::NEG_INFINITY);
        assert!(ValueConvertor::normalizing(&empty).is_err());
    }

    #[test]
    fn log_and_exp_compose_to_identity() {
        let log_exp = ValueConvertor::log().composed_with(&ValueConvertor::exp());
        for x in [1e-6, 0.5, 1.0, 440.0, 1e8] {
            assert!(close(log_exp.convert_forwards(x), x));
            assert!(close(log_exp.convert_backwards(x), x));
        }
        let exp_log = ValueConvertor::exp().composed_with(&ValueConvertor::log());
        for x in [-50.0, -1.0, 0.0, 3.3, 50.0] {
            assert!(close(exp_log.convert_forwards(x), x));
        }
    }

    #[test]
    fn composition_order_is_preserved() {
        let double = ValueConvertor::linear(2.0, 0.0);
        let plus_one = ValueConvertor::linear(1.0, 1.0);
        let conv = double.composed_with(&plus_one);
        assert_eq!(conv.convert_forwards(3.0), 7.0);
        assert_eq!(conv.convert_backwards(7.0), 3.0);
        assert_eq!(plus_one.composed_with(&double).convert_forwards(3.0), 8.0);
    }

    #[test]
    fn inversion_swaps_directions() {
        let conv = ValueConvertor::fitting_range_to_after(
            &NumberRange::new(220.0, 440.0),
            &NumberRange::new(57.0, 69.0),
            &ValueConvertor::log(),
        )
        .unwrap();
        let inverse = conv.inverted();
        assert!(close(inverse.convert_forwards(69.0), 440.0));
        assert!(close(inverse.convert_backwards(220.0), 57.0));
    }

    #[test]
    fn range_conversion_maps_both_endpoints() {
        let conv = ValueConvertor::linear(10.0, 0.0);
        let range = convert_range_backwards(&conv, &NumberRange::new(100.0, 250.0));
        assert_eq!(range, NumberRange::new(10.0, 25.0));
        assert_eq!(convert_range_forwards(&conv, &range), NumberRange::new(100.0, 250.0));
    }
}
