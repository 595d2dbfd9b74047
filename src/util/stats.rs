//! Single-pass, constant-memory statistics.

use crate::util::range::NumberRange;

pub trait CumulativeResultFinder {
    type Output;

    fn accept(&mut self, value: f64);

    fn get(&self) -> Self::Output;

    fn accept_all<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<f64>,
    {
        for value in values {
            self.accept(value.into());
        }
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaximumFinder {
    max: f64,
}

impl MaximumFinder {
    pub fn new() -> Self {
        Self::seeded(f64::NEG_INFINITY)
    }

    pub fn seeded(initial: f64) -> Self {
        Self { max: initial }
    }
}

impl Default for MaximumFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl CumulativeResultFinder for MaximumFinder {
    type Output = f64;

    fn accept(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
    }

    fn get(&self) -> f64 {
        self.max
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MinimumFinder {
    min: f64,
}

impl MinimumFinder {
    pub fn new() -> Self {
        Self::seeded(f64::INFINITY)
    }

    pub fn seeded(initial: f64) -> Self {
        Self { min: initial }
    }
}

impl Default for MinimumFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl CumulativeResultFinder for MinimumFinder {
    type Output = f64;

    fn accept(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
    }

    fn get(&self) -> f64 {
        self.min
    }
}

/// Running `[min, max]`; `[+inf, -inf]` until a value arrives.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxFinder {
    min: MinimumFinder,
    max: MaximumFinder,
}

impl MinMaxFinder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CumulativeResultFinder for MinMaxFinder {
    type Output = NumberRange;

    fn accept(&mut self, value: f64) {
        self.min.accept(value);
        self.max.accept(value);
    }

    fn get(&self) -> NumberRange {
        NumberRange::new(self.min.get(), self.max.get())
    }
}

/// Running mean; NaN if nothing was accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageFinder {
    total: f64,
    count: u64,
}

impl AverageFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl CumulativeResultFinder for AverageFinder {
    type Output = f64;

    fn accept(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    fn get(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.total / self.count as f64
        }
    }
}

/// Population variance as `E[x²] - E[x]²`.
///
/// Not Welford-stabilized: with a large mean relative to the spread the
/// subtraction cancels badly.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarianceFinder {
    mean: AverageFinder,
    mean_of_squares: AverageFinder,
}

impl VarianceFinder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CumulativeResultFinder for VarianceFinder {
    type Output = f64;

    fn accept(&mut self, value: f64) {
        self.mean.accept(value);
        self.mean_of_squares.accept(value * value);
    }

    fn get(&self) -> f64 {
        self.mean_of_squares.get() - self.mean.get().powi(2)
    }
}
