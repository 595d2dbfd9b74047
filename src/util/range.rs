//! Closed numeric and integer intervals.
//!
//! Trimming never fails: a range clamped against a disjoint range ends up
//! with a negative length, and callers check `is_empty` before iterating.

use serde::Serialize;

/// A closed interval `[start, end]` over `f64`.
///
/// `length` is `end - start` and is negative when the endpoints are
/// unordered. Use [`NumberRange::from_endpoints`] when order is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NumberRange {
    pub start: f64,
    pub end: f64,
}

impl NumberRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Orders two endpoints so that `start <= end`.
    pub fn from_endpoints(p1: f64, p2: f64) -> Self {
        Self::new(p1.min(p2), p1.max(p2))
    }

    pub fn endpoints(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn includes(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: f64) -> Self {
        self.end = end;
        self
    }

    pub fn map_start(mut self, f: impl FnOnce(f64) -> f64) -> Self {
        self.start = f(self.start);
        self
    }

    pub fn map_end(mut self, f: impl FnOnce(f64) -> f64) -> Self {
        self.end = f(self.end);
        self
    }

    /// Clamps both endpoints into `interval`. May leave `length() < 0`.
    pub fn trim_to_range(&mut self, interval: &NumberRange) -> &mut Self {
        self.start = self.start.max(interval.start);
        self.end = self.end.min(interval.end);
        self
    }

    pub fn trimmed_to_range(&self, interval: &NumberRange) -> Self {
        let mut copy = *self;
        copy.trim_to_range(interval);
        copy
    }
}

impl From<IntRange> for NumberRange {
    fn from(range: IntRange) -> Self {
        Self::new(range.start as f64, range.end as f64)
    }
}

/// A closed interval of integers `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct IntRange {
    pub start: i64,
    pub end: i64,
}

impl IntRange {
    pub const fn new(start_inclusive: i64, end_inclusive: i64) -> Self {
        Self {
            start: start_inclusive,
            end: end_inclusive,
        }
    }

    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    pub fn num_ints_in_range(&self) -> i64 {
        self.length() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.num_ints_in_range() <= 0
    }

    pub fn includes(&self, x: i64) -> bool {
        x >= self.start && x <= self.end
    }

    pub fn start_exclusive(&self) -> i64 {
        self.start - 1
    }

    pub fn set_start_exclusive(&mut self, start_exclusive: i64) {
        self.start = start_exclusive + 1;
    }

    pub fn end_exclusive(&self) -> i64 {
        self.end + 1
    }

    pub fn set_end_exclusive(&mut self, end_exclusive: i64) {
        self.end = end_exclusive - 1;
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: i64) -> Self {
        self.end = end;
        self
    }

    pub fn map_start(mut self, f: impl FnOnce(i64) -> i64) -> Self {
        self.start = f(self.start);
        self
    }

    pub fn map_end(mut self, f: impl FnOnce(i64) -> i64) -> Self {
        self.end = f(self.end);
        self
    }

    pub fn trim_to_range(&mut self, interval: &IntRange) -> &mut Self {
        self.start = self.start.max(interval.start);
        self.end = self.end.min(interval.end);
        self
    }

    pub fn trimmed_to_range(&self, interval: &IntRange) -> Self {
        let mut copy = *self;
        copy.trim_to_range(interval);
        copy
    }

    /// `(min, max)` treated as exclusive on both sides.
    pub fn from_endpoints_exclusive(p1: i64, p2: i64) -> Self {
        let mut range = Self::default();
        range.set_start_exclusive(p1.min(p2));
        range.set_end_exclusive(p1.max(p2));
        range
    }

    pub fn from_endpoints_with_start_exclusive(p1: i64, p2: i64) -> Self {
        let mut range = Self::new(0, p1.max(p2));
        range.set_start_exclusive(p1.min(p2));
        range
    }

    pub fn from_endpoints_with_end_exclusive(p1: i64, p2: i64) -> Self {
        let mut range = Self::new(p1.min(p2), 0);
        range.set_end_exclusive(p1.max(p2));
        range
    }

    /// `[0, len - 1]`, which is empty for `len == 0`.
    pub fn for_indices_of(len: usize) -> Self {
        Self::new(0, len as i64 - 1)
    }

    /// Rounds outward: `[floor(start), ceil(end)]`.
    pub fn smallest_range_containing(range: &NumberRange) -> Self {
        Self::new(range.start.floor() as i64, range.end.ceil() as i64)
    }

    /// Rounds inward: `[ceil(start), floor(end)]`.
    pub fn largest_range_contained_in(range: &NumberRange) -> Self {
        Self::new(range.start.ceil() as i64, range.end.floor() as i64)
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<i64> {
        self.start..=self.end
    }

    pub fn values_in_range(&self) -> Vec<i64> {
        self.iter().collect()
    }

    pub fn map<T>(&self, f: impl FnMut(i64) -> T) -> Vec<T> {
        self.iter().map(f).collect()
    }

    pub fn for_each(&self, f: impl FnMut(i64)) {
        self.iter().for_each(f)
    }

    /// The range as slice indices, or `None` if it is empty or reaches
    /// below zero.
    pub fn as_index_span(&self) -> Option<std::ops::Range<usize>> {
        if self.is_empty() || self.start < 0 {
            return None;
        }
        Some(self.start as usize..self.end as usize + 1)
    }
}

impl IntoIterator for IntRange {
    type Item = i64;
    type IntoIter = std::ops::RangeInclusive<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &IntRange {
    type Item = i64;
    type IntoIter = std::ops::RangeInclusive<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
