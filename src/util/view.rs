//! Zero-copy views over an index range of a sample buffer.
//!
//! A view records the backing range it was cut from so local indices can be
//! translated back to buffer indices. Views of views are flattened when they
//! are created: the new view borrows the original slice directly.

use std::fmt::Display;

use crate::util::range::IntRange;

fn resolve(len: usize, range: Option<IntRange>) -> IntRange {
    let valid = IntRange::for_indices_of(len);
    match range {
        Some(range) => range.trimmed_to_range(&valid),
        None => valid,
    }
}

/// Read-only view over `backing[range]`.
#[derive(Debug, Clone, Copy)]
pub struct SubarrayView<'a, T> {
    data: &'a [T],
    backing_range: IntRange,
}

impl<'a, T> SubarrayView<'a, T> {
    /// Out-of-bounds parts of `range` are trimmed away silently.
    pub fn new(backing: &'a [T], range: IntRange) -> Self {
        Self::resolved(backing, resolve(backing.len(), Some(range)))
    }

    pub fn whole(backing: &'a [T]) -> Self {
        Self::resolved(backing, resolve(backing.len(), None))
    }

    fn resolved(backing: &'a [T], backing_range: IntRange) -> Self {
        let data = match backing_range.as_index_span() {
            Some(span) => &backing[span],
            None => &backing[..0],
        };
        Self { data, backing_range }
    }

    /// A view over this view's local index `range`, borrowing the same buffer.
    pub fn subview(&self, range: IntRange) -> SubarrayView<'a, T> {
        let backing: &'a [T] = self.data;
        let local = resolve(backing.len(), Some(range));
        let data = match local.as_index_span() {
            Some(span) => &backing[span],
            None => &backing[..0],
        };
        let offset = self.backing_range.start;
        SubarrayView {
            data,
            backing_range: IntRange::new(local.start + offset, local.end + offset),
        }
    }

    /// The range of backing indices this view covers.
    pub fn backing_range(&self) -> IntRange {
        self.backing_range
    }

    pub fn backing_index(&self, index: usize) -> usize {
        self.backing_range.start as usize + index
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a T> {
        let data: &'a [T] = self.data;
        data.get(index)
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'a, T> {
        let data: &'a [T] = self.data;
        data.iter()
    }

    pub fn for_each(&self, mut f: impl FnMut(&T, usize)) {
        for (i, value) in self.data.iter().enumerate() {
            f(value, i);
        }
    }

    pub fn every(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> bool {
        self.data.iter().enumerate().all(|(i, v)| predicate(v, i))
    }

    pub fn some(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> bool {
        self.data.iter().enumerate().any(|(i, v)| predicate(v, i))
    }

    pub fn find(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> Option<&'a T> {
        self.iter()
            .enumerate()
            .find(|(i, v)| predicate(*v, *i))
            .map(|(_, v)| v)
    }

    pub fn find_index(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> Option<usize> {
        self.data.iter().enumerate().position(|(i, v)| predicate(v, i))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T, usize) -> U) -> Vec<U> {
        self.data.iter().enumerate().map(|(i, v)| f(v, i)).collect()
    }
}

impl<T: Clone> SubarrayView<'_, T> {
    pub fn filter(&self, mut predicate: impl FnMut(&T, usize) -> bool) -> Vec<T> {
        self.data
            .iter()
            .enumerate()
            .filter(|(i, v)| predicate(*v, *i))
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.to_vec()
    }
}

impl<T: Display> SubarrayView<'_, T> {
    pub fn join(&self, separator: &str) -> String {
        self.data
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<'a, T> IntoIterator for SubarrayView<'a, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Mutable view over `backing[range]`; writes land in the backing buffer.
#[derive(Debug)]
pub struct SubarrayViewMut<'a, T> {
    data: &'a mut [T],
    backing_range: IntRange,
}

impl<'a, T> SubarrayViewMut<'a, T> {
    pub fn new(backing: &'a mut [T], range: IntRange) -> Self {
        let backing_range = resolve(backing.len(), Some(range));
        let data = match backing_range.as_index_span() {
            Some(span) => &mut backing[span],
            None => &mut backing[..0],
        };
        Self { data, backing_range }
    }

    pub fn backing_range(&self) -> IntRange {
        self.backing_range
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Returns `false` when `index` lies outside the view.
    pub fn set(&mut self, index: usize, value: T) -> bool {
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn as_view(&self) -> SubarrayView<'_, T> {
        SubarrayView {
            data: self.data,
            backing_range: self.backing_range,
        }
    }

    pub fn modify_each(&mut self, mut f: impl FnMut(&T, usize) -> T) -> &mut Self {
        for (i, slot) in self.data.iter_mut().enumerate() {
            *slot = f(slot, i);
        }
        self
    }
}

impl<T: Clone> SubarrayViewMut<'_, T> {
    pub fn fill(&mut self, value: T) -> &mut Self {
        self.data.fill(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_range_is_trimmed() {
        let data = [1, 2, 3, 4, 5];
        let view = SubarrayView::new(&data, IntRange::new(-3, 2));
        assert_eq!(view.to_vec(), vec![1, 2, 3]);
        assert_eq!(view.backing_range(), IntRange::new(0, 2));

        let view = SubarrayView::new(&data, IntRange::new(3, 99));
        assert_eq!(view.to_vec(), vec![4, 5]);

        let view = SubarrayView::new(&data, IntRange::new(7, 9));
        assert!(view.is_empty());
        assert_eq!(view.find_index(|_, _| true), None);
    }

    #[test]
    fn operations_stay_inside_the_range() {
        let data = [5.0, 1.0, 2.0, 3.0, 4.0, 9.0];
        let view = SubarrayView::new(&data, IntRange::new(1, 4));
        assert_eq!(view.len(), 4);
        assert_eq!(view.filter(|v, _| *v > 1.5), vec![2.0, 3.0, 4.0]);
        assert_eq!(view.find(|v, _| *v > 2.5), Some(&3.0));
        assert_eq!(view.find_index(|v, _| *v > 2.5), Some(2));
        assert_eq!(view.map(|v, i| v * i as f64), vec![0.0, 2.0, 6.0, 12.0]);
        assert!(view.every(|v, _| *v < 5.0));
        assert!(!view.some(|v, _| *v > 5.0));
        assert_eq!(view.join(","), "1,2,3,4");

        let mut seen = Vec::new();
        view.for_each(|v, i| seen.push((i, *v)));
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], (0, 1.0));
    }

    #[test]
    fn nested_views_translate_to_backing_indices() {
        let data: Vec<i32> = (0..20).collect();
        let outer = SubarrayView::new(&data, IntRange::new(5, 14));
        let inner = outer.subview(IntRange::new(2, 100));
        assert_eq!(inner.backing_range(), IntRange::new(7, 14));
        assert_eq!(inner.get(0), Some(&7));
        assert_eq!(inner.backing_index(3), 10);
        assert_eq!(inner.len(), 8);
    }

    #[test]
    fn mutable_view_writes_through() {
        let mut data = vec![0.0f32; 6];
        {
            let mut view = SubarrayViewMut::new(&mut data, IntRange::new(2, 4));
            view.modify_each(|_, i| i as f32 + 1.0);
            assert!(view.set(0, 10.0));
            assert!(!view.set(3, 99.0));
            assert_eq!(view.as_view().to_vec(), vec![10.0, 2.0, 3.0]);
        }
        assert_eq!(data, vec![0.0, 0.0, 10.0, 2.0, 3.0, 0.0]);

        SubarrayViewMut::new(&mut data, IntRange::new(4, 10)).fill(-1.0);
        assert_eq!(data[3..], [2.0, -1.0, -1.0]);
    }
}
