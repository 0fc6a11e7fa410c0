//! # Rolling Window
//!
//! Fixed-capacity, overwrite-on-full sequence indexed from newest to oldest.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use crate::error::{WindowError, WindowResult};

/// A ring of the `capacity` most recently added items.
///
/// Logical index 0 is the newest item and `len() - 1` the oldest. Adding to a
/// full window overwrites the oldest slot in place; the backing storage never
/// grows after construction.
///
/// Elements are owned by the window. When `T` is a handle to something that
/// lives elsewhere (a spawned chunk, for instance) the window only keeps the
/// handle, and tearing down the referenced object stays with the caller.
///
/// # Thread Safety
///
/// This window is NOT thread-safe. It is driven from the frame loop only.
///
/// # Example
///
/// ```rust
/// use strider_core::RollingWindow;
///
/// let mut window = RollingWindow::new(2);
/// window.add("a");
/// window.add("b");
/// assert_eq!(window.add("c"), Some("a"));
/// assert_eq!(window[0], "c");
/// ```
#[derive(Clone)]
pub struct RollingWindow<T> {
    /// Backing storage. Slots outside the live range may hold stale values.
    slots: Box<[Option<T>]>,
    /// Physical slot of the newest element.
    head: usize,
    /// Number of live elements.
    len: usize,
}

impl<T> RollingWindow<T> {
    /// Creates an empty window holding at most `capacity` items.
    ///
    /// All slots are allocated upfront.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let slots: Vec<Option<T>> = (0..capacity).map(|_| None).collect();

        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live items.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the window holds no live items.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the next [`add`](Self::add) will overwrite the oldest item.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Maps a logical index to its physical slot.
    #[inline]
    fn physical(&self, logical: usize) -> usize {
        (self.head + logical) % self.slots.len()
    }

    /// Adds an item at logical index 0.
    ///
    /// Every existing item moves one logical index further from the front.
    /// This is an **O(1)** operation.
    ///
    /// # Returns
    ///
    /// The oldest item if the window was full and it got overwritten.
    pub fn add(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        self.head = (self.head + capacity - 1) % capacity;
        let previous = self.slots[self.head].replace(item);

        if self.len < capacity {
            self.len += 1;
            None
        } else {
            previous
        }
    }

    /// Alias of [`add`](Self::add).
    #[inline]
    pub fn push_front(&mut self, item: T) -> Option<T> {
        self.add(item)
    }

    /// Inserts an item at a logical index.
    ///
    /// Only the front of the window is writable this way, so index 0 behaves
    /// exactly like [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::UnsupportedInsert`] for any index other than 0.
    pub fn insert(&mut self, index: usize, item: T) -> WindowResult<Option<T>> {
        if index != 0 {
            return Err(WindowError::UnsupportedInsert { index });
        }
        Ok(self.add(item))
    }

    /// Gets the item at a logical index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.slots[self.physical(index)].as_ref()
    }

    /// Gets a mutable reference to the item at a logical index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        self.slots[slot].as_mut()
    }

    /// Replaces the item at a logical index, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::IndexOutOfRange`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: T) -> WindowResult<T> {
        let out_of_range = WindowError::IndexOutOfRange {
            index,
            len: self.len,
        };
        if index >= self.len {
            return Err(out_of_range);
        }
        let slot = self.physical(index);
        self.slots[slot].replace(value).ok_or(out_of_range)
    }

    /// Returns the most recently added item.
    #[inline]
    #[must_use]
    pub fn newest(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the oldest live item.
    #[inline]
    #[must_use]
    pub fn oldest(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|index| self.get(index))
    }

    /// Removes the item at a logical index.
    ///
    /// Older items shift one position toward the front. Cost is proportional
    /// to the distance between `index` and the oldest item.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::IndexOutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> WindowResult<T> {
        let out_of_range = WindowError::IndexOutOfRange {
            index,
            len: self.len,
        };
        if index >= self.len {
            return Err(out_of_range);
        }

        // Bubble the removed slot to the oldest position.
        for logical in index..self.len - 1 {
            let here = self.physical(logical);
            let next = self.physical(logical + 1);
            self.slots.swap(here, next);
        }

        let last = self.physical(self.len - 1);
        self.len -= 1;
        self.slots[last].take().ok_or(out_of_range)
    }

    /// Empties the window.
    ///
    /// Only the live count is reset. Stale values stay in their slots until
    /// they are overwritten.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Iterates from newest to oldest.
    #[must_use]
    pub fn iter(&self) -> WindowIter<'_, T> {
        WindowIter {
            window: self,
            front: 0,
            back: self.len,
        }
    }
}

impl<T: PartialEq> RollingWindow<T> {
    /// Returns the logical index of the first item equal to `item`.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.iter().position(|candidate| candidate == item)
    }

    /// Returns true if an equal item is live in the window.
    #[inline]
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Removes the first item equal to `item`.
    ///
    /// # Returns
    ///
    /// The removed item, or None if nothing matched.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let index = self.index_of(item)?;
        self.remove_at(index).ok()
    }
}

impl<T> Index<usize> for RollingWindow<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "index {index} out of range for window of length {}",
                self.len
            ),
        }
    }
}

impl<T> IndexMut<usize> for RollingWindow<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!("index {index} out of range for window of length {len}"),
        }
    }
}

impl<T> Extend<T> for RollingWindow<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RollingWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a RollingWindow<T> {
    type Item = &'a T;
    type IntoIter = WindowIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Newest-to-oldest iterator over a [`RollingWindow`].
pub struct WindowIter<'a, T> {
    window: &'a RollingWindow<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for WindowIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.window.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for WindowIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.window.get(self.back)
    }
}

impl<T> ExactSizeIterator for WindowIter<'_, T> {}

impl<T> FusedIterator for WindowIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Copy>(window: &RollingWindow<T>) -> Vec<T> {
        window.iter().copied().collect()
    }

    #[test]
    fn test_eviction_keeps_last_three() {
        let mut window = RollingWindow::new(3);
        assert_eq!(window.add("x1"), None);
        assert_eq!(window.add("x2"), None);
        assert_eq!(window.add("x3"), None);
        assert_eq!(window.add("x4"), Some("x1"));

        assert_eq!(window.len(), 3);
        assert_eq!(collect(&window), vec!["x4", "x3", "x2"]);
        assert!(!window.contains(&"x1"));
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        for capacity in 1..8 {
            let mut window = RollingWindow::new(capacity);
            for added in 0..(capacity * 3) {
                window.add(added);
                assert!(window.len() <= capacity);

                let expected: Vec<usize> = (0..=added).rev().take(capacity).collect();
                assert_eq!(collect(&window), expected, "capacity {capacity}");
            }
            assert!(window.is_full());
        }
    }

    #[test]
    fn test_index_of_round_trip() {
        let mut window = RollingWindow::new(5);
        window.extend(10..17);

        for i in 0..window.len() {
            assert_eq!(window.index_of(&window[i]), Some(i));
        }
        assert_eq!(window.index_of(&10), None);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut window = RollingWindow::new(4);
        window.add(1);
        window.add(2);

        assert_eq!(window.get(1), Some(&1));
        assert_eq!(window.get(2), None);
        assert_eq!(
            window.set(2, 9),
            Err(WindowError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_panics_past_len() {
        let mut window = RollingWindow::new(4);
        window.add(1);
        let _ = window[1];
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut window = RollingWindow::new(3);
        window.extend([1, 2, 3]);

        assert_eq!(window.set(1, 20), Ok(2));
        window[0] = 30;
        assert_eq!(collect(&window), vec![30, 20, 1]);
    }

    #[test]
    fn test_remove_at_shifts_older_items_forward() {
        let mut window = RollingWindow::new(4);
        window.extend(1..=6);
        assert_eq!(collect(&window), vec![6, 5, 4, 3]);

        assert_eq!(window.remove_at(1), Ok(5));
        assert_eq!(collect(&window), vec![6, 4, 3]);

        // The freed slot is reused without evicting anything.
        assert_eq!(window.add(7), None);
        assert_eq!(collect(&window), vec![7, 6, 4, 3]);
    }

    #[test]
    fn test_remove_at_every_position_across_wrap() {
        for head_shift in 0..5 {
            for target in 0..4 {
                let mut window = RollingWindow::new(4);
                window.extend(0..(4 + head_shift));
                let mut expected = collect(&window);

                let removed = window.remove_at(target).unwrap();
                assert_eq!(removed, expected.remove(target));
                assert_eq!(collect(&window), expected);
                assert_eq!(window.oldest(), expected.last());
            }
        }
    }

    #[test]
    fn test_remove_at_out_of_range() {
        let mut window: RollingWindow<u8> = RollingWindow::new(2);
        assert_eq!(
            window.remove_at(0),
            Err(WindowError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_remove_by_value() {
        let mut window = RollingWindow::new(3);
        window.extend(["a", "b", "c"]);

        assert_eq!(window.remove(&"c"), Some("c"));
        assert_eq!(window.remove(&"z"), None);
        assert_eq!(collect(&window), vec!["b", "a"]);
    }

    #[test]
    fn test_insert_front_only() {
        let mut window = RollingWindow::new(2);
        assert_eq!(window.insert(0, 1), Ok(None));
        assert_eq!(
            window.insert(1, 2),
            Err(WindowError::UnsupportedInsert { index: 1 })
        );
        assert_eq!(collect(&window), vec![1]);
    }

    #[test]
    fn test_clear_resets_len_only() {
        let mut window = RollingWindow::new(3);
        window.extend([1, 2, 3]);
        window.clear();

        assert!(window.is_empty());
        assert_eq!(window.get(0), None);
        assert!(!window.contains(&3));

        // Stale slots are overwritten without being reported as evictions.
        assert_eq!(window.add(4), None);
        assert_eq!(collect(&window), vec![4]);
    }

    #[test]
    fn test_iteration_is_double_ended() {
        let mut window = RollingWindow::new(3);
        window.extend([1, 2, 3, 4]);

        let oldest_first: Vec<i32> = window.iter().rev().copied().collect();
        assert_eq!(oldest_first, vec![2, 3, 4]);
        assert_eq!(window.iter().len(), 3);
        assert_eq!(window.newest(), Some(&4));
        assert_eq!(window.oldest(), Some(&2));
    }

    #[test]
    fn test_debug_lists_logical_order() {
        let mut window = RollingWindow::new(2);
        window.extend([1, 2, 3]);
        assert_eq!(format!("{window:?}"), "[3, 2]");
    }
}
