// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary-heap priority queue ordered by a caller-supplied comparator.
//!
//! The comparator defines *rank*: `compare(a, b) == Ordering::Less` means `a` is
//! dequeued before `b`. An ascending comparator gives a min-queue (the search
//! frontier); a reversed one gives a max-queue whose top is the worst of the
//! current candidates.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

/// A binary heap over `I` ranked by the comparator `C`.
///
/// ```
/// use understory_kdtree::PriorityQueue;
///
/// let mut q = PriorityQueue::new(|a: &u32, b: &u32| a.cmp(b));
/// q.enqueue(5);
/// q.enqueue(1);
/// q.enqueue(3);
/// assert_eq!(q.peek(), Some(&1));
/// assert_eq!(q.dequeue(), Some(1));
/// assert_eq!(q.drain_sorted(), vec![3, 5]);
/// assert!(q.is_empty());
/// ```
pub struct PriorityQueue<I, C> {
    heap: Vec<I>,
    compare: C,
}

impl<I, C> PriorityQueue<I, C>
where
    C: Fn(&I, &I) -> Ordering,
{
    /// Create an empty queue ranked by `compare`.
    pub fn new(compare: C) -> Self {
        Self {
            heap: Vec::new(),
            compare,
        }
    }

    /// Create an empty queue with room for `capacity` items.
    pub fn with_capacity(capacity: usize, compare: C) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            compare,
        }
    }

    /// Number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The top-ranked item, if any.
    #[inline]
    pub fn peek(&self) -> Option<&I> {
        self.heap.first()
    }

    /// Add an item.
    pub fn enqueue(&mut self, item: I) {
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    /// Remove and return the top-ranked item, if any.
    pub fn dequeue(&mut self) -> Option<I> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let top = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        top
    }

    /// Drop all queued items.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Take every item out of the queue, sorted by the queue's own comparator.
    pub fn drain_sorted(&mut self) -> Vec<I> {
        let mut items = core::mem::take(&mut self.heap);
        items.sort_by(|a, b| (self.compare)(a, b));
        items
    }

    /// Take every item out of the queue, sorted by `compare` instead of the
    /// queue's comparator.
    pub fn drain_sorted_by<F>(&mut self, compare: F) -> Vec<I>
    where
        F: FnMut(&I, &I) -> Ordering,
    {
        let mut items = core::mem::take(&mut self.heap);
        items.sort_by(compare);
        items
    }

    #[inline]
    fn outranks(&self, a: usize, b: usize) -> bool {
        (self.compare)(&self.heap[a], &self.heap[b]) == Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.outranks(i, parent) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            // Prefer the left child on ties.
            let child = if right < n && self.outranks(right, left) {
                right
            } else {
                left
            };
            if !self.outranks(child, i) {
                break;
            }
            self.heap.swap(i, child);
            i = child;
        }
    }
}

impl<I, C> Debug for PriorityQueue<I, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("len", &self.heap.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn ascending(a: &i64, b: &i64) -> Ordering {
        a.cmp(b)
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let mut q = PriorityQueue::new(ascending);
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert_eq!(q.peek(), None);
        assert_eq!(q.dequeue(), None);
        assert!(q.drain_sorted().is_empty());
    }

    #[test]
    fn dequeue_returns_minimum_under_comparator() {
        let mut q = PriorityQueue::new(ascending);
        for v in [7, 3, 9, 1, 4, 1, 8] {
            q.enqueue(v);
        }
        let mut out = Vec::new();
        while let Some(v) = q.dequeue() {
            out.push(v);
        }
        assert_eq!(out, vec![1, 1, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn reversed_comparator_keeps_worst_on_top() {
        let mut q = PriorityQueue::new(|a: &f64, b: &f64| b.total_cmp(a));
        for d in [2.5, 0.5, 9.0, 4.0] {
            q.enqueue(d);
        }
        assert_eq!(q.peek(), Some(&9.0));
        assert_eq!(q.dequeue(), Some(9.0));
        assert_eq!(q.peek(), Some(&4.0));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn interleaved_operations_keep_heap_order() {
        // Xorshift stream; every dequeue must match the minimum of a shadow list.
        let mut state = 0x9E37_79B9_7F4A_7C15_u64;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        let mut q = PriorityQueue::new(ascending);
        let mut shadow: Vec<i64> = Vec::new();
        for _ in 0..2000 {
            let r = next();
            if r % 3 == 0 {
                let got = q.dequeue();
                let expected = shadow.iter().copied().min();
                if let Some(m) = expected {
                    let pos = shadow.iter().position(|&v| v == m).unwrap();
                    shadow.swap_remove(pos);
                }
                assert_eq!(got, expected);
            } else {
                let v = (r >> 8) as i64 % 1000;
                q.enqueue(v);
                shadow.push(v);
            }
            assert_eq!(q.len(), shadow.len());
            assert_eq!(q.peek().copied(), shadow.iter().copied().min());
        }
    }

    #[test]
    fn drain_sorted_by_uses_given_order_and_empties_queue() {
        let mut q = PriorityQueue::new(|a: &i64, b: &i64| b.cmp(a));
        for v in [3, 1, 2] {
            q.enqueue(v);
        }
        assert_eq!(q.drain_sorted_by(|a, b| a.cmp(b)), vec![1, 2, 3]);
        assert!(q.is_empty());

        for v in [3, 1, 2] {
            q.enqueue(v);
        }
        assert_eq!(q.drain_sorted(), vec![3, 2, 1]);
    }

    #[test]
    fn clear_and_reuse() {
        let mut q = PriorityQueue::with_capacity(4, ascending);
        q.enqueue(2);
        q.enqueue(1);
        q.clear();
        assert!(q.is_empty());
        q.enqueue(5);
        assert_eq!(q.dequeue(), Some(5));
    }
}
