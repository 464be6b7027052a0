// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The k-d tree: construction, insertion, removal, lookup, and neighbor search.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::dimension::{Dimension, key_cmp, key_eq, key_lt};
use crate::node::{KdNode, NodeIdx, Nodes, Side};
use crate::queue::PriorityQueue;
use crate::shape::TreeShape;
use crate::types::{KdTreeError, Neighbor, SplitStrategy};

/// A search frontier entry: a subtree and a lower bound on its distance.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    node: NodeIdx,
    bound: f64,
}

fn nearest_bound_first(a: &Frontier, b: &Frontier) -> Ordering {
    key_cmp(a.bound, b.bound)
}

fn nearest_first<T>(a: &Neighbor<'_, T>, b: &Neighbor<'_, T>) -> Ordering {
    key_cmp(a.distance, b.distance)
}

fn farthest_first<T>(a: &Neighbor<'_, T>, b: &Neighbor<'_, T>) -> Ordering {
    key_cmp(b.distance, a.distance)
}

/// True if a candidate at `distance` belongs in `best`: always while fewer than
/// `count` are held, afterwards only if it is closer than the worst held.
fn improves<'a, T, C>(
    best: &PriorityQueue<Neighbor<'a, T>, C>,
    count: usize,
    distance: f64,
) -> bool
where
    C: Fn(&Neighbor<'a, T>, &Neighbor<'a, T>) -> Ordering,
{
    if best.len() < count {
        return true;
    }
    best.peek().is_none_or(|worst| key_lt(distance, worst.distance))
}

/// Distance between two keys, or `0.0` where it is undefined (`NaN` keys,
/// opposite infinities).
fn gap(a: f64, b: f64) -> f64 {
    let g = (a - b).abs();
    if g.is_nan() { 0.0 } else { g }
}

/// A k-d tree over caller-defined points.
///
/// The tree reads points only through its [`Dimension`]s and the distance
/// function `D`. The distance must be a metric that is bounded below by the
/// per-dimension difference (Euclidean, Manhattan, Chebyshev, ...), since that
/// difference is what search pruning relies on. Points with a `NaN` key on some
/// dimension are exempt from that bound; searches stop pruning where they could
/// be hiding.
///
/// Each point is stored exactly once, in its tree node; [`points`](Self::points)
/// walks them and [`rebuild`](Self::rebuild) constructs a fresh balanced tree from them.
pub struct KdTree<T, D> {
    nodes: Nodes<T>,
    distance: D,
    dimensions: Vec<Dimension<T>>,
    strategy: SplitStrategy,
    /// Points with a `NaN` key on at least one dimension.
    nan_points: usize,
}

impl<T, D> KdTree<T, D>
where
    D: Fn(&T, &T) -> f64,
{
    /// Build a tree using [`SplitStrategy::RoundRobin`].
    ///
    /// Fails only if `dimensions` is empty.
    pub fn new(
        points: impl IntoIterator<Item = T>,
        distance: D,
        dimensions: impl IntoIterator<Item = Dimension<T>>,
    ) -> Result<Self, KdTreeError> {
        Self::with_strategy(points, distance, dimensions, SplitStrategy::RoundRobin)
    }

    /// Build a tree using the given split strategy.
    ///
    /// Fails only if `dimensions` is empty.
    pub fn with_strategy(
        points: impl IntoIterator<Item = T>,
        distance: D,
        dimensions: impl IntoIterator<Item = Dimension<T>>,
        strategy: SplitStrategy,
    ) -> Result<Self, KdTreeError> {
        let dimensions: Vec<_> = dimensions.into_iter().collect();
        if dimensions.is_empty() {
            return Err(KdTreeError::NoDimensions);
        }
        let mut tree = Self {
            nodes: Nodes::default(),
            distance,
            dimensions,
            strategy,
            nan_points: 0,
        };
        tree.build(points.into_iter().collect());
        Ok(tree)
    }

    /// Add a point.
    ///
    /// The point is attached as a new leaf below the node where a lookup for it
    /// ends, with the parent's split index plus one; no rebalancing happens and
    /// the split strategy is not consulted. Many inserts can therefore degrade
    /// query performance until the next [`rebuild`](Self::rebuild).
    pub fn insert(&mut self, point: T) {
        if self.has_nan_key(&point) {
            self.nan_points += 1;
        }
        match self.leaf_slot(&point) {
            None => {
                let idx = self.nodes.push(KdNode::new(point, None, 0));
                self.nodes.root = Some(idx);
            }
            Some((parent, side)) => {
                let split = (self.nodes.get(parent).split + 1) % self.dimensions.len();
                let idx = self.nodes.push(KdNode::new(point, Some(parent), split));
                self.nodes.link(Some(parent), side, Some(idx));
            }
        }
        tracing::trace!(points = self.nodes.len(), "inserted point");
    }

    /// Rebuild the tree from its points with the current strategy.
    ///
    /// The strategy in effect is kept, not reset to [`SplitStrategy::RoundRobin`];
    /// use [`rebuild_with`](Self::rebuild_with) to change it.
    pub fn rebuild(&mut self) {
        let items = core::mem::take(&mut self.nodes).into_data();
        self.build(items);
    }

    /// Rebuild the tree from its points, switching to `strategy`.
    pub fn rebuild_with(&mut self, strategy: SplitStrategy) {
        self.strategy = strategy;
        self.rebuild();
    }

    fn build(&mut self, items: Vec<T>) {
        self.nan_points = items.iter().filter(|p| self.has_nan_key(p)).count();
        self.nodes = build_nodes(&self.dimensions, self.strategy, items);
        tracing::debug!(
            points = self.nodes.len(),
            dimensions = self.dimensions.len(),
            strategy = ?self.strategy,
            height = self.height(),
            "built k-d tree"
        );
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no points are indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// The indexed points, in no particular order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &T> {
        self.nodes.data()
    }

    /// The strategy used by the last build.
    pub fn strategy(&self) -> SplitStrategy {
        self.strategy
    }

    /// The dimension list, in split-index order.
    pub fn dimensions(&self) -> &[Dimension<T>] {
        &self.dimensions
    }

    /// Number of levels in the tree; `0` when empty.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeIdx, usize)> =
            self.nodes.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.nodes.get(idx);
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// A snapshot of the tree structure, or `None` when empty.
    pub fn shape(&self) -> Option<TreeShape<'_, T>> {
        self.nodes
            .root
            .map(|root| TreeShape::from_nodes(&self.nodes, root))
    }

    /// True if `a` and `b` agree on every dimension.
    ///
    /// Anything the dimensions do not read is ignored.
    pub fn dimension_equal(&self, a: &T, b: &T) -> bool {
        self.dimensions
            .iter()
            .all(|d| key_eq(d.value(a), d.value(b)))
    }

    /// True if a dimension-equal point is reachable by a lookup descent.
    pub fn contains(&self, point: &T) -> bool {
        self.find(point).is_some()
    }

    /// Remove one point that is dimension-equal to `point`.
    ///
    /// Returns the stored point that was dropped, which may differ from `point`
    /// outside the dimensions, or `None` (leaving the tree untouched) if lookup
    /// finds no match. With duplicates, each call removes one of them.
    pub fn remove(&mut self, point: &T) -> Option<T> {
        let target = self.find(point)?;
        let removed = self.remove_node(target);
        if self.has_nan_key(&removed) {
            self.nan_points -= 1;
        }
        tracing::trace!(points = self.nodes.len(), "removed point");
        Some(removed)
    }

    /// Up to `count` points closest to `point`, nearest first.
    ///
    /// Returns `min(count, len)` neighbors; an empty tree or `count == 0`
    /// yields an empty result.
    pub fn nearest_by_count(&self, point: &T, count: usize) -> Vec<Neighbor<'_, T>> {
        self.search_by_count(point, count, true)
    }

    /// Every point within `max_distance` of `point` (inclusive), nearest first.
    ///
    /// A negative (or `NaN`) radius or an empty tree yields an empty result.
    pub fn nearest_by_distance(&self, point: &T, max_distance: f64) -> Vec<Neighbor<'_, T>> {
        self.search_by_distance(point, max_distance, true)
    }

    fn has_nan_key(&self, point: &T) -> bool {
        self.dimensions.iter().any(|d| d.value(point).is_nan())
    }

    /// Near and far children of `node` for a search around `point`, and a lower
    /// bound on the distance from `point` to anything on the far side.
    fn sides(&self, node: &KdNode<T>, point: &T) -> (Option<NodeIdx>, Option<NodeIdx>, f64) {
        let dim = &self.dimensions[node.split];
        let (query, key) = (dim.value(point), dim.value(&node.data));
        if key_lt(query, key) {
            // The right side may hold `NaN` keys, which bound nothing.
            let plane = if self.nan_points > 0 {
                0.0
            } else {
                gap(query, key)
            };
            (node.left, node.right, plane)
        } else {
            (node.right, node.left, gap(query, key))
        }
    }

    /// Where a new point would be attached: the parent and the free side.
    /// `None` means the tree is empty.
    fn leaf_slot(&self, point: &T) -> Option<(NodeIdx, Side)> {
        let mut idx = self.nodes.root?;
        loop {
            let node = self.nodes.get(idx);
            let dim = &self.dimensions[node.split];
            let side = if key_lt(dim.value(point), dim.value(&node.data)) {
                Side::Left
            } else {
                Side::Right
            };
            match node.child(side) {
                Some(next) => idx = next,
                None => return Some((idx, side)),
            }
        }
    }

    /// First node on the lookup path whose point is dimension-equal to `point`.
    fn find(&self, point: &T) -> Option<NodeIdx> {
        let mut cur = self.nodes.root;
        while let Some(idx) = cur {
            let node = self.nodes.get(idx);
            if self.dimension_equal(point, &node.data) {
                return Some(idx);
            }
            let dim = &self.dimensions[node.split];
            cur = if key_lt(dim.value(point), dim.value(&node.data)) {
                node.left
            } else {
                node.right
            };
        }
        None
    }

    /// The node with the smallest key along `split` in the subtree at `start`.
    ///
    /// Nodes that split on `split` only need their left side searched; every
    /// other node contributes itself and both children. Ties go to the first
    /// node in pre-order.
    fn find_min(&self, start: NodeIdx, split: usize) -> NodeIdx {
        let dim = &self.dimensions[split];
        // `start` precedes everything in pre-order, and when it splits on
        // `split` with a left child that child is strictly smaller.
        let mut best = (start, dim.value(&self.nodes.get(start).data));
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = self.nodes.get(idx);
            if node.split == split {
                if let Some(left) = node.left {
                    stack.push(left);
                    continue;
                }
            } else {
                stack.extend(node.right);
                stack.extend(node.left);
            }
            let key = dim.value(&node.data);
            if key_lt(key, best.1) {
                best = (idx, key);
            }
        }
        best.0
    }

    /// Delete the point stored at `idx`, repairing the structure below it.
    ///
    /// An internal node takes over the minimum (on its own split dimension) of
    /// its right subtree, and the deletion continues at the node that minimum
    /// came from. A node with only a left subtree first moves it to the right.
    /// The chain ends at a leaf, which is detached; its point is the one that
    /// was stored at `idx` on entry.
    fn remove_node(&mut self, mut idx: NodeIdx) -> T {
        loop {
            let node = self.nodes.get_mut(idx);
            if node.right.is_none() {
                node.right = node.left.take();
            }
            let split = node.split;
            let Some(right) = node.right else {
                return self.nodes.remove_leaf(idx);
            };
            let min = self.find_min(right, split);
            // `idx` now holds the replacement; the doomed point moves down to `min`.
            self.nodes.swap_data(idx, min);
            idx = min;
        }
    }

    /// Best-first k-nearest search. `prune` off visits every node.
    pub(crate) fn search_by_count(
        &self,
        point: &T,
        count: usize,
        prune: bool,
    ) -> Vec<Neighbor<'_, T>> {
        let Some(root) = self.nodes.root else {
            return Vec::new();
        };
        if count == 0 {
            return Vec::new();
        }

        let mut frontier = PriorityQueue::new(nearest_bound_first);
        let capacity = count.min(self.len()) + 1;
        let mut best = PriorityQueue::with_capacity(capacity, farthest_first::<T>);

        let mut visited = 0_usize;
        frontier.enqueue(Frontier {
            node: root,
            bound: 0.0,
        });
        while let Some(Frontier { node: idx, bound }) = frontier.dequeue() {
            if prune && !improves(&best, count, bound) {
                continue;
            }
            visited += 1;
            let node = self.nodes.get(idx);
            let distance = (self.distance)(point, &node.data);
            if improves(&best, count, distance) {
                best.enqueue(Neighbor {
                    data: &node.data,
                    distance,
                });
                if best.len() > count {
                    let _ = best.dequeue();
                }
            }

            let (near, far, plane) = self.sides(node, point);
            if let Some(near) = near {
                frontier.enqueue(Frontier {
                    node: near,
                    bound: 0.0,
                });
            }
            if let Some(far) = far
                && (!prune || improves(&best, count, plane))
            {
                frontier.enqueue(Frontier {
                    node: far,
                    bound: plane,
                });
            }
        }

        let out = best.drain_sorted_by(nearest_first::<T>);
        tracing::trace!(count, found = out.len(), visited, "nearest by count");
        out
    }

    /// Best-first radius search. `prune` off visits every node.
    pub(crate) fn search_by_distance(
        &self,
        point: &T,
        max_distance: f64,
        prune: bool,
    ) -> Vec<Neighbor<'_, T>> {
        let Some(root) = self.nodes.root else {
            return Vec::new();
        };
        if max_distance.is_nan() || max_distance < 0.0 {
            return Vec::new();
        }

        let mut frontier = PriorityQueue::new(nearest_bound_first);
        let mut out = Vec::new();
        let mut visited = 0_usize;
        frontier.enqueue(Frontier {
            node: root,
            bound: 0.0,
        });
        while let Some(Frontier { node: idx, .. }) = frontier.dequeue() {
            visited += 1;
            let node = self.nodes.get(idx);
            let distance = (self.distance)(point, &node.data);
            if distance <= max_distance {
                out.push(Neighbor {
                    data: &node.data,
                    distance,
                });
            }

            let (near, far, plane) = self.sides(node, point);
            if let Some(near) = near {
                frontier.enqueue(Frontier {
                    node: near,
                    bound: 0.0,
                });
            }
            if let Some(far) = far
                && (!prune || plane <= max_distance)
            {
                frontier.enqueue(Frontier {
                    node: far,
                    bound: plane,
                });
            }
        }

        out.sort_by(nearest_first::<T>);
        tracing::trace!(max_distance, found = out.len(), visited, "nearest by distance");
        out
    }
}

/// Median-partition `items` into a fresh arena.
///
/// Runs on an explicit work stack: heavy key duplication can make the tree
/// much deeper than `log2(n)`.
fn build_nodes<T>(
    dimensions: &[Dimension<T>],
    strategy: SplitStrategy,
    items: Vec<T>,
) -> Nodes<T> {
    let mut nodes = Nodes::with_capacity(items.len());
    let mut work = vec![(items, 0_usize, None, Side::Left)];
    while let Some((items, depth, parent, side)) = work.pop() {
        let Some((median, split, lower, upper)) = partition(dimensions, strategy, items, depth)
        else {
            continue;
        };
        let idx = nodes.push(KdNode::new(median, parent, split));
        nodes.link(parent, side, Some(idx));
        work.push((upper, depth + 1, Some(idx), Side::Right));
        work.push((lower, depth + 1, Some(idx), Side::Left));
    }
    nodes
}

/// Choose the split for one node and divide `items` around the median.
///
/// Returns the median point, its split index, and the points strictly below
/// and at-or-above it on that dimension. `None` for an empty subset.
fn partition<T>(
    dimensions: &[Dimension<T>],
    strategy: SplitStrategy,
    items: Vec<T>,
    depth: usize,
) -> Option<(T, usize, Vec<T>, Vec<T>)> {
    let (split, keys) = match items.len() {
        0 => return None,
        1 => {
            let split = match strategy {
                SplitStrategy::RoundRobin => depth % dimensions.len(),
                SplitStrategy::MaxVariance => 0,
            };
            let point = items.into_iter().next()?;
            return Some((point, split, Vec::new(), Vec::new()));
        }
        _ => match strategy {
            SplitStrategy::RoundRobin => {
                let split = depth % dimensions.len();
                let dim = &dimensions[split];
                (split, items.iter().map(|p| dim.value(p)).collect::<Vec<f64>>())
            }
            SplitStrategy::MaxVariance => max_variance_split(dimensions, &items),
        },
    };

    let mut keyed: Vec<(f64, T)> = keys.into_iter().zip(items).collect();
    keyed.sort_by(|a, b| key_cmp(a.0, b.0));

    // Step back over equal keys so the left subtree stays strictly below the median.
    let mut mid = keyed.len() / 2;
    while mid > 0 && key_eq(keyed[mid - 1].0, keyed[mid].0) {
        mid -= 1;
    }
    let upper: Vec<T> = keyed.split_off(mid + 1).into_iter().map(|(_, p)| p).collect();
    let (_, median) = keyed.pop()?;
    let lower: Vec<T> = keyed.into_iter().map(|(_, p)| p).collect();
    Some((median, split, lower, upper))
}

/// Pick the dimension with the largest variance over `items`.
///
/// Returns the split index and the keys of `items` along it.
fn max_variance_split<T>(dimensions: &[Dimension<T>], items: &[T]) -> (usize, Vec<f64>) {
    let n = items.len() as f64;
    let mut best: Option<(usize, f64, Vec<f64>)> = None;
    for (k, dim) in dimensions.iter().enumerate() {
        let values: Vec<f64> = items.iter().map(|p| dim.value(p)).collect();
        let mean = values.iter().sum::<f64>() / n;
        let variance: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        // Strictly greater, so ties keep the earlier dimension.
        let better = match &best {
            None => true,
            Some((_, max, _)) => variance > *max,
        };
        if better {
            best = Some((k, variance, values));
        }
    }
    match best {
        Some((k, _, values)) => (k, values),
        None => (0, Vec::new()),
    }
}

impl<T, D> Extend<T> for KdTree<T, D>
where
    D: Fn(&T, &T) -> f64,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}

impl<T, D> Debug for KdTree<T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KdTree")
            .field("points", &self.nodes.len())
            .field("has_root", &self.nodes.root.is_some())
            .field("dimensions", &self.dimensions)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
