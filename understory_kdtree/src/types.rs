// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public value types: query results, split strategies, and errors.

/// A point returned by a nearest-neighbor query, with its distance to the query point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor<'a, T> {
    /// The indexed point.
    pub data: &'a T,
    /// Distance from the query point, as computed by the tree's distance function.
    pub distance: f64,
}

/// How [`KdTree`](crate::KdTree) chooses the split dimension when building.
///
/// The strategy applies to bulk construction and [`rebuild`](crate::KdTree::rebuild).
/// Points added with [`insert`](crate::KdTree::insert) always take the parent's
/// split index plus one, whatever the strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SplitStrategy {
    /// Cycle through the dimensions by depth: `depth % dimensions`.
    #[default]
    RoundRobin,
    /// Split each subset on the dimension with the largest variance.
    ///
    /// Ties go to the earlier dimension. Costs `O(n * d)` extra per node, and
    /// pays off when the point cloud is stretched along some axes.
    MaxVariance,
}

/// Errors reported when constructing a tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KdTreeError {
    /// The dimension list was empty.
    #[error("a k-d tree needs at least one dimension")]
    NoDimensions,
}
