// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree-shape export for diagnostics and tests.

use alloc::boxed::Box;
use core::fmt::{self, Debug, Display};

use crate::node::{NodeIdx, Nodes};

/// A borrowed snapshot of a tree's structure.
///
/// Produced by [`KdTree::shape`](crate::KdTree::shape). The layout is meant for
/// debugging and assertions; it is not a stable serialization format.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeShape<'a, T> {
    /// The point stored at this node.
    pub data: &'a T,
    /// Index of this node's split dimension in the tree's dimension list.
    pub split_index: usize,
    /// Subtree of points strictly below this node on its split dimension.
    pub left: Option<Box<TreeShape<'a, T>>>,
    /// Subtree of points at or above this node on its split dimension.
    pub right: Option<Box<TreeShape<'a, T>>>,
}

impl<'a, T> TreeShape<'a, T> {
    pub(crate) fn from_nodes(nodes: &'a Nodes<T>, idx: NodeIdx) -> Self {
        let node = nodes.get(idx);
        Self {
            data: &node.data,
            split_index: node.split,
            left: node.left.map(|l| Box::new(Self::from_nodes(nodes, l))),
            right: node.right.map(|r| Box::new(Self::from_nodes(nodes, r))),
        }
    }

    /// True if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |l| l.node_count())
            + self.right.as_ref().map_or(0, |r| r.node_count())
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize, label: &str) -> fmt::Result
    where
        T: Debug,
    {
        writeln!(
            f,
            "{:indent$}{label}{:?} [split {}]",
            "",
            self.data,
            self.split_index,
            indent = depth * 2
        )?;
        if self.is_leaf() {
            return Ok(());
        }
        for (child, label) in [(&self.left, "L: "), (&self.right, "R: ")] {
            match child {
                Some(c) => c.write_indented(f, depth + 1, label)?,
                None => writeln!(f, "{:indent$}{label}-", "", indent = (depth + 1) * 2)?,
            }
        }
        Ok(())
    }
}

impl<T: Debug> Display for TreeShape<'_, T> {
    /// One node per line, children indented under their parent; `-` marks a
    /// missing child of an internal node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0, "")
    }
}
