// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node storage for the k-d tree.
//!
//! Nodes live in a dense arena and refer to each other by [`NodeIdx`]. A node's
//! `left`/`right` links are the only owning edges of the tree; `parent` is a
//! back-reference used to navigate upward during removal. Dropping the arena
//! drops every node at once, so destruction never walks the tree.

use alloc::vec::Vec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }
}

/// Which child link of a parent a node hangs from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub(crate) struct KdNode<T> {
    pub(crate) data: T,
    pub(crate) left: Option<NodeIdx>,
    pub(crate) right: Option<NodeIdx>,
    pub(crate) parent: Option<NodeIdx>,
    /// Index into the tree's dimension list.
    pub(crate) split: usize,
}

impl<T> KdNode<T> {
    pub(crate) const fn new(data: T, parent: Option<NodeIdx>, split: usize) -> Self {
        Self {
            data,
            left: None,
            right: None,
            parent,
            split,
        }
    }

    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub(crate) const fn child(&self, side: Side) -> Option<NodeIdx> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Dense node arena plus the root link.
#[derive(Clone, Debug)]
pub(crate) struct Nodes<T> {
    arena: Vec<KdNode<T>>,
    pub(crate) root: Option<NodeIdx>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self {
            arena: Vec::new(),
            root: None,
        }
    }
}

impl<T> Nodes<T> {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            arena: Vec::with_capacity(n),
            root: None,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub(crate) fn get(&self, idx: NodeIdx) -> &KdNode<T> {
        &self.arena[idx.get()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: NodeIdx) -> &mut KdNode<T> {
        &mut self.arena[idx.get()]
    }

    /// The stored points, in arena order.
    pub(crate) fn data(&self) -> impl ExactSizeIterator<Item = &T> {
        self.arena.iter().map(|n| &n.data)
    }

    /// Consume the arena, keeping only the stored points.
    pub(crate) fn into_data(self) -> Vec<T> {
        self.arena.into_iter().map(|n| n.data).collect()
    }

    /// Add a detached node; the caller links it.
    pub(crate) fn push(&mut self, node: KdNode<T>) -> NodeIdx {
        let idx = NodeIdx::new(self.arena.len());
        self.arena.push(node);
        idx
    }

    /// Point `parent`'s `side` link (or the root, for `None`) at `child`.
    pub(crate) fn link(&mut self, parent: Option<NodeIdx>, side: Side, child: Option<NodeIdx>) {
        match parent {
            None => self.root = child,
            Some(p) => match side {
                Side::Left => self.get_mut(p).left = child,
                Side::Right => self.get_mut(p).right = child,
            },
        }
    }

    /// The side of its parent that `idx` hangs from. Meaningless for the root.
    pub(crate) fn side_of(&self, idx: NodeIdx) -> Side {
        match self.get(idx).parent {
            Some(p) if self.get(p).left == Some(idx) => Side::Left,
            _ => Side::Right,
        }
    }

    /// Exchange the points stored at two nodes, leaving the structure alone.
    pub(crate) fn swap_data(&mut self, a: NodeIdx, b: NodeIdx) {
        let (lo, hi) = if a.get() < b.get() {
            (a.get(), b.get())
        } else {
            (b.get(), a.get())
        };
        if lo == hi {
            return;
        }
        let (head, tail) = self.arena.split_at_mut(hi);
        core::mem::swap(&mut head[lo].data, &mut tail[0].data);
    }

    /// Unlink a leaf from its parent and drop it from the arena, returning its point.
    ///
    /// The last arena node moves into the vacated slot; links to it are patched.
    pub(crate) fn remove_leaf(&mut self, idx: NodeIdx) -> T {
        debug_assert!(self.get(idx).is_leaf(), "only leaves can be detached");
        let side = self.side_of(idx);
        let parent = self.get(idx).parent;
        self.link(parent, side, None);

        let moved_from = NodeIdx::new(self.arena.len() - 1);
        let removed = self.arena.swap_remove(idx.get());
        if moved_from != idx {
            let moved = self.get(idx);
            let (parent, left, right) = (moved.parent, moved.left, moved.right);
            match parent {
                None => self.root = Some(idx),
                Some(p) => {
                    let pn = self.get_mut(p);
                    if pn.left == Some(moved_from) {
                        pn.left = Some(idx);
                    } else {
                        pn.right = Some(idx);
                    }
                }
            }
            for child in [left, right].into_iter().flatten() {
                self.get_mut(child).parent = Some(idx);
            }
        }
        removed.data
    }
}
