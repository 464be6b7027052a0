// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_kdtree --heading-base-level=0

//! Understory KdTree: a k-d tree over caller-defined points.
//!
//! Understory KdTree indexes points of any type by a list of numeric dimensions and
//! answers nearest-neighbor queries.
//!
//! - Build from a batch of points, with round-robin or max-variance splits.
//! - Insert and remove points one at a time; [`KdTree::rebuild`] restores balance.
//! - Query the `k` nearest points, or every point within a radius.
//! - Export the tree structure as a [`TreeShape`] for debugging and tests.
//!
//! Points are read only through [`Dimension`]s (named fields via [`FieldAccess`], or
//! derived closures) and a caller-supplied distance function. The crate does not
//! depend on a geometry library; with the `kurbo` feature, the `points` module provides
//! ready-made dimensions for `kurbo::Point`.
//!
//! The binary-heap [`PriorityQueue`] that drives the searches is exported on its own.
//!
//! # Example
//!
//! ```rust
//! use understory_kdtree::{Dimension, FieldAccess, KdTree, SplitStrategy};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct City {
//!     name: &'static str,
//!     x: f64,
//!     y: f64,
//! }
//!
//! impl FieldAccess for City {
//!     fn field(&self, name: &str) -> Option<f64> {
//!         match name {
//!             "x" => Some(self.x),
//!             "y" => Some(self.y),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let city = |name, x, y| City { name, x, y };
//! let distance = |a: &City, b: &City| ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
//! let mut tree = KdTree::with_strategy(
//!     [city("a", 0.0, 0.0), city("b", 3.0, 4.0), city("c", 10.0, 1.0)],
//!     distance,
//!     [Dimension::field("x"), Dimension::field("y")],
//!     SplitStrategy::MaxVariance,
//! )
//! .unwrap();
//!
//! tree.insert(city("d", 2.0, 2.0));
//!
//! let query = city("?", 1.5, 1.0);
//! let nearest = tree.nearest_by_count(&query, 2);
//! assert_eq!(nearest[0].data.name, "d");
//! assert_eq!(nearest[1].data.name, "a");
//!
//! let within: Vec<_> = tree
//!     .nearest_by_distance(&query, 5.0)
//!     .iter()
//!     .map(|n| n.data.name)
//!     .collect();
//! assert_eq!(within, ["d", "a", "b"]);
//!
//! assert!(tree.remove(&city("b", 3.0, 4.0)).is_some());
//! assert_eq!(tree.len(), 3);
//! ```
//!
//! ## Choosing a split strategy
//!
//! - [`SplitStrategy::RoundRobin`] (default): split on dimension `depth % d`. Cheap to
//!   build; fine when the point cloud has a similar spread on every axis.
//! - [`SplitStrategy::MaxVariance`]: split each subset on its widest dimension. Builds
//!   cost an extra pass per dimension, and queries visit fewer nodes on stretched data.
//!
//! Inserted points ignore the strategy; they take the parent's split plus one.
//!
//! ### Float semantics
//!
//! Keys are ordered numerically with `-0.0 == 0.0`; `NaN` sorts after every number
//! and all `NaN`s compare equal. A field that a point does not have reads as `NaN`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dimension;
mod node;
#[cfg(feature = "kurbo")]
pub mod points;
pub mod queue;
pub mod shape;
pub mod tree;
pub mod types;

pub use dimension::{Dimension, FieldAccess};
pub use queue::PriorityQueue;
pub use shape::TreeShape;
pub use tree::KdTree;
pub use types::{KdTreeError, Neighbor, SplitStrategy};
