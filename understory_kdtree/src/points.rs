// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kurbo point support.
//!
//! [`Point`] and [`Vec2`] expose their `"x"` and `"y"` coordinates through
//! [`FieldAccess`], so a tree over either type can use field dimensions directly.
//!
//! ```rust
//! use kurbo::Point;
//! use understory_kdtree::KdTree;
//! use understory_kdtree::points::{point_dimensions, point_distance};
//!
//! let pts = [Point::new(0.0, 0.0), Point::new(3.0, 4.0), Point::new(-1.0, 0.5)];
//! let tree = KdTree::new(pts, point_distance, point_dimensions()).unwrap();
//! let hits = tree.nearest_by_distance(&Point::ORIGIN, 5.0);
//! assert_eq!(hits.len(), 3);
//! assert_eq!(hits[2].distance, 5.0);
//! ```

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Point, Vec2};

use crate::dimension::{Dimension, FieldAccess};

impl FieldAccess for Point {
    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "x" => Some(self.x),
            "y" => Some(self.y),
            _ => None,
        }
    }
}

impl FieldAccess for Vec2 {
    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "x" => Some(self.x),
            "y" => Some(self.y),
            _ => None,
        }
    }
}

/// The `x` and `y` dimensions of a [`Point`], in that order.
pub fn point_dimensions() -> Vec<Dimension<Point>> {
    vec![Dimension::field("x"), Dimension::field("y")]
}

/// Euclidean distance between two points.
pub fn point_distance(a: &Point, b: &Point) -> f64 {
    a.distance(*b)
}
