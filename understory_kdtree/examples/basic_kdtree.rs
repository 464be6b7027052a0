// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory KdTree: build, insert, query, remove, and rebuild.

use kurbo::Point;
use understory_kdtree::points::{point_dimensions, point_distance};
use understory_kdtree::{KdTree, SplitStrategy};

fn main() {
    let points = [
        Point::new(0.0, 1.0),
        Point::new(10.0, 21.0),
        Point::new(5.0, 2.0),
        Point::new(62.0, 2.0),
        Point::new(3.0, 51.0),
        Point::new(11.0, 1.0),
        Point::new(5.0, 17.0),
    ];
    let mut tree = KdTree::with_strategy(
        points,
        point_distance,
        point_dimensions(),
        SplitStrategy::MaxVariance,
    )
    .expect("points have two dimensions");
    println!("built {} points, height {}", tree.len(), tree.height());

    // Inserts attach leaves without rebalancing.
    tree.insert(Point::new(20.0, 20.0));
    tree.insert(Point::new(21.0, 20.0));

    let query = Point::new(18.0, 18.0);
    for n in tree.nearest_by_count(&query, 3) {
        println!("near {:?}: {:?} at {:.3}", query, n.data, n.distance);
    }
    let within: Vec<_> = tree
        .nearest_by_distance(&query, 10.0)
        .iter()
        .map(|n| *n.data)
        .collect();
    println!("within 10 of {:?}: {:?}", query, within);

    let removed = tree.remove(&Point::new(62.0, 2.0));
    println!("removed: {:?}", removed);

    tree.rebuild();
    if let Some(shape) = tree.shape() {
        print!("{shape}");
    }
}
