// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_kdtree::KdTree;
use understory_kdtree::points::{point_dimensions, point_distance};

use rstar::RTree;

fn gen_jittered_grid(n: usize, cell: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            // Deterministic offsets keep points off the exact grid lines.
            let jx = ((x * 7 + y * 13) % 10) as f64 * 0.05 * cell;
            let jy = ((x * 11 + y * 3) % 10) as f64 * 0.05 * cell;
            out.push(Point::new(x as f64 * cell + jx, y as f64 * cell + jy));
        }
    }
    out
}

fn to_rstar_points(v: &[Point]) -> Vec<[f64; 2]> {
    v.iter().map(|p| [p.x, p.y]).collect()
}

fn bench_rstar_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_external_compare");
    let queries: Vec<Point> = (0..32)
        .map(|i| Point::new(f64::from(i) * 19.3, f64::from(i) * 11.7))
        .collect();
    for &n in &[64usize, 128] {
        let pts = gen_jittered_grid(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("understory_build_knn10_n{}", n), |b| {
            b.iter_batched(
                || pts.clone(),
                |pts| {
                    let tree = KdTree::new(pts, point_distance, point_dimensions()).unwrap();
                    let mut total = 0.0;
                    for q in &queries {
                        for hit in tree.nearest_by_count(q, 10) {
                            total += hit.distance;
                        }
                    }
                    black_box(total);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_knn10_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_points(&pts),
                |pts| {
                    let tree = RTree::bulk_load(pts);
                    let mut total = 0.0;
                    for q in &queries {
                        for hit in tree.nearest_neighbor_iter(&[q.x, q.y]).take(10) {
                            total += Point::new(hit[0], hit[1]).distance(*q);
                        }
                    }
                    black_box(total);
                },
                BatchSize::SmallInput,
            )
        });

        let tree = KdTree::new(pts.iter().copied(), point_distance, point_dimensions()).unwrap();
        let rtree = RTree::bulk_load(to_rstar_points(&pts));
        group.bench_function(format!("understory_radius50_n{}", n), |b| {
            b.iter(|| {
                let hits: usize = queries
                    .iter()
                    .map(|q| tree.nearest_by_distance(q, 50.0).len())
                    .sum();
                black_box(hits);
            })
        });
        group.bench_function(format!("rstar_radius50_n{}", n), |b| {
            b.iter(|| {
                let hits: usize = queries
                    .iter()
                    .map(|q| rtree.locate_within_distance([q.x, q.y], 50.0 * 50.0).count())
                    .sum();
                black_box(hits);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rstar_external_compare);
criterion_main!(benches);
