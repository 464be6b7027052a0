// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_kdtree::points::{point_dimensions, point_distance};
use understory_kdtree::{KdTree, SplitStrategy};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_points(count: usize, w: f64, h: f64, seed: u64) -> Vec<Point> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * w, rng.next_f64() * h))
        .collect()
}

const STRATEGIES: [(&str, SplitStrategy); 2] = [
    ("round_robin", SplitStrategy::RoundRobin),
    ("max_variance", SplitStrategy::MaxVariance),
];

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");
    for &n in &[1_000usize, 10_000] {
        // Stretched along x so the strategies pick different splits.
        let pts = gen_random_points(n, 4000.0, 250.0, 0xA11CE);
        group.throughput(Throughput::Elements(n as u64));
        for (name, strategy) in STRATEGIES {
            group.bench_function(format!("{name}_n{n}"), |b| {
                b.iter_batched(
                    || pts.clone(),
                    |pts| {
                        let tree = KdTree::with_strategy(
                            pts,
                            point_distance,
                            point_dimensions(),
                            strategy,
                        )
                        .unwrap();
                        black_box(tree.height());
                    },
                    BatchSize::SmallInput,
                )
            });
        }
        group.bench_function(format!("insert_then_rebuild_n{n}"), |b| {
            b.iter_batched(
                || pts.clone(),
                |pts| {
                    let mut tree =
                        KdTree::new(Vec::new(), point_distance, point_dimensions()).unwrap();
                    tree.extend(pts);
                    tree.rebuild();
                    black_box(tree.height());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_nearest_by_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_nearest_by_count");
    let n = 10_000;
    let pts = gen_random_points(n, 4000.0, 250.0, 0xBEEF);
    let queries = gen_random_points(64, 4000.0, 250.0, 0xF00D);
    group.throughput(Throughput::Elements(queries.len() as u64));
    for (name, strategy) in STRATEGIES {
        let tree = KdTree::with_strategy(
            pts.iter().copied(),
            point_distance,
            point_dimensions(),
            strategy,
        )
        .unwrap();
        for &k in &[1usize, 10, 50] {
            group.bench_function(format!("{name}_k{k}"), |b| {
                b.iter(|| {
                    let mut total = 0.0;
                    for q in &queries {
                        for hit in tree.nearest_by_count(q, k) {
                            total += hit.distance;
                        }
                    }
                    black_box(total);
                })
            });
        }
    }
    group.bench_function("brute_force_k10", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for q in &queries {
                let mut d: Vec<f64> = pts.iter().map(|p| p.distance(*q)).collect();
                d.sort_by(f64::total_cmp);
                total += d[..10].iter().sum::<f64>();
            }
            black_box(total);
        })
    });
    group.finish();
}

fn bench_nearest_by_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_nearest_by_distance");
    let n = 10_000;
    let pts = gen_random_points(n, 4000.0, 250.0, 0xCAFE);
    let queries = gen_random_points(64, 4000.0, 250.0, 0xD00D);
    let tree = KdTree::new(pts.iter().copied(), point_distance, point_dimensions()).unwrap();
    group.throughput(Throughput::Elements(queries.len() as u64));
    for &r in &[5.0f64, 25.0, 100.0] {
        group.bench_function(format!("radius_{r}"), |b| {
            b.iter(|| {
                let hits: usize = queries
                    .iter()
                    .map(|q| tree.nearest_by_distance(q, r).len())
                    .sum();
                black_box(hits);
            })
        });
        group.bench_function(format!("brute_force_radius_{r}"), |b| {
            b.iter(|| {
                let hits: usize = queries
                    .iter()
                    .map(|q| pts.iter().filter(|p| p.distance(*q) <= r).count())
                    .sum();
                black_box(hits);
            })
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_remove");
    let n = 5_000;
    let pts = gen_random_points(n, 1000.0, 1000.0, 0x5EED);
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function(format!("remove_all_n{n}"), |b| {
        b.iter_batched(
            || KdTree::new(pts.iter().copied(), point_distance, point_dimensions()).unwrap(),
            |mut tree| {
                for p in &pts {
                    black_box(tree.remove(p));
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_nearest_by_count,
    bench_nearest_by_distance,
    bench_remove
);
criterion_main!(benches);
