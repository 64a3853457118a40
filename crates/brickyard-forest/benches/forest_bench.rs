#![forbid(unsafe_code)]

use brickyard_forest::{
    Forest, HeadlessLayer, NodeId, OperatorKind, Point, SOCKET_CAPTURE_RADIUS, Side, Socket,
    nearest_socket,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// A forest of `count` operators arranged as left-leaning chains of eight.
fn chained_forest(count: usize) -> Forest<HeadlessLayer> {
    let mut forest = Forest::new(HeadlessLayer);
    let mut previous: Option<NodeId> = None;
    for index in 0..count {
        let id = forest
            .spawn(
                OperatorKind::ALL[index % OperatorKind::ALL.len()],
                Point::new((index % 32) as f64 * 180.0, (index / 32) as f64 * 90.0),
            )
            .expect("spawn within id range");
        if index % 8 != 0
            && let Some(parent) = previous
        {
            forest
                .attach_child(parent, id, Side::Left)
                .expect("chain link is legal");
        }
        previous = Some(id);
    }
    forest
}

fn bench_derive_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest/derive_views");
    for count in [16_usize, 128, 1024] {
        let forest = chained_forest(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &forest, |b, forest| {
            b.iter(|| black_box(forest.derive_views()));
        });
    }
    group.finish();
}

fn bench_attach_detach(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest/attach_detach");
    for count in [16_usize, 128, 1024] {
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            let mut forest = chained_forest(count);
            let roots = forest.roots().to_vec();
            let (Some(&parent), Some(&child)) = (roots.first(), roots.last()) else {
                return;
            };
            b.iter(|| {
                forest
                    .attach_child(parent, child, Side::Right)
                    .expect("right socket of first root is free");
                black_box(forest.detach_child(parent, Side::Right).ok());
            });
        });
    }
    group.finish();
}

fn bench_nearest_socket(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest/nearest_socket");
    for count in [16_u64, 256, 4096] {
        let candidates: Vec<(Socket, Point)> = (1..=count)
            .flat_map(|raw| {
                let owner = NodeId::new(raw).expect("non-zero");
                let base = Point::new((raw % 64) as f64 * 40.0, (raw / 64) as f64 * 40.0);
                [
                    (Socket::new(owner, Side::Left), base),
                    (
                        Socket::new(owner, Side::Right),
                        Point::new(base.x + 20.0, base.y),
                    ),
                ]
            })
            .collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &candidates,
            |b, candidates| {
                b.iter(|| {
                    black_box(nearest_socket(
                        Point::new(610.0, 205.0),
                        candidates.iter().copied(),
                        SOCKET_CAPTURE_RADIUS,
                    ))
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_derive_views,
    bench_attach_detach,
    bench_nearest_socket
);
criterion_main!(benches);
