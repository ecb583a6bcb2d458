//! Performance benchmarks for quadtree-lib
//!
//! Run with: cargo bench --package quadtree-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quadtree_lib::{Point, PrQuadtree, RectQuadtree, Rectangle, RegionQuadtree, codec};
use std::hint::black_box;

/// Deterministic points spread over the 512x512 base surface
fn generate_points(count: usize) -> Vec<Point> {
    let mut state: u32 = 0x9e37_79b9;
    (0..count)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let x = (state >> 8) % 512;
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let y = (state >> 8) % 512;
            Point::new(x as i32, y as i32)
        })
        .collect()
}

/// Small rectangles anchored at generated points, clipped to the surface
fn generate_rects(count: usize) -> Vec<Rectangle> {
    generate_points(count)
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let size = 1 + (i as i32 % 40);
            Rectangle::new(
                (p.y + size).min(512),
                (p.x + size).min(512),
                p.y,
                p.x,
            )
        })
        .collect()
}

/// Checkerboard region tree of the given depth
fn checkerboard(depth: usize) -> RegionQuadtree {
    if depth == 0 {
        return RegionQuadtree::black();
    }
    let child = checkerboard(depth - 1);
    RegionQuadtree::internal(
        child.clone(),
        child.invert(),
        child.invert(),
        child,
    )
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_point_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_region");

    for count in [1_000, 10_000] {
        let points = generate_points(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("insert_all", count), &points, |b, points| {
            b.iter(|| PrQuadtree::from_points(points.iter().copied()).unwrap());
        });

        let tree = PrQuadtree::from_points(points.iter().copied()).unwrap();
        group.bench_with_input(
            BenchmarkId::new("contains_many", count),
            &points,
            |b, points| {
                b.iter(|| tree.contains_many(black_box(points)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("region");

    let a = checkerboard(8);
    let b = a.vertical_symmetry();

    group.bench_function("union_depth_8", |bench| {
        bench.iter(|| black_box(&a).union(black_box(&b)));
    });
    group.bench_function("intersection_depth_8", |bench| {
        bench.iter(|| black_box(&a).intersection(black_box(&b)));
    });

    let bits = codec::encode(&a);
    group.throughput(Throughput::Elements(bits.len() as u64));
    group.bench_function("encode_depth_8", |bench| {
        bench.iter(|| codec::encode(black_box(&a)));
    });
    group.bench_function("decode_depth_8", |bench| {
        bench.iter(|| codec::decode(black_box(&bits)).unwrap());
    });

    group.finish();
}

fn bench_rect_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("rect_collection");
    group.sample_size(20);

    let rects = generate_rects(5_000);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("insert_all_5k", |b| {
        b.iter(|| RectQuadtree::from_rects(rects.iter().copied()).unwrap());
    });

    let tree = RectQuadtree::from_rects(rects.iter().copied()).unwrap();
    let points = generate_points(10_000);
    group.bench_function("query_many_10k", |b| {
        b.iter(|| tree.query_many(black_box(&points)));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_point_region,
    bench_region,
    bench_rect_collection,
);

criterion_main!(benches);
