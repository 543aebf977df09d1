//! Benchmarks for manifold operations
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geomopt_core::manifold::Manifold;
use geomopt_manifolds::{ComplexEuclidean, Grassmann, Sphere, Stiefel, SymmetricPositiveDefinite};

fn benchmark_sphere_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere");

    for &n in &[10, 100, 1000] {
        let sphere = Sphere::vector(n).unwrap().with_seed(1);
        let point = sphere.random_point();
        let vector = sphere.random_tangent_vector(&point).unwrap();

        group.bench_with_input(BenchmarkId::new("projection", n), &n, |b, _| {
            b.iter(|| sphere.projection(black_box(&point), black_box(&vector)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("retraction", n), &n, |b, _| {
            b.iter(|| sphere.retr(black_box(&point), black_box(&vector)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("exp", n), &n, |b, _| {
            b.iter(|| sphere.exp(black_box(&point), black_box(&vector)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_stiefel_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("stiefel");

    let configs = [(10, 3), (50, 10), (100, 20)];

    for &(n, p) in &configs {
        let stiefel = Stiefel::new(n, p).unwrap().with_seed(2);
        let point = stiefel.random_point();
        let vector = stiefel.random_tangent_vector(&point).unwrap();

        group.bench_with_input(
            BenchmarkId::new("qr_retraction", format!("{}x{}", n, p)),
            &(n, p),
            |b, _| {
                b.iter(|| stiefel.retr(black_box(&point), black_box(&vector)).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("exp", format!("{}x{}", n, p)),
            &(n, p),
            |b, _| {
                b.iter(|| stiefel.exp(black_box(&point), black_box(&vector)).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_grassmann_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("grassmann");

    for &(n, p) in &[(10, 3), (50, 10)] {
        let grassmann = Grassmann::new(n, p).unwrap().with_seed(3);
        let x = grassmann.random_point();
        let y = grassmann.random_point();

        group.bench_with_input(
            BenchmarkId::new("distance", format!("{}x{}", n, p)),
            &(n, p),
            |b, _| {
                b.iter(|| grassmann.dist(black_box(&x), black_box(&y)).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("log", format!("{}x{}", n, p)),
            &(n, p),
            |b, _| {
                b.iter(|| grassmann.log(black_box(&x), black_box(&y)).unwrap());
            },
        );
    }

    group.finish();
}

fn benchmark_spd_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("spd");

    for &n in &[5, 20, 50] {
        let spd = SymmetricPositiveDefinite::new(n).unwrap().with_seed(4);
        let x = spd.random_point();
        let y = spd.random_point();

        group.bench_with_input(BenchmarkId::new("distance", n), &n, |b, _| {
            b.iter(|| spd.dist(black_box(&x), black_box(&y)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("log", n), &n, |b, _| {
            b.iter(|| spd.log(black_box(&x), black_box(&y)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_complex_euclidean(c: &mut Criterion) {
    let mut group = c.benchmark_group("complex_euclidean");

    for &(m, n) in &[(10, 5), (100, 50)] {
        let space = ComplexEuclidean::new(m, n).unwrap().with_seed(5);
        let x = space.random_point();
        let u = space.random_tangent_vector(&x).unwrap();
        let v = space.random_tangent_vector(&x).unwrap();

        group.bench_with_input(
            BenchmarkId::new("inner_product", format!("{}x{}", m, n)),
            &(m, n),
            |b, _| {
                b.iter(|| space.inner_product(black_box(&x), black_box(&u), black_box(&v)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sphere_operations,
    benchmark_stiefel_operations,
    benchmark_grassmann_operations,
    benchmark_spd_operations,
    benchmark_complex_euclidean
);
criterion_main!(benches);
