//! Contract tests for the flat Euclidean spaces on a 10 × 5 shape.
//!
//! Every flat operation has an explicit closed form, so these tests compare
//! against hand-written formulas rather than against other manifold methods.

use approx::assert_relative_eq;
use geomopt_core::{
    manifold::Manifold,
    types::{DMatrix, Field, Real},
};
use geomopt_manifolds::{ComplexEuclidean, Euclidean, EuclideanSpace};
use nalgebra::{Complex, ComplexField};
use pretty_assertions::assert_eq;

const M: usize = 10;
const N: usize = 5;

fn complex_manifold() -> ComplexEuclidean {
    ComplexEuclidean::new(M, N).unwrap()
}

/// Re Σ conj(u) v, written out entry by entry.
fn hermitian_real_part<F: Field>(u: &DMatrix<F>, v: &DMatrix<F>) -> Real {
    u.iter().zip(v.iter()).map(|(a, b)| (a.conjugate() * *b).real()).sum()
}

#[test]
fn test_dim() {
    assert_eq!(complex_manifold().dim(), 2 * M * N);
    assert_eq!(complex_manifold().dim(), 100);
    assert_eq!(Euclidean::new(M, N).unwrap().dim(), M * N);
}

#[test]
fn test_typical_dist() {
    assert_relative_eq!(complex_manifold().typical_dist(), ((M * N) as Real).sqrt());
    assert_relative_eq!(complex_manifold().typical_dist(), 50.0_f64.sqrt());
}

#[test]
fn test_dist() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let y = manifold.random_point();
    let expected = (&x - &y).norm();
    assert_relative_eq!(manifold.dist(&x, &y).unwrap(), expected, epsilon = 1e-6);
    let via_norm = manifold.norm(&x, &(&x - &y)).unwrap();
    assert_relative_eq!(manifold.dist(&x, &y).unwrap(), via_norm, epsilon = 1e-6);
}

#[test]
fn test_inner_product() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();
    let v = manifold.random_tangent_vector(&x).unwrap();
    let value = manifold.inner_product(&x, &u, &v).unwrap();
    assert_relative_eq!(value, hermitian_real_part(&u, &v), epsilon = 1e-6);
    // Real-valued and symmetric even though the entries are complex.
    assert_relative_eq!(value, manifold.inner_product(&x, &v, &u).unwrap(), epsilon = 1e-12);
}

#[test]
fn test_projection() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();
    assert_eq!(manifold.projection(&x, &u).unwrap(), u);
}

#[test]
fn test_euclidean_to_riemannian_hessian() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();
    let egrad = manifold.random_point();
    let ehess = manifold.random_point();
    assert_eq!(
        manifold
            .euclidean_to_riemannian_hessian(&x, &egrad, &ehess, &u)
            .unwrap(),
        ehess
    );
}

#[test]
fn test_retr() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();
    assert_eq!(manifold.retr(&x, &u).unwrap(), &x + &u);
}

#[test]
fn test_norm() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let u = manifold.random_point();
    let expected = u.iter().map(|z| z.norm_sqr()).sum::<Real>().sqrt();
    assert_relative_eq!(manifold.norm(&x, &u).unwrap(), expected, epsilon = 1e-12);
    let other = manifold.random_point();
    assert_relative_eq!(manifold.norm(&other, &u).unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn test_random_point() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let y = manifold.random_point();
    assert_eq!(x.shape(), (M, N));
    assert!((&x - &y).norm() > 1e-6);
    assert!(x.iter().any(|z| z.im.abs() > 1e-6));
}

#[test]
fn test_random_tangent_vector() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();
    let v = manifold.random_tangent_vector(&x).unwrap();
    assert_relative_eq!(manifold.norm(&x, &u).unwrap(), 1.0, epsilon = 1e-6);
    assert!((&u - &v).norm() > 1e-6);
}

#[test]
fn test_transp() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let y = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();
    assert_eq!(manifold.transp(&x, &y, &u).unwrap(), u);
}

#[test]
fn test_exp_log_inverse() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let y = manifold.random_point();
    let v = manifold.log(&x, &y).unwrap();
    let z = manifold.exp(&x, &v).unwrap();
    assert!((&y - &z).norm() < 1e-6);
}

#[test]
fn test_log_exp_inverse() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();
    let y = manifold.exp(&x, &u).unwrap();
    let v = manifold.log(&x, &y).unwrap();
    assert!((&u - &v).norm() < 1e-6);
}

#[test]
fn test_pairmean() {
    let manifold = complex_manifold();
    let x = manifold.random_point();
    let y = manifold.random_point();
    let z = manifold.pairmean(&x, &y).unwrap();
    assert_relative_eq!(
        manifold.dist(&x, &z).unwrap(),
        manifold.dist(&y, &z).unwrap(),
        epsilon = 1e-6
    );
}

#[test]
fn test_shape_scenario() {
    let manifold = ComplexEuclidean::new(10, 5).unwrap();
    let x = manifold.random_point();
    assert_eq!(x.shape(), (10, 5));
    let _: &DMatrix<Complex<f64>> = &x;
}

/// The same laws on the real space, through the shared generic implementation.
fn check_flat_laws<F: Field>(manifold: &EuclideanSpace<F>) {
    let x = manifold.random_point();
    let y = manifold.random_point();
    let u = manifold.random_tangent_vector(&x).unwrap();

    assert_relative_eq!(manifold.dist(&x, &y).unwrap(), (&x - &y).norm(), epsilon = 1e-12);
    assert_eq!(manifold.projection(&x, &u).unwrap(), u);
    assert_eq!(manifold.retr(&x, &u).unwrap(), &x + &u);
    assert_eq!(manifold.transp(&x, &y, &u).unwrap(), u);
    assert_relative_eq!(manifold.norm(&x, &u).unwrap(), 1.0, epsilon = 1e-12);

    let mid = manifold.pairmean(&x, &y).unwrap();
    assert_relative_eq!(
        manifold.dist(&x, &mid).unwrap(),
        manifold.dist(&y, &mid).unwrap(),
        epsilon = 1e-12
    );
    assert!((manifold.exp(&x, &manifold.log(&x, &y).unwrap()).unwrap() - &y).norm() < 1e-12);
}

#[test]
fn test_real_euclidean_laws() {
    check_flat_laws(&Euclidean::new(M, N).unwrap().with_seed(10));
    check_flat_laws(&Euclidean::new(1, 1).unwrap());
}

#[test]
fn test_complex_euclidean_laws() {
    check_flat_laws(&ComplexEuclidean::new(M, N).unwrap().with_seed(10));
}
