//! Checks `euclidean_to_riemannian_hessian` against a finite-difference
//! covariant derivative of the Riemannian gradient field.
//!
//! For a tangent vector `u` at `x`, the gradient is differentiated along the
//! retraction curve `t ↦ R_x(tu)`, projected back to the tangent (horizontal)
//! space at `x`, and corrected by the Christoffel term of the metric where the
//! metric is not the embedded one.

use geomopt_core::{
    manifold::Manifold,
    metric,
    random::RandomSource,
    types::{DMatrix, Real},
};
use geomopt_manifolds::{
    Grassmann, Oblique, PSDFixedRank, Sphere, Stiefel, SymmetricPositiveDefinite,
};

const STEP: Real = 1e-5;
const TOLERANCE: Real = 1e-5;

fn symmetric_matrix(seed: u64, n: usize) -> DMatrix<Real> {
    metric::symmetric(&RandomSource::seeded(seed).standard_normal::<Real>(n, n))
}

fn check_hessian<M, G, H, C>(manifold: &M, egrad: G, ehess: H, connection: C)
where
    M: Manifold<Field = Real>,
    G: Fn(&DMatrix<Real>) -> DMatrix<Real>,
    H: Fn(&DMatrix<Real>, &DMatrix<Real>) -> DMatrix<Real>,
    C: Fn(&DMatrix<Real>, &DMatrix<Real>, &DMatrix<Real>) -> DMatrix<Real>,
{
    let rgrad = |x: &DMatrix<Real>| {
        manifold
            .euclidean_to_riemannian_gradient(x, &egrad(x))
            .unwrap()
    };

    for _ in 0..3 {
        let x = manifold.random_point();
        let u = manifold.random_tangent_vector(&x).unwrap();

        let hess = manifold
            .euclidean_to_riemannian_hessian(&x, &egrad(&x), &ehess(&x, &u), &u)
            .unwrap();

        let forward = rgrad(&manifold.retr(&x, &(&u * STEP)).unwrap());
        let backward = rgrad(&manifold.retr(&x, &(&u * -STEP)).unwrap());
        let derivative = (forward - backward) / (2.0 * STEP);
        let expected = manifold.projection(&x, &derivative).unwrap() - connection(&x, &u, &rgrad(&x));

        let error = (&hess - &expected).norm();
        assert!(
            error <= TOLERANCE * Real::max(1.0, expected.norm()),
            "{}: Riemannian Hessian differs from finite differences by {:e}",
            manifold.name(),
            error
        );
        assert!(
            manifold.is_vector_in_tangent_space(&x, &hess, 1e-8),
            "{}: Riemannian Hessian is not tangent",
            manifold.name()
        );
    }
}

fn no_connection(_: &DMatrix<Real>, u: &DMatrix<Real>, _: &DMatrix<Real>) -> DMatrix<Real> {
    DMatrix::zeros(u.nrows(), u.ncols())
}

#[test]
fn test_sphere_hessian() {
    let sphere = Sphere::new(4, 2).unwrap().with_seed(100);
    let b = symmetric_matrix(1, 4);
    check_hessian(&sphere, |x| &b * x * 2.0, |_, u| &b * u * 2.0, no_connection);
}

#[test]
fn test_oblique_hessian() {
    let oblique = Oblique::new(5, 3).unwrap().with_seed(101);
    let b = symmetric_matrix(2, 5);
    let c = RandomSource::seeded(3).standard_normal::<Real>(5, 3);
    check_hessian(
        &oblique,
        |x| &b * x * 2.0 + &c,
        |_, u| &b * u * 2.0,
        no_connection,
    );
}

#[test]
fn test_stiefel_hessian() {
    let stiefel = Stiefel::new(6, 3).unwrap().with_seed(102);
    let b = symmetric_matrix(4, 6);
    let c = RandomSource::seeded(5).standard_normal::<Real>(6, 3);
    check_hessian(
        &stiefel,
        |x| &b * x * 2.0 + &c,
        |_, u| &b * u * 2.0,
        no_connection,
    );
}

#[test]
fn test_grassmann_hessian() {
    // The Rayleigh quotient is invariant under a change of basis.
    let grassmann = Grassmann::new(6, 2).unwrap().with_seed(103);
    let b = symmetric_matrix(6, 6);
    check_hessian(&grassmann, |x| &b * x * 2.0, |_, u| &b * u * 2.0, no_connection);
}

#[test]
fn test_psd_fixed_rank_hessian() {
    let psd = PSDFixedRank::new(5, 2).unwrap().with_seed(104);
    let factor = RandomSource::seeded(7).standard_normal::<Real>(5, 2);
    let target = &factor * factor.transpose();
    check_hessian(
        &psd,
        |y| (y * y.transpose() - &target) * y * 4.0,
        |y, u| ((u * y.transpose() + y * u.transpose()) * y + (y * y.transpose() - &target) * u) * 4.0,
        no_connection,
    );
}

#[test]
fn test_spd_hessian() {
    let spd = SymmetricPositiveDefinite::new(4).unwrap().with_seed(105);
    let b = symmetric_matrix(8, 4);
    // Affine-invariant Levi-Civita connection: D_u ξ - sym(u X⁻¹ ξ).
    let christoffel = |x: &DMatrix<Real>, u: &DMatrix<Real>, grad: &DMatrix<Real>| {
        let x_inv = x.clone().try_inverse().unwrap();
        metric::symmetric(&(u * x_inv * grad))
    };
    check_hessian(&spd, |x| &b + x, |_, u| u.clone(), christoffel);
}
