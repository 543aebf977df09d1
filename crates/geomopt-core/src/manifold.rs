//! Core manifold trait.
//!
//! This module defines the `Manifold` trait that every geometry in the
//! workspace implements. A Riemannian manifold (ℳ, g) is a smooth manifold
//! together with an inner product g_x on each tangent space T_x ℳ.
//!
//! # Mathematical Background
//!
//! - **Tangent space**: T_x ℳ is the linear approximation of ℳ at x
//! - **Retraction**: a smooth map R_x: T_x ℳ → ℳ with R_x(0) = x and
//!   dR_x(0) = id, a cheap stand-in for the exponential map
//! - **Exponential / logarithmic maps**: exp_x follows the geodesic with
//!   initial velocity u for unit time, log_x is its local inverse
//! - **Transport**: moves tangent vectors from T_x ℳ to T_y ℳ
//! - **Riemannian gradient / Hessian**: obtained from their Euclidean
//!   counterparts through projection and a curvature correction
//!
//! Points and tangent vectors share one representation: a matrix of shape
//! [`Manifold::point_shape`]. Operations validate shapes and never broadcast.

use crate::{
    error::Result,
    metric,
    types::{constants, Field, Point, Real, TangentVector},
};
use std::fmt::Debug;

/// Trait for Riemannian manifolds.
///
/// Optimizers and example problems depend on this trait only, never on a
/// concrete geometry. Implementations are immutable after construction and
/// `Send + Sync`; the one piece of interior state is the manifold's own
/// random source, used by [`random_point`](Manifold::random_point) and
/// [`random_tangent_vector`](Manifold::random_tangent_vector).
///
/// # Mathematical Properties
///
/// 1. **Projection idempotency**: P_x(P_x(u)) = P_x(u)
/// 2. **Retraction centering**: R_x(0) = x
/// 3. **Exp/log inverse**: exp_x(log_x(y)) = y wherever log_x is defined
/// 4. **Metric**: ⟨·,·⟩_x is real-valued, symmetric and positive definite
///
/// # Example
///
/// ```rust,ignore
/// use geomopt_manifolds::ComplexEuclidean;
/// use geomopt_core::manifold::Manifold;
///
/// let manifold = ComplexEuclidean::new(10, 5)?;
/// let x = manifold.random_point();
/// let u = manifold.random_tangent_vector(&x)?;
/// let y = manifold.retr(&x, &u)?;
/// assert_eq!(manifold.dim(), 100);
/// ```
pub trait Manifold: Debug + Send + Sync {
    /// Scalar field of the matrix entries (ℝ or ℂ).
    type Field: Field;

    /// Returns a human-readable name for the manifold.
    fn name(&self) -> &str;

    /// Real dimension of the manifold.
    ///
    /// Every complex degree of freedom counts as two real dimensions.
    fn dim(&self) -> usize;

    /// Characteristic geodesic scale, used by solvers for step-size heuristics.
    fn typical_dist(&self) -> Real;

    /// Shape `(rows, cols)` shared by points and tangent vectors.
    fn point_shape(&self) -> (usize, usize);

    /// Checks if a point lies on the manifold within a given tolerance.
    fn is_point_on_manifold(&self, point: &Point<Self::Field>, tol: Real) -> bool;

    /// Checks if a vector is in the tangent space at a given point.
    ///
    /// The default compares the vector with its own projection.
    fn is_vector_in_tangent_space(
        &self,
        point: &Point<Self::Field>,
        vector: &TangentVector<Self::Field>,
        tol: Real,
    ) -> bool {
        match self.projection(point, vector) {
            Ok(projected) => {
                metric::distance(&projected, vector) <= tol * Real::max(1.0, metric::norm(vector))
            }
            Err(_) => false,
        }
    }

    /// Computes the Riemannian inner product ⟨u, v⟩_x.
    ///
    /// Always real; complex manifolds return the real part of the Hermitian
    /// inner product.
    fn inner_product(
        &self,
        point: &Point<Self::Field>,
        u: &TangentVector<Self::Field>,
        v: &TangentVector<Self::Field>,
    ) -> Result<Real>;

    /// Computes the norm of a tangent vector, sqrt(⟨u, u⟩_x).
    fn norm(&self, point: &Point<Self::Field>, vector: &TangentVector<Self::Field>) -> Result<Real> {
        self.inner_product(point, vector, vector)
            .map(|ip| ip.max(0.0).sqrt())
    }

    /// Computes the geodesic distance between two points.
    ///
    /// The default uses the norm of the logarithmic map.
    fn dist(&self, x: &Point<Self::Field>, y: &Point<Self::Field>) -> Result<Real> {
        let log = self.log(x, y)?;
        self.norm(x, &log)
    }

    /// Orthogonal projection of an ambient vector onto T_x ℳ.
    fn projection(
        &self,
        point: &Point<Self::Field>,
        vector: &TangentVector<Self::Field>,
    ) -> Result<TangentVector<Self::Field>>;

    /// Converts a Euclidean gradient into the Riemannian gradient.
    ///
    /// For manifolds embedded with the induced metric this is the tangent
    /// projection, which is the default. Manifolds with a non-Euclidean metric
    /// override it.
    fn euclidean_to_riemannian_gradient(
        &self,
        point: &Point<Self::Field>,
        euclidean_gradient: &TangentVector<Self::Field>,
    ) -> Result<TangentVector<Self::Field>> {
        self.projection(point, euclidean_gradient)
    }

    /// Converts a Euclidean Hessian-vector product into the Riemannian one.
    ///
    /// # Arguments
    ///
    /// * `point` - A point x on the manifold
    /// * `euclidean_gradient` - The ambient gradient ∇f(x)
    /// * `euclidean_hessian` - The ambient Hessian-vector product ∇²f(x)[u]
    /// * `tangent_vector` - The direction u ∈ T_x ℳ
    ///
    /// Flat manifolds return `euclidean_hessian` unchanged; curved ones
    /// subtract a curvature term built from the gradient and `u`.
    fn euclidean_to_riemannian_hessian(
        &self,
        point: &Point<Self::Field>,
        euclidean_gradient: &TangentVector<Self::Field>,
        euclidean_hessian: &TangentVector<Self::Field>,
        tangent_vector: &TangentVector<Self::Field>,
    ) -> Result<TangentVector<Self::Field>>;

    /// Performs a retraction R_x(u).
    fn retr(
        &self,
        point: &Point<Self::Field>,
        tangent_vector: &TangentVector<Self::Field>,
    ) -> Result<Point<Self::Field>>;

    /// Computes the exponential map exp_x(u).
    fn exp(
        &self,
        point: &Point<Self::Field>,
        tangent_vector: &TangentVector<Self::Field>,
    ) -> Result<Point<Self::Field>>;

    /// Computes the logarithmic map log_x(y), the inverse of `exp` in `y`.
    ///
    /// # Errors
    ///
    /// Returns a numerical error where log is not defined (e.g. antipodal
    /// points on a sphere).
    fn log(
        &self,
        point: &Point<Self::Field>,
        other: &Point<Self::Field>,
    ) -> Result<TangentVector<Self::Field>>;

    /// Transports a tangent vector from T_x ℳ to T_y ℳ.
    ///
    /// The default is vector transport by projection onto T_y ℳ.
    fn transp(
        &self,
        _from: &Point<Self::Field>,
        to: &Point<Self::Field>,
        vector: &TangentVector<Self::Field>,
    ) -> Result<TangentVector<Self::Field>> {
        self.projection(to, vector)
    }

    /// Geodesic midpoint of `x` and `y`.
    ///
    /// The default walks half of the logarithmic map from `x`.
    fn pairmean(&self, x: &Point<Self::Field>, y: &Point<Self::Field>) -> Result<Point<Self::Field>> {
        let log = self.log(x, y)?;
        self.exp(x, &metric::scale(&log, 0.5))
    }

    /// Generates a random point on the manifold.
    fn random_point(&self) -> Point<Self::Field>;

    /// Generates a random tangent vector of unit norm at `point`.
    fn random_tangent_vector(&self, point: &Point<Self::Field>) -> Result<TangentVector<Self::Field>>;

    /// The zero tangent vector at `point`.
    fn zero_vector(&self, point: &Point<Self::Field>) -> Result<TangentVector<Self::Field>> {
        self.check_point(point)?;
        let (rows, cols) = self.point_shape();
        Ok(TangentVector::zeros(rows, cols))
    }

    /// Validates the shape of a point or tangent vector.
    fn check_point(&self, matrix: &Point<Self::Field>) -> Result<()> {
        metric::check_shape(self.point_shape(), matrix, self.name())
    }
}

/// Normalizes a tangent vector to unit length in the manifold metric.
///
/// Shared by `random_tangent_vector` implementations. Vectors with a
/// vanishing norm are returned unchanged.
pub fn normalize_tangent<M: Manifold + ?Sized>(
    manifold: &M,
    point: &Point<M::Field>,
    vector: TangentVector<M::Field>,
) -> Result<TangentVector<M::Field>> {
    let norm = manifold.norm(point, &vector)?;
    if norm < constants::NORM_EPSILON {
        return Ok(vector);
    }
    Ok(metric::scale(&vector, 1.0 / norm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ManifoldError, random::RandomSource, types::DMatrix};

    /// Flat real matrix space, only relying on trait defaults where possible.
    #[derive(Debug)]
    struct Flat {
        shape: (usize, usize),
        random: RandomSource,
    }

    impl Manifold for Flat {
        type Field = f64;

        fn name(&self) -> &str {
            "Flat"
        }

        fn dim(&self) -> usize {
            self.shape.0 * self.shape.1
        }

        fn typical_dist(&self) -> Real {
            (self.dim() as Real).sqrt()
        }

        fn point_shape(&self) -> (usize, usize) {
            self.shape
        }

        fn is_point_on_manifold(&self, point: &DMatrix<f64>, _tol: Real) -> bool {
            point.shape() == self.shape
        }

        fn inner_product(&self, x: &DMatrix<f64>, u: &DMatrix<f64>, v: &DMatrix<f64>) -> Result<Real> {
            self.check_point(x)?;
            Ok(metric::inner(u, v))
        }

        fn projection(&self, x: &DMatrix<f64>, u: &DMatrix<f64>) -> Result<DMatrix<f64>> {
            self.check_point(x)?;
            Ok(u.clone())
        }

        fn euclidean_to_riemannian_hessian(
            &self,
            _x: &DMatrix<f64>,
            _egrad: &DMatrix<f64>,
            ehess: &DMatrix<f64>,
            _u: &DMatrix<f64>,
        ) -> Result<DMatrix<f64>> {
            Ok(ehess.clone())
        }

        fn retr(&self, x: &DMatrix<f64>, u: &DMatrix<f64>) -> Result<DMatrix<f64>> {
            Ok(x + u)
        }

        fn exp(&self, x: &DMatrix<f64>, u: &DMatrix<f64>) -> Result<DMatrix<f64>> {
            self.retr(x, u)
        }

        fn log(&self, x: &DMatrix<f64>, y: &DMatrix<f64>) -> Result<DMatrix<f64>> {
            Ok(y - x)
        }

        fn random_point(&self) -> DMatrix<f64> {
            self.random.standard_normal(self.shape.0, self.shape.1)
        }

        fn random_tangent_vector(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
            let u = self.random.standard_normal(self.shape.0, self.shape.1);
            normalize_tangent(self, x, u)
        }
    }

    fn flat() -> Flat {
        Flat {
            shape: (3, 2),
            random: RandomSource::seeded(11),
        }
    }

    #[test]
    fn test_default_norm_and_dist() {
        let manifold = flat();
        let x = DMatrix::zeros(3, 2);
        let y = DMatrix::from_element(3, 2, 1.0);
        assert!((manifold.norm(&x, &y).unwrap() - 6.0_f64.sqrt()).abs() < 1e-14);
        assert!((manifold.dist(&x, &y).unwrap() - 6.0_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn test_default_pairmean_and_transport() {
        let manifold = flat();
        let x = manifold.random_point();
        let y = manifold.random_point();
        let mid = manifold.pairmean(&x, &y).unwrap();
        let dx = manifold.dist(&x, &mid).unwrap();
        let dy = manifold.dist(&y, &mid).unwrap();
        assert!((dx - dy).abs() < 1e-12);

        let u = manifold.random_tangent_vector(&x).unwrap();
        assert_eq!(manifold.transp(&x, &y, &u).unwrap(), u);
    }

    #[test]
    fn test_random_tangent_is_unit() {
        let manifold = flat();
        let x = manifold.random_point();
        let u = manifold.random_tangent_vector(&x).unwrap();
        assert!((manifold.norm(&x, &u).unwrap() - 1.0).abs() < 1e-12);
        assert!(manifold.is_vector_in_tangent_space(&x, &u, 1e-12));
    }

    #[test]
    fn test_zero_vector_checks_shape() {
        let manifold = flat();
        let bad = DMatrix::zeros(2, 3);
        assert!(matches!(
            manifold.zero_vector(&bad),
            Err(ManifoldError::DimensionMismatch { .. })
        ));
        let x = DMatrix::zeros(3, 2);
        assert_eq!(manifold.zero_vector(&x).unwrap(), DMatrix::zeros(3, 2));
    }

    #[test]
    fn test_manifold_is_object_safe_and_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Flat>();
        let boxed: Box<dyn Manifold<Field = f64>> = Box::new(flat());
        assert_eq!(boxed.dim(), 6);
    }
}
