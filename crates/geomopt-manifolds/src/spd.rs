//! Manifold of symmetric positive definite matrices with the affine-invariant metric.
//!
//! S⁺⁺(n) = {X ∈ ℝ^{n×n} : X = Xᵀ, X ≻ 0}, an open subset of the symmetric
//! matrices, so tangent vectors are symmetric matrices. The affine-invariant
//! metric
//!
//! ```text
//! ⟨U, V⟩_X = tr(X⁻¹ U X⁻¹ V)
//! ```
//!
//! makes it a complete manifold of non-positive curvature: exp and log are
//! global, and every pair of points is joined by a unique geodesic.
//!
//! All formulas whiten through the Cholesky factor `X = LLᵀ`:
//!
//! ```text
//! exp_X(U) = L expm(L⁻¹ U L⁻ᵀ) Lᵀ
//! log_X(Y) = L logm(L⁻¹ Y L⁻ᵀ) Lᵀ
//! d(X, Y)  = ‖logm(L⁻¹ Y L⁻ᵀ)‖_F
//! ```

use crate::utils;
use geomopt_core::{
    error::{ManifoldError, Result},
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{DMatrix, Real},
};
use log::warn;
use nalgebra::Cholesky;

/// The manifold of `n × n` symmetric positive definite matrices.
///
/// # Mathematical Properties
///
/// - **Dimension**: n(n+1)/2
/// - **Tangent space**: symmetric matrices
/// - **Riemannian gradient**: X sym(∇f) X
/// - **Parallel transport**: U ↦ E U Eᵀ, E = X^{1/2}(X^{-1/2} Y X^{-1/2})^{1/2} X^{-1/2}
#[derive(Debug, Clone)]
pub struct SymmetricPositiveDefinite {
    n: usize,
    random: RandomSource,
}

impl SymmetricPositiveDefinite {
    /// Creates the manifold of `n × n` SPD matrices.
    ///
    /// # Errors
    ///
    /// Returns an error if `n == 0`.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(ManifoldError::invalid_parameter(
                "SPD manifold requires n >= 1",
            ));
        }
        Ok(Self {
            n,
            random: RandomSource::default(),
        })
    }

    /// Replaces the random source used for sampling.
    pub fn with_random_source(mut self, random: RandomSource) -> Self {
        self.random = random;
        self
    }

    /// Seeds the random source for reproducible sampling.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_random_source(RandomSource::seeded(seed))
    }

    fn check_pair(&self, a: &DMatrix<Real>, b: &DMatrix<Real>) -> Result<()> {
        self.check_point(a)?;
        self.check_point(b)
    }

    fn cholesky(point: &DMatrix<Real>) -> Result<Cholesky<Real, nalgebra::Dyn>> {
        metric::symmetric(point)
            .cholesky()
            .ok_or_else(|| ManifoldError::invalid_point("matrix is not positive definite"))
    }

    /// `L⁻¹ A L⁻ᵀ` for the Cholesky factor `L`.
    fn whiten(l: &DMatrix<Real>, a: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        let half = l
            .solve_lower_triangular(a)
            .ok_or_else(|| ManifoldError::numerical_error("singular Cholesky factor"))?;
        let full = l
            .solve_lower_triangular(&half.transpose())
            .ok_or_else(|| ManifoldError::numerical_error("singular Cholesky factor"))?;
        Ok(metric::symmetric(&full))
    }

    /// `L A Lᵀ`, the inverse of [`whiten`](Self::whiten).
    fn color(l: &DMatrix<Real>, a: &DMatrix<Real>) -> DMatrix<Real> {
        metric::symmetric(&(l * a * l.transpose()))
    }

    fn log_eigenvalue(lambda: Real) -> Result<Real> {
        if lambda <= 0.0 {
            return Err(ManifoldError::invalid_point(
                "matrix logarithm of a non positive definite matrix",
            ));
        }
        Ok(lambda.ln())
    }
}

impl Manifold for SymmetricPositiveDefinite {
    type Field = Real;

    fn name(&self) -> &str {
        "SymmetricPositiveDefinite"
    }

    fn dim(&self) -> usize {
        self.n * (self.n + 1) / 2
    }

    fn typical_dist(&self) -> Real {
        (self.dim() as Real).sqrt()
    }

    fn point_shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    fn is_point_on_manifold(&self, point: &DMatrix<Real>, tol: Real) -> bool {
        point.shape() == (self.n, self.n)
            && (point - point.transpose()).norm() <= tol * Real::max(1.0, point.norm())
            && utils::sym_eigenvalues(point).min() > 0.0
    }

    fn is_vector_in_tangent_space(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>, tol: Real) -> bool {
        self.check_pair(point, vector).is_ok()
            && (vector - vector.transpose()).norm() <= tol * Real::max(1.0, vector.norm())
    }

    fn inner_product(&self, point: &DMatrix<Real>, u: &DMatrix<Real>, v: &DMatrix<Real>) -> Result<Real> {
        self.check_point(point)?;
        self.check_pair(u, v)?;
        let l = Self::cholesky(point)?.l();
        let wu = Self::whiten(&l, u)?;
        let wv = Self::whiten(&l, v)?;
        Ok(metric::inner(&wu, &wv))
    }

    /// `sqrt(Σ log² λᵢ)` over the eigenvalues of `L⁻¹ Y L⁻ᵀ`.
    fn dist(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<Real> {
        self.check_pair(x, y)?;
        let l = Self::cholesky(x)?.l();
        let eigenvalues = utils::sym_eigenvalues(&Self::whiten(&l, y)?);
        let mut squared = 0.0;
        for &lambda in eigenvalues.iter() {
            squared += Self::log_eigenvalue(lambda)?.powi(2);
        }
        Ok(squared.sqrt())
    }

    fn projection(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, vector)?;
        Ok(metric::symmetric(vector))
    }

    fn euclidean_to_riemannian_gradient(
        &self,
        point: &DMatrix<Real>,
        euclidean_gradient: &DMatrix<Real>,
    ) -> Result<DMatrix<Real>> {
        self.check_pair(point, euclidean_gradient)?;
        Ok(metric::symmetric(
            &(point * metric::symmetric(euclidean_gradient) * point),
        ))
    }

    fn euclidean_to_riemannian_hessian(
        &self,
        point: &DMatrix<Real>,
        euclidean_gradient: &DMatrix<Real>,
        euclidean_hessian: &DMatrix<Real>,
        tangent_vector: &DMatrix<Real>,
    ) -> Result<DMatrix<Real>> {
        self.check_pair(point, euclidean_gradient)?;
        self.check_pair(euclidean_hessian, tangent_vector)?;
        let sym_grad = metric::symmetric(euclidean_gradient);
        let first = point * metric::symmetric(euclidean_hessian) * point;
        let second = metric::symmetric(&(tangent_vector * sym_grad * point));
        Ok(metric::symmetric(&(first + second)))
    }

    /// Second-order retraction `X + U + ½ U X⁻¹ U`, which stays positive definite.
    fn retr(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        let x_inv_u = Self::cholesky(point)?.solve(tangent_vector);
        Ok(metric::symmetric(
            &(point + tangent_vector + tangent_vector * x_inv_u * 0.5),
        ))
    }

    fn exp(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        let l = Self::cholesky(point)?.l();
        let whitened = Self::whiten(&l, tangent_vector)?;
        Ok(Self::color(&l, &utils::sym_function(&whitened, Real::exp)))
    }

    fn log(&self, point: &DMatrix<Real>, other: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, other)?;
        let l = Self::cholesky(point)?.l();
        let whitened = Self::whiten(&l, other)?;
        if utils::sym_eigenvalues(&whitened).min() <= 0.0 {
            warn!("SPD logarithm requested towards a matrix that is not positive definite");
            return Err(ManifoldError::invalid_point(
                "target of the logarithm is not positive definite",
            ));
        }
        Ok(Self::color(&l, &utils::sym_function(&whitened, Real::ln)))
    }

    /// Exact parallel transport along the connecting geodesic.
    fn transp(&self, from: &DMatrix<Real>, to: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(from, to)?;
        self.check_point(vector)?;
        Self::cholesky(from)?;
        let sqrt_x = utils::sym_function(from, Real::sqrt);
        let inv_sqrt_x = utils::sym_function(from, |lambda| 1.0 / lambda.sqrt());
        let middle = utils::sym_function(&(&inv_sqrt_x * to * &inv_sqrt_x), |lambda| {
            lambda.max(0.0).sqrt()
        });
        let e = sqrt_x * middle * inv_sqrt_x;
        Ok(metric::symmetric(&(&e * metric::symmetric(vector) * e.transpose())))
    }

    /// `Q diag(1 + uᵢ) Qᵀ` with Q Haar-orthogonal and uᵢ uniform in [0, 1).
    fn random_point(&self) -> DMatrix<Real> {
        let q = utils::random_orthonormal(&self.random, self.n, self.n);
        let eigenvalues = self.random.uniform(self.n, 1, 1.0, 2.0).column(0).into_owned();
        metric::symmetric(&(metric::scale_columns(&q, &eigenvalues) * q.transpose()))
    }

    fn random_tangent_vector(&self, point: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(point)?;
        let vector = metric::symmetric(&self.random.standard_normal(self.n, self.n));
        normalize_tangent(self, point, vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spd() -> SymmetricPositiveDefinite {
        SymmetricPositiveDefinite::new(3).unwrap().with_seed(21)
    }

    #[test]
    fn test_spd_creation() {
        let m = spd();
        assert_eq!(m.dim(), 6);
        assert_relative_eq!(m.typical_dist(), 6.0_f64.sqrt());
        assert!(SymmetricPositiveDefinite::new(0).is_err());
    }

    #[test]
    fn test_metric_at_identity_is_frobenius() {
        let m = spd();
        let x = DMatrix::identity(3, 3);
        let u = m.random_tangent_vector(&m.random_point()).unwrap();
        let v = metric::symmetric(&DMatrix::from_fn(3, 3, |i, j| (i + 2 * j) as Real));
        assert_relative_eq!(m.inner_product(&x, &u, &v).unwrap(), metric::inner(&u, &v), epsilon = 1e-12);
    }

    #[test]
    fn test_affine_invariance_of_distance() {
        let m = spd();
        let x = m.random_point();
        let y = m.random_point();
        let a = m.random_point();
        let moved_x = &a * &x * a.transpose();
        let moved_y = &a * &y * a.transpose();
        assert_relative_eq!(
            m.dist(&x, &y).unwrap(),
            m.dist(&moved_x, &moved_y).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_exp_log_global() {
        let m = spd();
        let x = m.random_point();
        let y = m.random_point();
        let v = m.log(&x, &y).unwrap();
        assert_relative_eq!(m.exp(&x, &v).unwrap(), y, epsilon = 1e-9);
        assert_relative_eq!(m.norm(&x, &v).unwrap(), m.dist(&x, &y).unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn test_retraction_stays_positive_definite() {
        let m = spd();
        let x = m.random_point();
        let u = m.random_tangent_vector(&x).unwrap() * 5.0;
        let y = m.retr(&x, &u).unwrap();
        assert!(m.is_point_on_manifold(&y, 1e-10));
    }

    #[test]
    fn test_transport_preserves_inner_products() {
        let m = spd();
        let x = m.random_point();
        let y = m.random_point();
        let u = m.random_tangent_vector(&x).unwrap();
        let w = m.random_tangent_vector(&x).unwrap();
        let tu = m.transp(&x, &y, &u).unwrap();
        let tw = m.transp(&x, &y, &w).unwrap();
        assert_relative_eq!(
            m.inner_product(&y, &tu, &tw).unwrap(),
            m.inner_product(&x, &u, &w).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_not_positive_definite_rejected() {
        let m = spd();
        let x = DMatrix::from_diagonal_element(3, 3, -1.0);
        let u = DMatrix::identity(3, 3);
        assert!(!m.is_point_on_manifold(&x, 1e-8));
        assert!(matches!(
            m.inner_product(&x, &u, &u),
            Err(ManifoldError::InvalidPoint { .. })
        ));
    }
}
