//! Grassmann manifold Gr(n, p) of p-dimensional subspaces of ℝⁿ.
//!
//! A subspace is represented by an `n × p` matrix with orthonormal columns
//! spanning it; two representatives `X` and `XQ` (Q orthogonal) denote the
//! same point. Tangent vectors are horizontal lifts, `XᵀU = 0`.
//!
//! Applications include:
//! - Dominant invariant subspace computation
//! - Low-rank matrix approximation
//! - Subspace tracking and clustering
//!
//! # Closed forms
//!
//! With the thin SVD `U = A Σ Bᵀ`:
//!
//! ```text
//! exp_X(U) = X B cos(Σ) Bᵀ + A sin(Σ) Bᵀ
//! ```
//!
//! and the logarithm inverts it through `arctan` of the singular values of
//! `(YᵀX)⁻¹(Yᵀ - YᵀX Xᵀ)`. Distances are the norm of the principal angles.

use crate::utils;
use geomopt_core::{
    error::{ManifoldError, Result},
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{DMatrix, Real},
};
use log::warn;

/// The Grassmann manifold Gr(n, p) with orthonormal representatives.
///
/// # Mathematical Properties
///
/// - **Dimension**: p(n - p)
/// - **Horizontal space**: {U : XᵀU = 0}
/// - **Projection**: P_X(U) = (I - XXᵀ)U
/// - **Distance**: ‖θ‖ with θ the principal angles between the subspaces
#[derive(Debug, Clone)]
pub struct Grassmann {
    n: usize,
    p: usize,
    random: RandomSource,
}

impl Grassmann {
    /// Creates the Grassmann manifold Gr(n, p).
    ///
    /// # Errors
    ///
    /// Returns an error if `p == 0` or `p > n`.
    pub fn new(n: usize, p: usize) -> Result<Self> {
        if p == 0 || p > n {
            return Err(ManifoldError::invalid_parameter(format!(
                "Grassmann manifold requires 0 < p <= n, got n={}, p={}",
                n, p
            )));
        }
        Ok(Self {
            n,
            p,
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

    /// Returns n (ambient dimension).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns p (subspace dimension).
    pub fn p(&self) -> usize {
        self.p
    }

    /// Orthogonal projector `XXᵀ` onto the subspace, independent of the representative.
    pub fn projector(point: &DMatrix<Real>) -> DMatrix<Real> {
        point * point.transpose()
    }

    fn check_pair(&self, a: &DMatrix<Real>, b: &DMatrix<Real>) -> Result<()> {
        self.check_point(a)?;
        self.check_point(b)
    }

    fn project(x: &DMatrix<Real>, u: &DMatrix<Real>) -> DMatrix<Real> {
        u - x * (x.transpose() * u)
    }
}

impl Manifold for Grassmann {
    type Field = Real;

    fn name(&self) -> &str {
        "Grassmann"
    }

    fn dim(&self) -> usize {
        self.p * (self.n - self.p)
    }

    fn typical_dist(&self) -> Real {
        (self.p as Real).sqrt()
    }

    fn point_shape(&self) -> (usize, usize) {
        (self.n, self.p)
    }

    fn is_point_on_manifold(&self, point: &DMatrix<Real>, tol: Real) -> bool {
        point.shape() == (self.n, self.p) && utils::orthonormality_error(point) <= tol
    }

    fn is_vector_in_tangent_space(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>, tol: Real) -> bool {
        self.check_pair(point, vector).is_ok()
            && (point.transpose() * vector).norm() <= tol * Real::max(1.0, vector.norm())
    }

    fn inner_product(&self, point: &DMatrix<Real>, u: &DMatrix<Real>, v: &DMatrix<Real>) -> Result<Real> {
        self.check_point(point)?;
        self.check_pair(u, v)?;
        Ok(metric::inner(u, v))
    }

    /// Norm of the principal angles, `θᵢ = arccos σᵢ(XᵀY)`.
    fn dist(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<Real> {
        self.check_pair(x, y)?;
        let cosines = (x.transpose() * y).singular_values();
        let squared: Real = cosines
            .iter()
            .map(|&s| s.clamp(-1.0, 1.0).acos().powi(2))
            .sum();
        Ok(squared.sqrt())
    }

    fn projection(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, vector)?;
        Ok(Self::project(point, vector))
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
        let xtg = point.transpose() * euclidean_gradient;
        Ok(Self::project(point, euclidean_hessian) - tangent_vector * xtg)
    }

    fn retr(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        utils::polar_factor(&(point + tangent_vector))
    }

    fn exp(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        let (a, sigma, b_t) = utils::thin_svd(tangent_vector)?;
        let cos = metric::scale_columns(&(point * b_t.transpose()), &sigma.map(Real::cos));
        let sin = metric::scale_columns(&a, &sigma.map(Real::sin));
        Ok((cos + sin) * b_t)
    }

    /// # Errors
    ///
    /// Returns a numerical error when `YᵀX` is singular, i.e. when the
    /// subspaces contain mutually orthogonal directions.
    fn log(&self, point: &DMatrix<Real>, other: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, other)?;
        let ytx = other.transpose() * point;
        let at = other.transpose() - &ytx * point.transpose();
        let bt = ytx.lu().solve(&at).ok_or_else(|| {
            warn!("Grassmann logarithm requested between subspaces with orthogonal directions");
            ManifoldError::numerical_error("YᵀX is singular; the logarithm is undefined")
        })?;
        let (a, sigma, b_t) = utils::thin_svd(&bt.transpose())?;
        Ok(metric::scale_columns(&a, &sigma.map(Real::atan)) * b_t)
    }

    fn random_point(&self) -> DMatrix<Real> {
        utils::random_orthonormal(&self.random, self.n, self.p)
    }

    fn random_tangent_vector(&self, point: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(point)?;
        let vector = Self::project(point, &self.random.standard_normal(self.n, self.p));
        normalize_tangent(self, point, vector)
    }
}
