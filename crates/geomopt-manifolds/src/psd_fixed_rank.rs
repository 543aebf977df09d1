//! Positive semidefinite matrices of fixed rank, as a quotient manifold.
//!
//! A PSD matrix `A = YYᵀ` of rank k is represented by a full-rank factor
//! `Y ∈ ℝ^{n×k}`; the factors `Y` and `YQ` (Q orthogonal) describe the same
//! matrix. The total space ℝ^{n×k} carries the Euclidean metric and tangent
//! vectors are horizontal lifts:
//!
//! ```text
//! H_Y = {U : YᵀU = UᵀY}
//! ```
//!
//! The horizontal projection solves a small Lyapunov equation. Distances,
//! logarithms and midpoints first align the second factor with the first by
//! solving an orthogonal Procrustes problem.

use crate::utils;
use geomopt_core::{
    error::{ManifoldError, Result},
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{DMatrix, Real},
};

/// The manifold of rank-k PSD matrices `YYᵀ` of size n × n.
///
/// # Mathematical Properties
///
/// - **Dimension**: kn - k(k-1)/2
/// - **Projection**: P_Y(H) = H - YΩ with (YᵀY)Ω + Ω(YᵀY) = YᵀH - HᵀY
/// - **Retraction / exponential**: Y + U
/// - **Distance**: min_Q ‖ZQ - Y‖_F over orthogonal Q
#[derive(Debug, Clone)]
pub struct PSDFixedRank {
    n: usize,
    k: usize,
    random: RandomSource,
}

impl PSDFixedRank {
    /// Creates the manifold of rank-`k` PSD matrices of size `n × n`.
    ///
    /// # Errors
    ///
    /// Returns an error if `k == 0` or `k > n`.
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if k == 0 || k > n {
            return Err(ManifoldError::invalid_parameter(format!(
                "PSDFixedRank requires 0 < k <= n, got n={}, k={}",
                n, k
            )));
        }
        Ok(Self {
            n,
            k,
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

    /// The PSD matrix `YYᵀ` represented by a factor.
    pub fn matrix(point: &DMatrix<Real>) -> DMatrix<Real> {
        point * point.transpose()
    }

    fn check_pair(&self, a: &DMatrix<Real>, b: &DMatrix<Real>) -> Result<()> {
        self.check_point(a)?;
        self.check_point(b)
    }

    fn project(y: &DMatrix<Real>, h: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        let yty = y.transpose() * y;
        let yth = y.transpose() * h;
        let skew = &yth - yth.transpose();
        let omega = utils::solve_lyapunov(&yty, &skew)?;
        Ok(h - y * omega)
    }

    /// `ZQ`, the representative of `other` closest to `point`.
    fn align(point: &DMatrix<Real>, other: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        let q = utils::polar_factor(&(other.transpose() * point))?;
        Ok(other * q)
    }
}

impl Manifold for PSDFixedRank {
    type Field = Real;

    fn name(&self) -> &str {
        "PSDFixedRank"
    }

    fn dim(&self) -> usize {
        self.k * self.n - self.k * (self.k - 1) / 2
    }

    fn typical_dist(&self) -> Real {
        10.0 + self.k as Real
    }

    fn point_shape(&self) -> (usize, usize) {
        (self.n, self.k)
    }

    fn is_point_on_manifold(&self, point: &DMatrix<Real>, tol: Real) -> bool {
        point.shape() == (self.n, self.k)
            && point.iter().all(|v| v.is_finite())
            && point.singular_values().min() > tol
    }

    fn is_vector_in_tangent_space(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>, tol: Real) -> bool {
        if self.check_pair(point, vector).is_err() {
            return false;
        }
        let ytu = point.transpose() * vector;
        (&ytu - ytu.transpose()).norm() <= tol * Real::max(1.0, point.norm() * vector.norm())
    }

    fn inner_product(&self, point: &DMatrix<Real>, u: &DMatrix<Real>, v: &DMatrix<Real>) -> Result<Real> {
        self.check_point(point)?;
        self.check_pair(u, v)?;
        Ok(metric::inner(u, v))
    }

    fn dist(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<Real> {
        self.check_pair(x, y)?;
        Ok(metric::distance(&Self::align(x, y)?, x))
    }

    fn projection(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, vector)?;
        Self::project(point, vector)
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
        Self::project(point, euclidean_hessian)
    }

    fn retr(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        Ok(point + tangent_vector)
    }

    fn exp(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.retr(point, tangent_vector)
    }

    fn log(&self, point: &DMatrix<Real>, other: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, other)?;
        Ok(Self::align(point, other)? - point)
    }

    fn pairmean(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(x, y)?;
        Ok((Self::align(x, y)? + x) * 0.5)
    }

    fn random_point(&self) -> DMatrix<Real> {
        self.random.standard_normal(self.n, self.k)
    }

    fn random_tangent_vector(&self, point: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(point)?;
        let vector = Self::project(point, &self.random.standard_normal(self.n, self.k))?;
        normalize_tangent(self, point, vector)
    }
}
