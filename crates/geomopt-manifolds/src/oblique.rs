//! Oblique manifold OB(m, n) = {X ∈ ℝ^{m×n} : diag(XᵀX) = 1}.
//!
//! Matrices whose columns all have unit norm, i.e. the product of `n` unit
//! spheres in ℝᵐ. It appears in:
//! - Dictionary learning with normalized atoms
//! - Low-rank correlation matrix approximation
//! - Sphere packing (one point per column)
//!
//! Every operation applies the sphere formulas to each column independently.

use crate::{
    sphere,
    utils::{self, column},
};
use geomopt_core::{
    error::{ManifoldError, Result},
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{DMatrix, Real},
};
use std::f64::consts::PI;

/// The oblique manifold of `m × n` matrices with unit-norm columns.
///
/// # Mathematical Properties
///
/// - **Dimension**: (m - 1) n
/// - **Tangent space**: T_X OB = {U : diag(XᵀU) = 0}
/// - **Projection**: P_X(H) = H - X diag(diag(XᵀH))
/// - **Distance**: sqrt(Σⱼ d_S(xⱼ, yⱼ)²)
#[derive(Debug, Clone)]
pub struct Oblique {
    m: usize,
    n: usize,
    random: RandomSource,
}

impl Oblique {
    /// Creates the oblique manifold of `m × n` matrices.
    ///
    /// # Errors
    ///
    /// Returns an error if `m < 2` or `n == 0`.
    pub fn new(m: usize, n: usize) -> Result<Self> {
        if m < 2 || n == 0 {
            return Err(ManifoldError::invalid_parameter(format!(
                "Oblique manifold requires m >= 2 and n >= 1, got ({}, {})",
                m, n
            )));
        }
        Ok(Self {
            m,
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

    fn project(x: &DMatrix<Real>, h: &DMatrix<Real>) -> DMatrix<Real> {
        h - metric::scale_columns(x, &metric::column_inner(x, h))
    }

    /// Builds a matrix column by column from a per-column sphere operation.
    fn columnwise<F>(&self, f: F) -> Result<DMatrix<Real>>
    where
        F: Fn(usize) -> Result<DMatrix<Real>>,
    {
        let mut result = DMatrix::zeros(self.m, self.n);
        for j in 0..self.n {
            result.set_column(j, &f(j)?.column(0));
        }
        Ok(result)
    }
}

impl Manifold for Oblique {
    type Field = Real;

    fn name(&self) -> &str {
        "Oblique"
    }

    fn dim(&self) -> usize {
        (self.m - 1) * self.n
    }

    fn typical_dist(&self) -> Real {
        PI * (self.n as Real).sqrt()
    }

    fn point_shape(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    fn is_point_on_manifold(&self, point: &DMatrix<Real>, tol: Real) -> bool {
        point.shape() == (self.m, self.n)
            && point.column_iter().all(|c| (c.norm() - 1.0).abs() <= tol)
    }

    fn is_vector_in_tangent_space(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>, tol: Real) -> bool {
        self.check_pair(point, vector).is_ok()
            && metric::column_inner(point, vector).amax() <= tol * Real::max(1.0, vector.norm())
    }

    fn inner_product(&self, point: &DMatrix<Real>, u: &DMatrix<Real>, v: &DMatrix<Real>) -> Result<Real> {
        self.check_point(point)?;
        self.check_pair(u, v)?;
        Ok(metric::inner(u, v))
    }

    fn dist(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<Real> {
        self.check_pair(x, y)?;
        let squared: Real = (0..self.n)
            .map(|j| sphere::dist(&column(x, j), &column(y, j)).powi(2))
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
        let correction = metric::scale_columns(
            tangent_vector,
            &metric::column_inner(point, euclidean_gradient),
        );
        Ok(Self::project(point, euclidean_hessian) - correction)
    }

    fn retr(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        utils::normalize_columns(&(point + tangent_vector))
    }

    fn exp(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        self.columnwise(|j| Ok(sphere::exp(&column(point, j), &column(tangent_vector, j))))
    }

    fn log(&self, point: &DMatrix<Real>, other: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, other)?;
        self.columnwise(|j| sphere::log(&column(point, j), &column(other, j)))
    }

    fn transp(&self, from: &DMatrix<Real>, to: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(from, to)?;
        self.check_point(vector)?;
        self.columnwise(|j| sphere::transport(&column(from, j), &column(to, j), &column(vector, j)))
    }

    fn pairmean(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(x, y)?;
        utils::normalize_columns(&(x + y))
    }

    fn random_point(&self) -> DMatrix<Real> {
        loop {
            let sample: DMatrix<Real> = self.random.standard_normal(self.m, self.n);
            if let Ok(point) = utils::normalize_columns(&sample) {
                return point;
            }
        }
    }

    fn random_tangent_vector(&self, point: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(point)?;
        let vector = Self::project(point, &self.random.standard_normal(self.m, self.n));
        normalize_tangent(self, point, vector)
    }
}
