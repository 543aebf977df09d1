//! Euclidean spaces ℝ^{m×n} and ℂ^{m×n}.
//!
//! The flat reference instantiation of the manifold contract. Tangent spaces
//! are canonically identified with the ambient space, so every geometric
//! operation reduces to vector-space arithmetic:
//!
//! - projection, transport and the Hessian conversion are identities
//! - `retr(x, u) = exp(x, u) = x + u` and `log(x, y) = y - x`
//! - the metric is `Re Σ conj(u) v` and the distance is `‖x - y‖_F`
//!
//! The complex space counts every entry as two real dimensions.

use geomopt_core::{
    error::{ManifoldError, Result},
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{Field, Point, Real, TangentVector},
};
use nalgebra::Complex;
use std::marker::PhantomData;

/// The space of `m × n` matrices over the field `F` with the flat metric.
#[derive(Debug, Clone)]
pub struct EuclideanSpace<F: Field> {
    m: usize,
    n: usize,
    random: RandomSource,
    _field: PhantomData<F>,
}

/// Real Euclidean space ℝ^{m×n}.
pub type Euclidean = EuclideanSpace<Real>;

/// Complex Euclidean space ℂ^{m×n}.
pub type ComplexEuclidean = EuclideanSpace<Complex<Real>>;

impl<F: Field> EuclideanSpace<F> {
    /// Creates the space of `m × n` matrices.
    ///
    /// # Errors
    ///
    /// Returns an error if `m` or `n` is zero.
    pub fn new(m: usize, n: usize) -> Result<Self> {
        if m == 0 || n == 0 {
            return Err(ManifoldError::invalid_parameter(format!(
                "Euclidean space requires positive dimensions, got ({}, {})",
                m, n
            )));
        }
        Ok(Self {
            m,
            n,
            random: RandomSource::default(),
            _field: PhantomData,
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

    fn check_pair(&self, a: &Point<F>, b: &Point<F>) -> Result<()> {
        self.check_point(a)?;
        self.check_point(b)
    }
}

impl<F: Field> Manifold for EuclideanSpace<F> {
    type Field = F;

    fn name(&self) -> &str {
        if F::REAL_DIMENSION == 2 {
            "ComplexEuclidean"
        } else {
            "Euclidean"
        }
    }

    fn dim(&self) -> usize {
        self.m * self.n * F::REAL_DIMENSION
    }

    fn typical_dist(&self) -> Real {
        ((self.m * self.n) as Real).sqrt()
    }

    fn point_shape(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    fn is_point_on_manifold(&self, point: &Point<F>, _tol: Real) -> bool {
        point.shape() == (self.m, self.n) && point.iter().all(|z| z.is_finite())
    }

    fn is_vector_in_tangent_space(&self, point: &Point<F>, vector: &TangentVector<F>, _tol: Real) -> bool {
        self.check_pair(point, vector).is_ok()
    }

    fn inner_product(&self, point: &Point<F>, u: &TangentVector<F>, v: &TangentVector<F>) -> Result<Real> {
        self.check_point(point)?;
        self.check_pair(u, v)?;
        Ok(metric::inner(u, v))
    }

    fn norm(&self, point: &Point<F>, vector: &TangentVector<F>) -> Result<Real> {
        self.check_pair(point, vector)?;
        Ok(metric::norm(vector))
    }

    fn dist(&self, x: &Point<F>, y: &Point<F>) -> Result<Real> {
        self.check_pair(x, y)?;
        Ok(metric::distance(x, y))
    }

    fn projection(&self, point: &Point<F>, vector: &TangentVector<F>) -> Result<TangentVector<F>> {
        self.check_pair(point, vector)?;
        Ok(vector.clone())
    }

    fn euclidean_to_riemannian_hessian(
        &self,
        point: &Point<F>,
        euclidean_gradient: &TangentVector<F>,
        euclidean_hessian: &TangentVector<F>,
        tangent_vector: &TangentVector<F>,
    ) -> Result<TangentVector<F>> {
        self.check_pair(point, euclidean_gradient)?;
        self.check_pair(euclidean_hessian, tangent_vector)?;
        Ok(euclidean_hessian.clone())
    }

    fn retr(&self, point: &Point<F>, tangent_vector: &TangentVector<F>) -> Result<Point<F>> {
        self.check_pair(point, tangent_vector)?;
        Ok(point + tangent_vector)
    }

    fn exp(&self, point: &Point<F>, tangent_vector: &TangentVector<F>) -> Result<Point<F>> {
        self.retr(point, tangent_vector)
    }

    fn log(&self, point: &Point<F>, other: &Point<F>) -> Result<TangentVector<F>> {
        self.check_pair(point, other)?;
        Ok(other - point)
    }

    fn transp(&self, from: &Point<F>, to: &Point<F>, vector: &TangentVector<F>) -> Result<TangentVector<F>> {
        self.check_pair(from, to)?;
        self.check_point(vector)?;
        Ok(vector.clone())
    }

    fn pairmean(&self, x: &Point<F>, y: &Point<F>) -> Result<Point<F>> {
        self.check_pair(x, y)?;
        Ok(metric::scale(&(x + y), 0.5))
    }

    /// Standard normal entries (independent real and imaginary parts for ℂ).
    fn random_point(&self) -> Point<F> {
        self.random.standard_normal(self.m, self.n)
    }

    fn random_tangent_vector(&self, point: &Point<F>) -> Result<TangentVector<F>> {
        self.check_point(point)?;
        let vector = self.random.standard_normal(self.m, self.n);
        normalize_tangent(self, point, vector)
    }
}
