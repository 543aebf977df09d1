//! Sphere manifold S = {X ∈ ℝ^{m×n} : ‖X‖_F = 1}.
//!
//! The unit sphere is one of the most fundamental manifolds in optimization.
//! It naturally appears in:
//! - Eigenvalue problems (Rayleigh quotient minimization)
//! - Principal Component Analysis
//! - Sparse coding with unit norm constraints
//!
//! Matrices are treated as vectors of ℝ^{mn}, so the sphere has dimension
//! `mn - 1` for any shape. The great-circle formulas below are shared with
//! [`Oblique`](crate::Oblique), which applies them column by column.

use geomopt_core::{
    error::{ManifoldError, Result},
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{constants, DMatrix, Real},
};
use log::warn;
use std::f64::consts::PI;

/// The unit sphere in ℝ^{m×n} with the Frobenius metric.
///
/// # Mathematical Properties
///
/// - **Dimension**: mn - 1
/// - **Tangent space**: T_x S = {u : ⟨x, u⟩ = 0}
/// - **Exponential map**: exp_x(u) = cos(‖u‖) x + sin(‖u‖) u/‖u‖
/// - **Distance**: d(x, y) = 2 arcsin(‖x - y‖/2)
/// - **Injectivity radius**: π; the logarithm is undefined at antipodal points
#[derive(Debug, Clone)]
pub struct Sphere {
    m: usize,
    n: usize,
    random: RandomSource,
}

impl Sphere {
    /// Creates the unit sphere of `m × n` matrices.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or if `mn < 2`.
    pub fn new(m: usize, n: usize) -> Result<Self> {
        if m == 0 || n == 0 || m * n < 2 {
            return Err(ManifoldError::invalid_parameter(format!(
                "Sphere requires positive dimensions with m*n >= 2, got ({}, {})",
                m, n
            )));
        }
        Ok(Self {
            m,
            n,
            random: RandomSource::default(),
        })
    }

    /// Unit sphere of column vectors in ℝⁿ.
    pub fn vector(n: usize) -> Result<Self> {
        Self::new(n, 1)
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
}

/// Scales `a` to unit Frobenius norm.
pub(crate) fn normalize(a: &DMatrix<Real>) -> Result<DMatrix<Real>> {
    let norm = a.norm();
    if norm < constants::NORM_EPSILON {
        return Err(ManifoldError::numerical_error(
            "cannot normalize a vanishing matrix onto the sphere",
        ));
    }
    Ok(a / norm)
}

/// Projection `u - ⟨x, u⟩ x` onto the tangent space at `x`.
pub(crate) fn project(x: &DMatrix<Real>, u: &DMatrix<Real>) -> DMatrix<Real> {
    u - x * x.dot(u)
}

/// Great-circle exponential `x cos‖u‖ + u sinc‖u‖`.
pub(crate) fn exp(x: &DMatrix<Real>, u: &DMatrix<Real>) -> DMatrix<Real> {
    let t = u.norm();
    let sinc = if t < 1e-8 { 1.0 - t * t / 6.0 } else { t.sin() / t };
    x * t.cos() + u * sinc
}

/// Geodesic distance `2 arcsin(‖x - y‖/2)`, accurate for nearby points.
pub(crate) fn dist(x: &DMatrix<Real>, y: &DMatrix<Real>) -> Real {
    2.0 * ((x - y).norm() / 2.0).min(1.0).asin()
}

/// Logarithm: the projected difference rescaled to the geodesic distance.
pub(crate) fn log(x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<DMatrix<Real>> {
    let v = project(x, &(y - x));
    let d = dist(x, y);
    let norm = v.norm();
    if norm < constants::NORM_EPSILON {
        if d > constants::DISTANCE_EPSILON {
            warn!("sphere logarithm requested between antipodal points (d = {:.6})", d);
            return Err(ManifoldError::numerical_error(
                "logarithm is undefined between antipodal points",
            ));
        }
        return Ok(v);
    }
    if d > constants::DISTANCE_EPSILON {
        Ok(v * (d / norm))
    } else {
        Ok(v)
    }
}

/// Parallel transport of `u` along the geodesic from `x` to `y`.
///
/// Writing `log_x(y) = d e` with `‖e‖ = 1`, the component of `u` along `e`
/// rotates in the plane spanned by `x` and `e` while the orthogonal part is
/// left untouched.
pub(crate) fn transport(x: &DMatrix<Real>, y: &DMatrix<Real>, u: &DMatrix<Real>) -> Result<DMatrix<Real>> {
    let v = log(x, y)?;
    let d = v.norm();
    if d < constants::NORM_EPSILON {
        return Ok(project(y, u));
    }
    let e = v / d;
    let along = e.dot(u);
    Ok(u + (e * (d.cos() - 1.0) - x * d.sin()) * along)
}

/// Curvature-corrected Hessian `P_x(ehess) - ⟨x, egrad⟩ u`.
pub(crate) fn hessian(
    x: &DMatrix<Real>,
    egrad: &DMatrix<Real>,
    ehess: &DMatrix<Real>,
    u: &DMatrix<Real>,
) -> DMatrix<Real> {
    project(x, ehess) - u * x.dot(egrad)
}

impl Manifold for Sphere {
    type Field = Real;

    fn name(&self) -> &str {
        "Sphere"
    }

    fn dim(&self) -> usize {
        self.m * self.n - 1
    }

    fn typical_dist(&self) -> Real {
        PI
    }

    fn point_shape(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    fn is_point_on_manifold(&self, point: &DMatrix<Real>, tol: Real) -> bool {
        point.shape() == (self.m, self.n) && (point.norm() - 1.0).abs() <= tol
    }

    fn is_vector_in_tangent_space(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>, tol: Real) -> bool {
        self.check_pair(point, vector).is_ok()
            && point.dot(vector).abs() <= tol * Real::max(1.0, vector.norm())
    }

    fn inner_product(&self, point: &DMatrix<Real>, u: &DMatrix<Real>, v: &DMatrix<Real>) -> Result<Real> {
        self.check_point(point)?;
        self.check_pair(u, v)?;
        Ok(metric::inner(u, v))
    }

    fn dist(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<Real> {
        self.check_pair(x, y)?;
        Ok(dist(x, y))
    }

    fn projection(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, vector)?;
        Ok(project(point, vector))
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
        Ok(hessian(point, euclidean_gradient, euclidean_hessian, tangent_vector))
    }

    fn retr(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        normalize(&(point + tangent_vector))
    }

    fn exp(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        Ok(exp(point, tangent_vector))
    }

    fn log(&self, point: &DMatrix<Real>, other: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, other)?;
        log(point, other)
    }

    fn transp(&self, from: &DMatrix<Real>, to: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(from, to)?;
        self.check_point(vector)?;
        transport(from, to, vector)
    }

    fn pairmean(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(x, y)?;
        normalize(&(x + y))
    }

    /// Uniform sample: a normalized standard Gaussian.
    fn random_point(&self) -> DMatrix<Real> {
        loop {
            let sample: DMatrix<Real> = self.random.standard_normal(self.m, self.n);
            if let Ok(point) = normalize(&sample) {
                return point;
            }
        }
    }

    fn random_tangent_vector(&self, point: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(point)?;
        let vector = project(point, &self.random.standard_normal(self.m, self.n));
        normalize_tangent(self, point, vector)
    }
}
