//! Packing points on the unit sphere.
//!
//! The points are the columns of a matrix on the oblique manifold
//! OB(d, N). Packing maximizes the smallest pairwise angle, i.e. minimizes
//! the largest pairwise inner product, which is smoothed with a log-sum-exp:
//!
//! ```text
//! f(X) = ε log Σ_{i<j} exp(x_iᵀx_j / ε)
//! ```
//!
//! The cost has no closed-form gradient here, so it is only solved with
//! finite differences.

use crate::{
    config::ProblemConfig,
    error::{ProblemError, ProblemResult},
    runner,
};
use geomopt_core::{
    backend::Backend,
    cost_function::CostFunction,
    error::{ManifoldError, Result},
    types::{Point, Real},
};
use geomopt_manifolds::Oblique;
use geomopt_optim::OptimizationResult;
use log::info;

/// Backends this problem can be solved with.
pub const SUPPORTED_BACKENDS: &[Backend] = &[Backend::FiniteDifferences];

/// Dimension of the ambient space.
pub const DEFAULT_DIMENSION: usize = 3;

/// Number of points.
pub const DEFAULT_NUM_POINTS: usize = 24;

/// Smoothing parameter ε.
pub const DEFAULT_EPSILON: Real = 0.0015;

/// Smoothed maximum of the pairwise inner products of the columns.
#[derive(Debug, Clone)]
pub struct PackingOnTheSphere {
    dimension: usize,
    num_points: usize,
    epsilon: Real,
}

impl PackingOnTheSphere {
    /// Packs `num_points` points in ℝ^`dimension` with smoothing `epsilon`.
    pub fn new(dimension: usize, num_points: usize, epsilon: Real) -> ProblemResult<Self> {
        if dimension < 2 || num_points < 2 {
            return Err(ProblemError::invalid_configuration(format!(
                "packing needs dimension >= 2 and at least 2 points, got {} and {}",
                dimension, num_points
            )));
        }
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(ProblemError::invalid_configuration(format!(
                "epsilon must be positive, got {}",
                epsilon
            )));
        }
        Ok(Self {
            dimension,
            num_points,
            epsilon,
        })
    }

    /// Largest inner product between two distinct points.
    pub fn max_inner_product(point: &Point<Real>) -> Real {
        let gram = point.transpose() * point;
        let n = gram.nrows();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| gram[(i, j)])
            .fold(Real::NEG_INFINITY, Real::max)
    }

    /// Solves this instance on OB(d, N).
    pub fn solve(&self, config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
        backend.ensure_supported(SUPPORTED_BACKENDS)?;
        let oblique = Oblique::new(self.dimension, self.num_points)?
            .with_random_source(config.random_source());
        runner::minimize(oblique, self, backend, config)
    }
}

impl CostFunction<Real> for PackingOnTheSphere {
    fn name(&self) -> &str {
        "packing on the sphere"
    }

    fn cost(&self, point: &Point<Real>) -> Result<Real> {
        if point.ncols() != self.num_points {
            return Err(ManifoldError::dimension_mismatch(self.num_points, point.ncols()));
        }
        let gram = point.transpose() * point;
        let shift = Self::max_inner_product(point);
        let n = gram.nrows();
        let sum: Real = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| ((gram[(i, j)] - shift) / self.epsilon).exp())
            .sum();
        Ok(shift + self.epsilon * sum.ln())
    }
}

/// Solves the default instance.
pub fn solve(config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
    backend.ensure_supported(SUPPORTED_BACKENDS)?;
    PackingOnTheSphere::new(DEFAULT_DIMENSION, DEFAULT_NUM_POINTS, DEFAULT_EPSILON)?
        .solve(config, backend)
}

/// Solves the default instance with the default configuration and returns the points.
pub fn run(backend: Backend) -> ProblemResult<Point<Real>> {
    let result = solve(&ProblemConfig::default(), backend)?;
    let max_inner = PackingOnTheSphere::max_inner_product(&result.point);
    info!(
        "smallest pairwise angle {:.4} rad ({})",
        max_inner.clamp(-1.0, 1.0).acos(),
        result.termination_reason
    );
    Ok(result.point)
}
