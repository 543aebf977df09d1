//! Closest matrix with unit-norm columns.
//!
//! Minimizes `f(X) = ½‖X - A‖²` over the oblique manifold. The minimizer
//! normalizes every column of A.

use crate::{
    config::ProblemConfig,
    error::{ProblemError, ProblemResult},
    runner,
};
use geomopt_core::{
    backend::Backend,
    cost_function::CostFunction,
    error::{BackendResult, Result},
    random::RandomSource,
    types::{DMatrix, Point, Real, TangentVector},
};
use geomopt_manifolds::{utils, Oblique};
use geomopt_optim::OptimizationResult;
use log::info;

/// Backends this problem can be solved with.
pub const SUPPORTED_BACKENDS: &[Backend] = &[Backend::Analytic, Backend::FiniteDifferences];

/// Rows of the random target matrix.
pub const DEFAULT_ROWS: usize = 5;

/// Columns of the random target matrix.
pub const DEFAULT_COLUMNS: usize = 8;

/// Squared distance to a fixed target matrix.
#[derive(Debug, Clone)]
pub struct ClosestUnitNormColumnApproximation {
    target: DMatrix<Real>,
}

impl ClosestUnitNormColumnApproximation {
    /// Wraps the target matrix A.
    pub fn new(target: DMatrix<Real>) -> ProblemResult<Self> {
        if target.nrows() < 2 || target.ncols() == 0 {
            return Err(ProblemError::invalid_configuration(format!(
                "target needs at least 2 rows and 1 column, got {}x{}",
                target.nrows(),
                target.ncols()
            )));
        }
        Ok(Self { target })
    }

    /// Standard normal target.
    pub fn random(m: usize, n: usize, random: &RandomSource) -> ProblemResult<Self> {
        Self::new(random.standard_normal(m, n))
    }

    /// The target matrix A.
    pub fn target(&self) -> &DMatrix<Real> {
        &self.target
    }

    /// A with normalized columns.
    pub fn exact_solution(&self) -> ProblemResult<DMatrix<Real>> {
        Ok(utils::normalize_columns(&self.target)?)
    }

    /// Solves this instance on the oblique manifold.
    pub fn solve(&self, config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
        backend.ensure_supported(SUPPORTED_BACKENDS)?;
        let oblique = Oblique::new(self.target.nrows(), self.target.ncols())?
            .with_random_source(config.random_source().fork());
        runner::minimize(oblique, self, backend, config)
    }
}

impl CostFunction<Real> for ClosestUnitNormColumnApproximation {
    fn name(&self) -> &str {
        "closest unit norm column approximation"
    }

    fn cost(&self, point: &Point<Real>) -> Result<Real> {
        Ok(0.5 * (point - &self.target).norm_squared())
    }

    fn euclidean_gradient(&self, point: &Point<Real>) -> BackendResult<TangentVector<Real>> {
        Ok(point - &self.target)
    }

    fn euclidean_hessian(
        &self,
        _point: &Point<Real>,
        direction: &TangentVector<Real>,
    ) -> BackendResult<TangentVector<Real>> {
        Ok(direction.clone())
    }
}

/// Solves a random instance.
pub fn solve(config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
    backend.ensure_supported(SUPPORTED_BACKENDS)?;
    ClosestUnitNormColumnApproximation::random(DEFAULT_ROWS, DEFAULT_COLUMNS, &config.random_source())?
        .solve(config, backend)
}

/// Solves a random instance with the default configuration and returns the approximation.
pub fn run(backend: Backend) -> ProblemResult<Point<Real>> {
    let result = solve(&ProblemConfig::default(), backend)?;
    info!(
        "distance to target {:.6} ({})",
        (2.0 * result.cost).sqrt(),
        result.termination_reason
    );
    Ok(result.point)
}
