//! Ordinary least squares as optimization over Euclidean space.
//!
//! Minimizes `f(w) = ‖y - Xw‖²` over weights `w ∈ ℝᵈ`, whose minimizer
//! solves the normal equations `XᵀX w = Xᵀy`.

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
use geomopt_manifolds::Euclidean;
use geomopt_optim::OptimizationResult;
use log::info;

/// Backends this problem can be solved with.
pub const SUPPORTED_BACKENDS: &[Backend] = &[Backend::Analytic, Backend::FiniteDifferences];

/// Number of samples in the random instance.
pub const DEFAULT_SAMPLES: usize = 32;

/// Number of features in the random instance.
pub const DEFAULT_FEATURES: usize = 3;

/// Sum of squared residuals of a linear model.
#[derive(Debug, Clone)]
pub struct MultipleLinearRegression {
    features: DMatrix<Real>,
    targets: DMatrix<Real>,
}

impl MultipleLinearRegression {
    /// Design matrix `X` (samples × features) and target column `y`.
    pub fn new(features: DMatrix<Real>, targets: DMatrix<Real>) -> ProblemResult<Self> {
        if targets.shape() != (features.nrows(), 1) {
            return Err(ProblemError::invalid_configuration(format!(
                "targets must be a {}x1 column, got {}x{}",
                features.nrows(),
                targets.nrows(),
                targets.ncols()
            )));
        }
        Ok(Self { features, targets })
    }

    /// Standard normal features and uniform targets in [0, 1).
    pub fn random(samples: usize, features: usize, random: &RandomSource) -> ProblemResult<Self> {
        Self::new(
            random.standard_normal(samples, features),
            random.uniform(samples, 1, 0.0, 1.0),
        )
    }

    /// Least-squares weights from the normal equations.
    pub fn exact_solution(&self) -> ProblemResult<DMatrix<Real>> {
        let normal = self.features.transpose() * &self.features;
        let rhs = self.features.transpose() * &self.targets;
        normal
            .cholesky()
            .map(|chol| chol.solve(&rhs))
            .ok_or_else(|| ProblemError::invalid_configuration("features are rank deficient"))
    }

    /// Solves this instance on ℝᵈ.
    pub fn solve(&self, config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
        backend.ensure_supported(SUPPORTED_BACKENDS)?;
        let space = Euclidean::new(self.features.ncols(), 1)?
            .with_random_source(config.random_source().fork());
        runner::minimize(space, self, backend, config)
    }

    fn residual(&self, weights: &Point<Real>) -> DMatrix<Real> {
        &self.targets - &self.features * weights
    }
}

impl CostFunction<Real> for MultipleLinearRegression {
    fn name(&self) -> &str {
        "multiple linear regression"
    }

    fn cost(&self, point: &Point<Real>) -> Result<Real> {
        Ok(self.residual(point).norm_squared())
    }

    fn euclidean_gradient(&self, point: &Point<Real>) -> BackendResult<TangentVector<Real>> {
        Ok(self.features.transpose() * self.residual(point) * -2.0)
    }

    fn euclidean_hessian(
        &self,
        _point: &Point<Real>,
        direction: &TangentVector<Real>,
    ) -> BackendResult<TangentVector<Real>> {
        Ok(self.features.transpose() * (&self.features * direction) * 2.0)
    }
}

/// Solves a random instance.
pub fn solve(config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
    backend.ensure_supported(SUPPORTED_BACKENDS)?;
    MultipleLinearRegression::random(DEFAULT_SAMPLES, DEFAULT_FEATURES, &config.random_source())?
        .solve(config, backend)
}

/// Solves a random instance with the default configuration and returns the weights.
pub fn run(backend: Backend) -> ProblemResult<Point<Real>> {
    let result = solve(&ProblemConfig::default(), backend)?;
    info!(
        "regression residual {:.6} ({})",
        result.cost, result.termination_reason
    );
    Ok(result.point)
}
