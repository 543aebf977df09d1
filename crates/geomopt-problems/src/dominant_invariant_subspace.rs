//! Dominant invariant subspace of a symmetric matrix.
//!
//! Minimizes `f(X) = -tr(XᵀAX)` over the Grassmann manifold Gr(n, p). The
//! minimizer is the span of the eigenvectors of the p largest eigenvalues.

use crate::{
    config::ProblemConfig,
    error::{ProblemError, ProblemResult},
    runner,
};
use geomopt_core::{
    backend::Backend,
    cost_function::CostFunction,
    error::{BackendResult, Result},
    metric,
    random::RandomSource,
    types::{DMatrix, Point, Real, TangentVector},
};
use geomopt_manifolds::Grassmann;
use geomopt_optim::OptimizationResult;
use log::info;

/// Backends this problem can be solved with.
pub const SUPPORTED_BACKENDS: &[Backend] = &[Backend::Analytic, Backend::FiniteDifferences];

/// Ambient dimension of the random instance.
pub const DEFAULT_DIMENSION: usize = 32;

/// Subspace dimension of the random instance.
pub const DEFAULT_SUBSPACE_DIMENSION: usize = 3;

/// Negative trace of a symmetric matrix restricted to a subspace.
#[derive(Debug, Clone)]
pub struct DominantInvariantSubspace {
    matrix: DMatrix<Real>,
    p: usize,
}

impl DominantInvariantSubspace {
    /// Wraps a symmetric `n × n` matrix and the subspace dimension `p`.
    pub fn new(matrix: DMatrix<Real>, p: usize) -> ProblemResult<Self> {
        if !matrix.is_square() || p == 0 || p > matrix.nrows() {
            return Err(ProblemError::invalid_configuration(format!(
                "expected a square matrix and 0 < p <= n, got {}x{} with p={}",
                matrix.nrows(),
                matrix.ncols(),
                p
            )));
        }
        Ok(Self {
            matrix: metric::symmetric(&matrix),
            p,
        })
    }

    /// Random symmetric instance.
    pub fn random(n: usize, p: usize, random: &RandomSource) -> ProblemResult<Self> {
        Self::new(random.standard_normal(n, n), p)
    }

    /// The symmetric matrix A.
    pub fn matrix(&self) -> &DMatrix<Real> {
        &self.matrix
    }

    /// Orthonormal basis of the dominant invariant subspace.
    pub fn exact_solution(&self) -> DMatrix<Real> {
        let eigen = self.matrix.clone().symmetric_eigen();
        let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
        let columns: Vec<_> = order[..self.p]
            .iter()
            .map(|&j| eigen.eigenvectors.column(j).into_owned())
            .collect();
        DMatrix::from_columns(&columns)
    }

    /// Solves this instance on Gr(n, p).
    pub fn solve(&self, config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
        backend.ensure_supported(SUPPORTED_BACKENDS)?;
        let grassmann = Grassmann::new(self.matrix.nrows(), self.p)?
            .with_random_source(config.random_source().fork());
        runner::minimize(grassmann, self, backend, config)
    }
}

impl CostFunction<Real> for DominantInvariantSubspace {
    fn name(&self) -> &str {
        "dominant invariant subspace"
    }

    fn cost(&self, point: &Point<Real>) -> Result<Real> {
        Ok(-(point.transpose() * &self.matrix * point).trace())
    }

    fn euclidean_gradient(&self, point: &Point<Real>) -> BackendResult<TangentVector<Real>> {
        Ok(&self.matrix * point * -2.0)
    }

    fn euclidean_hessian(
        &self,
        _point: &Point<Real>,
        direction: &TangentVector<Real>,
    ) -> BackendResult<TangentVector<Real>> {
        Ok(&self.matrix * direction * -2.0)
    }
}

/// Solves a random instance.
pub fn solve(config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
    backend.ensure_supported(SUPPORTED_BACKENDS)?;
    DominantInvariantSubspace::random(
        DEFAULT_DIMENSION,
        DEFAULT_SUBSPACE_DIMENSION,
        &config.random_source(),
    )?
    .solve(config, backend)
}

/// Solves a random instance with the default configuration and returns a basis.
pub fn run(backend: Backend) -> ProblemResult<Point<Real>> {
    let result = solve(&ProblemConfig::default(), backend)?;
    info!(
        "sum of the {} dominant eigenvalues {:.6} ({})",
        DEFAULT_SUBSPACE_DIMENSION, -result.cost, result.termination_reason
    );
    Ok(result.point)
}
