//! Low-rank approximation of a rectangular matrix through its column space.
//!
//! Minimizes `f(U) = -‖UᵀA‖²` over Gr(m, k). For an orthonormal basis U the
//! approximant `UUᵀA` has error `‖A‖² - ‖UᵀA‖²`, so the minimizer spans the
//! k leading left singular vectors (Eckart–Young).

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
use geomopt_manifolds::Grassmann;
use geomopt_optim::OptimizationResult;
use log::info;

/// Backends this problem can be solved with.
pub const SUPPORTED_BACKENDS: &[Backend] = &[Backend::Analytic, Backend::FiniteDifferences];

/// Rows of the random matrix.
pub const DEFAULT_ROWS: usize = 12;

/// Columns of the random matrix.
pub const DEFAULT_COLUMNS: usize = 8;

/// Rank of the approximation.
pub const DEFAULT_RANK: usize = 3;

/// Negative energy of a matrix captured by a k-dimensional column space.
#[derive(Debug, Clone)]
pub struct LowRankMatrixApproximation {
    matrix: DMatrix<Real>,
    gram: DMatrix<Real>,
    rank: usize,
}

impl LowRankMatrixApproximation {
    /// Wraps the matrix A and the approximation rank k.
    pub fn new(matrix: DMatrix<Real>, rank: usize) -> ProblemResult<Self> {
        if rank == 0 || rank > matrix.nrows() {
            return Err(ProblemError::invalid_configuration(format!(
                "rank must satisfy 0 < k <= {}, got {}",
                matrix.nrows(),
                rank
            )));
        }
        let gram = &matrix * matrix.transpose();
        Ok(Self { matrix, gram, rank })
    }

    /// Standard normal `m × n` instance.
    pub fn random(m: usize, n: usize, rank: usize, random: &RandomSource) -> ProblemResult<Self> {
        Self::new(random.standard_normal(m, n), rank)
    }

    /// The matrix A.
    pub fn matrix(&self) -> &DMatrix<Real> {
        &self.matrix
    }

    /// The rank-k approximant `UUᵀA` for a basis U.
    pub fn approximant(&self, basis: &Point<Real>) -> DMatrix<Real> {
        basis * (basis.transpose() * &self.matrix)
    }

    /// Smallest achievable squared error `Σ_{i>k} σᵢ²`.
    pub fn optimal_error(&self) -> Real {
        let mut singular_values: Vec<Real> = self.matrix.singular_values().iter().copied().collect();
        singular_values.sort_by(|a, b| b.total_cmp(a));
        singular_values.iter().skip(self.rank).map(|s| s * s).sum()
    }

    /// Solves this instance on Gr(m, k).
    pub fn solve(&self, config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
        backend.ensure_supported(SUPPORTED_BACKENDS)?;
        let grassmann = Grassmann::new(self.matrix.nrows(), self.rank)?
            .with_random_source(config.random_source().fork());
        runner::minimize(grassmann, self, backend, config)
    }
}

impl CostFunction<Real> for LowRankMatrixApproximation {
    fn name(&self) -> &str {
        "low rank matrix approximation"
    }

    fn cost(&self, point: &Point<Real>) -> Result<Real> {
        Ok(-(point.transpose() * &self.matrix).norm_squared())
    }

    fn euclidean_gradient(&self, point: &Point<Real>) -> BackendResult<TangentVector<Real>> {
        Ok(&self.gram * point * -2.0)
    }

    fn euclidean_hessian(
        &self,
        _point: &Point<Real>,
        direction: &TangentVector<Real>,
    ) -> BackendResult<TangentVector<Real>> {
        Ok(&self.gram * direction * -2.0)
    }
}

/// Solves a random instance.
pub fn solve(config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
    backend.ensure_supported(SUPPORTED_BACKENDS)?;
    LowRankMatrixApproximation::random(
        DEFAULT_ROWS,
        DEFAULT_COLUMNS,
        DEFAULT_RANK,
        &config.random_source(),
    )?
    .solve(config, backend)
}

/// Solves a random instance with the default configuration and returns the basis U.
pub fn run(backend: Backend) -> ProblemResult<Point<Real>> {
    let config = ProblemConfig::default();
    let result = solve(&config, backend)?;
    info!(
        "captured energy {:.6} ({})",
        -result.cost, result.termination_reason
    );
    Ok(result.point)
}
