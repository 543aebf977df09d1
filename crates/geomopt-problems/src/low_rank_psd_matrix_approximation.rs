//! Low-rank approximation of a positive semidefinite matrix.
//!
//! Minimizes `f(Y) = ‖YYᵀ - A‖²` over rank-k factors. When A itself has rank
//! k the optimum is zero and recovers A exactly.

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
use geomopt_manifolds::PSDFixedRank;
use geomopt_optim::OptimizationResult;
use log::info;

/// Backends this problem can be solved with.
pub const SUPPORTED_BACKENDS: &[Backend] = &[Backend::Analytic, Backend::FiniteDifferences];

/// Size of the random target.
pub const DEFAULT_DIMENSION: usize = 20;

/// Rank of the random target and of the approximation.
pub const DEFAULT_RANK: usize = 3;

/// Squared Frobenius distance between `YYᵀ` and a PSD target.
#[derive(Debug, Clone)]
pub struct LowRankPsdMatrixApproximation {
    target: DMatrix<Real>,
    rank: usize,
}

impl LowRankPsdMatrixApproximation {
    /// Wraps a symmetric target and the approximation rank.
    pub fn new(target: DMatrix<Real>, rank: usize) -> ProblemResult<Self> {
        if !target.is_square() || rank == 0 || rank > target.nrows() {
            return Err(ProblemError::invalid_configuration(format!(
                "expected a square target and 0 < rank <= n, got {}x{} with rank {}",
                target.nrows(),
                target.ncols(),
                rank
            )));
        }
        Ok(Self {
            target: metric::symmetric(&target),
            rank,
        })
    }

    /// Target `LLᵀ` built from a standard normal `n × k` factor L.
    pub fn random(n: usize, rank: usize, random: &RandomSource) -> ProblemResult<Self> {
        let factor: DMatrix<Real> = random.standard_normal(n, rank);
        Self::new(&factor * factor.transpose(), rank)
    }

    /// The target matrix A.
    pub fn target(&self) -> &DMatrix<Real> {
        &self.target
    }

    /// Best rank-k approximation of A, from its k largest eigenpairs.
    pub fn exact_solution(&self) -> DMatrix<Real> {
        let eigen = self.target.clone().symmetric_eigen();
        let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));
        let n = self.target.nrows();
        order[..self.rank]
            .iter()
            .filter(|&&j| eigen.eigenvalues[j] > 0.0)
            .fold(DMatrix::zeros(n, n), |acc, &j| {
                let v = eigen.eigenvectors.column(j);
                acc + v * v.transpose() * eigen.eigenvalues[j]
            })
    }

    /// Solves this instance on the rank-k PSD manifold.
    pub fn solve(&self, config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
        backend.ensure_supported(SUPPORTED_BACKENDS)?;
        let manifold = PSDFixedRank::new(self.target.nrows(), self.rank)?
            .with_random_source(config.random_source().fork());
        runner::minimize(manifold, self, backend, config)
    }

    fn residual(&self, factor: &Point<Real>) -> DMatrix<Real> {
        factor * factor.transpose() - &self.target
    }
}

impl CostFunction<Real> for LowRankPsdMatrixApproximation {
    fn name(&self) -> &str {
        "low rank PSD matrix approximation"
    }

    fn cost(&self, point: &Point<Real>) -> Result<Real> {
        Ok(self.residual(point).norm_squared())
    }

    fn euclidean_gradient(&self, point: &Point<Real>) -> BackendResult<TangentVector<Real>> {
        Ok(self.residual(point) * point * 4.0)
    }

    fn euclidean_hessian(
        &self,
        point: &Point<Real>,
        direction: &TangentVector<Real>,
    ) -> BackendResult<TangentVector<Real>> {
        let sym = direction * point.transpose() + point * direction.transpose();
        Ok((sym * point + self.residual(point) * direction) * 4.0)
    }
}

/// Solves a random instance.
pub fn solve(config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
    backend.ensure_supported(SUPPORTED_BACKENDS)?;
    LowRankPsdMatrixApproximation::random(DEFAULT_DIMENSION, DEFAULT_RANK, &config.random_source())?
        .solve(config, backend)
}

/// Solves a random instance with the default configuration and returns the factor Y.
pub fn run(backend: Backend) -> ProblemResult<Point<Real>> {
    let result = solve(&ProblemConfig::default(), backend)?;
    info!(
        "approximation error {:.6e} ({})",
        result.cost.sqrt(),
        result.termination_reason
    );
    Ok(result.point)
}
