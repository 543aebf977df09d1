//! Dominant eigenvector of a symmetric matrix.
//!
//! Minimizes the negative Rayleigh quotient `f(x) = -xᵀAx` over the unit
//! sphere. Minimizers are the unit eigenvectors of the largest eigenvalue.

use crate::{config::ProblemConfig, error::{ProblemError, ProblemResult}, runner};
use geomopt_core::{
    backend::Backend,
    cost_function::CostFunction,
    error::{BackendResult, Result},
    metric,
    random::RandomSource,
    types::{DMatrix, Point, Real, TangentVector},
};
use geomopt_manifolds::Sphere;
use geomopt_optim::OptimizationResult;
use log::info;

/// Backends this problem can be solved with.
pub const SUPPORTED_BACKENDS: &[Backend] = &[Backend::Analytic, Backend::FiniteDifferences];

/// Size of the randomly generated matrix.
pub const DEFAULT_DIMENSION: usize = 32;

/// The negative Rayleigh quotient of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct DominantEigenvector {
    matrix: DMatrix<Real>,
}

impl DominantEigenvector {
    /// Wraps a symmetric matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square and symmetric.
    pub fn new(matrix: DMatrix<Real>) -> ProblemResult<Self> {
        if !matrix.is_square() || matrix.nrows() < 2 {
            return Err(ProblemError::invalid_configuration(format!(
                "expected a square matrix of size at least 2, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if (&matrix - matrix.transpose()).norm() > 1e-12 * Real::max(1.0, matrix.norm()) {
            return Err(ProblemError::invalid_configuration("matrix must be symmetric"));
        }
        Ok(Self { matrix })
    }

    /// Symmetric part of a standard normal `n × n` matrix.
    pub fn random(n: usize, random: &RandomSource) -> Self {
        Self {
            matrix: metric::symmetric(&random.standard_normal(n, n)),
        }
    }

    /// The symmetric matrix A.
    pub fn matrix(&self) -> &DMatrix<Real> {
        &self.matrix
    }

    /// Unit eigenvector of the largest eigenvalue and that eigenvalue.
    pub fn exact_solution(&self) -> (DMatrix<Real>, Real) {
        let eigen = self.matrix.clone().symmetric_eigen();
        let index = eigen.eigenvalues.imax();
        let vector = eigen.eigenvectors.column(index).into_owned();
        let n = vector.len();
        (DMatrix::from_column_slice(n, 1, vector.as_slice()), eigen.eigenvalues[index])
    }

    /// Solves this instance on the sphere.
    pub fn solve(&self, config: &ProblemConfig, backend: Backend) -> ProblemResult<OptimizationResult<Real>> {
        backend.ensure_supported(SUPPORTED_BACKENDS)?;
        let sphere = Sphere::vector(self.matrix.nrows())?.with_random_source(config.random_source().fork());
        runner::minimize(sphere, self, backend, config)
    }
}

impl CostFunction<Real> for DominantEigenvector {
    fn name(&self) -> &str {
        "dominant eigenvector"
    }

    fn cost(&self, point: &Point<Real>) -> Result<Real> {
        Ok(-point.dot(&(&self.matrix * point)))
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
    let instance = DominantEigenvector::random(DEFAULT_DIMENSION, &config.random_source());
    instance.solve(config, backend)
}

/// Solves a random instance with the default configuration and returns the eigenvector.
pub fn run(backend: Backend) -> ProblemResult<Point<Real>> {
    let result = solve(&ProblemConfig::default(), backend)?;
    info!(
        "dominant eigenvalue estimate {:.6} ({})",
        -result.cost, result.termination_reason
    );
    Ok(result.point)
}
