//! Glue between a problem instance and the configured solver.

use crate::{
    config::{OptimizerKind, ProblemConfig},
    error::ProblemResult,
};
use geomopt_core::{
    backend::Backend, bridge::Problem, cost_function::CostFunction, manifold::Manifold,
};
use geomopt_optim::{ConjugateGradient, OptimizationResult, Optimizer, SteepestDescent};
use log::debug;

/// Minimizes `cost` on `manifold` from a random initial point.
///
/// The backend must already be checked against the problem's supported set.
pub(crate) fn minimize<M, C>(
    manifold: M,
    cost: C,
    backend: Backend,
    config: &ProblemConfig,
) -> ProblemResult<OptimizationResult<M::Field>>
where
    M: Manifold,
    C: CostFunction<M::Field>,
{
    config.validate()?;
    let initial_point = manifold.random_point();
    let problem = match backend {
        Backend::Analytic => Problem::new(manifold, cost, backend),
        Backend::FiniteDifferences => {
            Problem::with_derivatives(manifold, cost, config.finite_differences())
        }
    };
    let criterion = config.stopping_criterion();

    let result = match config.optimizer {
        OptimizerKind::SteepestDescent => {
            SteepestDescent::new().optimize(&problem, &initial_point, &criterion)?
        }
        OptimizerKind::ConjugateGradient => {
            ConjugateGradient::default().optimize(&problem, &initial_point, &criterion)?
        }
    };

    debug!(
        "{} with {}: f = {:.6e} after {} iterations ({})",
        problem.cost_function().name(),
        config.optimizer,
        result.cost,
        result.iterations,
        result.termination_reason
    );
    Ok(result)
}
