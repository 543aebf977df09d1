//! Riemannian steepest descent.
//!
//! Each iteration moves along the negative Riemannian gradient,
//!
//! ```text
//! x_{k+1} = R_{x_k}(-α_k grad f(x_k))
//! ```
//!
//! with `α_k` chosen by [`BacktrackingLineSearch`].

use crate::{
    line_search::BacktrackingLineSearch,
    optimizer::{OptimizationResult, Optimizer, Progress, StoppingCriterion, TerminationReason},
};
use geomopt_core::{
    bridge::Problem,
    cost_function::CostFunction,
    error::OptimizerResult,
    manifold::Manifold,
    types::Point,
};
use log::debug;
use std::time::Instant;

/// Steepest descent with backtracking line search.
#[derive(Debug, Clone, Default)]
pub struct SteepestDescent {
    line_search: BacktrackingLineSearch,
}

impl SteepestDescent {
    /// Creates a steepest descent solver with the default line search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the line search.
    pub fn with_line_search(mut self, line_search: BacktrackingLineSearch) -> Self {
        self.line_search = line_search;
        self
    }
}

impl Optimizer for SteepestDescent {
    fn name(&self) -> &str {
        "Steepest Descent"
    }

    fn optimize<M, C>(
        &mut self,
        problem: &Problem<M, C>,
        initial_point: &Point<M::Field>,
        stopping_criterion: &StoppingCriterion,
    ) -> OptimizerResult<OptimizationResult<M::Field>>
    where
        M: Manifold,
        C: CostFunction<M::Field>,
    {
        stopping_criterion.validate()?;
        self.line_search.validate()?;
        self.line_search.reset();
        problem.reset_counts();

        let manifold = problem.manifold();
        let start = Instant::now();

        let mut point = initial_point.clone();
        let (mut cost, mut gradient) = problem.cost_and_gradient(&point)?;
        let mut gradient_norm = manifold.norm(&point, &gradient)?;
        let initial_cost = cost;
        let mut step_size = None;
        let mut iteration = 0;

        let reason = loop {
            let progress = Progress {
                iteration,
                gradient_norm,
                step_size,
                cost_evaluations: problem.evaluation_counts().cost,
                elapsed: start.elapsed(),
            };
            if let Some(reason) = stopping_criterion.check(&progress) {
                break reason;
            }

            let direction = -&gradient;
            let slope = -gradient_norm * gradient_norm;
            let outcome = self
                .line_search
                .search(problem, &point, cost, &direction, slope)?;
            if !outcome.accepted {
                break TerminationReason::LineSearchFailed;
            }

            point = outcome.point;
            cost = outcome.cost;
            step_size = Some(outcome.step_size);
            gradient = problem.riemannian_gradient(&point)?;
            gradient_norm = manifold.norm(&point, &gradient)?;
            iteration += 1;

            debug!(
                "iter {:>5}: f = {:+.8e}, |grad| = {:.3e}, step = {:.3e}",
                iteration, cost, gradient_norm, outcome.step_size
            );
        };

        debug!(
            "{} terminated after {} iterations: {}",
            self.name(),
            iteration,
            reason
        );

        Ok(OptimizationResult::new(
            point,
            cost,
            initial_cost,
            gradient_norm,
            iteration,
            problem.evaluation_counts(),
            start.elapsed(),
            reason,
        ))
    }
}
