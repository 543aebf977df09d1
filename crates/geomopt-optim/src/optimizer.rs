//! Core optimizer trait and the types shared by every solver.
//!
//! # Key Components
//!
//! - **Optimizer trait**: interface implemented by the solvers of this crate
//! - **OptimizationResult**: final point and metadata of a run
//! - **StoppingCriterion**: conditions for terminating a run
//! - **Progress**: snapshot of a run that the criterion is checked against

use geomopt_core::{
    bridge::{EvaluationCounts, Problem},
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    manifold::Manifold,
    types::{Field, Point, Real},
};
use std::fmt::{self, Debug};
use std::time::Duration;

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult<F: Field> {
    /// The best point found by the optimizer
    pub point: Point<F>,

    /// The cost at `point`
    pub cost: Real,

    /// The cost at the initial point
    pub initial_cost: Real,

    /// Riemannian gradient norm at `point`
    pub gradient_norm: Real,

    /// Number of iterations performed
    pub iterations: usize,

    /// Evaluations performed through the problem during the run
    pub evaluations: EvaluationCounts,

    /// Total optimization time
    pub duration: Duration,

    /// Reason for termination
    pub termination_reason: TerminationReason,

    /// Whether the gradient tolerance was reached
    pub converged: bool,
}

impl<F: Field> OptimizationResult<F> {
    /// Creates a new optimization result.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        point: Point<F>,
        cost: Real,
        initial_cost: Real,
        gradient_norm: Real,
        iterations: usize,
        evaluations: EvaluationCounts,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        Self {
            point,
            cost,
            initial_cost,
            gradient_norm,
            iterations,
            evaluations,
            duration,
            converged: termination_reason == TerminationReason::Converged,
            termination_reason,
        }
    }

    /// Decrease of the cost over the run.
    pub fn cost_decrease(&self) -> Real {
        self.initial_cost - self.cost
    }
}

/// Reason for termination of the optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// Gradient norm fell below the tolerance
    Converged,
    /// Maximum iterations reached
    MaxIterations,
    /// Maximum time exceeded
    MaxTime,
    /// Maximum cost evaluations reached
    MaxCostEvaluations,
    /// Last accepted step was shorter than the minimum step size
    MinStepSize,
    /// Line search could not decrease the cost
    LineSearchFailed,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::Converged => "gradient norm below tolerance",
            Self::MaxIterations => "maximum number of iterations reached",
            Self::MaxTime => "maximum time reached",
            Self::MaxCostEvaluations => "maximum number of cost evaluations reached",
            Self::MinStepSize => "step size below minimum",
            Self::LineSearchFailed => "line search failed to decrease the cost",
        };
        f.write_str(message)
    }
}

/// Stopping criteria for optimization algorithms.
///
/// Every limit is optional; unset limits never trigger.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoppingCriterion {
    /// Maximum number of iterations
    pub max_iterations: Option<usize>,

    /// Gradient norm tolerance for convergence
    pub gradient_tolerance: Option<Real>,

    /// Minimum length of an accepted step
    pub min_step_size: Option<Real>,

    /// Maximum optimization time
    pub max_time: Option<Duration>,

    /// Maximum number of cost evaluations
    pub max_cost_evaluations: Option<usize>,
}

impl Default for StoppingCriterion {
    fn default() -> Self {
        Self {
            max_iterations: Some(1000),
            gradient_tolerance: Some(1e-6),
            min_step_size: Some(1e-10),
            max_time: None,
            max_cost_evaluations: None,
        }
    }
}

impl StoppingCriterion {
    /// Creates a new stopping criterion with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = Some(max_iter);
        self
    }

    /// Sets the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tol: Real) -> Self {
        self.gradient_tolerance = Some(tol);
        self
    }

    /// Sets the minimum step size.
    pub fn with_min_step_size(mut self, step: Real) -> Self {
        self.min_step_size = Some(step);
        self
    }

    /// Sets the maximum optimization time.
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Sets the maximum number of cost evaluations.
    pub fn with_max_cost_evaluations(mut self, max_evals: usize) -> Self {
        self.max_cost_evaluations = Some(max_evals);
        self
    }

    /// Checks that every set tolerance is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidConfiguration` naming the offending field.
    pub fn validate(&self) -> OptimizerResult<()> {
        let tolerances = [
            ("gradient_tolerance", self.gradient_tolerance),
            ("min_step_size", self.min_step_size),
        ];
        for (name, value) in tolerances {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(OptimizerError::invalid_configuration(
                        "tolerance must be finite and non-negative",
                        name,
                        value.to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Returns the first criterion met by `progress`, if any.
    pub fn check(&self, progress: &Progress) -> Option<TerminationReason> {
        if let Some(grad_tol) = self.gradient_tolerance {
            if progress.gradient_norm < grad_tol {
                return Some(TerminationReason::Converged);
            }
        }

        if let Some(max_iter) = self.max_iterations {
            if progress.iteration >= max_iter {
                return Some(TerminationReason::MaxIterations);
            }
        }

        if let Some(max_time) = self.max_time {
            if progress.elapsed >= max_time {
                return Some(TerminationReason::MaxTime);
            }
        }

        if let Some(max_evals) = self.max_cost_evaluations {
            if progress.cost_evaluations >= max_evals {
                return Some(TerminationReason::MaxCostEvaluations);
            }
        }

        if let (Some(min_step), Some(step)) = (self.min_step_size, progress.step_size) {
            if step < min_step {
                return Some(TerminationReason::MinStepSize);
            }
        }

        None
    }
}

/// Snapshot of a run, checked against a [`StoppingCriterion`] once per iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Iterations completed so far
    pub iteration: usize,
    /// Riemannian gradient norm at the current point
    pub gradient_norm: Real,
    /// Length of the last accepted step; `None` before the first step
    pub step_size: Option<Real>,
    /// Cost evaluations so far
    pub cost_evaluations: usize,
    /// Time since the run started
    pub elapsed: Duration,
}

/// Trait for optimization algorithms on Riemannian manifolds.
///
/// Solvers only see a [`Problem`]: the manifold contract plus derivatives
/// from whichever backend the problem was built with.
pub trait Optimizer: Debug {
    /// Returns the name of the optimizer.
    fn name(&self) -> &str;

    /// Minimizes the problem's cost starting from `initial_point`.
    ///
    /// The problem's evaluation counters are reset at the start of the run.
    fn optimize<M, C>(
        &mut self,
        problem: &Problem<M, C>,
        initial_point: &Point<M::Field>,
        stopping_criterion: &StoppingCriterion,
    ) -> OptimizerResult<OptimizationResult<M::Field>>
    where
        M: Manifold,
        C: CostFunction<M::Field>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomopt_core::types::DMatrix;

    fn progress() -> Progress {
        Progress {
            iteration: 3,
            gradient_norm: 1.0,
            step_size: None,
            cost_evaluations: 10,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_optimization_result() {
        let point = DMatrix::from_element(2, 1, 1.0);
        let result = OptimizationResult::new(
            point.clone(),
            0.5,
            2.0,
            1e-8,
            100,
            EvaluationCounts::default(),
            Duration::from_secs(1),
            TerminationReason::Converged,
        );

        assert_eq!(result.point, point);
        assert_eq!(result.iterations, 100);
        assert!(result.converged);
        assert_eq!(result.cost_decrease(), 1.5);

        let result = OptimizationResult::new(
            point,
            0.5,
            2.0,
            1e-2,
            100,
            EvaluationCounts::default(),
            Duration::from_secs(1),
            TerminationReason::MaxIterations,
        );
        assert!(!result.converged);
    }

    #[test]
    fn test_stopping_criterion_builder() {
        let criterion = StoppingCriterion::new()
            .with_max_iterations(500)
            .with_gradient_tolerance(1e-8)
            .with_min_step_size(1e-12)
            .with_max_time(Duration::from_secs(60))
            .with_max_cost_evaluations(2000);

        assert_eq!(criterion.max_iterations, Some(500));
        assert_eq!(criterion.gradient_tolerance, Some(1e-8));
        assert_eq!(criterion.min_step_size, Some(1e-12));
        assert_eq!(criterion.max_time, Some(Duration::from_secs(60)));
        assert_eq!(criterion.max_cost_evaluations, Some(2000));
        assert!(criterion.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let criterion = StoppingCriterion::new().with_gradient_tolerance(-1.0);
        assert!(matches!(
            criterion.validate(),
            Err(OptimizerError::InvalidConfiguration { parameter, .. }) if parameter == "gradient_tolerance"
        ));

        let criterion = StoppingCriterion::new().with_min_step_size(Real::NAN);
        assert!(criterion.validate().is_err());
    }

    #[test]
    fn test_check_order() {
        let criterion = StoppingCriterion::new()
            .with_max_iterations(3)
            .with_gradient_tolerance(1e-6);

        assert_eq!(criterion.check(&progress()), Some(TerminationReason::MaxIterations));

        let converged = Progress {
            gradient_norm: 1e-9,
            ..progress()
        };
        assert_eq!(criterion.check(&converged), Some(TerminationReason::Converged));

        let running = Progress {
            iteration: 1,
            ..progress()
        };
        assert_eq!(criterion.check(&running), None);
    }

    #[test]
    fn test_check_step_and_budget() {
        let criterion = StoppingCriterion {
            max_iterations: None,
            gradient_tolerance: None,
            min_step_size: Some(1e-10),
            max_time: Some(Duration::from_secs(1)),
            max_cost_evaluations: Some(11),
        };
        assert_eq!(criterion.check(&progress()), None);

        let tiny_step = Progress {
            step_size: Some(1e-12),
            ..progress()
        };
        assert_eq!(criterion.check(&tiny_step), Some(TerminationReason::MinStepSize));

        let slow = Progress {
            elapsed: Duration::from_secs(2),
            ..progress()
        };
        assert_eq!(criterion.check(&slow), Some(TerminationReason::MaxTime));

        let expensive = Progress {
            cost_evaluations: 11,
            ..progress()
        };
        assert_eq!(criterion.check(&expensive), Some(TerminationReason::MaxCostEvaluations));
    }

    #[test]
    fn test_termination_reason_display() {
        assert_eq!(TerminationReason::Converged.to_string(), "gradient norm below tolerance");
        assert!(!TerminationReason::LineSearchFailed.to_string().is_empty());
    }
}
