//! Backtracking line search on Riemannian manifolds.
//!
//! Given a point `x`, a descent direction `η ∈ T_x ℳ` and the slope
//! `⟨grad f(x), η⟩_x < 0`, the search looks for `α > 0` satisfying the
//! Armijo condition
//!
//! ```text
//! f(R_x(α η)) ≤ f(x) + c₁ α ⟨grad f(x), η⟩_x
//! ```
//!
//! by repeatedly contracting `α`. The first trial step of a run moves a
//! manifold's typical distance along `η`; later trial steps are predicted from
//! the decrease achieved at the previous iteration, inflated by an optimism
//! factor.

use geomopt_core::{
    bridge::Problem,
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    manifold::Manifold,
    metric,
    types::{Point, Real, TangentVector},
};
use log::{debug, trace};

/// Outcome of a single line search.
#[derive(Debug, Clone)]
pub struct LineSearchOutcome<P> {
    /// Accepted point; the starting point when no decrease was found
    pub point: P,
    /// Cost at `point`
    pub cost: Real,
    /// Multiplier α applied to the direction
    pub alpha: Real,
    /// Length of the accepted step, `α‖η‖_x`
    pub step_size: Real,
    /// Number of cost evaluations performed
    pub evaluations: usize,
    /// Whether the cost decreased
    pub accepted: bool,
}

/// Armijo backtracking line search with adaptive initial steps.
#[derive(Debug, Clone)]
pub struct BacktrackingLineSearch {
    contraction_factor: Real,
    optimism: Real,
    sufficient_decrease: Real,
    max_iterations: usize,
    initial_step_size: Real,
    previous_cost: Option<Real>,
}

impl Default for BacktrackingLineSearch {
    fn default() -> Self {
        Self {
            contraction_factor: 0.5,
            optimism: 2.0,
            sufficient_decrease: 1e-4,
            max_iterations: 25,
            initial_step_size: 1.0,
            previous_cost: None,
        }
    }
}

impl BacktrackingLineSearch {
    /// Creates a line search with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the factor ρ ∈ (0, 1) the step is multiplied by after each rejection.
    pub fn with_contraction_factor(mut self, factor: Real) -> Self {
        self.contraction_factor = factor;
        self
    }

    /// Sets the inflation applied to predicted initial steps.
    pub fn with_optimism(mut self, optimism: Real) -> Self {
        self.optimism = optimism;
        self
    }

    /// Sets the Armijo constant c₁ ∈ (0, 1).
    pub fn with_sufficient_decrease(mut self, c1: Real) -> Self {
        self.sufficient_decrease = c1;
        self
    }

    /// Sets the maximum number of contractions per search.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the multiple of the typical distance used for the first trial step.
    pub fn with_initial_step_size(mut self, step: Real) -> Self {
        self.initial_step_size = step;
        self
    }

    /// Forgets the decrease remembered from previous searches.
    pub fn reset(&mut self) {
        self.previous_cost = None;
    }

    /// Checks the parameter ranges.
    pub fn validate(&self) -> OptimizerResult<()> {
        let in_unit_interval = |v: Real| v > 0.0 && v < 1.0;
        if !in_unit_interval(self.contraction_factor) {
            return Err(OptimizerError::invalid_configuration(
                "contraction factor must lie in (0, 1)",
                "contraction_factor",
                self.contraction_factor.to_string(),
            ));
        }
        if !in_unit_interval(self.sufficient_decrease) {
            return Err(OptimizerError::invalid_configuration(
                "sufficient decrease constant must lie in (0, 1)",
                "sufficient_decrease",
                self.sufficient_decrease.to_string(),
            ));
        }
        if !(self.optimism.is_finite() && self.optimism > 0.0) {
            return Err(OptimizerError::invalid_configuration(
                "optimism must be positive",
                "optimism",
                self.optimism.to_string(),
            ));
        }
        if !(self.initial_step_size.is_finite() && self.initial_step_size > 0.0) {
            return Err(OptimizerError::invalid_configuration(
                "initial step size must be positive",
                "initial_step_size",
                self.initial_step_size.to_string(),
            ));
        }
        Ok(())
    }

    fn initial_alpha(&self, typical_dist: Real, cost: Real, slope: Real, direction_norm: Real) -> Real {
        let fallback = self.initial_step_size * typical_dist / direction_norm;
        match self.previous_cost {
            Some(previous) => {
                let predicted = 2.0 * (cost - previous) / slope * self.optimism;
                if predicted.is_finite() && predicted > 0.0 {
                    predicted
                } else {
                    fallback
                }
            }
            None => fallback,
        }
    }

    /// Searches along `direction` from `point`, where `cost` is the cost at
    /// `point` and `slope` the directional derivative `⟨grad f, direction⟩`.
    pub fn search<M, C>(
        &mut self,
        problem: &Problem<M, C>,
        point: &Point<M::Field>,
        cost: Real,
        direction: &TangentVector<M::Field>,
        slope: Real,
    ) -> OptimizerResult<LineSearchOutcome<Point<M::Field>>>
    where
        M: Manifold,
        C: CostFunction<M::Field>,
    {
        let manifold = problem.manifold();
        let direction_norm = manifold.norm(point, direction)?;
        if direction_norm == 0.0 || slope.is_nan() || slope >= 0.0 {
            debug!(
                "line search skipped: |d| = {:e}, slope = {:e}",
                direction_norm, slope
            );
            return Ok(LineSearchOutcome {
                point: point.clone(),
                cost,
                alpha: 0.0,
                step_size: 0.0,
                evaluations: 0,
                accepted: false,
            });
        }

        let mut alpha = self.initial_alpha(manifold.typical_dist(), cost, slope, direction_norm);
        let mut candidate = manifold.retr(point, &metric::scale(direction, alpha))?;
        let mut candidate_cost = problem.cost(&candidate)?;
        let mut evaluations = 1;

        let armijo_fails = |f: Real, alpha: Real| {
            f.is_nan() || f > cost + self.sufficient_decrease * alpha * slope
        };
        while armijo_fails(candidate_cost, alpha) && evaluations <= self.max_iterations {
            trace!(
                "alpha = {:e} rejected: f = {:e} > {:e}",
                alpha,
                candidate_cost,
                cost + self.sufficient_decrease * alpha * slope
            );
            alpha *= self.contraction_factor;
            candidate = manifold.retr(point, &metric::scale(direction, alpha))?;
            candidate_cost = problem.cost(&candidate)?;
            evaluations += 1;
        }

        let accepted = !armijo_fails(candidate_cost, alpha) || candidate_cost < cost;
        self.previous_cost = Some(cost);

        if !accepted {
            debug!(
                "line search failed after {} evaluations, no decrease from f = {:e}",
                evaluations, cost
            );
            return Ok(LineSearchOutcome {
                point: point.clone(),
                cost,
                alpha: 0.0,
                step_size: 0.0,
                evaluations,
                accepted: false,
            });
        }

        trace!("alpha = {:e} accepted after {} evaluations", alpha, evaluations);
        Ok(LineSearchOutcome {
            point: candidate,
            cost: candidate_cost,
            alpha,
            step_size: alpha * direction_norm,
            evaluations,
            accepted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geomopt_core::{backend::Backend, error::Result, test_utils::FlatSpace, types::DMatrix};

    /// f(x) = ½‖x‖²
    #[derive(Debug)]
    struct HalfSquaredNorm;

    impl CostFunction<f64> for HalfSquaredNorm {
        fn cost(&self, point: &DMatrix<f64>) -> Result<Real> {
            Ok(0.5 * point.norm_squared())
        }

        fn euclidean_gradient(&self, point: &DMatrix<f64>) -> geomopt_core::error::BackendResult<DMatrix<f64>> {
            Ok(point.clone())
        }
    }

    fn problem() -> Problem<FlatSpace, HalfSquaredNorm> {
        Problem::new(FlatSpace::new(3, 1), HalfSquaredNorm, Backend::Analytic)
    }

    #[test]
    fn test_armijo_decrease() {
        let problem = problem();
        let x: DMatrix<f64> = DMatrix::from_column_slice(3, 1, &[1.0, -2.0, 0.5]);
        let cost = 0.5 * x.norm_squared();
        let direction = -x.clone();
        let slope = -x.norm_squared();

        let mut search = BacktrackingLineSearch::new();
        let outcome = search.search(&problem, &x, cost, &direction, slope).unwrap();

        assert!(outcome.accepted);
        assert!(outcome.cost <= cost + 1e-4 * outcome.alpha * slope);
        assert_relative_eq!(outcome.step_size, outcome.alpha * direction.norm(), epsilon = 1e-12);
        assert_eq!(problem.evaluation_counts().cost, outcome.evaluations);
    }

    #[test]
    fn test_first_step_uses_typical_distance() {
        let problem = problem();
        let x = DMatrix::from_column_slice(3, 1, &[0.1, 0.0, 0.0]);
        let direction = -x.clone();
        let mut search = BacktrackingLineSearch::new();
        let outcome = search
            .search(&problem, &x, 0.005, &direction, -0.01)
            .unwrap();

        // typical_dist = √3 gives α = √3 / 0.1, which overshoots and gets contracted.
        let first = 3.0_f64.sqrt() / 0.1;
        let contractions = outcome.evaluations - 1;
        assert_relative_eq!(
            outcome.alpha,
            first * 0.5_f64.powi(contractions as i32),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_ascent_direction_is_rejected() {
        let problem = problem();
        let x = DMatrix::from_column_slice(3, 1, &[1.0, 0.0, 0.0]);
        let mut search = BacktrackingLineSearch::new();
        let outcome = search.search(&problem, &x, 0.5, &x, 1.0).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.point, x);
        assert_eq!(outcome.step_size, 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(BacktrackingLineSearch::new().validate().is_ok());
        assert!(BacktrackingLineSearch::new()
            .with_contraction_factor(1.5)
            .validate()
            .is_err());
        assert!(BacktrackingLineSearch::new()
            .with_sufficient_decrease(0.0)
            .validate()
            .is_err());
    }
}
