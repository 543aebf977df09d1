//! Riemannian Conjugate Gradient optimizer.
//!
//! At each iteration, the conjugate gradient method:
//! 1. Computes the Riemannian gradient
//! 2. Determines a conjugate direction using the chosen beta formula
//! 3. Performs line search along the conjugate direction
//! 4. Updates the position using retraction
//!
//! Previous gradients and directions live in the previous tangent space and
//! are moved with the manifold's `transp` before they are combined.
//!
//! # Supported Methods
//!
//! - **Fletcher-Reeves (FR)**: β = ‖g_k‖² / ‖g_{k-1}‖²
//! - **Polak-Ribière+ (PR+)**: β = max(0, ⟨g_k, g_k - T g_{k-1}⟩ / ‖g_{k-1}‖²)
//! - **Hestenes-Stiefel (HS)**: β = max(0, ⟨g_k, y_k⟩ / ⟨T d_{k-1}, y_k⟩) with y_k = g_k - T g_{k-1}
//!
//! The direction is reset to the negative gradient whenever it fails to be a
//! descent direction, when consecutive gradients are far from orthogonal, or
//! every `restart_period` iterations when a period is set.

use crate::{
    line_search::BacktrackingLineSearch,
    optimizer::{OptimizationResult, Optimizer, Progress, StoppingCriterion, TerminationReason},
};
use geomopt_core::{
    bridge::Problem,
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    manifold::Manifold,
    metric,
    types::{Point, Real},
};
use log::{debug, trace};
use std::time::Instant;

/// Rule for the conjugacy coefficient β.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BetaRule {
    /// Fletcher-Reeves
    FletcherReeves,
    /// Polak-Ribière, clipped at zero
    #[default]
    PolakRibierePlus,
    /// Hestenes-Stiefel, clipped at zero
    HestenesStiefel,
}

/// Configuration for the Conjugate Gradient optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConjugateGradientConfig {
    /// The β rule
    pub beta_rule: BetaRule,
    /// Restart when |⟨T g_{k-1}, g_k⟩| / ‖g_k‖² reaches this value
    pub orthogonality_threshold: Real,
    /// Restart every this many iterations (`None` = never)
    pub restart_period: Option<usize>,
}

impl Default for ConjugateGradientConfig {
    fn default() -> Self {
        Self {
            beta_rule: BetaRule::default(),
            orthogonality_threshold: Real::INFINITY,
            restart_period: None,
        }
    }
}

impl ConjugateGradientConfig {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the β rule.
    pub fn with_beta_rule(mut self, rule: BetaRule) -> Self {
        self.beta_rule = rule;
        self
    }

    /// Sets the orthogonality threshold that triggers a restart.
    pub fn with_orthogonality_threshold(mut self, threshold: Real) -> Self {
        self.orthogonality_threshold = threshold;
        self
    }

    /// Sets the restart period.
    pub fn with_restart_period(mut self, period: usize) -> Self {
        self.restart_period = Some(period);
        self
    }

    /// Creates a configuration for the Fletcher-Reeves method.
    pub fn fletcher_reeves() -> Self {
        Self::new().with_beta_rule(BetaRule::FletcherReeves)
    }

    /// Creates a configuration for the Polak-Ribière+ method.
    pub fn polak_ribiere_plus() -> Self {
        Self::new().with_beta_rule(BetaRule::PolakRibierePlus)
    }

    /// Creates a configuration for the Hestenes-Stiefel method.
    pub fn hestenes_stiefel() -> Self {
        Self::new().with_beta_rule(BetaRule::HestenesStiefel)
    }

    /// Checks the parameter ranges.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.orthogonality_threshold.is_nan() || self.orthogonality_threshold <= 0.0 {
            return Err(OptimizerError::invalid_configuration(
                "orthogonality threshold must be positive",
                "orthogonality_threshold",
                self.orthogonality_threshold.to_string(),
            ));
        }
        if self.restart_period == Some(0) {
            return Err(OptimizerError::invalid_configuration(
                "restart period must be at least one iteration",
                "restart_period",
                "0",
            ));
        }
        Ok(())
    }
}

/// Riemannian nonlinear conjugate gradient with backtracking line search.
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradient {
    config: ConjugateGradientConfig,
    line_search: BacktrackingLineSearch,
}

impl ConjugateGradient {
    /// Creates a solver with the given configuration.
    pub fn new(config: ConjugateGradientConfig) -> Self {
        Self {
            config,
            line_search: BacktrackingLineSearch::default(),
        }
    }

    /// Replaces the line search.
    pub fn with_line_search(mut self, line_search: BacktrackingLineSearch) -> Self {
        self.line_search = line_search;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ConjugateGradientConfig {
        &self.config
    }
}

impl Optimizer for ConjugateGradient {
    fn name(&self) -> &str {
        match self.config.beta_rule {
            BetaRule::FletcherReeves => "Conjugate Gradient (FR)",
            BetaRule::PolakRibierePlus => "Conjugate Gradient (PR+)",
            BetaRule::HestenesStiefel => "Conjugate Gradient (HS)",
        }
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
        self.config.validate()?;
        self.line_search.validate()?;
        self.line_search.reset();
        problem.reset_counts();

        let manifold = problem.manifold();
        let start = Instant::now();

        let mut point = initial_point.clone();
        let (mut cost, mut gradient) = problem.cost_and_gradient(&point)?;
        let mut gradient_sq = manifold.inner_product(&point, &gradient, &gradient)?;
        let initial_cost = cost;
        let mut direction = -&gradient;
        let mut step_size = None;
        let mut iteration = 0;

        let reason = loop {
            let progress = Progress {
                iteration,
                gradient_norm: gradient_sq.sqrt(),
                step_size,
                cost_evaluations: problem.evaluation_counts().cost,
                elapsed: start.elapsed(),
            };
            if let Some(reason) = stopping_criterion.check(&progress) {
                break reason;
            }

            let mut slope = manifold.inner_product(&point, &gradient, &direction)?;
            if slope.is_nan() || slope >= 0.0 {
                debug!("iter {:>5}: not a descent direction, restarting", iteration);
                direction = -&gradient;
                slope = -gradient_sq;
            }

            let outcome = self
                .line_search
                .search(problem, &point, cost, &direction, slope)?;
            if !outcome.accepted {
                break TerminationReason::LineSearchFailed;
            }

            let new_point = outcome.point;
            let new_gradient = problem.riemannian_gradient(&new_point)?;
            let new_gradient_sq = manifold.inner_product(&new_point, &new_gradient, &new_gradient)?;

            let old_gradient = manifold.transp(&point, &new_point, &gradient)?;
            let orthogonality =
                manifold.inner_product(&new_point, &old_gradient, &new_gradient)? / new_gradient_sq;
            let periodic_restart = self
                .config
                .restart_period
                .is_some_and(|period| (iteration + 1) % period == 0);

            direction = if orthogonality.abs() >= self.config.orthogonality_threshold
                || !orthogonality.is_finite()
                || periodic_restart
            {
                trace!("iter {:>5}: restart (orthogonality = {:e})", iteration, orthogonality);
                -&new_gradient
            } else {
                let transported = manifold.transp(&point, &new_point, &direction)?;
                let beta = match self.config.beta_rule {
                    BetaRule::FletcherReeves => new_gradient_sq / gradient_sq,
                    BetaRule::PolakRibierePlus => {
                        let diff = &new_gradient - &old_gradient;
                        let ip_diff = manifold.inner_product(&new_point, &new_gradient, &diff)?;
                        Real::max(0.0, ip_diff / gradient_sq)
                    }
                    BetaRule::HestenesStiefel => {
                        let diff = &new_gradient - &old_gradient;
                        let ip_diff = manifold.inner_product(&new_point, &new_gradient, &diff)?;
                        let denominator = manifold.inner_product(&new_point, &diff, &transported)?;
                        let beta = ip_diff / denominator;
                        if beta.is_finite() {
                            Real::max(0.0, beta)
                        } else {
                            0.0
                        }
                    }
                };
                trace!("iter {:>5}: beta = {:e}", iteration, beta);
                metric::scale(&transported, beta) - &new_gradient
            };

            point = new_point;
            cost = outcome.cost;
            gradient = new_gradient;
            gradient_sq = new_gradient_sq;
            step_size = Some(outcome.step_size);
            iteration += 1;

            debug!(
                "iter {:>5}: f = {:+.8e}, |grad| = {:.3e}, step = {:.3e}",
                iteration,
                cost,
                gradient_sq.sqrt(),
                outcome.step_size
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
            gradient_sq.sqrt(),
            iteration,
            problem.evaluation_counts(),
            start.elapsed(),
            reason,
        ))
    }
}
