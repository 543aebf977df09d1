//! Configuration shared by the example problems.

use crate::error::{ProblemError, ProblemResult};
use geomopt_core::{backend::FiniteDifferences, random::RandomSource, types::Real};
use geomopt_optim::StoppingCriterion;
use std::fmt;

/// Solver used to minimize an example problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OptimizerKind {
    /// [`SteepestDescent`](geomopt_optim::SteepestDescent)
    SteepestDescent,
    /// [`ConjugateGradient`](geomopt_optim::ConjugateGradient) with the PR+ rule
    #[default]
    ConjugateGradient,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SteepestDescent => f.write_str("steepest descent"),
            Self::ConjugateGradient => f.write_str("conjugate gradient"),
        }
    }
}

/// Options for solving an example problem.
///
/// `seed` drives both the random problem data and the initial point; `None`
/// draws fresh entropy on every run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProblemConfig {
    /// Seed for the problem data and the initial point
    pub seed: Option<u64>,
    /// Maximum number of solver iterations
    pub max_iterations: usize,
    /// Gradient norm at which the solver stops
    pub gradient_tolerance: Real,
    /// Step length at which the solver stops
    pub min_step_size: Real,
    /// Solver to use
    pub optimizer: OptimizerKind,
    /// Step of the central differences under `Backend::FiniteDifferences`
    pub finite_difference_step: Real,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_iterations: 1000,
            gradient_tolerance: 1e-6,
            min_step_size: 1e-10,
            optimizer: OptimizerKind::default(),
            finite_difference_step: FiniteDifferences::default().gradient_step(),
        }
    }
}

impl ProblemConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tolerance: Real) -> Self {
        self.gradient_tolerance = tolerance;
        self
    }

    /// Sets the minimum step size.
    pub fn with_min_step_size(mut self, step: Real) -> Self {
        self.min_step_size = step;
        self
    }

    /// Selects the solver.
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the finite-difference step.
    pub fn with_finite_difference_step(mut self, step: Real) -> Self {
        self.finite_difference_step = step;
        self
    }

    /// Checks that the configuration can drive a solver.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError::InvalidConfiguration` if `max_iterations` is zero,
    /// a tolerance is negative or not finite, or the finite-difference step is
    /// not positive.
    pub fn validate(&self) -> ProblemResult<()> {
        if self.max_iterations == 0 {
            return Err(ProblemError::invalid_configuration(
                "max_iterations must be positive",
            ));
        }
        for (name, value) in [
            ("gradient_tolerance", self.gradient_tolerance),
            ("min_step_size", self.min_step_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProblemError::invalid_configuration(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if !(self.finite_difference_step.is_finite() && self.finite_difference_step > 0.0) {
            return Err(ProblemError::invalid_configuration(format!(
                "finite_difference_step must be finite and positive, got {}",
                self.finite_difference_step
            )));
        }
        Ok(())
    }

    /// The solver's stopping criterion.
    pub fn stopping_criterion(&self) -> StoppingCriterion {
        StoppingCriterion::new()
            .with_max_iterations(self.max_iterations)
            .with_gradient_tolerance(self.gradient_tolerance)
            .with_min_step_size(self.min_step_size)
    }

    /// Finite-difference backend with the configured step.
    pub fn finite_differences(&self) -> FiniteDifferences {
        FiniteDifferences::new().with_gradient_step(self.finite_difference_step)
    }

    /// Random source seeded from `seed`.
    pub fn random_source(&self) -> RandomSource {
        RandomSource::from_seed_option(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builders() {
        let config = ProblemConfig::new()
            .with_seed(7)
            .with_max_iterations(50)
            .with_gradient_tolerance(1e-4)
            .with_min_step_size(1e-12)
            .with_optimizer(OptimizerKind::SteepestDescent);

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.optimizer, OptimizerKind::SteepestDescent);

        let criterion = config.stopping_criterion();
        assert_eq!(criterion.max_iterations, Some(50));
        assert_eq!(criterion.gradient_tolerance, Some(1e-4));
        assert_eq!(criterion.min_step_size, Some(1e-12));
        assert!(config.validate().is_ok());

        let config = config.with_finite_difference_step(1e-3);
        assert_eq!(config.finite_differences().gradient_step(), 1e-3);
    }

    #[test]
    fn test_validate() {
        assert!(ProblemConfig::default().validate().is_ok());
        assert!(matches!(
            ProblemConfig::new().with_max_iterations(0).validate(),
            Err(ProblemError::InvalidConfiguration { .. })
        ));
        assert!(ProblemConfig::new()
            .with_gradient_tolerance(Real::INFINITY)
            .validate()
            .is_err());
        assert!(ProblemConfig::new().with_min_step_size(-1.0).validate().is_err());
        assert!(ProblemConfig::new()
            .with_finite_difference_step(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_seeded_sources_agree() {
        let config = ProblemConfig::new().with_seed(3);
        assert_eq!(
            config.random_source().next_u64(),
            config.random_source().next_u64()
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let config = ProblemConfig::new().with_seed(11);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"conjugate_gradient\""));
        let parsed: ProblemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let partial: ProblemConfig = serde_json::from_str(r#"{"max_iterations": 10}"#).unwrap();
        assert_eq!(partial.max_iterations, 10);
        assert_eq!(partial.seed, None);
    }
}
