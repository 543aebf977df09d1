//! Error type for running example problems.

use geomopt_core::error::{BackendError, ManifoldError, OptimizerError};
use thiserror::Error;

/// Errors that can occur while setting up or solving an example problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    /// The problem configuration or the problem data is invalid.
    #[error("Invalid problem configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
    },

    /// The requested backend is unsupported or failed to produce derivatives.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A manifold could not be built or an operation failed.
    #[error(transparent)]
    Manifold(#[from] ManifoldError),

    /// The solver failed.
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

impl ProblemError {
    /// Create an InvalidConfiguration error with a custom reason.
    pub fn invalid_configuration<S: Into<String>>(reason: S) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Result type alias for example problems.
pub type ProblemResult<T> = std::result::Result<T, ProblemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let err: ProblemError = BackendError::unsupported("analytic").into();
        assert!(matches!(err, ProblemError::Backend(BackendError::Unsupported { .. })));
        assert_eq!(err.to_string(), "Unsupported backend: analytic");

        let err: ProblemError = ManifoldError::invalid_parameter("p > n").into();
        assert!(matches!(err, ProblemError::Manifold(_)));

        let err = ProblemError::invalid_configuration("max_iterations must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid problem configuration: max_iterations must be positive"
        );
    }
}
