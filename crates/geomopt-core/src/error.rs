//! Error types for manifold operations, derivative backends and solvers.
//!
//! Manifold operations fail with [`ManifoldError`]. Anything that touches a
//! cost function's derivatives fails with [`BackendError`], which wraps
//! manifold failures. Solvers report [`OptimizerError`].

use thiserror::Error;

/// Errors that can occur during manifold construction and manifold operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// Invalid construction parameter (non-positive size, incompatible rank).
    #[error("Invalid manifold parameter: {reason}")]
    InvalidParameter {
        /// Description of the rejected parameter
        reason: String,
    },

    /// A point violates the manifold's defining constraints beyond tolerance.
    #[error("Point off the manifold: {reason}")]
    InvalidPoint {
        /// Which constraint failed
        reason: String,
    },

    /// Shape mismatch between an argument and the manifold's point shape.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Shape the manifold works with
        expected: String,
        /// Shape that was passed in
        actual: String,
    },

    /// Numerical degeneracy, such as the logarithm between antipodal points.
    #[error("Numerical failure: {reason}")]
    NumericalError {
        /// What degenerated
        reason: String,
    },
}

impl ManifoldError {
    /// Rejects a construction parameter.
    pub fn invalid_parameter<S: Into<String>>(reason: S) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Reports a point that is off the manifold.
    pub fn invalid_point<S: Into<String>>(reason: S) -> Self {
        Self::InvalidPoint {
            reason: reason.into(),
        }
    }

    /// Reports a shape mismatch, formatting both shapes with `Display`.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Reports a numerical degeneracy, such as a logarithm that does not
    /// exist or does not converge.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Errors raised while obtaining derivatives of a cost function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// The requested backend is unknown or not supported by the consumer.
    #[error("Unsupported backend: {backend}")]
    Unsupported {
        /// Identifier of the rejected backend
        backend: String,
    },

    /// The cost function has no closed-form Euclidean gradient.
    #[error("Cost function `{cost}` does not provide a Euclidean gradient")]
    MissingGradient {
        /// Name of the cost function
        cost: String,
    },

    /// The cost function has no closed-form Euclidean Hessian.
    #[error("Cost function `{cost}` does not provide a Euclidean Hessian")]
    MissingHessian {
        /// Name of the cost function
        cost: String,
    },

    /// A manifold operation inside the bridge failed.
    #[error("Manifold error: {0}")]
    Manifold(#[from] ManifoldError),
}

impl BackendError {
    /// Create an Unsupported error for a backend identifier.
    pub fn unsupported<S: Into<String>>(backend: S) -> Self {
        Self::Unsupported {
            backend: backend.into(),
        }
    }

    /// Create a MissingGradient error for a named cost function.
    pub fn missing_gradient<S: Into<String>>(cost: S) -> Self {
        Self::MissingGradient { cost: cost.into() }
    }

    /// Create a MissingHessian error for a named cost function.
    pub fn missing_hessian<S: Into<String>>(cost: S) -> Self {
        Self::MissingHessian { cost: cost.into() }
    }
}

/// Errors reported by solvers and line searches.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// A solver, line search or stopping criterion was given an out-of-range
    /// setting, such as a contraction factor outside (0, 1).
    #[error("Invalid configuration for `{parameter}` = {value}: {reason}")]
    InvalidConfiguration {
        /// Why the value was rejected
        reason: String,
        /// Setting name
        parameter: String,
        /// Offending value, formatted
        value: String,
    },

    /// Propagated backend error.
    #[error("Derivative evaluation failed: {0}")]
    Backend(#[from] BackendError),

    /// Manifold failure outside derivative evaluation (retraction, transport).
    #[error("Manifold error: {0}")]
    Manifold(#[from] ManifoldError),
}

impl OptimizerError {
    /// Rejects a setting, naming the parameter and its value.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }
}

/// Result of a manifold operation.
pub type Result<T> = std::result::Result<T, ManifoldError>;

/// Result of a derivative evaluation.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Result of a solver run or solver configuration check.
pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ManifoldError::invalid_parameter("m must be positive");
        assert!(matches!(err, ManifoldError::InvalidParameter { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid manifold parameter: m must be positive"
        );

        let err = ManifoldError::dimension_mismatch("(10, 5)", "(5, 10)");
        assert!(matches!(err, ManifoldError::DimensionMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected (10, 5), got (5, 10)"
        );
    }

    #[test]
    fn test_every_variant_has_a_message() {
        let errors = [
            ManifoldError::invalid_point("not unit norm"),
            ManifoldError::numerical_error("antipodal points"),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_backend_error_propagation() {
        let manifold_err = ManifoldError::invalid_point("not on sphere");
        let backend_err: BackendError = manifold_err.into();
        assert!(matches!(backend_err, BackendError::Manifold(_)));
        assert!(backend_err.to_string().contains("not on sphere"));

        let optimizer_err: OptimizerError = backend_err.into();
        assert!(matches!(optimizer_err, OptimizerError::Backend(_)));
        assert!(optimizer_err.to_string().contains("Derivative evaluation failed"));
    }

    #[test]
    fn test_backend_error_messages() {
        let err = BackendError::unsupported("jax");
        assert_eq!(err.to_string(), "Unsupported backend: jax");

        let err = BackendError::missing_hessian("packing");
        assert!(err.to_string().contains("`packing`"));
    }

    #[test]
    fn test_invalid_configuration_fields() {
        let err = OptimizerError::invalid_configuration("must be in (0, 1)", "contraction", "1.5");

        if let OptimizerError::InvalidConfiguration {
            reason,
            parameter,
            value,
        } = err
        {
            assert_eq!(reason, "must be in (0, 1)");
            assert_eq!(parameter, "contraction");
            assert_eq!(value, "1.5");
        } else {
            panic!("expected InvalidConfiguration");
        }
    }

    #[test]
    fn test_invalid_configuration_message() {
        let err = OptimizerError::invalid_configuration("must be positive", "max_iterations", "0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for `max_iterations` = 0: must be positive"
        );
    }
}
