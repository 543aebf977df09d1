//! Core traits and types for Riemannian optimization.
//!
//! This crate provides the foundational abstractions shared by every other
//! crate of the workspace: the manifold contract, the scalar fields points
//! live in, metric primitives, explicit random sources, cost functions,
//! derivative backends, and the bridge turning Euclidean derivatives into
//! Riemannian ones.
//!
//! # Key Concepts
//!
//! - **Manifolds**: smooth spaces that locally resemble Euclidean space,
//!   described by the [`Manifold`](manifold::Manifold) trait
//! - **Fields**: points are real or complex matrices ([`Field`](types::Field))
//! - **Backends**: enumerated derivative capabilities ([`Backend`](backend::Backend))
//! - **Bridge**: projection of Euclidean gradients and Hessians
//!
//! # Modules
//!
//! - [`backend`]: Derivative backends and the backend capability enum
//! - [`bridge`]: Euclidean-to-Riemannian conversion and [`Problem`](bridge::Problem)
//! - [`cost_function`]: Cost function interface
//! - [`error`]: Error types
//! - [`manifold`]: Core manifold trait
//! - [`metric`]: Flat metric primitives
//! - [`random`]: Explicit pseudorandom sources
//! - [`types`]: Type aliases, scalar fields and numerical constants

pub mod backend;
pub mod bridge;
pub mod cost_function;
pub mod error;
pub mod manifold;
pub mod metric;
pub mod random;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used items at the crate root
pub use error::{BackendError, ManifoldError, OptimizerError, OptimizerResult, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use geomopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{AnalyticDerivatives, Backend, DerivativeBackend, FiniteDifferences};
    pub use crate::bridge::{riemannian_gradient, riemannian_hessian, EvaluationCounts, Problem};
    pub use crate::cost_function::{CostFunction, CountingCostFunction};
    pub use crate::error::{
        BackendError, BackendResult, ManifoldError, OptimizerError, OptimizerResult, Result,
    };
    pub use crate::manifold::Manifold;
    pub use crate::random::RandomSource;
    pub use crate::types::{constants, DMatrix, DVector, Field, Point, Real, TangentVector};
}
