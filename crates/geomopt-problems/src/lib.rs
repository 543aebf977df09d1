//! Example optimization problems on Riemannian manifolds.
//!
//! Every problem module exposes the same surface:
//!
//! - `SUPPORTED_BACKENDS`: the derivative backends it can be solved with
//! - `run(backend)`: solves a random instance with the default
//!   [`ProblemConfig`] and returns the final point
//! - `solve(&config, backend)`: solves a random instance and returns the
//!   full [`OptimizationResult`](geomopt_optim::OptimizationResult)
//!
//! Requesting a backend outside `SUPPORTED_BACKENDS` fails with
//! `BackendError::Unsupported`.
//!
//! | Problem | Manifold | Cost |
//! |---|---|---|
//! | [`dominant_eigenvector`] | Sphere(n, 1) | -xᵀAx |
//! | [`dominant_invariant_subspace`] | Grassmann(n, p) | -tr(XᵀAX) |
//! | [`multiple_linear_regression`] | Euclidean(d, 1) | ‖y - Xw‖² |
//! | [`closest_unit_norm_column_approximation`] | Oblique(m, n) | ½‖X - A‖² |
//! | [`low_rank_psd_matrix_approximation`] | PSDFixedRank(n, k) | ‖YYᵀ - A‖² |
//! | [`low_rank_matrix_approximation`] | Grassmann(m, k) | -‖UᵀA‖² |
//! | [`packing_on_the_sphere`] | Oblique(d, N) | ε log Σ exp(x_iᵀx_j / ε) |

pub mod closest_unit_norm_column_approximation;
pub mod config;
pub mod dominant_eigenvector;
pub mod dominant_invariant_subspace;
pub mod error;
pub mod low_rank_matrix_approximation;
pub mod low_rank_psd_matrix_approximation;
pub mod multiple_linear_regression;
pub mod packing_on_the_sphere;

mod runner;

pub use config::{OptimizerKind, ProblemConfig};
pub use error::{ProblemError, ProblemResult};
