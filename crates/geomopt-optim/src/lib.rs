//! First-order solvers for optimization on Riemannian manifolds.
//!
//! The solvers in this crate only consume the manifold contract of
//! `geomopt-core` through a [`Problem`](geomopt_core::bridge::Problem), so
//! they work unchanged on every manifold and with every derivative backend.
//!
//! # Solvers
//!
//! - [`SteepestDescent`]: negative Riemannian gradient steps
//! - [`ConjugateGradient`]: nonlinear CG with FR, PR+ and HS rules
//!
//! Both use the Armijo [`BacktrackingLineSearch`] and stop according to a
//! [`StoppingCriterion`].
//!
//! # Example
//!
//! ```rust,ignore
//! use geomopt_optim::{Optimizer, SteepestDescent, StoppingCriterion};
//!
//! let mut solver = SteepestDescent::new();
//! let result = solver.optimize(&problem, &x0, &StoppingCriterion::new())?;
//! println!("{} after {} iterations", result.termination_reason, result.iterations);
//! ```

pub mod conjugate_gradient;
pub mod line_search;
pub mod optimizer;
pub mod steepest_descent;

pub use conjugate_gradient::{BetaRule, ConjugateGradient, ConjugateGradientConfig};
pub use line_search::{BacktrackingLineSearch, LineSearchOutcome};
pub use optimizer::{OptimizationResult, Optimizer, Progress, StoppingCriterion, TerminationReason};
pub use steepest_descent::SteepestDescent;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::conjugate_gradient::{BetaRule, ConjugateGradient, ConjugateGradientConfig};
    pub use crate::line_search::BacktrackingLineSearch;
    pub use crate::optimizer::{OptimizationResult, Optimizer, StoppingCriterion, TerminationReason};
    pub use crate::steepest_descent::SteepestDescent;
}
