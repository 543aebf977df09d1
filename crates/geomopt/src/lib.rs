//! Riemannian manifolds and manifold-aware optimization.
//!
//! This crate re-exports the workspace crates under one roof:
//!
//! - [`core`]: the manifold contract, cost functions, derivative backends
//!   and the Euclidean-to-Riemannian bridge
//! - [`manifolds`]: Euclidean, complex Euclidean, sphere, oblique, Stiefel,
//!   Grassmann, SPD and fixed-rank PSD geometries
//! - [`optim`]: steepest descent and conjugate gradient with backtracking
//!   line search
//! - [`problems`]: example problems (behind the default `problems` feature)
//!
//! # Example
//!
//! ```rust,no_run
//! use geomopt::prelude::*;
//!
//! #[derive(Debug)]
//! struct Rayleigh(DMatrix<f64>);
//!
//! impl CostFunction<f64> for Rayleigh {
//!     fn cost(&self, x: &DMatrix<f64>) -> geomopt::core::Result<f64> {
//!         Ok(-x.dot(&(&self.0 * x)))
//!     }
//! }
//!
//! let sphere = Sphere::vector(3).unwrap();
//! let x0 = sphere.random_point();
//! let a = DMatrix::from_diagonal(&DVector::from_row_slice(&[1.0, 2.0, 3.0]));
//! let problem = Problem::new(sphere, Rayleigh(a), Backend::FiniteDifferences);
//! let result = SteepestDescent::new()
//!     .optimize(&problem, &x0, &StoppingCriterion::new())
//!     .unwrap();
//! println!("λ_max ≈ {}", -result.cost);
//! ```

pub use geomopt_core as core;
pub use geomopt_manifolds as manifolds;
pub use geomopt_optim as optim;

#[cfg(feature = "problems")]
pub use geomopt_problems as problems;

pub use nalgebra;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use geomopt_core::prelude::*;
    pub use geomopt_manifolds::{
        ComplexEuclidean, Euclidean, Grassmann, Oblique, PSDFixedRank, Sphere, Stiefel,
        StiefelRetraction, SymmetricPositiveDefinite,
    };
    pub use geomopt_optim::prelude::*;

    #[cfg(feature = "problems")]
    pub use geomopt_problems::{OptimizerKind, ProblemConfig, ProblemError, ProblemResult};
}
