//! Concrete implementations of Riemannian manifolds.
//!
//! This crate provides the documented family of geometries, each
//! implementing [`geomopt_core::manifold::Manifold`]:
//!
//! | Manifold | Points | Dimension |
//! |---|---|---|
//! | [`Euclidean`] | ℝ^{m×n} | mn |
//! | [`ComplexEuclidean`] | ℂ^{m×n} | 2mn |
//! | [`Sphere`] | ‖X‖_F = 1 | mn - 1 |
//! | [`Oblique`] | unit-norm columns | (m-1)n |
//! | [`Stiefel`] | XᵀX = I | np - p(p+1)/2 |
//! | [`Grassmann`] | p-dim subspaces of ℝⁿ | p(n-p) |
//! | [`SymmetricPositiveDefinite`] | X ≻ 0 | n(n+1)/2 |
//! | [`PSDFixedRank`] | YYᵀ, rank k | kn - k(k-1)/2 |
//!
//! Every manifold owns an explicit [`RandomSource`](geomopt_core::random::RandomSource)
//! that can be seeded through `with_seed`.

pub mod euclidean;
pub mod grassmann;
pub mod oblique;
pub mod psd_fixed_rank;
pub mod spd;
pub mod sphere;
pub mod stiefel;
pub mod utils;

// Re-export main manifolds for convenience
pub use euclidean::{ComplexEuclidean, Euclidean, EuclideanSpace};
pub use grassmann::Grassmann;
pub use oblique::Oblique;
pub use psd_fixed_rank::PSDFixedRank;
pub use spd::SymmetricPositiveDefinite;
pub use sphere::Sphere;
pub use stiefel::{Stiefel, StiefelRetraction};
