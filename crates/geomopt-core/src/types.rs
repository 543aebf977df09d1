//! Type definitions and aliases for Riemannian optimization.
//!
//! Points and tangent vectors are dense matrices of a fixed shape whose
//! entries live in a scalar [`Field`] (ℝ or ℂ). Metrics always return a
//! [`Real`] value, even on complex manifolds.

use nalgebra::{Complex, ComplexField, Dyn, OMatrix, OVector};
use rand::Rng;
use rand_distr::StandardNormal;

/// Real scalar type used for metric values, distances and step sizes.
pub type Real = f64;

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized vector.
pub type DVector<T> = OVector<T, Dyn>;

/// A point on a manifold, stored as a matrix of the manifold's shape.
pub type Point<F> = DMatrix<F>;

/// A tangent vector, stored with the same shape as a point.
pub type TangentVector<F> = DMatrix<F>;

/// Scalar field over which a manifold's points are expressed.
///
/// Implemented for `f64` and `Complex<f64>`. The real part of the Hermitian
/// inner product gives every field a real-valued metric.
pub trait Field: ComplexField<RealField = Real> + Copy {
    /// Number of real degrees of freedom carried by one entry.
    const REAL_DIMENSION: usize;

    /// Builds a scalar from its real and imaginary parts.
    ///
    /// Real fields ignore the imaginary part.
    fn from_parts(re: Real, im: Real) -> Self;

    /// Draws a standard normal sample.
    ///
    /// Complex samples have independent standard normal real and imaginary parts.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl Field for f64 {
    const REAL_DIMENSION: usize = 1;

    fn from_parts(re: Real, _im: Real) -> Self {
        re
    }

    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl Field for Complex<f64> {
    const REAL_DIMENSION: usize = 2;

    fn from_parts(re: Real, im: Real) -> Self {
        Complex::new(re, im)
    }

    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let re: f64 = rng.sample(StandardNormal);
        let im: f64 = rng.sample(StandardNormal);
        Complex::new(re, im)
    }
}

/// Numerical constants shared by the manifolds and solvers.
pub mod constants {
    use super::Real;

    /// Default tolerance for manifold and tangent-space membership checks.
    pub const MANIFOLD_TOLERANCE: Real = 1e-8;

    /// Norms below this threshold are treated as zero.
    pub const NORM_EPSILON: Real = 1e-12;

    /// Geodesic distances below this threshold skip curvature rescaling.
    pub const DISTANCE_EPSILON: Real = 1e-6;

    /// Default tolerance for Riemannian gradient norm convergence.
    pub const DEFAULT_GRADIENT_TOLERANCE: Real = 1e-6;

    /// Default smallest accepted line-search step.
    pub const DEFAULT_MIN_STEP_SIZE: Real = 1e-10;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_real_dimensions() {
        assert_eq!(<f64 as Field>::REAL_DIMENSION, 1);
        assert_eq!(<Complex<f64> as Field>::REAL_DIMENSION, 2);
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(<f64 as Field>::from_parts(1.5, 3.0), 1.5);
        assert_eq!(
            <Complex<f64> as Field>::from_parts(1.5, -2.0),
            Complex::new(1.5, -2.0)
        );
    }

    #[test]
    fn test_complex_samples_have_imaginary_part() {
        let mut rng = SmallRng::seed_from_u64(7);
        let samples: Vec<Complex<f64>> = (0..16)
            .map(|_| <Complex<f64> as Field>::sample_standard_normal(&mut rng))
            .collect();
        assert!(samples.iter().any(|z| z.im.abs() > 1e-3));
        assert!(samples.iter().all(|z| z.re.is_finite() && z.im.is_finite()));
    }
}
