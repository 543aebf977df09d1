//! Metric primitives shared by the manifold implementations.
//!
//! These are the flat-space building blocks: the real part of the Hermitian
//! (Frobenius) inner product, the induced norm and distance, scaling by a real
//! factor, and symmetric/skew parts. Every manifold composes its own metric from
//! them, so real and complex manifolds agree on what "inner product" means:
//!
//! ```text
//! ⟨u, v⟩ = Re Σᵢⱼ conj(uᵢⱼ) vᵢⱼ
//! ```

use crate::{
    error::{ManifoldError, Result},
    types::{DMatrix, DVector, Field, Real},
};
use nalgebra::ComplexField;

/// Real part of the Hermitian Frobenius inner product.
#[inline]
pub fn inner<F: Field>(u: &DMatrix<F>, v: &DMatrix<F>) -> Real {
    u.dotc(v).real()
}

/// Frobenius norm, consistent with [`inner`].
#[inline]
pub fn norm<F: Field>(u: &DMatrix<F>) -> Real {
    u.norm()
}

/// Ambient Frobenius distance between two matrices.
#[inline]
pub fn distance<F: Field>(x: &DMatrix<F>, y: &DMatrix<F>) -> Real {
    (x - y).norm()
}

/// Multiplies every entry by a real factor.
#[inline]
pub fn scale<F: Field>(u: &DMatrix<F>, factor: Real) -> DMatrix<F> {
    u * F::from_real(factor)
}

/// Symmetric part `(A + Aᵀ)/2` of a real square matrix.
pub fn symmetric(a: &DMatrix<Real>) -> DMatrix<Real> {
    (a + a.transpose()) * 0.5
}

/// Skew-symmetric part `(A - Aᵀ)/2` of a real square matrix.
pub fn skew(a: &DMatrix<Real>) -> DMatrix<Real> {
    (a - a.transpose()) * 0.5
}

/// Column-wise inner products `diag(UᵀV)` of two real matrices.
pub fn column_inner(u: &DMatrix<Real>, v: &DMatrix<Real>) -> DVector<Real> {
    DVector::from_iterator(
        u.ncols(),
        u.column_iter().zip(v.column_iter()).map(|(a, b)| a.dot(&b)),
    )
}

/// Scales column `j` of `u` by `factors[j]`, i.e. computes `U diag(factors)`.
pub fn scale_columns(u: &DMatrix<Real>, factors: &DVector<Real>) -> DMatrix<Real> {
    let mut scaled = u.clone();
    for (mut column, factor) in scaled.column_iter_mut().zip(factors.iter()) {
        column *= *factor;
    }
    scaled
}

/// Fails with [`ManifoldError::DimensionMismatch`] unless `matrix` has the expected shape.
pub fn check_shape<F: Field>(
    expected: (usize, usize),
    matrix: &DMatrix<F>,
    role: &str,
) -> Result<()> {
    let actual = matrix.shape();
    if actual != expected {
        return Err(ManifoldError::dimension_mismatch(
            format!("{} of shape {:?}", role, expected),
            format!("{:?}", actual),
        ));
    }
    Ok(())
}
