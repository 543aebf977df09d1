//! Dense linear-algebra helpers shared by the matrix manifolds.

use geomopt_core::{
    error::{ManifoldError, Result},
    metric,
    random::RandomSource,
    types::{constants, DMatrix, DVector, Real},
};

/// Thin Q factor of `a` with the signs fixed so that diag(R) is positive.
///
/// Fixing the signs makes the factorization unique and turns it into a
/// smooth retraction.
pub fn qr_positive(a: &DMatrix<Real>) -> DMatrix<Real> {
    let qr = a.clone().qr();
    let r = qr.r();
    let mut q = qr.q();
    for (j, mut column) in q.column_iter_mut().enumerate() {
        if j < r.nrows() && r[(j, j)] < 0.0 {
            column.neg_mut();
        }
    }
    q
}

/// Orthonormal polar factor `U Vᵀ` of the thin SVD `a = U Σ Vᵀ`.
pub fn polar_factor(a: &DMatrix<Real>) -> Result<DMatrix<Real>> {
    let svd = a.clone().svd(true, true);
    match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => Ok(u * v_t),
        _ => Err(ManifoldError::numerical_error("SVD failed to converge")),
    }
}

/// Thin SVD returning `(U, σ, Vᵀ)`.
pub fn thin_svd(a: &DMatrix<Real>) -> Result<(DMatrix<Real>, DVector<Real>, DMatrix<Real>)> {
    let svd = a.clone().svd(true, true);
    match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => Ok((u, svd.singular_values, v_t)),
        _ => Err(ManifoldError::numerical_error("SVD failed to converge")),
    }
}

/// Applies a scalar function to the eigenvalues of a symmetric matrix.
///
/// Computes `Q diag(f(λ)) Qᵀ` from `a = Q diag(λ) Qᵀ`.
pub fn sym_function<F>(a: &DMatrix<Real>, f: F) -> DMatrix<Real>
where
    F: Fn(Real) -> Real,
{
    let eigen = metric::symmetric(a).symmetric_eigen();
    let q = eigen.eigenvectors;
    let values = eigen.eigenvalues.map(f);
    let scaled = metric::scale_columns(&q, &values);
    metric::symmetric(&(scaled * q.transpose()))
}

/// Eigenvalues of a symmetric matrix.
pub fn sym_eigenvalues(a: &DMatrix<Real>) -> DVector<Real> {
    metric::symmetric(a).symmetric_eigenvalues()
}

/// Solves the Lyapunov equation `S Ω + Ω S = C` for symmetric positive definite `S`.
///
/// Works in the eigenbasis of `S`, where the equation decouples entrywise.
pub fn solve_lyapunov(s: &DMatrix<Real>, c: &DMatrix<Real>) -> Result<DMatrix<Real>> {
    let eigen = metric::symmetric(s).symmetric_eigen();
    let q = &eigen.eigenvectors;
    let lambda = &eigen.eigenvalues;
    let mut rotated = q.transpose() * c * q;
    for j in 0..rotated.ncols() {
        for i in 0..rotated.nrows() {
            let denom = lambda[i] + lambda[j];
            if denom.abs() < constants::NORM_EPSILON {
                return Err(ManifoldError::numerical_error(
                    "Lyapunov operator is singular (rank-deficient point)",
                ));
            }
            rotated[(i, j)] /= denom;
        }
    }
    Ok(q * rotated * q.transpose())
}

/// Fréchet derivative of the matrix exponential at `a` along `e`.
///
/// Read off the upper-right block of `exp([[a, e], [0, a]])`.
pub fn expm_frechet(a: &DMatrix<Real>, e: &DMatrix<Real>) -> DMatrix<Real> {
    let k = a.nrows();
    let mut block = DMatrix::<Real>::zeros(2 * k, 2 * k);
    block.view_mut((0, 0), (k, k)).copy_from(a);
    block.view_mut((0, k), (k, k)).copy_from(e);
    block.view_mut((k, k), (k, k)).copy_from(a);
    block.exp().view((0, k), (k, k)).into_owned()
}

/// Divides every column by its Euclidean norm.
pub fn normalize_columns(a: &DMatrix<Real>) -> Result<DMatrix<Real>> {
    let mut normalized = a.clone();
    for mut column in normalized.column_iter_mut() {
        let norm = column.norm();
        if norm < constants::NORM_EPSILON {
            return Err(ManifoldError::numerical_error(
                "cannot normalize a zero column",
            ));
        }
        column /= norm;
    }
    Ok(normalized)
}

/// Copies column `j` into an owned `nrows × 1` matrix.
pub(crate) fn column(a: &DMatrix<Real>, j: usize) -> DMatrix<Real> {
    a.columns(j, 1).into_owned()
}

/// Random `n × p` matrix with orthonormal columns.
pub fn random_orthonormal(random: &RandomSource, n: usize, p: usize) -> DMatrix<Real> {
    qr_positive(&random.standard_normal(n, p))
}

/// Frobenius distance of `XᵀX` from the identity.
pub(crate) fn orthonormality_error(x: &DMatrix<Real>) -> Real {
    let p = x.ncols();
    (x.transpose() * x - DMatrix::<Real>::identity(p, p)).norm()
}
