//! Cost function interface for optimization problems.
//!
//! A cost function evaluates a real objective at a point given in ambient
//! coordinates. Closed-form Euclidean derivatives are optional: a cost that
//! does not override [`CostFunction::euclidean_gradient`] reports
//! [`BackendError::MissingGradient`], and derivative backends decide whether
//! to fall back to numerical approximations.
//!
//! Cost functions never see the manifold. Conversion of their ambient
//! derivatives into Riemannian ones is the job of the bridge in
//! [`crate::bridge`].

use crate::{
    error::{BackendError, BackendResult, Result},
    types::{Field, Point, Real, TangentVector},
};
use std::{
    fmt::Debug,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Trait for cost functions expressed in ambient coordinates.
pub trait CostFunction<F: Field>: Debug + Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> &str {
        "cost"
    }

    /// Evaluates the cost at a point.
    fn cost(&self, point: &Point<F>) -> Result<Real>;

    /// Closed-form Euclidean gradient ∇f(x).
    ///
    /// # Default Implementation
    ///
    /// Returns [`BackendError::MissingGradient`].
    fn euclidean_gradient(&self, _point: &Point<F>) -> BackendResult<TangentVector<F>> {
        Err(BackendError::missing_gradient(self.name()))
    }

    /// Closed-form Euclidean Hessian-vector product ∇²f(x)[u].
    ///
    /// # Default Implementation
    ///
    /// Returns [`BackendError::MissingHessian`].
    fn euclidean_hessian(
        &self,
        _point: &Point<F>,
        _direction: &TangentVector<F>,
    ) -> BackendResult<TangentVector<F>> {
        Err(BackendError::missing_hessian(self.name()))
    }
}

impl<F: Field, C: CostFunction<F> + ?Sized> CostFunction<F> for &C {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn cost(&self, point: &Point<F>) -> Result<Real> {
        (**self).cost(point)
    }

    fn euclidean_gradient(&self, point: &Point<F>) -> BackendResult<TangentVector<F>> {
        (**self).euclidean_gradient(point)
    }

    fn euclidean_hessian(
        &self,
        point: &Point<F>,
        direction: &TangentVector<F>,
    ) -> BackendResult<TangentVector<F>> {
        (**self).euclidean_hessian(point, direction)
    }
}

/// Wrapper that counts evaluations of an inner cost function.
///
/// Counters are atomic so the wrapper stays `Sync`.
#[derive(Debug)]
pub struct CountingCostFunction<C> {
    /// The underlying cost function
    pub inner: C,
    cost_count: AtomicUsize,
    gradient_count: AtomicUsize,
    hessian_count: AtomicUsize,
}

impl<C> CountingCostFunction<C> {
    /// Creates a new counting wrapper around a cost function.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cost_count: AtomicUsize::new(0),
            gradient_count: AtomicUsize::new(0),
            hessian_count: AtomicUsize::new(0),
        }
    }

    /// Resets all counters to zero.
    pub fn reset_counts(&self) {
        self.cost_count.store(0, Ordering::Relaxed);
        self.gradient_count.store(0, Ordering::Relaxed);
        self.hessian_count.store(0, Ordering::Relaxed);
    }

    /// Returns the current `(cost, gradient, hessian)` evaluation counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.cost_count.load(Ordering::Relaxed),
            self.gradient_count.load(Ordering::Relaxed),
            self.hessian_count.load(Ordering::Relaxed),
        )
    }

    /// Consumes the wrapper and returns the inner cost function.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<F: Field, C: CostFunction<F>> CostFunction<F> for CountingCostFunction<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn cost(&self, point: &Point<F>) -> Result<Real> {
        self.cost_count.fetch_add(1, Ordering::Relaxed);
        self.inner.cost(point)
    }

    fn euclidean_gradient(&self, point: &Point<F>) -> BackendResult<TangentVector<F>> {
        self.gradient_count.fetch_add(1, Ordering::Relaxed);
        self.inner.euclidean_gradient(point)
    }

    fn euclidean_hessian(
        &self,
        point: &Point<F>,
        direction: &TangentVector<F>,
    ) -> BackendResult<TangentVector<F>> {
        self.hessian_count.fetch_add(1, Ordering::Relaxed);
        self.inner.euclidean_hessian(point, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metric, types::DMatrix};

    /// f(x) = ½‖x‖², value only.
    #[derive(Debug)]
    struct HalfSquaredNorm;

    impl CostFunction<f64> for HalfSquaredNorm {
        fn name(&self) -> &str {
            "half_squared_norm"
        }

        fn cost(&self, point: &DMatrix<f64>) -> Result<Real> {
            Ok(0.5 * metric::inner(point, point))
        }
    }

    #[test]
    fn test_missing_derivatives_are_reported() {
        let cost = HalfSquaredNorm;
        let x = DMatrix::from_element(2, 2, 1.0);
        assert_eq!(cost.cost(&x).unwrap(), 2.0);
        assert_eq!(
            cost.euclidean_gradient(&x).unwrap_err(),
            BackendError::missing_gradient("half_squared_norm")
        );
        assert!(matches!(
            cost.euclidean_hessian(&x, &x),
            Err(BackendError::MissingHessian { .. })
        ));
    }

    #[test]
    fn test_counting_cost_function() {
        let cost = CountingCostFunction::new(HalfSquaredNorm);
        let x = DMatrix::from_element(3, 1, 1.0);
        assert_eq!(cost.counts(), (0, 0, 0));

        cost.cost(&x).unwrap();
        cost.cost(&x).unwrap();
        let _ = cost.euclidean_gradient(&x);
        assert_eq!(cost.counts(), (2, 1, 0));

        cost.reset_counts();
        assert_eq!(cost.counts(), (0, 0, 0));
    }

    #[test]
    fn test_reference_forwards() {
        let inner = HalfSquaredNorm;
        let by_ref = &inner;
        let x = DMatrix::from_element(1, 1, 2.0);
        assert_eq!(CostFunction::<f64>::name(&by_ref), "half_squared_norm");
        assert_eq!(by_ref.cost(&x).unwrap(), 2.0);
    }
}
