//! Euclidean-to-Riemannian bridge.
//!
//! Derivative backends produce ambient (Euclidean) gradients and
//! Hessian-vector products. This module turns them into their Riemannian
//! counterparts through the manifold:
//!
//! ```text
//! grad f(x)      = euclidean_to_riemannian_gradient(x, ∇f(x))
//! Hess f(x)[u]   = euclidean_to_riemannian_hessian(x, ∇f(x), ∇²f(x)[u], u)
//! ```
//!
//! The manifold never calls into a backend; backend output is handed over as
//! a plain matrix of the point's shape. [`Problem`] bundles a manifold, a cost
//! function and the injected [`DerivativeBackend`] for solvers.

use crate::{
    backend::{Backend, DerivativeBackend},
    cost_function::CostFunction,
    error::{BackendResult, Result},
    manifold::Manifold,
    types::{Point, Real, TangentVector},
};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Converts a Euclidean gradient into the Riemannian gradient at `point`.
///
/// # Errors
///
/// Fails with a dimension mismatch if either argument has the wrong shape.
pub fn riemannian_gradient<M: Manifold + ?Sized>(
    manifold: &M,
    point: &Point<M::Field>,
    euclidean_gradient: &TangentVector<M::Field>,
) -> Result<TangentVector<M::Field>> {
    manifold.check_point(point)?;
    manifold.check_point(euclidean_gradient)?;
    manifold.euclidean_to_riemannian_gradient(point, euclidean_gradient)
}

/// Converts a Euclidean Hessian-vector product into the Riemannian one.
pub fn riemannian_hessian<M: Manifold + ?Sized>(
    manifold: &M,
    point: &Point<M::Field>,
    euclidean_gradient: &TangentVector<M::Field>,
    euclidean_hessian: &TangentVector<M::Field>,
    direction: &TangentVector<M::Field>,
) -> Result<TangentVector<M::Field>> {
    manifold.check_point(point)?;
    manifold.check_point(euclidean_gradient)?;
    manifold.check_point(euclidean_hessian)?;
    manifold.check_point(direction)?;
    manifold.euclidean_to_riemannian_hessian(point, euclidean_gradient, euclidean_hessian, direction)
}

/// Number of cost, gradient and Hessian evaluations performed through a [`Problem`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationCounts {
    /// Cost evaluations
    pub cost: usize,
    /// Gradient evaluations
    pub gradient: usize,
    /// Hessian-vector products
    pub hessian: usize,
}

/// An optimization problem: a manifold, a cost function and a derivative backend.
#[derive(Debug)]
pub struct Problem<M: Manifold, C> {
    manifold: M,
    cost: C,
    derivatives: Box<dyn DerivativeBackend<M::Field>>,
    cost_count: AtomicUsize,
    gradient_count: AtomicUsize,
    hessian_count: AtomicUsize,
}

impl<M, C> Problem<M, C>
where
    M: Manifold,
    C: CostFunction<M::Field>,
{
    /// Creates a problem with the default configuration of `backend`.
    pub fn new(manifold: M, cost: C, backend: Backend) -> Self {
        Self::with_derivatives(manifold, cost, backend)
    }

    /// Creates a problem with a configured derivative backend, such as
    /// [`FiniteDifferences`](crate::backend::FiniteDifferences) with custom steps.
    pub fn with_derivatives<D>(manifold: M, cost: C, derivatives: D) -> Self
    where
        D: DerivativeBackend<M::Field> + 'static,
    {
        debug!(
            "problem `{}` on {} (dim {}) using {:?}",
            cost.name(),
            manifold.name(),
            manifold.dim(),
            derivatives
        );
        Self {
            manifold,
            cost,
            derivatives: Box::new(derivatives),
            cost_count: AtomicUsize::new(0),
            gradient_count: AtomicUsize::new(0),
            hessian_count: AtomicUsize::new(0),
        }
    }

    /// The manifold the problem is posed on.
    pub fn manifold(&self) -> &M {
        &self.manifold
    }

    /// The cost function.
    pub fn cost_function(&self) -> &C {
        &self.cost
    }

    /// Capability of the injected derivative backend.
    pub fn backend(&self) -> Backend {
        self.derivatives.backend()
    }

    /// Evaluates the cost at `point`.
    pub fn cost(&self, point: &Point<M::Field>) -> Result<Real> {
        self.manifold.check_point(point)?;
        self.cost_count.fetch_add(1, Ordering::Relaxed);
        self.cost.cost(point)
    }

    /// Euclidean gradient at `point`, computed by the backend.
    pub fn euclidean_gradient(&self, point: &Point<M::Field>) -> BackendResult<TangentVector<M::Field>> {
        self.manifold.check_point(point)?;
        self.gradient_count.fetch_add(1, Ordering::Relaxed);
        let gradient = self.derivatives.euclidean_gradient(&self.cost, point)?;
        self.manifold.check_point(&gradient)?;
        Ok(gradient)
    }

    /// Riemannian gradient at `point`.
    pub fn riemannian_gradient(&self, point: &Point<M::Field>) -> BackendResult<TangentVector<M::Field>> {
        let egrad = self.euclidean_gradient(point)?;
        Ok(riemannian_gradient(&self.manifold, point, &egrad)?)
    }

    /// Cost and Riemannian gradient at `point`.
    pub fn cost_and_gradient(
        &self,
        point: &Point<M::Field>,
    ) -> BackendResult<(Real, TangentVector<M::Field>)> {
        let cost = self.cost(point)?;
        let gradient = self.riemannian_gradient(point)?;
        Ok((cost, gradient))
    }

    /// Riemannian Hessian-vector product at `point` along `direction`.
    pub fn riemannian_hessian(
        &self,
        point: &Point<M::Field>,
        direction: &TangentVector<M::Field>,
    ) -> BackendResult<TangentVector<M::Field>> {
        self.manifold.check_point(direction)?;
        let egrad = self.euclidean_gradient(point)?;
        self.hessian_count.fetch_add(1, Ordering::Relaxed);
        let ehess = self.derivatives.euclidean_hessian(&self.cost, point, direction)?;
        Ok(riemannian_hessian(&self.manifold, point, &egrad, &ehess, direction)?)
    }

    /// Evaluations performed so far.
    pub fn evaluation_counts(&self) -> EvaluationCounts {
        EvaluationCounts {
            cost: self.cost_count.load(Ordering::Relaxed),
            gradient: self.gradient_count.load(Ordering::Relaxed),
            hessian: self.hessian_count.load(Ordering::Relaxed),
        }
    }

    /// Resets the evaluation counters.
    pub fn reset_counts(&self) {
        self.cost_count.store(0, Ordering::Relaxed);
        self.gradient_count.store(0, Ordering::Relaxed);
        self.hessian_count.store(0, Ordering::Relaxed);
    }
}
