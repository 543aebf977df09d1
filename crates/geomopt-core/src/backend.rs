//! Derivative backends.
//!
//! A backend turns a [`CostFunction`] into Euclidean derivatives. The
//! available capabilities are enumerated by [`Backend`]; consumers such as the
//! example problems declare which of them they support and inject the chosen
//! one into a [`Problem`](crate::bridge::Problem) at construction.
//!
//! - [`AnalyticDerivatives`] forwards to the cost function's closed forms.
//! - [`FiniteDifferences`] approximates them with central differences of the
//!   cost (gradient) and of the gradient (Hessian-vector product).
//!
//! For complex fields the finite-difference gradient perturbs the real and the
//! imaginary part of every entry, so that Re⟨∇f, δ⟩ ≈ f(x + δ) - f(x).

use crate::{
    cost_function::CostFunction,
    error::{BackendError, BackendResult},
    metric,
    types::{constants, Field, Point, Real, TangentVector},
};
use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Enumerated derivative capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Backend {
    /// Closed-form derivatives supplied by the cost function
    Analytic,
    /// Central finite differences of the cost
    FiniteDifferences,
}

impl Backend {
    /// Every backend, in a stable order.
    pub const ALL: [Backend; 2] = [Backend::Analytic, Backend::FiniteDifferences];

    /// Stable string identifier, accepted back by [`FromStr`].
    pub fn identifier(&self) -> &'static str {
        match self {
            Backend::Analytic => "analytic",
            Backend::FiniteDifferences => "finite_differences",
        }
    }

    /// Fails with [`BackendError::Unsupported`] unless `self` is in `supported`.
    pub fn ensure_supported(&self, supported: &[Backend]) -> BackendResult<()> {
        if supported.contains(self) {
            Ok(())
        } else {
            Err(BackendError::unsupported(self.identifier()))
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Backend {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "analytic" => Ok(Backend::Analytic),
            "finite_differences" | "fd" => Ok(Backend::FiniteDifferences),
            _ => Err(BackendError::unsupported(s)),
        }
    }
}

/// Source of Euclidean derivatives for a cost function.
pub trait DerivativeBackend<F: Field>: fmt::Debug + Send + Sync {
    /// The capability this backend implements.
    fn backend(&self) -> Backend;

    /// Euclidean gradient of `cost` at `point`.
    fn euclidean_gradient(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
    ) -> BackendResult<TangentVector<F>>;

    /// Euclidean Hessian-vector product of `cost` at `point` along `direction`.
    fn euclidean_hessian(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
        direction: &TangentVector<F>,
    ) -> BackendResult<TangentVector<F>>;
}

/// Backend forwarding to the cost function's closed-form derivatives.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticDerivatives;

impl<F: Field> DerivativeBackend<F> for AnalyticDerivatives {
    fn backend(&self) -> Backend {
        Backend::Analytic
    }

    fn euclidean_gradient(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
    ) -> BackendResult<TangentVector<F>> {
        cost.euclidean_gradient(point)
    }

    fn euclidean_hessian(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
        direction: &TangentVector<F>,
    ) -> BackendResult<TangentVector<F>> {
        cost.euclidean_hessian(point, direction)
    }
}

/// Central finite-difference backend.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifferences {
    gradient_step: Real,
    hessian_step: Real,
}

impl Default for FiniteDifferences {
    fn default() -> Self {
        Self {
            gradient_step: 1e-6,
            hessian_step: 1e-4,
        }
    }
}

impl FiniteDifferences {
    /// Creates a backend with the default step sizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step used for cost differences.
    pub fn with_gradient_step(mut self, step: Real) -> Self {
        self.gradient_step = step;
        self
    }

    /// Sets the step used for gradient differences along a direction.
    pub fn with_hessian_step(mut self, step: Real) -> Self {
        self.hessian_step = step;
        self
    }

    /// Step used for cost differences.
    pub fn gradient_step(&self) -> Real {
        self.gradient_step
    }

    /// Step used for gradient differences.
    pub fn hessian_step(&self) -> Real {
        self.hessian_step
    }

    fn partial<F: Field>(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
        index: usize,
        unit: F,
    ) -> BackendResult<Real> {
        let h = self.gradient_step;
        let mut shifted = point.clone();
        shifted[index] += unit * F::from_real(h);
        let forward = cost.cost(&shifted)?;
        shifted[index] = point[index] - unit * F::from_real(h);
        let backward = cost.cost(&shifted)?;
        Ok((forward - backward) / (2.0 * h))
    }
}

impl<F: Field> DerivativeBackend<F> for FiniteDifferences {
    fn backend(&self) -> Backend {
        Backend::FiniteDifferences
    }

    fn euclidean_gradient(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
    ) -> BackendResult<TangentVector<F>> {
        let mut gradient = TangentVector::<F>::zeros(point.nrows(), point.ncols());
        for index in 0..point.len() {
            let re = self.partial(cost, point, index, F::from_parts(1.0, 0.0))?;
            let im = if F::REAL_DIMENSION == 2 {
                self.partial(cost, point, index, F::from_parts(0.0, 1.0))?
            } else {
                0.0
            };
            gradient[index] = F::from_parts(re, im);
        }
        Ok(gradient)
    }

    fn euclidean_hessian(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
        direction: &TangentVector<F>,
    ) -> BackendResult<TangentVector<F>> {
        let norm = metric::norm(direction);
        if norm < constants::NORM_EPSILON {
            return Ok(TangentVector::zeros(point.nrows(), point.ncols()));
        }
        let t = self.hessian_step / norm;
        let forward = self.euclidean_gradient(cost, &(point + metric::scale(direction, t)))?;
        let backward = self.euclidean_gradient(cost, &(point - metric::scale(direction, t)))?;
        Ok(metric::scale(&(forward - backward), 0.5 / t))
    }
}

impl<F: Field> DerivativeBackend<F> for Backend {
    fn backend(&self) -> Backend {
        *self
    }

    fn euclidean_gradient(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
    ) -> BackendResult<TangentVector<F>> {
        match self {
            Backend::Analytic => AnalyticDerivatives.euclidean_gradient(cost, point),
            Backend::FiniteDifferences => {
                FiniteDifferences::default().euclidean_gradient(cost, point)
            }
        }
    }

    fn euclidean_hessian(
        &self,
        cost: &dyn CostFunction<F>,
        point: &Point<F>,
        direction: &TangentVector<F>,
    ) -> BackendResult<TangentVector<F>> {
        match self {
            Backend::Analytic => AnalyticDerivatives.euclidean_hessian(cost, point, direction),
            Backend::FiniteDifferences => {
                FiniteDifferences::default().euclidean_hessian(cost, point, direction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Result, types::DMatrix};
    use approx::assert_relative_eq;
    use nalgebra::Complex;

    /// f(x) = Re tr(Aᴴ x) + ½‖x‖², gradient A + x, Hessian identity.
    #[derive(Debug)]
    struct Shifted<F: Field> {
        a: DMatrix<F>,
    }

    impl<F: Field> CostFunction<F> for Shifted<F> {
        fn cost(&self, point: &DMatrix<F>) -> Result<Real> {
            Ok(metric::inner(&self.a, point) + 0.5 * metric::inner(point, point))
        }

        fn euclidean_gradient(&self, point: &DMatrix<F>) -> BackendResult<DMatrix<F>> {
            Ok(&self.a + point)
        }
    }

    #[test]
    fn test_identifiers_round_trip() {
        for backend in Backend::ALL {
            assert_eq!(backend.identifier().parse::<Backend>().unwrap(), backend);
            assert_eq!(backend.to_string(), backend.identifier());
        }
        assert_eq!("FD".parse::<Backend>().unwrap(), Backend::FiniteDifferences);
        assert_eq!(
            "autograd".parse::<Backend>().unwrap_err(),
            BackendError::unsupported("autograd")
        );
    }

    #[test]
    fn test_ensure_supported() {
        assert!(Backend::Analytic.ensure_supported(&Backend::ALL).is_ok());
        assert!(matches!(
            Backend::FiniteDifferences.ensure_supported(&[Backend::Analytic]),
            Err(BackendError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_finite_difference_gradient_real() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, -2.0, 0.5, 3.0]);
        let cost = Shifted { a: a.clone() };
        let x = DMatrix::from_row_slice(2, 2, &[0.1, 0.2, -0.3, 0.4]);

        let backend: &dyn DerivativeBackend<f64> = &FiniteDifferences::new();
        let numeric = backend.euclidean_gradient(&cost, &x).unwrap();
        assert_relative_eq!(numeric, &a + &x, epsilon = 1e-7);
    }

    #[test]
    fn test_finite_difference_gradient_complex() {
        let a = DMatrix::from_row_slice(
            1,
            2,
            &[Complex::new(1.0, 2.0), Complex::new(-0.5, 0.25)],
        );
        let cost = Shifted { a: a.clone() };
        let x = DMatrix::from_row_slice(1, 2, &[Complex::new(0.3, -0.1), Complex::new(0.0, 1.0)]);

        let backend: &dyn DerivativeBackend<Complex<f64>> = &Backend::FiniteDifferences;
        let numeric = backend.euclidean_gradient(&cost, &x).unwrap();
        let exact = &a + &x;
        assert!((numeric - exact).norm() < 1e-7);
    }

    #[test]
    fn test_finite_difference_hessian_is_identity() {
        let cost = Shifted {
            a: DMatrix::from_element(3, 1, 1.0),
        };
        let x = DMatrix::from_element(3, 1, 0.5);
        let u = DMatrix::from_column_slice(3, 1, &[1.0, -1.0, 2.0]);
        let backend: &dyn DerivativeBackend<f64> = &FiniteDifferences::new();
        let hv = backend.euclidean_hessian(&cost, &x, &u).unwrap();
        assert_relative_eq!(hv, u, epsilon = 1e-5);
    }

    #[test]
    fn test_analytic_hessian_missing() {
        let cost = Shifted {
            a: DMatrix::<f64>::zeros(1, 1),
        };
        let x = DMatrix::zeros(1, 1);
        let backend: &dyn DerivativeBackend<f64> = &Backend::Analytic;
        assert!(matches!(
            backend.euclidean_hessian(&cost, &x, &x),
            Err(BackendError::MissingHessian { .. })
        ));
    }
}
