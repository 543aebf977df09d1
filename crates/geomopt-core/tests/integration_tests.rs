//! Integration tests for the core crate: metric laws and derivative backends.

use geomopt_core::{
    backend::{AnalyticDerivatives, Backend, DerivativeBackend, FiniteDifferences},
    cost_function::CostFunction,
    error::{BackendResult, Result as ManifoldResult},
    metric,
    random::RandomSource,
    types::{DMatrix, Real},
};
use nalgebra::Complex;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// f(z) = ‖Az - b‖² over complex column vectors.
#[derive(Debug)]
struct ComplexLeastSquares {
    a: DMatrix<Complex<f64>>,
    b: DMatrix<Complex<f64>>,
}

impl CostFunction<Complex<f64>> for ComplexLeastSquares {
    fn name(&self) -> &str {
        "complex_least_squares"
    }

    fn cost(&self, point: &DMatrix<Complex<f64>>) -> ManifoldResult<Real> {
        let residual = &self.a * point - &self.b;
        Ok(metric::inner(&residual, &residual))
    }

    fn euclidean_gradient(
        &self,
        point: &DMatrix<Complex<f64>>,
    ) -> BackendResult<DMatrix<Complex<f64>>> {
        let residual = &self.a * point - &self.b;
        Ok(self.a.adjoint() * residual * Complex::new(2.0, 0.0))
    }
}

#[test]
fn test_complex_finite_differences_match_closed_form() {
    let random = RandomSource::seeded(2024);
    let cost = ComplexLeastSquares {
        a: random.standard_normal(4, 3),
        b: random.standard_normal(4, 1),
    };
    let z: DMatrix<Complex<f64>> = random.standard_normal(3, 1);

    let analytic: &dyn DerivativeBackend<Complex<f64>> = &AnalyticDerivatives;
    let numeric: &dyn DerivativeBackend<Complex<f64>> = &FiniteDifferences::new();
    let exact = analytic.euclidean_gradient(&cost, &z).unwrap();
    let approx = numeric.euclidean_gradient(&cost, &z).unwrap();
    assert!(metric::distance(&exact, &approx) < 1e-6 * exact.norm().max(1.0));
}

#[test]
fn test_backend_identifiers_are_stable() {
    let identifiers: Vec<String> = Backend::ALL.iter().map(|b| b.to_string()).collect();
    assert_eq!(identifiers, vec!["analytic", "finite_differences"]);
    assert!(matches!(
        " Finite-Differences ".parse::<Backend>(),
        Ok(Backend::FiniteDifferences)
    ));
}

fn matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = DMatrix<f64>> {
    prop::collection::vec(-10.0..10.0f64, rows * cols)
        .prop_map(move |data| DMatrix::from_vec(rows, cols, data))
}

proptest! {
    #[test]
    fn prop_inner_product_is_symmetric(u in matrix_strategy(3, 2), v in matrix_strategy(3, 2)) {
        prop_assert!((metric::inner(&u, &v) - metric::inner(&v, &u)).abs() < 1e-10);
    }

    #[test]
    fn prop_norm_matches_inner(u in matrix_strategy(4, 3)) {
        let n = metric::norm(&u);
        prop_assert!((n * n - metric::inner(&u, &u)).abs() < 1e-8 * (1.0 + n * n));
    }

    #[test]
    fn prop_symmetric_plus_skew_recovers(a in matrix_strategy(3, 3)) {
        let recovered = metric::symmetric(&a) + metric::skew(&a);
        prop_assert!(metric::distance(&recovered, &a) < 1e-12);
    }
}
