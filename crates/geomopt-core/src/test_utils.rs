//! Test utilities for checking the manifold contract.
//!
//! [`ContractChecker`] samples points and tangent vectors from a manifold and
//! verifies the laws every implementation must satisfy: unit random tangents,
//! idempotent projection, centered retraction, exp/log inverse pairs,
//! equidistant midpoints and transports landing in the target tangent space.
//! Each check returns a [`ContractReport`] listing every violation instead of
//! panicking on the first one.
//!
//! [`FlatSpace`] is a minimal real matrix space for exercising code that is
//! generic over [`Manifold`].

use crate::{
    error::Result,
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{DMatrix, Point, Real, TangentVector},
};

/// Configuration for contract checks.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    /// Tolerance for numerical comparisons
    pub tolerance: Real,
    /// Number of random points to test
    pub num_points: usize,
    /// Length of the tangent vectors used for local laws (exp/log, transport)
    pub tangent_scale: Real,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            num_points: 5,
            tangent_scale: 0.3,
        }
    }
}

impl ContractConfig {
    /// Sets the comparison tolerance.
    pub fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the number of sampled points.
    pub fn with_num_points(mut self, num_points: usize) -> Self {
        self.num_points = num_points;
        self
    }

    /// Sets the length of the local tangent steps.
    pub fn with_tangent_scale(mut self, scale: Real) -> Self {
        self.tangent_scale = scale;
        self
    }
}

/// Outcome of a contract check.
#[derive(Debug, Clone, Default)]
pub struct ContractReport {
    /// Largest error observed
    pub max_error: Real,
    /// Number of comparisons performed
    pub num_tests: usize,
    /// Description of every violation
    pub errors: Vec<String>,
}

impl ContractReport {
    /// Whether every comparison passed.
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, law: &str, error: Real, tolerance: Real) {
        self.num_tests += 1;
        self.max_error = self.max_error.max(error);
        if error.is_nan() || error > tolerance {
            self.errors.push(format!(
                "{}: error = {:e} > tolerance = {:e}",
                law, error, tolerance
            ));
        }
    }

    fn fail(&mut self, law: &str, err: impl std::fmt::Display) {
        self.num_tests += 1;
        self.errors.push(format!("{}: {}", law, err));
    }

    /// Merges another report into this one.
    pub fn merge(mut self, other: ContractReport) -> Self {
        self.max_error = self.max_error.max(other.max_error);
        self.num_tests += other.num_tests;
        self.errors.extend(other.errors);
        self
    }

    /// Panics with every collected violation if any check failed.
    pub fn assert_passed(&self, manifold: &str) {
        assert!(
            self.passed(),
            "{} violates the manifold contract:\n{}",
            manifold,
            self.errors.join("\n")
        );
    }
}

/// Property checks for the manifold contract.
#[derive(Debug, Clone, Default)]
pub struct ContractChecker {
    config: ContractConfig,
}

impl ContractChecker {
    /// Creates a checker with the given configuration.
    pub fn new(config: ContractConfig) -> Self {
        Self { config }
    }

    /// Runs every check and merges the reports.
    pub fn check_all<M: Manifold>(&self, manifold: &M) -> ContractReport {
        self.check_random_tangent_unit(manifold)
            .merge(self.check_projection_idempotent(manifold))
            .merge(self.check_retraction_centering(manifold))
            .merge(self.check_exp_log_inverse(manifold))
            .merge(self.check_log_exp_inverse(manifold))
            .merge(self.check_pairmean_equidistant(manifold))
            .merge(self.check_transport_tangent(manifold))
    }

    /// Random points lie on the manifold, random tangents are unit and tangent.
    pub fn check_random_tangent_unit<M: Manifold>(&self, manifold: &M) -> ContractReport {
        let tol = self.config.tolerance;
        let mut report = ContractReport::default();
        for _ in 0..self.config.num_points {
            let x = manifold.random_point();
            if !manifold.is_point_on_manifold(&x, tol) {
                report.fail("random_point on manifold", "sample is off the manifold");
            }
            match manifold
                .random_tangent_vector(&x)
                .and_then(|u| manifold.norm(&x, &u).map(|n| (u, n)))
            {
                Ok((u, n)) => {
                    report.record("random tangent has unit norm", (n - 1.0).abs(), tol);
                    if !manifold.is_vector_in_tangent_space(&x, &u, tol) {
                        report.fail("random tangent is tangent", "vector leaves the tangent space");
                    }
                }
                Err(e) => report.fail("random_tangent_vector", e),
            }
        }
        report
    }

    /// P_x(P_x(v)) = P_x(v) for an arbitrary ambient v.
    pub fn check_projection_idempotent<M: Manifold>(&self, manifold: &M) -> ContractReport {
        let mut report = ContractReport::default();
        for _ in 0..self.config.num_points {
            let x = manifold.random_point();
            let ambient = manifold.random_point();
            let result = manifold.projection(&x, &ambient).and_then(|once| {
                manifold
                    .projection(&x, &once)
                    .map(|twice| metric::distance(&once, &twice))
            });
            match result {
                Ok(error) => report.record("projection idempotent", error, self.config.tolerance),
                Err(e) => report.fail("projection", e),
            }
        }
        report
    }

    /// R_x(0) = x.
    pub fn check_retraction_centering<M: Manifold>(&self, manifold: &M) -> ContractReport {
        let mut report = ContractReport::default();
        for _ in 0..self.config.num_points {
            let x = manifold.random_point();
            let result = manifold
                .zero_vector(&x)
                .and_then(|zero| manifold.retr(&x, &zero))
                .map(|y| metric::distance(&x, &y));
            match result {
                Ok(error) => report.record("retr(x, 0) = x", error, self.config.tolerance),
                Err(e) => report.fail("retr", e),
            }
        }
        report
    }

    /// exp_x(log_x(y)) = y for y near x, compared with the manifold distance.
    pub fn check_exp_log_inverse<M: Manifold>(&self, manifold: &M) -> ContractReport {
        let mut report = ContractReport::default();
        for _ in 0..self.config.num_points {
            let x = manifold.random_point();
            let result = (|| -> Result<Real> {
                let y = nearby_point(manifold, &x, self.config.tangent_scale)?;
                let v = manifold.log(&x, &y)?;
                let back = manifold.exp(&x, &v)?;
                manifold.dist(&y, &back)
            })();
            match result {
                Ok(error) => report.record("exp(x, log(x, y)) = y", error, self.config.tolerance),
                Err(e) => report.fail("exp/log", e),
            }
        }
        report
    }

    /// log_x(exp_x(u)) = u for small tangent u.
    pub fn check_log_exp_inverse<M: Manifold>(&self, manifold: &M) -> ContractReport {
        let mut report = ContractReport::default();
        for _ in 0..self.config.num_points {
            let x = manifold.random_point();
            let result = (|| -> Result<Real> {
                let u = metric::scale(&manifold.random_tangent_vector(&x)?, self.config.tangent_scale);
                let y = manifold.exp(&x, &u)?;
                let v = manifold.log(&x, &y)?;
                manifold.norm(&x, &(v - u))
            })();
            match result {
                Ok(error) => report.record("log(x, exp(x, u)) = u", error, self.config.tolerance),
                Err(e) => report.fail("log/exp", e),
            }
        }
        report
    }

    /// dist(x, m) = dist(y, m) for m = pairmean(x, y).
    pub fn check_pairmean_equidistant<M: Manifold>(&self, manifold: &M) -> ContractReport {
        let mut report = ContractReport::default();
        for _ in 0..self.config.num_points {
            let x = manifold.random_point();
            let result = (|| -> Result<Real> {
                let y = nearby_point(manifold, &x, self.config.tangent_scale)?;
                let mid = manifold.pairmean(&x, &y)?;
                Ok((manifold.dist(&x, &mid)? - manifold.dist(&y, &mid)?).abs())
            })();
            match result {
                Ok(error) => report.record("pairmean equidistant", error, self.config.tolerance),
                Err(e) => report.fail("pairmean", e),
            }
        }
        report
    }

    /// transp(x, y, u) lies in T_y ℳ.
    pub fn check_transport_tangent<M: Manifold>(&self, manifold: &M) -> ContractReport {
        let tol = self.config.tolerance;
        let mut report = ContractReport::default();
        for _ in 0..self.config.num_points {
            let x = manifold.random_point();
            let result = (|| -> Result<(Point<M::Field>, TangentVector<M::Field>)> {
                let y = nearby_point(manifold, &x, self.config.tangent_scale)?;
                let u = manifold.random_tangent_vector(&x)?;
                Ok((y.clone(), manifold.transp(&x, &y, &u)?))
            })();
            match result {
                Ok((y, moved)) => {
                    report.num_tests += 1;
                    if !manifold.is_vector_in_tangent_space(&y, &moved, tol) {
                        report
                            .errors
                            .push("transp: result leaves the target tangent space".to_string());
                    }
                }
                Err(e) => report.fail("transp", e),
            }
        }
        report
    }
}

/// A point at geodesic distance `scale` from `point` in a random direction.
pub fn nearby_point<M: Manifold + ?Sized>(
    manifold: &M,
    point: &Point<M::Field>,
    scale: Real,
) -> Result<Point<M::Field>> {
    let u = manifold.random_tangent_vector(point)?;
    manifold.exp(point, &metric::scale(&u, scale))
}

/// Flat real matrix space with the Frobenius metric.
#[derive(Debug, Clone)]
pub struct FlatSpace {
    shape: (usize, usize),
    random: RandomSource,
}

impl FlatSpace {
    /// Creates the space of `nrows × ncols` real matrices.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            shape: (nrows, ncols),
            random: RandomSource::seeded(0x5eed),
        }
    }
}

impl Manifold for FlatSpace {
    type Field = Real;

    fn name(&self) -> &str {
        "FlatSpace"
    }

    fn dim(&self) -> usize {
        self.shape.0 * self.shape.1
    }

    fn typical_dist(&self) -> Real {
        (self.dim() as Real).sqrt()
    }

    fn point_shape(&self) -> (usize, usize) {
        self.shape
    }

    fn is_point_on_manifold(&self, point: &DMatrix<Real>, _tol: Real) -> bool {
        point.shape() == self.shape
    }

    fn inner_product(&self, x: &DMatrix<Real>, u: &DMatrix<Real>, v: &DMatrix<Real>) -> Result<Real> {
        self.check_point(x)?;
        self.check_point(u)?;
        self.check_point(v)?;
        Ok(metric::inner(u, v))
    }

    fn projection(&self, x: &DMatrix<Real>, u: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(x)?;
        self.check_point(u)?;
        Ok(u.clone())
    }

    fn euclidean_to_riemannian_hessian(
        &self,
        _x: &DMatrix<Real>,
        _egrad: &DMatrix<Real>,
        ehess: &DMatrix<Real>,
        _u: &DMatrix<Real>,
    ) -> Result<DMatrix<Real>> {
        Ok(ehess.clone())
    }

    fn retr(&self, x: &DMatrix<Real>, u: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(x)?;
        self.check_point(u)?;
        Ok(x + u)
    }

    fn exp(&self, x: &DMatrix<Real>, u: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.retr(x, u)
    }

    fn log(&self, x: &DMatrix<Real>, y: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(x)?;
        self.check_point(y)?;
        Ok(y - x)
    }

    fn transp(&self, _x: &DMatrix<Real>, _y: &DMatrix<Real>, u: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        Ok(u.clone())
    }

    fn random_point(&self) -> DMatrix<Real> {
        self.random.standard_normal(self.shape.0, self.shape.1)
    }

    fn random_tangent_vector(&self, x: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        let u = self.random.standard_normal(self.shape.0, self.shape.1);
        normalize_tangent(self, x, u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_space_satisfies_contract() {
        let space = FlatSpace::new(4, 3);
        let report = ContractChecker::default().check_all(&space);
        report.assert_passed(space.name());
        assert!(report.num_tests >= 7 * ContractConfig::default().num_points);
    }

    #[test]
    fn test_report_collects_violations() {
        let mut report = ContractReport::default();
        report.record("law", 1e-3, 1e-6);
        report.record("law", 1e-9, 1e-6);
        report.record("law", Real::NAN, 1e-6);
        assert!(!report.passed());
        assert_eq!(report.num_tests, 3);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.max_error, 1e-3);
    }

    #[test]
    fn test_flat_contract_with_custom_config() {
        let config = ContractConfig::default()
            .with_tolerance(1e-10)
            .with_num_points(3)
            .with_tangent_scale(2.0);
        let report = ContractChecker::new(config).check_all(&FlatSpace::new(5, 2));
        report.assert_passed("FlatSpace");
    }
}
