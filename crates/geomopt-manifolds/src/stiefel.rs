//! Stiefel manifold St(n, p) = {X ∈ ℝ^{n×p} : XᵀX = I_p}.
//!
//! The Stiefel manifold is the set of n×p matrices with orthonormal columns.
//! It appears in:
//! - Principal Component Analysis with orthogonality constraints
//! - Orthogonal Procrustes problems
//! - Independent Component Analysis
//!
//! The metric is the one induced by the embedding in ℝ^{n×p}. Geodesics have a
//! closed form through a 2p×2p matrix exponential. The logarithm has none and
//! is computed by Newton shooting on the exact differential of that closed
//! form, continued along the polar path from X to Y.

use crate::utils;
use geomopt_core::{
    error::{ManifoldError, Result},
    manifold::{normalize_tangent, Manifold},
    metric,
    random::RandomSource,
    types::{DMatrix, DVector, Real},
};
use log::{trace, warn};

const LOG_TOLERANCE: Real = 1e-11;
const PATH_TOLERANCE: Real = 1e-8;
const NEWTON_MAX_ITERATIONS: usize = 30;
const MIN_DAMPING: Real = 1.0 / 1024.0;
const MAX_PATH_STEP: Real = 0.25;
const MIN_PATH_STEP: Real = 1.0 / 4096.0;
const MAX_PATH_STEPS: usize = 200;
const SINGULAR_CUTOFF: Real = 1e-10;

/// Retraction used by [`Stiefel::retr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StiefelRetraction {
    /// Q factor of `X + U` with a positive R diagonal
    #[default]
    Qr,
    /// Polar factor of `X + U`, the closest orthonormal matrix
    Polar,
}

/// `exp_X(V)` together with the factors its differential reuses.
struct Shot {
    /// `[X V]`
    frame: DMatrix<Real>,
    /// `[[XᵀV, -VᵀV], [I, XᵀV]]`
    block: DMatrix<Real>,
    /// First p columns of `expm(block)`
    head: DMatrix<Real>,
    /// `XᵀV`
    xtv: DMatrix<Real>,
    /// `expm(-XᵀV)`
    tail: DMatrix<Real>,
    endpoint: DMatrix<Real>,
}

/// The Stiefel manifold of `n × p` orthonormal frames.
///
/// # Mathematical Properties
///
/// - **Dimension**: np - p(p+1)/2
/// - **Tangent space**: T_X St = {U : XᵀU + UᵀX = 0}
/// - **Projection**: P_X(U) = U - X sym(XᵀU)
/// - **Exponential map**: [X U] expm([[XᵀU, -UᵀU], [I, XᵀU]]) [I; 0] expm(-XᵀU)
#[derive(Debug, Clone)]
pub struct Stiefel {
    n: usize,
    p: usize,
    retraction: StiefelRetraction,
    random: RandomSource,
}

impl Stiefel {
    /// Creates the Stiefel manifold St(n, p).
    ///
    /// # Errors
    ///
    /// Returns an error if `p == 0` or `p > n`.
    pub fn new(n: usize, p: usize) -> Result<Self> {
        if p == 0 || p > n {
            return Err(ManifoldError::invalid_parameter(format!(
                "Stiefel manifold requires 0 < p <= n, got n={}, p={}",
                n, p
            )));
        }
        Ok(Self {
            n,
            p,
            retraction: StiefelRetraction::default(),
            random: RandomSource::default(),
        })
    }

    /// Selects the retraction.
    pub fn with_retraction(mut self, retraction: StiefelRetraction) -> Self {
        self.retraction = retraction;
        self
    }

    /// Replaces the random source used for sampling.
    pub fn with_random_source(mut self, random: RandomSource) -> Self {
        self.random = random;
        self
    }

    /// Seeds the random source for reproducible sampling.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_random_source(RandomSource::seeded(seed))
    }

    /// Returns n (number of rows).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Returns p (number of columns).
    pub fn p(&self) -> usize {
        self.p
    }

    /// The configured retraction.
    pub fn retraction(&self) -> StiefelRetraction {
        self.retraction
    }

    fn check_pair(&self, a: &DMatrix<Real>, b: &DMatrix<Real>) -> Result<()> {
        self.check_point(a)?;
        self.check_point(b)
    }

    fn project(x: &DMatrix<Real>, u: &DMatrix<Real>) -> DMatrix<Real> {
        u - x * metric::symmetric(&(x.transpose() * u))
    }

    fn shoot(&self, x: &DMatrix<Real>, v: &DMatrix<Real>) -> Shot {
        let p = self.p;
        let xtv = x.transpose() * v;
        let vtv = v.transpose() * v;

        let mut block = DMatrix::<Real>::zeros(2 * p, 2 * p);
        block.view_mut((0, 0), (p, p)).copy_from(&xtv);
        block.view_mut((0, p), (p, p)).copy_from(&(-vtv));
        block
            .view_mut((p, 0), (p, p))
            .copy_from(&DMatrix::<Real>::identity(p, p));
        block.view_mut((p, p), (p, p)).copy_from(&xtv);

        let mut frame = DMatrix::<Real>::zeros(self.n, 2 * p);
        frame.view_mut((0, 0), (self.n, p)).copy_from(x);
        frame.view_mut((0, p), (self.n, p)).copy_from(v);

        let head = block.clone().exp().columns(0, p).into_owned();
        let tail = (-&xtv).exp();
        let endpoint = &frame * &head * &tail;
        Shot {
            frame,
            block,
            head,
            xtv,
            tail,
            endpoint,
        }
    }

    fn geodesic(&self, x: &DMatrix<Real>, u: &DMatrix<Real>) -> DMatrix<Real> {
        self.shoot(x, u).endpoint
    }

    /// Directional derivative of `V ↦ exp_X(V)` at `shot` along `h`.
    fn differential(&self, x: &DMatrix<Real>, shot: &Shot, h: &DMatrix<Real>) -> DMatrix<Real> {
        let (n, p) = (self.n, self.p);
        let v = shot.frame.columns(p, p);
        let xth = x.transpose() * h;
        let vth = v.transpose() * h;

        let mut block_dot = DMatrix::<Real>::zeros(2 * p, 2 * p);
        block_dot.view_mut((0, 0), (p, p)).copy_from(&xth);
        block_dot
            .view_mut((0, p), (p, p))
            .copy_from(&(-(&vth + vth.transpose())));
        block_dot.view_mut((p, p), (p, p)).copy_from(&xth);

        let head_dot = utils::expm_frechet(&shot.block, &block_dot)
            .columns(0, p)
            .into_owned();
        let tail_dot = utils::expm_frechet(&(-&shot.xtv), &(-xth));

        let mut frame_dot = DMatrix::<Real>::zeros(n, 2 * p);
        frame_dot.view_mut((0, p), (n, p)).copy_from(h);

        frame_dot * &shot.head * &shot.tail
            + &shot.frame * head_dot * &shot.tail
            + &shot.frame * &shot.head * tail_dot
    }

    /// Gauss-Newton correction `ΔV ∈ T_X St` with `D exp_X(V)[ΔV] ≈ residual`.
    fn newton_step(
        &self,
        x: &DMatrix<Real>,
        shot: &Shot,
        residual: &DMatrix<Real>,
    ) -> Option<DMatrix<Real>> {
        let (n, p) = (self.n, self.p);
        let mut jacobian = DMatrix::<Real>::zeros(n * p, n * p);
        let mut unit = DMatrix::<Real>::zeros(n, p);
        for k in 0..n * p {
            unit[k] = 1.0;
            let column = self.differential(x, shot, &Self::project(x, &unit));
            unit[k] = 0.0;
            jacobian.column_mut(k).copy_from_slice(column.as_slice());
        }

        let svd = jacobian.svd(true, true);
        let cutoff = SINGULAR_CUTOFF * svd.singular_values.max();
        let rhs = DVector::from_column_slice(residual.as_slice());
        let delta = svd.solve(&rhs, cutoff).ok()?;
        Some(Self::project(x, &DMatrix::from_column_slice(n, p, delta.as_slice())))
    }

    /// Damped Newton iteration for `exp_X(V) = target`, starting at `guess`.
    fn shoot_towards(
        &self,
        x: &DMatrix<Real>,
        target: &DMatrix<Real>,
        guess: DMatrix<Real>,
        tolerance: Real,
    ) -> Option<DMatrix<Real>> {
        let mut v = guess;
        let mut shot = self.shoot(x, &v);
        let mut residual = target - &shot.endpoint;
        let mut residual_norm = residual.norm();

        for _ in 0..NEWTON_MAX_ITERATIONS {
            if residual_norm <= tolerance {
                return Some(v);
            }
            if !residual_norm.is_finite() {
                return None;
            }
            let step = self.newton_step(x, &shot, &residual)?;

            let mut damping = 1.0;
            loop {
                let candidate = &v + &step * damping;
                let candidate_shot = self.shoot(x, &candidate);
                let candidate_residual = target - &candidate_shot.endpoint;
                let candidate_norm = candidate_residual.norm();
                if candidate_norm < residual_norm {
                    v = candidate;
                    shot = candidate_shot;
                    residual = candidate_residual;
                    residual_norm = candidate_norm;
                    break;
                }
                damping *= 0.5;
                if damping < MIN_DAMPING {
                    return None;
                }
            }
        }
        (residual_norm <= tolerance).then_some(v)
    }
}

impl Manifold for Stiefel {
    type Field = Real;

    fn name(&self) -> &str {
        "Stiefel"
    }

    fn dim(&self) -> usize {
        self.n * self.p - self.p * (self.p + 1) / 2
    }

    fn typical_dist(&self) -> Real {
        (self.p as Real).sqrt()
    }

    fn point_shape(&self) -> (usize, usize) {
        (self.n, self.p)
    }

    fn is_point_on_manifold(&self, point: &DMatrix<Real>, tol: Real) -> bool {
        point.shape() == (self.n, self.p) && utils::orthonormality_error(point) <= tol
    }

    fn is_vector_in_tangent_space(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>, tol: Real) -> bool {
        if self.check_pair(point, vector).is_err() {
            return false;
        }
        let xtu = point.transpose() * vector;
        (&xtu + xtu.transpose()).norm() <= tol * Real::max(1.0, vector.norm())
    }

    fn inner_product(&self, point: &DMatrix<Real>, u: &DMatrix<Real>, v: &DMatrix<Real>) -> Result<Real> {
        self.check_point(point)?;
        self.check_pair(u, v)?;
        Ok(metric::inner(u, v))
    }

    fn projection(&self, point: &DMatrix<Real>, vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, vector)?;
        Ok(Self::project(point, vector))
    }

    fn euclidean_to_riemannian_hessian(
        &self,
        point: &DMatrix<Real>,
        euclidean_gradient: &DMatrix<Real>,
        euclidean_hessian: &DMatrix<Real>,
        tangent_vector: &DMatrix<Real>,
    ) -> Result<DMatrix<Real>> {
        self.check_pair(point, euclidean_gradient)?;
        self.check_pair(euclidean_hessian, tangent_vector)?;
        let xtg = metric::symmetric(&(point.transpose() * euclidean_gradient));
        Ok(Self::project(
            point,
            &(euclidean_hessian - tangent_vector * xtg),
        ))
    }

    fn retr(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        let moved = point + tangent_vector;
        match self.retraction {
            StiefelRetraction::Qr => Ok(utils::qr_positive(&moved)),
            StiefelRetraction::Polar => utils::polar_factor(&moved),
        }
    }

    fn exp(&self, point: &DMatrix<Real>, tangent_vector: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, tangent_vector)?;
        Ok(self.geodesic(point, tangent_vector))
    }

    /// Logarithm by Newton shooting along the polar path.
    ///
    /// The targets `Y(t) = polar((1 - t) X + t Y)` run from `X` to `Y`. Each
    /// is reached from the previous solution, extrapolated linearly in `t`,
    /// and the step in `t` doubles on success (up to a quarter of the path)
    /// and halves on failure. Starting from `V = 0` at `t = 0` keeps the
    /// iterates on the branch of the shortest geodesic.
    ///
    /// # Errors
    ///
    /// Returns a numerical error if the path step collapses, which happens
    /// at conjugate points and when `X` and `Y` share an antipodal direction.
    fn log(&self, point: &DMatrix<Real>, other: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_pair(point, other)?;
        let mut v = DMatrix::<Real>::zeros(self.n, self.p);
        let mut velocity: Option<DMatrix<Real>> = None;
        let mut t: Real = 0.0;
        let mut step: Real = MAX_PATH_STEP;

        for attempt in 0..MAX_PATH_STEPS {
            if t >= 1.0 {
                trace!("Stiefel log reached Y after {} path steps", attempt);
                return Ok(v);
            }
            if step < MIN_PATH_STEP {
                break;
            }
            let next = Real::min(t + step, 1.0);
            let target = if next < 1.0 {
                utils::polar_factor(&(point * (1.0 - next) + other * next))?
            } else {
                other.clone()
            };
            let guess = match &velocity {
                Some(rate) => &v + rate * (next - t),
                None => Self::project(point, &(&target - point)),
            };
            let tolerance = if next < 1.0 {
                PATH_TOLERANCE
            } else {
                LOG_TOLERANCE * Real::max(1.0, guess.norm())
            };

            match self.shoot_towards(point, &target, guess, tolerance) {
                Some(solution) => {
                    velocity = Some((&solution - &v) / (next - t));
                    v = solution;
                    t = next;
                    step = Real::min(2.0 * step, MAX_PATH_STEP);
                }
                None => step *= 0.5,
            }
        }
        if t >= 1.0 {
            return Ok(v);
        }

        warn!("Stiefel log stalled at t = {:.4} on the polar path", t);
        Err(ManifoldError::numerical_error(format!(
            "Stiefel logarithm did not converge (stalled at t = {:.4})",
            t
        )))
    }

    fn random_point(&self) -> DMatrix<Real> {
        utils::random_orthonormal(&self.random, self.n, self.p)
    }

    fn random_tangent_vector(&self, point: &DMatrix<Real>) -> Result<DMatrix<Real>> {
        self.check_point(point)?;
        let vector = Self::project(point, &self.random.standard_normal(self.n, self.p));
        normalize_tangent(self, point, vector)
    }
}
