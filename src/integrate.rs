//! Public entry points for oscillatory quadrature.
//!
//! [`levintegrate`] evaluates ∫ₐᵇ f(x)·w(x) dx by solving the Levin
//! auxiliary ODE with the crate's own RKF7(8) solver;
//! [`levintegrate_with`] does the same against any caller-supplied
//! [`IvpSolver`]. The cost of either is governed by the smoothness of f,
//! not by how many times the kernel oscillates over [a, b].

use crate::error::{LevinError, LevinResult};
use crate::kernel::{Kernel, BASIS_DIM};
use crate::levin::{boundary_term, particular_start, system_matrix};
use crate::solver::{IvpSolver, OdeSystem, Rkf78, Tolerances};

/// The auxiliary solve runs tighter than the requested tolerances. The
/// solver controls error per step while the quadrature error accumulates
/// over all steps of the solve, so a per-step setting equal to the
/// end-to-end target would miss it by the step count.
const SOLVE_TOLERANCE_FACTOR: f64 = 1e-3;
/// Keeps the interior solve above roundoff when very tight tolerances are
/// requested.
const SOLVE_TOLERANCE_FLOOR: f64 = 1e-14;

/// Options for [`levintegrate`].
#[derive(Debug, Clone)]
pub struct LevinOptions {
    /// Absolute tolerance target for the quadrature error.
    pub atol: f64,
    /// Relative tolerance target for the quadrature error.
    pub rtol: f64,
    /// Initial step size; defaults to a tenth of the interval.
    pub h0: Option<f64>,
    /// Step budget for the auxiliary solve.
    pub max_steps: u64,
}

impl Default for LevinOptions {
    fn default() -> Self {
        Self {
            atol: 1e-8,
            rtol: 1e-8,
            h0: None,
            max_steps: 1_000_000,
        }
    }
}

/// The Levin auxiliary system p′ = −A(x)·p + f(x)·e₁ as an [`OdeSystem`].
///
/// Borrows the kernel and the integrand; built internally by the entry
/// points and public so a caller driving their own solver can reuse it.
/// Carries the validated interval so that a solver probing slightly past
/// an endpoint sees the nearest in-interval value instead of a kernel
/// singularity.
pub struct LevinOde<'a, F>
where
    F: Fn(f64) -> f64,
{
    kernel: &'a Kernel,
    f: &'a F,
    a: f64,
    b: f64,
}

impl<'a, F> LevinOde<'a, F>
where
    F: Fn(f64) -> f64,
{
    /// Bridge a kernel and an integrand into the auxiliary ODE over [a, b].
    ///
    /// Bounds must satisfy 0 < a < b and be finite.
    pub fn new(kernel: &'a Kernel, f: &'a F, a: f64, b: f64) -> LevinResult<Self> {
        validate_bounds(a, b)?;
        Ok(Self { kernel, f, a, b })
    }
}

impl<F> OdeSystem<BASIS_DIM> for LevinOde<'_, F>
where
    F: Fn(f64) -> f64,
{
    fn rhs(&self, x: f64, p: &[f64; BASIS_DIM], dpdx: &mut [f64; BASIS_DIM]) {
        let x = x.clamp(self.a, self.b);
        // 0 < a ≤ x ≤ b after the clamp, so the matrix is always defined.
        let a = system_matrix(self.kernel, x)
            .expect("coefficient matrix is defined on the validated interval");
        let fx = (self.f)(x);
        dpdx[0] = -(a[0][0] * p[0] + a[0][1] * p[1]) + fx;
        dpdx[1] = -(a[1][0] * p[0] + a[1][1] * p[1]);
    }
}

fn validate_bounds(a: f64, b: f64) -> LevinResult<()> {
    if !a.is_finite() || !b.is_finite() || !(a > 0.0) || !(b > a) {
        return Err(LevinError::InvalidBounds { a, b });
    }
    Ok(())
}

/// Evaluate ∫ₐᵇ f(x)·w(x) dx with the built-in RKF7(8) solver.
///
/// `f` is the smooth amplitude; `kernel` supplies the oscillatory factor
/// w(x). Bounds must satisfy 0 < a < b and be finite; the positivity
/// requirement keeps Bessel-family kernels away from their x = 0
/// singularity and is enforced for all families uniformly.
///
/// `atol`/`rtol` are targets for the quadrature error itself; the interior
/// ODE solve runs correspondingly tighter.
///
/// # Example
/// ```
/// use levin_ode::{levintegrate, Kernel, LevinOptions};
///
/// // ∫₁⁵ cos(50x) dx = (sin 250 − sin 50) / 50
/// let kernel = Kernel::harmonic(50.0).unwrap();
/// let result = levintegrate(&kernel, |_| 1.0, 1.0, 5.0, &LevinOptions::default()).unwrap();
/// let exact = (250.0f64.sin() - 50.0f64.sin()) / 50.0;
/// assert!((result - exact).abs() < 1e-7);
/// ```
pub fn levintegrate<F>(
    kernel: &Kernel,
    f: F,
    a: f64,
    b: f64,
    options: &LevinOptions,
) -> LevinResult<f64>
where
    F: Fn(f64) -> f64,
{
    validate_bounds(a, b)?;
    let h0 = options.h0.unwrap_or((b - a) / 10.0);

    let atol = (options.atol * SOLVE_TOLERANCE_FACTOR).max(SOLVE_TOLERANCE_FLOOR);
    let rtol = (options.rtol * SOLVE_TOLERANCE_FACTOR).max(SOLVE_TOLERANCE_FLOOR);
    let mut solver = Rkf78::new(Tolerances::new(atol, rtol));
    solver.max_steps = options.max_steps;

    levintegrate_with(kernel, f, a, b, h0, &mut solver)
}

/// Evaluate ∫ₐᵇ f(x)·w(x) dx against a caller-supplied solver.
///
/// The auxiliary system is solved from the slowly varying start
/// p(a) = A(a)⁻¹·f(a)·e₁ (zero at a kernel turning point) to x = b; the
/// integral is the difference of the boundary terms
/// p(b)·B(b) − p(a)·B(a). The start is a convention, not a requirement:
/// homogeneous components of the solution keep p·B constant, so every
/// solution branch yields the same difference. The slowly varying branch
/// is chosen because it minimizes the rotating component the solver has
/// to resolve.
///
/// Unlike [`levintegrate`], the solver's tolerances are used as given;
/// the caller owns the per-step versus end-to-end error trade.
pub fn levintegrate_with<F, S>(
    kernel: &Kernel,
    f: F,
    a: f64,
    b: f64,
    h0: f64,
    solver: &mut S,
) -> LevinResult<f64>
where
    F: Fn(f64) -> f64,
    S: IvpSolver<BASIS_DIM>,
{
    let system = LevinOde::new(kernel, &f, a, b)?;
    let p_a = particular_start(kernel, f(a), a)?;
    let (_, p_b) = solver.solve(&system, a, &p_a, b, h0)?;

    Ok(boundary_term(kernel, &p_b, b)? - boundary_term(kernel, &p_a, a)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_validation() {
        let kernel = Kernel::harmonic(10.0).unwrap();
        let opts = LevinOptions::default();
        let f = |_: f64| 1.0;

        for (a, b) in [
            (2.0, 2.0),   // degenerate
            (3.0, 1.0),   // reversed
            (0.0, 1.0),   // touches the Bessel singularity
            (-1.0, 1.0),  // crosses it
            (f64::NAN, 1.0),
            (1.0, f64::INFINITY),
        ] {
            assert!(
                matches!(
                    levintegrate(&kernel, f, a, b, &opts),
                    Err(LevinError::InvalidBounds { .. })
                ),
                "bounds ({}, {}) accepted",
                a,
                b
            );
            assert!(
                matches!(
                    LevinOde::new(&kernel, &f, a, b),
                    Err(LevinError::InvalidBounds { .. })
                ),
                "bridge accepted bounds ({}, {})",
                a,
                b
            );
        }
    }

    #[test]
    fn test_rhs_matches_hand_expansion() {
        let kernel = Kernel::harmonic(4.0).unwrap();
        let f = |x: f64| x * x;
        let system = LevinOde::new(&kernel, &f, 1.0, 2.0).unwrap();

        let x = 1.5;
        let p = [0.25, -0.75];
        let mut dpdx = [0.0; BASIS_DIM];
        system.rhs(x, &p, &mut dpdx);

        // A = Dᵀ = [[0, 4], [−4, 0]] for ω = 4.
        assert!((dpdx[0] - (-4.0 * p[1] + x * x)).abs() < 1e-15);
        assert!((dpdx[1] - 4.0 * p[0]).abs() < 1e-15);
    }

    #[test]
    fn test_rhs_clamps_out_of_interval_points() {
        // An external solver may overshoot an endpoint while probing; the
        // bridge must answer with the nearest in-interval value, never
        // panic on the x ≤ 0 kernel singularity.
        let kernel = Kernel::bessel_j(2.0, 5.0).unwrap();
        let f = |x: f64| x;
        let system = LevinOde::new(&kernel, &f, 1.0, 2.0).unwrap();

        let p = [0.1, -0.2];
        let mut below = [0.0; BASIS_DIM];
        let mut at_a = [0.0; BASIS_DIM];
        let mut beyond = [0.0; BASIS_DIM];
        let mut at_b = [0.0; BASIS_DIM];
        system.rhs(-0.5, &p, &mut below);
        system.rhs(1.0, &p, &mut at_a);
        system.rhs(2.3, &p, &mut beyond);
        system.rhs(2.0, &p, &mut at_b);

        assert_eq!(below, at_a);
        assert_eq!(beyond, at_b);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let kernel = Kernel::harmonic(30.0).unwrap();
        let opts = LevinOptions::default();
        let f = |x: f64| (0.3 * x).cos();

        let first = levintegrate(&kernel, f, 1.0, 4.0, &opts).unwrap();
        let second = levintegrate(&kernel, f, 1.0, 4.0, &opts).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_default_options() {
        let opts = LevinOptions::default();
        assert_eq!(opts.atol, 1e-8);
        assert_eq!(opts.rtol, 1e-8);
        assert!(opts.h0.is_none());
        assert_eq!(opts.max_steps, 1_000_000);
    }
}
