//! Adaptive Runge-Kutta-Fehlberg 7(8) initial value solver.
//!
//! This is the default implementation of the [`IvpSolver`] capability
//! consumed by the integration entry point: "given a right-hand side, an
//! initial state, an interval and tolerances, produce the state at the far
//! endpoint". Any conforming solver can be substituted through
//! [`levintegrate_with`](crate::levintegrate_with); the Levin construction
//! never looks inside the stepping.
//!
//! A high-order explicit pair is the right default for this crate: the
//! auxiliary right-hand side is smooth and cheap (rational coefficients, one
//! integrand call), so the large-step regime where 8th order wins is exactly
//! where the solver spends its time.
//!
//! Reference: NASA TR R-287, Erwin Fehlberg, 1968.

use crate::tableau::{A, B, B_ERR, C, STAGES};

/// System of ordinary differential equations dy/dt = f(t, y).
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side into `dydt`.
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Initial value solver capability.
///
/// Implementors advance `sys` from `(t0, y0)` to `tf` under their own error
/// control and return the final time and state. `h0` is the initial step
/// size guess; adaptive solvers are free to reject and rescale it.
pub trait IvpSolver<const N: usize> {
    /// Integrate `sys` over `[t0, tf]` starting from `y0`.
    fn solve<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(f64, [f64; N]), IntegrationError>;
}

/// Result of a single trial step.
#[derive(Debug, Clone)]
pub struct StepResult<const N: usize> {
    /// New state (8th-order solution).
    pub y: [f64; N],
    /// New time value.
    pub t: f64,
    /// Normalized error estimate (≤ 1.0 means accepted).
    pub error: f64,
    /// Suggested step size for the next step.
    pub h_next: f64,
    /// Whether the step was accepted.
    pub accepted: bool,
}

/// Integration statistics.
///
/// `accepted_steps` is the quantity the Levin method is judged on: for an
/// oscillatory integral it must grow far slower than the oscillation count.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Total number of RHS evaluations.
    pub fn_evals: u64,
    /// Number of accepted steps.
    pub accepted_steps: u64,
    /// Number of rejected steps.
    pub rejected_steps: u64,
}

/// I-controller for the step size: h_new = safety · h · error^(−1/(p+1)).
#[derive(Clone)]
pub struct StepController {
    /// Safety factor (0.8-0.9 typical).
    pub safety: f64,
    /// Maximum growth factor per step.
    pub max_factor: f64,
    /// Minimum reduction factor per step.
    pub min_factor: f64,
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / 8.0,
        }
    }
}

impl StepController {
    /// Step size adjustment factor for a normalized error estimate.
    pub fn compute_factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }
}

/// Tolerance specification. The error norm is
/// max_i |y8_i − y7_i| / (atol_i + rtol_i·|y8_i|).
#[derive(Debug, Clone)]
pub struct Tolerances<const N: usize> {
    /// Absolute tolerance per component.
    pub atol: [f64; N],
    /// Relative tolerance per component.
    pub rtol: [f64; N],
}

impl<const N: usize> Tolerances<N> {
    /// Uniform tolerances across components.
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self {
            atol: [atol; N],
            rtol: [rtol; N],
        }
    }

    /// Per-component tolerances.
    pub fn with_components(atol: [f64; N], rtol: [f64; N]) -> Self {
        Self { atol, rtol }
    }
}

/// Runge-Kutta-Fehlberg 7(8) integrator.
///
/// # Type Parameters
/// * `N` - State dimension (2 for every Levin auxiliary system)
///
/// # Example
/// ```
/// use levin_ode::{OdeSystem, Rkf78, Tolerances};
///
/// // y' = -y, exact solution e^{-t}
/// struct Decay;
/// impl OdeSystem<1> for Decay {
///     fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
///         dydt[0] = -y[0];
///     }
/// }
///
/// let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));
/// let (_, y) = solver.integrate(&Decay, 0.0, &[1.0], 2.0, 0.1).unwrap();
/// assert!((y[0] - (-2.0f64).exp()).abs() < 1e-10);
/// ```
#[derive(Clone)]
pub struct Rkf78<const N: usize> {
    tol: Tolerances<N>,
    controller: StepController,
    /// Minimum step size.
    pub h_min: f64,
    /// Maximum step size.
    pub h_max: f64,
    /// Maximum number of integration steps before giving up.
    pub max_steps: u64,
    /// Stage evaluations (pre-allocated workspace).
    k: [[f64; N]; STAGES],
    /// Integration statistics.
    pub stats: Stats,
}

impl<const N: usize> Rkf78<N> {
    /// Create a solver with the given tolerances.
    pub fn new(tol: Tolerances<N>) -> Self {
        Self {
            tol,
            controller: StepController::default(),
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 10_000_000,
            k: [[0.0; N]; STAGES],
            stats: Stats::default(),
        }
    }

    /// Set minimum and maximum step sizes.
    pub fn set_step_limits(&mut self, h_min: f64, h_max: f64) {
        self.h_min = h_min;
        self.h_max = h_max;
    }

    /// Perform a single trial step: compute the 13 stages, form the
    /// 8th-order solution, estimate the error, decide acceptance.
    pub fn step<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> StepResult<N> {
        let h = h.signum() * h.abs().clamp(self.h_min, self.h_max);

        self.compute_stages(sys, t, y, h);
        let y8 = self.compute_solution(y, h);
        let error = self.compute_error(&y8, h);
        let accepted = error <= 1.0;

        let factor = self.controller.compute_factor(error);
        let h_next = (h.abs() * factor).clamp(self.h_min, self.h_max);

        self.stats.fn_evals += STAGES as u64;
        if accepted {
            self.stats.accepted_steps += 1;
        } else {
            self.stats.rejected_steps += 1;
        }

        StepResult {
            y: y8,
            t: t + h,
            error,
            h_next,
            accepted,
        }
    }

    /// Integrate from `t0` to `tf` with adaptive step control.
    ///
    /// Returns the final time and state, or an [`IntegrationError`] carrying
    /// the failure diagnostic. No retries are attempted.
    pub fn integrate<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(f64, [f64; N]), IntegrationError> {
        if t0 == tf {
            return Ok((t0, *y0));
        }
        self.validate_inputs(t0, y0, tf, h0)?;

        let mut t = t0;
        let mut y = *y0;
        let mut h = h0;

        let direction = (tf - t0).signum();
        let mut step_count = 0u64;

        while (tf - t) * direction > self.h_min {
            // Don't overshoot the endpoint.
            if (t + h - tf) * direction > 0.0 {
                h = tf - t;
            }

            let result = self.step(sys, t, &y, h);

            if result.accepted {
                t = result.t;
                y = result.y;
                if !y.iter().all(|v| v.is_finite()) {
                    return Err(IntegrationError::NonFiniteState { t });
                }
            }

            h = result.h_next * direction;

            step_count += 1;
            if step_count > self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded);
            }

            // A rejected step already at h_min cannot make progress.
            if !result.accepted && result.h_next <= self.h_min && (tf - t) * direction > self.h_min
            {
                return Err(IntegrationError::StepSizeTooSmall {
                    t,
                    h: result.h_next,
                });
            }
        }

        Ok((t, y))
    }

    #[allow(clippy::needless_range_loop)]
    fn compute_stages<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, y: &[f64; N], h: f64) {
        let mut y_temp = [0.0; N];

        sys.rhs(t, y, &mut self.k[0]);

        for i in 1..STAGES {
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += A[i][j] * self.k[j][n];
                }
                y_temp[n] = y[n] + h * sum;
            }
            sys.rhs(t + C[i] * h, &y_temp, &mut self.k[i]);
        }
    }

    #[allow(clippy::needless_range_loop)]
    fn compute_solution(&self, y: &[f64; N], h: f64) -> [f64; N] {
        let mut y_new = [0.0; N];
        for n in 0..N {
            let mut sum = 0.0;
            for i in 0..STAGES {
                sum += B[i] * self.k[i][n];
            }
            y_new[n] = y[n] + h * sum;
        }
        y_new
    }

    /// Infinity norm of the tolerance-scaled truncation error estimate.
    #[allow(clippy::needless_range_loop)]
    fn compute_error(&self, y8: &[f64; N], h: f64) -> f64 {
        let mut max_err: f64 = 0.0;
        for n in 0..N {
            let mut err_n = 0.0;
            for i in 0..STAGES {
                err_n += B_ERR[i] * self.k[i][n];
            }
            err_n *= h;

            let scale = self.tol.atol[n] + self.tol.rtol[n] * y8[n].abs();
            max_err = max_err.max(err_n.abs() / scale);
        }
        max_err
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    fn validate_inputs(
        &self,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(), IntegrationError> {
        if !t0.is_finite() || !tf.is_finite() || !h0.is_finite() {
            return Err(IntegrationError::InvalidInput {
                message: "t0, tf, and h0 must be finite".to_string(),
            });
        }
        if h0 == 0.0 {
            return Err(IntegrationError::InvalidInput {
                message: "h0 must be non-zero".to_string(),
            });
        }
        let direction = tf - t0;
        if direction != 0.0 && h0.signum() != direction.signum() {
            return Err(IntegrationError::InvalidInput {
                message: "h0 sign must match integration direction (tf - t0)".to_string(),
            });
        }
        for (i, &val) in y0.iter().enumerate() {
            if !val.is_finite() {
                return Err(IntegrationError::InvalidInput {
                    message: format!("y0[{}] is not finite", i),
                });
            }
        }
        for (i, (&a, &r)) in self.tol.atol.iter().zip(self.tol.rtol.iter()).enumerate() {
            if !a.is_finite() || a <= 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("atol[{}] must be positive and finite", i),
                });
            }
            if !r.is_finite() || r < 0.0 {
                return Err(IntegrationError::InvalidInput {
                    message: format!("rtol[{}] must be non-negative and finite", i),
                });
            }
        }
        Ok(())
    }
}

impl<const N: usize> IvpSolver<N> for Rkf78<N> {
    fn solve<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(f64, [f64; N]), IntegrationError> {
        self.integrate(sys, t0, y0, tf, h0)
    }
}

/// Errors from the ODE solve.
#[derive(Debug, Clone)]
pub enum IntegrationError {
    /// Step size fell to the floor while the error estimate still exceeded
    /// tolerance.
    StepSizeTooSmall {
        /// Time at which progress stalled.
        t: f64,
        /// Step size that was too small.
        h: f64,
    },
    /// Step budget exhausted before reaching the endpoint.
    MaxStepsExceeded,
    /// Invalid input parameters.
    InvalidInput {
        /// Description of the invalid input.
        message: String,
    },
    /// Non-finite state encountered during integration.
    NonFiniteState {
        /// Time at which the state became non-finite.
        t: f64,
    },
}

impl std::fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationError::StepSizeTooSmall { t, h } => {
                write!(f, "step size {} too small at t = {}", h, t)
            }
            IntegrationError::MaxStepsExceeded => {
                write!(f, "maximum number of integration steps exceeded")
            }
            IntegrationError::InvalidInput { message } => {
                write!(f, "invalid input: {}", message)
            }
            IntegrationError::NonFiniteState { t } => {
                write!(f, "non-finite state at t = {}", t)
            }
        }
    }
}

impl std::error::Error for IntegrationError {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rotating two-component system p' = −A·p with A = [[0, ω], [−ω, 0]],
    /// the homogeneous part of a harmonic Levin system.
    struct Rotation {
        omega: f64,
    }

    impl OdeSystem<2> for Rotation {
        fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
            dydt[0] = -self.omega * y[1];
            dydt[1] = self.omega * y[0];
        }
    }

    #[test]
    fn test_rotation_returns_after_one_period() {
        let sys = Rotation { omega: 1.0 };
        let y0 = [1.0, 0.0];
        let tf = 2.0 * std::f64::consts::PI;

        let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));
        let (t_final, y_final) = solver.integrate(&sys, 0.0, &y0, tf, 0.1).unwrap();

        assert!((t_final - tf).abs() < 1e-10);
        assert!((y_final[0] - 1.0).abs() < 1e-10, "y[0] = {}", y_final[0]);
        assert!(y_final[1].abs() < 1e-10, "y[1] = {}", y_final[1]);
        assert!(solver.stats.accepted_steps > 0);
    }

    #[test]
    fn test_exponential_decay_accuracy() {
        struct Decay;
        impl OdeSystem<1> for Decay {
            fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
                dydt[0] = -y[0];
            }
        }

        let tf = 5.0;
        let mut solver = Rkf78::new(Tolerances::new(1e-14, 1e-14));
        let (_, y_final) = solver.integrate(&Decay, 0.0, &[1.0], tf, 0.1).unwrap();

        let exact = (-tf).exp();
        let rel_error = (y_final[0] - exact).abs() / exact;
        assert!(rel_error < 1e-11, "relative error {}", rel_error);
    }

    #[test]
    fn test_order_of_convergence() {
        // Single-step refinement on y' = cos t, exact y = sin t. The local
        // truncation error is O(h^9), so err(h)/err(h/2) → 512; a broad
        // [100, 800] band absorbs higher-order terms.
        struct CosRhs;
        impl OdeSystem<1> for CosRhs {
            fn rhs(&self, t: f64, _y: &[f64; 1], dydt: &mut [f64; 1]) {
                dydt[0] = t.cos();
            }
        }

        // Loose tolerances so every step is accepted.
        let tol = Tolerances::new(1.0, 1.0);
        let step_sizes = [1.6, 0.8, 0.4, 0.2];
        let mut errors = Vec::new();

        for &h in &step_sizes {
            let mut solver = Rkf78::new(tol.clone());
            let result = solver.step(&CosRhs, 0.0, &[0.0], h);
            assert!(result.accepted);
            errors.push((result.y[0] - h.sin()).abs());
        }

        let mut checked = 0;
        for i in 0..errors.len() - 1 {
            if errors[i + 1] < 1e-15 {
                continue; // denominator at machine eps, ratio meaningless
            }
            let ratio = errors[i] / errors[i + 1];
            assert!(
                ratio > 100.0 && ratio < 800.0,
                "error ratio {:.1} outside [100, 800] for h = {}",
                ratio,
                step_sizes[i]
            );
            checked += 1;
        }
        assert!(checked >= 2, "need at least 2 valid error ratios");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        struct Still;
        impl OdeSystem<1> for Still {
            fn rhs(&self, _t: f64, _y: &[f64; 1], dydt: &mut [f64; 1]) {
                dydt[0] = 0.0;
            }
        }

        // NaN tolerance
        let mut solver = Rkf78::new(Tolerances::new(f64::NAN, 1e-12));
        assert!(matches!(
            solver.integrate(&Still, 0.0, &[1.0], 1.0, 0.1),
            Err(IntegrationError::InvalidInput { .. })
        ));

        // Negative tolerance
        let mut solver = Rkf78::new(Tolerances::new(-1e-12, 1e-12));
        assert!(matches!(
            solver.integrate(&Still, 0.0, &[1.0], 1.0, 0.1),
            Err(IntegrationError::InvalidInput { .. })
        ));

        // h0 against the integration direction
        let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));
        assert!(matches!(
            solver.integrate(&Still, 0.0, &[1.0], 1.0, -0.1),
            Err(IntegrationError::InvalidInput { .. })
        ));

        // Non-finite initial state
        let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));
        assert!(matches!(
            solver.integrate(&Still, 0.0, &[f64::NAN], 1.0, 0.1),
            Err(IntegrationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_zero_length_interval_is_identity() {
        struct Drift;
        impl OdeSystem<1> for Drift {
            fn rhs(&self, _t: f64, _y: &[f64; 1], dydt: &mut [f64; 1]) {
                dydt[0] = 1.0;
            }
        }
        let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));
        let (t, y) = solver.integrate(&Drift, 5.0, &[42.0], 5.0, 0.1).unwrap();
        assert_eq!(t, 5.0);
        assert_eq!(y[0], 42.0);
    }

    #[test]
    fn test_max_steps_exceeded() {
        let sys = Rotation { omega: 1.0 };
        let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));
        solver.max_steps = 5;
        assert!(matches!(
            solver.integrate(&sys, 0.0, &[1.0, 0.0], 100.0, 0.01),
            Err(IntegrationError::MaxStepsExceeded)
        ));
    }

    #[test]
    fn test_recovers_from_oversized_initial_step() {
        let sys = Rotation { omega: 1.0 };
        let tf = 2.0 * std::f64::consts::PI;
        let mut solver = Rkf78::new(Tolerances::new(1e-12, 1e-12));

        // h0 = 100 is absurd for this problem; the controller must reject
        // and shrink until accepted.
        let (t_final, y_final) = solver.integrate(&sys, 0.0, &[1.0, 0.0], tf, 100.0).unwrap();

        assert!((t_final - tf).abs() < 1e-10);
        assert!((y_final[0] - 1.0).abs() < 1e-9);
        assert!(solver.stats.rejected_steps > 0);
    }

    #[test]
    fn test_solver_trait_dispatch() {
        // The entry point consumes the solver through IvpSolver; make sure
        // the trait path gives the same answer as the inherent method.
        fn drive<S: IvpSolver<2>>(solver: &mut S) -> [f64; 2] {
            let sys = Rotation { omega: 2.0 };
            solver.solve(&sys, 0.0, &[1.0, 0.0], 1.0, 0.05).unwrap().1
        }

        let mut a = Rkf78::new(Tolerances::new(1e-12, 1e-12));
        let mut b = Rkf78::new(Tolerances::new(1e-12, 1e-12));
        let via_trait = drive(&mut a);
        let direct = b
            .integrate(&Rotation { omega: 2.0 }, 0.0, &[1.0, 0.0], 1.0, 0.05)
            .unwrap()
            .1;
        assert_eq!(via_trait, direct);
    }
}
