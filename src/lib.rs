//! # levin-ode: Oscillatory Quadrature via the Levin Transform
//!
//! Evaluates ∫ₐᵇ f(x)·w(x) dx where f is smooth and w oscillates rapidly
//! (harmonic, Bessel J_ν, or spherical Bessel j_ν kernels), without ever
//! resolving the oscillations with quadrature points.
//!
//! ## How it works
//!
//! The kernel and its companion function form a basis B(x) whose derivative
//! is a linear map, B′ = D·B. The method solves the small auxiliary system
//!
//! ```text
//! p′(x) = −D(x)ᵀ·p(x) + f(x)·e₁
//! ```
//!
//! so that (p·B)′ = f·w exactly, and reads off the integral as
//! p(b)·B(b) − p(a)·B(a). The right-hand side is rational in x, free of
//! oscillation and of Bessel evaluations, so an adaptive high-order solver
//! takes steps sized by the smoothness of f alone. Special functions are
//! evaluated exactly twice, at the endpoints.
//!
//! ## Features
//!
//! - Harmonic (cos ωx), Bessel J_ν(rx), and spherical Bessel j_ν(rx)
//!   kernels with real order ν ≥ 0
//! - Cost nearly independent of the oscillation frequency
//! - Built-in 13-stage RKF7(8) adaptive solver (NASA TR R-287); any solver
//!   implementing [`IvpSolver`] can be substituted
//! - Real-order Bessel evaluation by Steed's continued fractions and
//!   Temme's series
//! - Minimal dependencies (no external linear algebra required)
//!
//! ## Basic Usage
//!
//! ```rust
//! use levin_ode::{levintegrate, Kernel, LevinOptions};
//!
//! // ∫₁⁵ cos(50x) dx, 32 full oscillations over the interval
//! let kernel = Kernel::harmonic(50.0).unwrap();
//! let result = levintegrate(&kernel, |_| 1.0, 1.0, 5.0, &LevinOptions::default()).unwrap();
//!
//! let exact = (250.0f64.sin() - 50.0f64.sin()) / 50.0;
//! assert!((result - exact).abs() < 1e-7);
//! ```
//!
//! ## Bessel kernels
//!
//! ```rust
//! use levin_ode::{levintegrate, Kernel, LevinOptions};
//!
//! // ∫₁⁵ e^{−x²/16} J₀(100x) dx
//! let kernel = Kernel::bessel_j(0.0, 100.0).unwrap();
//! let opts = LevinOptions { atol: 1e-10, rtol: 1e-10, ..Default::default() };
//! let result = levintegrate(&kernel, |x| (-x * x / 16.0).exp(), 1.0, 5.0, &opts).unwrap();
//! assert!(result.is_finite());
//! ```
//!
//! ## Tolerance Selection
//!
//! The `atol`/`rtol` pair of [`LevinOptions`] is a target for the final
//! quadrature error. The interior ODE solve controls error per step, and
//! the quadrature error accumulates over all steps, so [`levintegrate`]
//! runs the solve several orders tighter than the request. `1e-8` (the
//! default) is a good general-purpose setting; tighten to `1e-12` for
//! reference values. [`levintegrate_with`] skips the margin and uses the
//! supplied solver's tolerances as given.
//!
//! ## References
//!
//! 1. Levin, D. (1996). "Fast integration of rapidly oscillatory
//!    functions". J. Comput. Appl. Math. 67.
//! 2. Fehlberg, E. (1968). "Classical Fifth-, Sixth-, Seventh-, and
//!    Eighth-Order Runge-Kutta Formulas with Stepsize Control".
//!    NASA TR R-287.
//! 3. Press, W.H. et al. (2007). "Numerical Recipes", 3rd ed., §6.5
//!    (Bessel functions of real order).

#![deny(missing_docs)]
#![deny(unsafe_code)]

mod bessel;
pub mod error;
pub mod integrate;
pub mod kernel;
pub mod levin;
pub mod solver;
pub mod tableau;

pub use error::{LevinError, LevinResult};
pub use integrate::{levintegrate, levintegrate_with, LevinOde, LevinOptions};
pub use kernel::{Kernel, BASIS_DIM};
pub use solver::{
    IntegrationError, IvpSolver, OdeSystem, Rkf78, Stats, StepController, StepResult, Tolerances,
};
