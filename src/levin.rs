//! Levin auxiliary system: coefficient matrix and boundary evaluation.
//!
//! The Levin transform trades ∫ₐᵇ f(x) w(x) dx for an auxiliary function
//! u(x) = p(x)·B(x) with u′(x) = f(x) w(x). Writing the basis derivative as
//! B′(x) = D(x)·B(x) gives
//!
//! ```text
//! u′ = p′·B + p·(D·B) = (p′ + Dᵀ·p)·B
//! ```
//!
//! so requiring p′ = −A(x)·p + f(x)·e₁ with A = Dᵀ makes u′ = f·B₁ = f·w
//! exactly. The integral is then u(b) − u(a), and any solution branch of the
//! ODE gives the same answer: homogeneous components keep p·B constant.
//!
//! Both operations here are pure in (kernel, x) and hold no state; nothing
//! is cached across evaluations.

use crate::error::LevinResult;
use crate::kernel::{Kernel, BASIS_DIM};

/// Coefficient matrix A(x) = D(x)ᵀ of the auxiliary ODE p′ = −A·p + f·e₁.
///
/// Does not evaluate f; the integrand is injected by the ODE bridge, so
/// the builder stays agnostic of it. Entries are rational in x and no
/// Bessel function is ever evaluated on this path.
pub fn system_matrix(kernel: &Kernel, x: f64) -> LevinResult<[[f64; BASIS_DIM]; BASIS_DIM]> {
    let d = kernel.derivative_matrix(x)?;
    Ok([[d[0][0], d[1][0]], [d[0][1], d[1][1]]])
}

/// Boundary term u(x) = p·B(x).
///
/// The integral is the difference of the two endpoint terms,
/// `boundary_term(p_b, b) − boundary_term(p_a, a)`.
pub fn boundary_term(kernel: &Kernel, p: &[f64; BASIS_DIM], x: f64) -> LevinResult<f64> {
    let basis = kernel.basis(x)?;
    Ok(p[0] * basis[0] + p[1] * basis[1])
}

/// Leading-order slowly varying solution branch at a point:
/// p with A(x)·p = f(x)·e₁.
///
/// Starting the auxiliary solve here instead of at zero leaves only an
/// O(f′/ω²) rotating component for the solver to resolve, rather than the
/// O(f/ω) component a zero start excites. That rotating component is what
/// the global quadrature error accumulates on, so the start choice decides
/// whether the requested tolerance survives the solve. Any start is valid
/// (homogeneous components keep p·B constant); only the cost and accuracy
/// of the solve change.
///
/// Near a kernel turning point A(x) is singular and the slowly varying
/// branch does not exist; falls back to zero there.
pub fn particular_start(kernel: &Kernel, f_x: f64, x: f64) -> LevinResult<[f64; BASIS_DIM]> {
    if !f_x.is_finite() {
        return Ok([0.0; BASIS_DIM]);
    }
    let a = system_matrix(kernel, x)?;
    let det = a[0][0] * a[1][1] - a[0][1] * a[1][0];
    let magnitude = a
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, &v| acc.max(v.abs()));
    if det.abs() <= 1e-10 * magnitude * magnitude {
        return Ok([0.0; BASIS_DIM]);
    }
    Ok([a[1][1] * f_x / det, -a[1][0] * f_x / det])
}
