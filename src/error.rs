//! Error types for Levin-method integration.
//!
//! The taxonomy separates caller mistakes (bounds, kernel parameters) from
//! run-time numerical failures (special-function convergence, the ODE solve).
//! Nothing is retried internally and no partial result is ever returned as
//! success.

use std::fmt;

use crate::solver::IntegrationError;

/// Result alias used throughout the crate.
pub type LevinResult<T> = Result<T, LevinError>;

/// Errors surfaced by the integration entry points and kernel constructors.
#[derive(Debug, Clone)]
pub enum LevinError {
    /// Integration bounds must satisfy 0 < a < b and be finite.
    ///
    /// A degenerate interval (a = b) is rejected rather than mapped to zero:
    /// in this API it signals a caller bug, not a legitimate request.
    InvalidBounds {
        /// Lower bound as supplied by the caller.
        a: f64,
        /// Upper bound as supplied by the caller.
        b: f64,
    },

    /// Kernel parameters rejected at descriptor construction time
    /// (e.g. negative Bessel order, zero harmonic frequency).
    InvalidKernel {
        /// Description of the offending parameter.
        message: String,
    },

    /// A Bessel-family kernel was evaluated at a singular point (x ≤ 0).
    ///
    /// Bounds validation prevents this during a normal solve; it is still
    /// detected here so a misuse fails loudly instead of producing NaN.
    SingularPoint {
        /// The offending evaluation point.
        x: f64,
    },

    /// A special-function evaluation failed to converge.
    Numerical {
        /// Description of the failure, including the evaluation point.
        message: String,
    },

    /// The ODE solver could not complete the auxiliary solve.
    ///
    /// Carries the solver's own diagnostic. The caller may retry with
    /// relaxed tolerances or a different solver; this crate does not.
    Solver(IntegrationError),
}

impl fmt::Display for LevinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevinError::InvalidBounds { a, b } => {
                write!(f, "invalid bounds [{}, {}]: need 0 < a < b", a, b)
            }
            LevinError::InvalidKernel { message } => {
                write!(f, "invalid kernel: {}", message)
            }
            LevinError::SingularPoint { x } => {
                write!(f, "kernel evaluated at singular point x = {}", x)
            }
            LevinError::Numerical { message } => {
                write!(f, "numerical failure: {}", message)
            }
            LevinError::Solver(err) => {
                write!(f, "auxiliary ODE solve failed: {}", err)
            }
        }
    }
}

impl std::error::Error for LevinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevinError::Solver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IntegrationError> for LevinError {
    fn from(err: IntegrationError) -> Self {
        LevinError::Solver(err)
    }
}
