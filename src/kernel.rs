//! Oscillatory kernel descriptors.
//!
//! A kernel is the rapidly varying factor w(x) of the integrand. Each family
//! exposes the two quantities the Levin construction needs: the basis
//! B(x) = (w(x), companion) evaluated at a point, and the matrix D(x) with
//! B′(x) = D(x)·B(x) that encodes the family's derivative recurrence.
//!
//! The set of families is closed: every consumer matches exhaustively, so a
//! new family is a compile-visible change, not a runtime surprise.

use crate::bessel::{bessel_j_pair, spherical_j_pair};
use crate::error::{LevinError, LevinResult};

/// Dimension of the oscillatory basis, shared by all kernel families.
pub const BASIS_DIM: usize = 2;

/// An oscillatory kernel descriptor.
///
/// Built once through a validating constructor, then read-only for the
/// duration of an integration call. Parameter invariants (ν ≥ 0, r > 0,
/// ω ≠ 0) are enforced at construction, so a `Kernel` in hand is always
/// usable.
///
/// # Families
///
/// * [`Kernel::harmonic`] — w(x) = cos ωx, basis (cos ωx, sin ωx)
/// * [`Kernel::bessel_j`] — w(x) = J_ν(rx), basis (J_ν(rx), J_{ν+1}(rx))
/// * [`Kernel::spherical_bessel`] — w(x) = j_ν(rx), basis (j_ν(rx), j_{ν+1}(rx))
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    family: Family,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Family {
    Harmonic { omega: f64 },
    BesselJ { nu: f64, r: f64 },
    SphericalBessel { nu: f64, r: f64 },
}

impl Kernel {
    /// Harmonic kernel w(x) = cos ωx.
    ///
    /// ω must be finite and non-zero; ω = 0 degenerates to ordinary
    /// non-oscillatory quadrature, which this crate does not do.
    /// ∫ f sin ωx dx is the second basis component and can be obtained by
    /// the boundary algebra directly if needed; the forcing convention here
    /// pairs f with the cosine.
    pub fn harmonic(omega: f64) -> LevinResult<Self> {
        if !omega.is_finite() || omega == 0.0 {
            return Err(LevinError::InvalidKernel {
                message: format!("harmonic frequency must be finite and non-zero, got {}", omega),
            });
        }
        Ok(Self {
            family: Family::Harmonic { omega },
        })
    }

    /// Bessel kernel w(x) = J_ν(rx), with real order ν ≥ 0 and scale r > 0.
    pub fn bessel_j(nu: f64, r: f64) -> LevinResult<Self> {
        validate_bessel_params(nu, r)?;
        Ok(Self {
            family: Family::BesselJ { nu, r },
        })
    }

    /// Spherical Bessel kernel w(x) = j_ν(rx), with ν ≥ 0 and r > 0.
    pub fn spherical_bessel(nu: f64, r: f64) -> LevinResult<Self> {
        validate_bessel_params(nu, r)?;
        Ok(Self {
            family: Family::SphericalBessel { nu, r },
        })
    }

    /// The oscillatory basis B(x) at a point.
    ///
    /// The first component is the kernel w(x) itself; the second is the
    /// companion function closing the derivative recurrence. Bessel-family
    /// kernels are singular at x ≤ 0 and fail with
    /// [`LevinError::SingularPoint`] there.
    pub fn basis(&self, x: f64) -> LevinResult<[f64; BASIS_DIM]> {
        match self.family {
            Family::Harmonic { omega } => Ok([(omega * x).cos(), (omega * x).sin()]),
            Family::BesselJ { nu, r } => {
                self.check_domain(x)?;
                let (j, j_up) = bessel_j_pair(nu, r * x)?;
                Ok([j, j_up])
            }
            Family::SphericalBessel { nu, r } => {
                self.check_domain(x)?;
                let (j, j_up) = spherical_j_pair(nu, r * x)?;
                Ok([j, j_up])
            }
        }
    }

    /// The matrix D(x) relating the basis to its derivative, B′ = D·B.
    ///
    /// Encodes, per family:
    /// * harmonic: (cos ωx)′ = −ω sin ωx, (sin ωx)′ = ω cos ωx
    /// * Bessel: J′_ν(z) = (ν/z) J_ν(z) − J_{ν+1}(z), scaled by r
    /// * spherical Bessel: j′_ν(z) = (ν/z) j_ν(z) − j_{ν+1}(z), scaled by r
    ///
    /// Entries are rational in x (no Bessel evaluations), which is what
    /// makes the Levin right-hand side cheap.
    pub fn derivative_matrix(&self, x: f64) -> LevinResult<[[f64; BASIS_DIM]; BASIS_DIM]> {
        match self.family {
            Family::Harmonic { omega } => Ok([[0.0, -omega], [omega, 0.0]]),
            Family::BesselJ { nu, r } => {
                self.check_domain(x)?;
                Ok([[nu / x, -r], [r, -(nu + 1.0) / x]])
            }
            Family::SphericalBessel { nu, r } => {
                self.check_domain(x)?;
                Ok([[nu / x, -r], [r, -(nu + 2.0) / x]])
            }
        }
    }

    /// Recurrence coefficients divide by x for the Bessel families.
    fn check_domain(&self, x: f64) -> LevinResult<()> {
        if !(x > 0.0) {
            return Err(LevinError::SingularPoint { x });
        }
        Ok(())
    }
}

fn validate_bessel_params(nu: f64, r: f64) -> LevinResult<()> {
    if !nu.is_finite() || nu < 0.0 {
        return Err(LevinError::InvalidKernel {
            message: format!("Bessel order must be finite and non-negative, got {}", nu),
        });
    }
    if !r.is_finite() || r <= 0.0 {
        return Err(LevinError::InvalidKernel {
            message: format!("Bessel scale must be finite and positive, got {}", r),
        });
    }
    Ok(())
}
