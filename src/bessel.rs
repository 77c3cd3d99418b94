//! Real-order Bessel functions of the first and second kind.
//!
//! Steed's method: the continued fraction CF1 gives J′_ν/J_ν, downward
//! recurrence carries the (unnormalised) pair to an order μ ∈ [−1/2, 1/2],
//! and the normalisation comes from Temme's series (x < 2) or the complex
//! continued fraction CF2 (x ≥ 2) together with the Wronskian
//! J_ν(x) Y′_ν(x) − J′_ν(x) Y_ν(x) = 2/(πx).
//!
//! Only the boundary evaluation of the kernel basis uses these routines;
//! the Levin right-hand side involves no Bessel values at all, so each
//! integration performs a handful of calls regardless of tolerance.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::{LevinError, LevinResult};

const EPS: f64 = 1.0e-16;
const FPMIN: f64 = 1.0e-30;
const MAX_ITER: usize = 10_000;

/// Argument below which Temme's series replaces CF2.
const XMIN: f64 = 2.0;

/// J_ν, Y_ν and their derivatives at a single point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BesselJy {
    /// J_ν(x)
    pub j: f64,
    /// J′_ν(x)
    pub jp: f64,
    /// Y_ν(x)
    pub y: f64,
    /// Y′_ν(x)
    pub yp: f64,
}

/// Chebyshev coefficients for Temme's Γ-ratio functions on |μ| ≤ 1/2.
const TEMME_C1: [f64; 7] = [
    -1.142022680371168e0,
    6.5165112670737e-3,
    3.087090173086e-4,
    -3.4706269649e-6,
    6.9437664e-9,
    3.67795e-11,
    -1.356e-13,
];

const TEMME_C2: [f64; 8] = [
    1.843740587300905e0,
    -7.68528408447867e-2,
    1.2719271366546e-3,
    -4.9717367042e-6,
    -3.31261198e-8,
    2.423096e-10,
    -1.702e-13,
    -1.49e-15,
];

/// Clenshaw evaluation of a Chebyshev series on [-1, 1].
fn chebev(c: &[f64], x: f64) -> f64 {
    let mut d = 0.0;
    let mut dd = 0.0;
    let x2 = 2.0 * x;
    for &cj in c.iter().skip(1).rev() {
        let sv = d;
        d = x2 * d - dd + cj;
        dd = sv;
    }
    x * d - dd + 0.5 * c[0]
}

/// Temme's Γ-ratio functions:
/// Γ₁(μ) = [1/Γ(1−μ) − 1/Γ(1+μ)]/(2μ), Γ₂(μ) = [1/Γ(1−μ) + 1/Γ(1+μ)]/2,
/// plus 1/Γ(1+μ) and 1/Γ(1−μ). Valid for |μ| ≤ 1/2.
fn temme_gammas(xmu: f64) -> (f64, f64, f64, f64) {
    let xx = 8.0 * xmu * xmu - 1.0;
    let gam1 = chebev(&TEMME_C1, xx);
    let gam2 = chebev(&TEMME_C2, xx);
    let gampl = gam2 - xmu * gam1;
    let gammi = gam2 + xmu * gam1;
    (gam1, gam2, gampl, gammi)
}

fn non_convergence(stage: &str, nu: f64, x: f64) -> LevinError {
    LevinError::Numerical {
        message: format!("Bessel {} did not converge for nu = {}, x = {}", stage, nu, x),
    }
}

/// Compute J_ν(x), Y_ν(x) and derivatives for real ν ≥ 0, x > 0.
pub(crate) fn bessel_jy(nu: f64, x: f64) -> LevinResult<BesselJy> {
    if !(x > 0.0) {
        return Err(LevinError::SingularPoint { x });
    }
    if !nu.is_finite() || nu < 0.0 {
        return Err(LevinError::Numerical {
            message: format!("Bessel order must be finite and non-negative, got {}", nu),
        });
    }

    // Number of downward recurrences so the terminal order μ = ν − nl
    // lies in [−1/2, 1/2] (x < XMIN) or keeps CF1 fast (x ≥ XMIN).
    let nl: i32 = if x < XMIN {
        (nu + 0.5) as i32
    } else {
        ((nu - x + 1.5) as i32).max(0)
    };
    let xmu = nu - nl as f64;
    let xmu2 = xmu * xmu;
    let xi = 1.0 / x;
    let xi2 = 2.0 * xi;
    // Wronskian value 2/(πx), used for the normalisation below.
    let w = xi2 / PI;

    // CF1: J′_ν/J_ν by the modified Lentz method. `isign` tracks sign
    // flips of the denominator, i.e. the sign of J_ν.
    let mut isign = 1.0_f64;
    let mut h = (nu * xi).max(FPMIN);
    let mut b = xi2 * nu;
    let mut d = 0.0;
    let mut c = h;
    let mut converged = false;
    for _ in 0..MAX_ITER {
        b += xi2;
        d = b - d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b - 1.0 / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = c * d;
        h *= del;
        if d < 0.0 {
            isign = -isign;
        }
        if (del - 1.0).abs() < EPS {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(non_convergence("CF1", nu, x));
    }

    // Downward recurrence from ν to μ on an unnormalised J.
    let mut rjl = isign * FPMIN;
    let mut rjpl = h * rjl;
    let rjl1 = rjl;
    let rjp1 = rjpl;
    let mut fact = nu * xi;
    for _ in 0..nl {
        let rjtemp = fact * rjl + rjpl;
        fact -= xi;
        rjpl = fact * rjtemp - rjl;
        rjl = rjtemp;
    }
    if rjl == 0.0 {
        rjl = EPS;
    }
    // f = J′_μ/J_μ
    let f = rjpl / rjl;

    let rjmu;
    let mut rymu;
    let mut ry1;
    let rymup;
    if x < XMIN {
        // Temme's series for Y_μ and Y_{μ+1}.
        let x2 = 0.5 * x;
        let pimu = PI * xmu;
        let fact = if pimu.abs() < EPS { 1.0 } else { pimu / pimu.sin() };
        let log_term = -x2.ln();
        let e = xmu * log_term;
        let fact2 = if e.abs() < EPS { 1.0 } else { e.sinh() / e };
        let (gam1, gam2, gampl, gammi) = temme_gammas(xmu);
        let mut ff = 2.0 / PI * fact * (gam1 * e.cosh() + gam2 * fact2 * log_term);
        let e = e.exp();
        let mut p = e / (gampl * PI);
        let mut q = 1.0 / (e * PI * gammi);
        let pimu2 = 0.5 * pimu;
        let fact3 = if pimu2.abs() < EPS {
            1.0
        } else {
            pimu2.sin() / pimu2
        };
        let r = PI * pimu2 * fact3 * fact3;
        let mut cc = 1.0;
        let dd = -x2 * x2;
        let mut sum = ff + r * q;
        let mut sum1 = p;
        let mut converged = false;
        for i in 1..=MAX_ITER {
            let fi = i as f64;
            ff = (fi * ff + p + q) / (fi * fi - xmu2);
            cc *= dd / fi;
            p /= fi - xmu;
            q /= fi + xmu;
            let del = cc * (ff + r * q);
            sum += del;
            let del1 = cc * p - fi * del;
            sum1 += del1;
            if del.abs() < (1.0 + sum.abs()) * EPS {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(non_convergence("series", nu, x));
        }
        rymu = -sum;
        ry1 = -sum1 * xi2;
        rymup = xmu * xi * rymu - ry1;
        rjmu = w / (rymup - f * rymu);
    } else {
        // CF2 for p + iq = (J′_μ + iY′_μ)/(J_μ + iY_μ), complex Lentz.
        let mut a = 0.25 - xmu2;
        let mut p = -0.5 * xi;
        let mut q = 1.0;
        let br = 2.0 * x;
        let mut bi = 2.0;
        let mut fact = a * xi / (p * p + q * q);
        let mut cr = br + q * fact;
        let mut ci = bi + p * fact;
        let mut den = br * br + bi * bi;
        let mut dr = br / den;
        let mut di = -bi / den;
        let dlr = cr * dr - ci * di;
        let dli = cr * di + ci * dr;
        let temp = p * dlr - q * dli;
        q = p * dli + q * dlr;
        p = temp;
        let mut converged = false;
        for i in 2..=MAX_ITER {
            a += 2.0 * (i as f64 - 1.0);
            bi += 2.0;
            dr = a * dr + br;
            di = a * di + bi;
            if dr.abs() + di.abs() < FPMIN {
                dr = FPMIN;
            }
            fact = a / (cr * cr + ci * ci);
            cr = br + cr * fact;
            ci = bi - ci * fact;
            if cr.abs() + ci.abs() < FPMIN {
                cr = FPMIN;
            }
            den = dr * dr + di * di;
            dr /= den;
            di = -di / den;
            let dlr = cr * dr - ci * di;
            let dli = cr * di + ci * dr;
            let temp = p * dlr - q * dli;
            q = p * dli + q * dlr;
            p = temp;
            if (dlr - 1.0).abs() + dli.abs() < EPS {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(non_convergence("CF2", nu, x));
        }
        let gam = (p - f) / q;
        let mut jmu = (w / ((p - f) * gam + q)).sqrt();
        // Fix the sign from CF1's denominator tracking.
        jmu = jmu.copysign(rjl);
        rjmu = jmu;
        rymu = rjmu * gam;
        rymup = rymu * (p + q / gam);
        ry1 = xmu * xi * rymu - rymup;
    }

    // Rescale the recurred J pair by the exact J_μ.
    let fact = rjmu / rjl;
    let rj = rjl1 * fact;
    let rjp = rjp1 * fact;

    // Upward recurrence carries Y from μ back to ν (stable direction).
    for i in 1..=nl {
        let rytemp = (xmu + i as f64) * xi2 * ry1 - rymu;
        rymu = ry1;
        ry1 = rytemp;
    }
    let ry = rymu;
    let ryp = nu * xi * rymu - ry1;

    Ok(BesselJy {
        j: rj,
        jp: rjp,
        y: ry,
        yp: ryp,
    })
}

/// (J_ν(x), J_{ν+1}(x)), via J_{ν+1} = (ν/x) J_ν − J′_ν.
pub(crate) fn bessel_j_pair(nu: f64, x: f64) -> LevinResult<(f64, f64)> {
    let b = bessel_jy(nu, x)?;
    Ok((b.j, nu / x * b.j - b.jp))
}

/// (j_ν(x), j_{ν+1}(x)), spherical: j_ν(x) = √(π/2x) J_{ν+1/2}(x).
pub(crate) fn spherical_j_pair(nu: f64, x: f64) -> LevinResult<(f64, f64)> {
    let (ja, jb) = bessel_j_pair(nu + 0.5, x)?;
    let scale = (FRAC_PI_2 / x).sqrt();
    Ok((scale * ja, scale * jb))
}
