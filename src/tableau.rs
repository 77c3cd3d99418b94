//! Butcher tableau for the Runge-Kutta-Fehlberg 7(8) pair.
//!
//! The 13-stage embedded pair of Fehlberg (NASA TR R-287, 1968, Table X):
//! an 8th-order solution advanced with a 7th-order embedded estimate for
//! step-size control. High order pays off here because the Levin
//! right-hand side is smooth and cheap to evaluate.

/// Number of stages.
pub const STAGES: usize = 13;

/// Order of the advancing solution.
pub const ORDER: u8 = 8;

/// Order of the embedded error estimate.
pub const EMBEDDED_ORDER: u8 = 7;

/// Nodes c_i: stage i evaluates the RHS at t_n + c_i·h.
pub const C: [f64; STAGES] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    0.5,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0, // stages 11 and 12 feed the 7th-order estimate only
    1.0,
];

/// Stage matrix a_ij (lower triangular):
/// k_i = f(t_n + c_i·h, y_n + h·Σ_{j<i} a_ij·k_j).
#[rustfmt::skip]
pub const A: [[f64; 12]; 13] = [
    [0.0; 12],
    [2.0/27.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0/36.0, 1.0/12.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0/24.0, 0.0, 1.0/8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [5.0/12.0, 0.0, -25.0/16.0, 25.0/16.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0/20.0, 0.0, 0.0, 1.0/4.0, 1.0/5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [-25.0/108.0, 0.0, 0.0, 125.0/108.0, -65.0/27.0, 125.0/54.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [31.0/300.0, 0.0, 0.0, 0.0, 61.0/225.0, -2.0/9.0, 13.0/900.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [2.0, 0.0, 0.0, -53.0/6.0, 704.0/45.0, -107.0/9.0, 67.0/90.0, 3.0, 0.0, 0.0, 0.0, 0.0],
    [-91.0/108.0, 0.0, 0.0, 23.0/108.0, -976.0/135.0, 311.0/54.0, -19.0/60.0, 17.0/6.0, -1.0/12.0, 0.0, 0.0, 0.0],
    [2383.0/4100.0, 0.0, 0.0, -341.0/164.0, 4496.0/1025.0, -301.0/82.0, 2133.0/4100.0, 45.0/82.0, 45.0/164.0, 18.0/41.0, 0.0, 0.0],
    [3.0/205.0, 0.0, 0.0, 0.0, 0.0, -6.0/41.0, -3.0/205.0, -3.0/41.0, 3.0/41.0, 6.0/41.0, 0.0, 0.0],
    [-1777.0/4100.0, 0.0, 0.0, -341.0/164.0, 4496.0/1025.0, -289.0/82.0, 2193.0/4100.0, 51.0/82.0, 33.0/164.0, 12.0/41.0, 0.0, 1.0],
];

/// 8th-order weights b_i (stages 0-10; 11 and 12 are error-only).
#[rustfmt::skip]
pub const B: [f64; STAGES] = [
    41.0/840.0, 0.0, 0.0, 0.0, 0.0,
    34.0/105.0, 9.0/35.0, 9.0/35.0, 9.0/280.0, 9.0/280.0,
    41.0/840.0, 0.0, 0.0,
];

/// 7th-order embedded weights b̂_i.
#[rustfmt::skip]
pub const B_HAT: [f64; STAGES] = [
    0.0, 0.0, 0.0, 0.0, 0.0,
    34.0/105.0, 9.0/35.0, 9.0/35.0, 9.0/280.0, 9.0/280.0,
    0.0, 41.0/840.0, 41.0/840.0,
];

/// Error weights b_i − b̂_i; the local truncation estimate is
/// err ≈ h·Σ (b_i − b̂_i)·k_i = (41/840)·h·(k₀ + k₁₀ − k₁₁ − k₁₂).
#[rustfmt::skip]
pub const B_ERR: [f64; STAGES] = [
    41.0/840.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0,
    41.0/840.0, -41.0/840.0, -41.0/840.0,
];

#[cfg(test)]
mod tests {
    use super::*;

    // ~13-term f64 sums accumulate O(n·eps) roundoff.
    const TOL: f64 = 1e-14;

    #[test]
    fn test_row_sums_match_nodes() {
        for i in 0..STAGES {
            let row_sum: f64 = A[i].iter().sum();
            assert!(
                (row_sum - C[i]).abs() < TOL,
                "row {} sums to {}, node is {}",
                i,
                row_sum,
                C[i]
            );
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let b: f64 = B.iter().sum();
        let b_hat: f64 = B_HAT.iter().sum();
        assert!((b - 1.0).abs() < TOL, "B sums to {}", b);
        assert!((b_hat - 1.0).abs() < TOL, "B_HAT sums to {}", b_hat);
    }

    #[test]
    fn test_error_weights_are_consistent() {
        let sum: f64 = B_ERR.iter().sum();
        assert!(sum.abs() < TOL);
        for i in 0..STAGES {
            assert!((B_ERR[i] - (B[i] - B_HAT[i])).abs() < TOL, "stage {}", i);
        }
    }

    #[test]
    fn test_orders() {
        assert_eq!(ORDER, 8);
        assert_eq!(EMBEDDED_ORDER, 7);
    }
}
