//! Bessel-kernel integrals at high order and scale.
//!
//! Evaluates ∫₁⁵ e^{−x²/16} J_ν(rx) dx for a sweep of orders, including
//! ν = 100 where the kernel transitions from exponential decay to rapid
//! oscillation inside the interval.
//!
//! Run with:
//!   cargo run --example bessel_sweep

use levin_ode::{levintegrate, Kernel, LevinOptions};

fn main() {
    let f = |x: f64| (-x * x / 16.0).exp();
    let (a, b) = (1.0, 5.0);
    let r = 100.0;

    let opts = LevinOptions {
        atol: 1e-11,
        rtol: 1e-11,
        ..Default::default()
    };

    println!("∫₁⁵ e^(−x²/16) J_ν({r}x) dx");
    println!();
    println!("  {:>6} {:>24}", "ν", "value");

    for nu in [0.0, 0.5, 1.0, 10.0, 50.0, 100.0] {
        let kernel = Kernel::bessel_j(nu, r).unwrap();
        let value = levintegrate(&kernel, f, a, b, &opts).unwrap();
        println!("  {:>6} {:>24.15e}", nu, value);
    }

    println!();

    // Spherical variant for comparison.
    println!("∫₁⁵ e^(−x²/16) j_ν({r}x) dx");
    println!();
    println!("  {:>6} {:>24}", "ν", "value");

    for nu in [0.0, 1.0, 10.0] {
        let kernel = Kernel::spherical_bessel(nu, r).unwrap();
        let value = levintegrate(&kernel, f, a, b, &opts).unwrap();
        println!("  {:>6} {:>24.15e}", nu, value);
    }
}
