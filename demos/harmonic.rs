//! Basic usage — a rapidly oscillating cosine integral.
//!
//! Evaluates ∫₁⁵ e^{−x²/16} cos(ωx) dx for increasing ω and compares the
//! step counts: direct quadrature would need more points at every doubling,
//! the Levin path does not.
//!
//! Run with:
//!   cargo run --example harmonic

use levin_ode::{levintegrate_with, Kernel, Rkf78, Tolerances, BASIS_DIM};

fn main() {
    let f = |x: f64| (-x * x / 16.0).exp();
    let (a, b) = (1.0, 5.0);

    println!("∫₁⁵ e^(−x²/16) cos(ωx) dx");
    println!();
    println!("  {:>8} {:>22} {:>10} {:>10}", "ω", "value", "steps", "f evals");

    for omega in [10.0, 50.0, 100.0, 500.0, 1000.0] {
        let kernel = Kernel::harmonic(omega).unwrap();
        let mut solver = Rkf78::<BASIS_DIM>::new(Tolerances::new(1e-10, 1e-10));

        let value = levintegrate_with(&kernel, f, a, b, 0.4, &mut solver).unwrap();

        println!(
            "  {:>8} {:>22.15e} {:>10} {:>10}",
            omega, value, solver.stats.accepted_steps, solver.stats.fn_evals
        );
    }

    println!();
    println!("Oscillations over [1, 5] grow 100-fold down the table;");
    println!("solver steps do not.");
}
