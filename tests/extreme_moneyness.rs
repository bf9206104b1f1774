//! Stress tests far out of the money.
//!
//! For each moneyness the volatilities are placed around the inflection
//! point `s_c = √(2|x|)` so that the prices land on all four solver
//! branches. Every round trip must finish within four iterations and leave
//! a residual of at most `ε·bₘₐₓ·(1 + |b/(s·b′)|)`, widened by the price
//! change across a few units in the last place of `s`.

use std::collections::HashSet;
use std::sync::Mutex;

use rationalvol::black::{
    SolverBranch, implied_volatility_attainable_accuracy, normalised_black,
    normalised_implied_black_volatility_with_diagnostics, normalised_vega, scaled_normalised_black,
};
use rationalvol::config::SolverSettings;
use rationalvol::constants::DBL_EPSILON;

const MONEYNESS: [f64; 4] = [-100.0, -300.0, -580.0, -700.0];

/// Offsets from `s_c`, one per branch: lowest, lower middle, upper middle, highest.
const OFFSETS: [f64; 4] = [-3.0, -0.5, 0.5, 4.0];

static KNOBS: Mutex<()> = Mutex::new(());

fn check_round_trips(max_iterations: u32) {
    for &x in &MONEYNESS {
        let s_c = (2.0 * x.abs()).sqrt();
        let mut branches = HashSet::new();

        for &offset in &OFFSETS {
            let s = s_c + offset;
            for theta in [1.0, -1.0] {
                let x = -theta * x.abs();
                let b_max = (0.5 * theta * x).exp();
                let beta = normalised_black(x, s, theta);
                assert!(beta > 0.0 && beta < b_max, "x = {x}, s = {s}");

                let outcome = normalised_implied_black_volatility_with_diagnostics(beta, x, theta);
                let s_out = outcome.normalised_volatility;
                assert!(
                    outcome.iterations <= 4 && outcome.iterations <= max_iterations,
                    "x = {x}, s = {s}: {} iterations",
                    outcome.iterations
                );

                let conditioning = (scaled_normalised_black(theta * x, s) / s).abs();
                // near s_c one ulp of s moves b by about 13ε·bₘₐₓ at |x| = 700
                let spacing = 16.0 * DBL_EPSILON * s * normalised_vega(x, s);
                let residual = (normalised_black(x, s_out, theta) - beta).abs();
                assert!(
                    residual <= DBL_EPSILON * b_max * (1.0 + conditioning) + spacing,
                    "x = {x}, s = {s}, s_out = {s_out}, residual = {residual:e}"
                );

                let accuracy = implied_volatility_attainable_accuracy(x, s, theta);
                assert!(
                    (s_out - s).abs() <= 16.0 * s * accuracy,
                    "x = {x}, s = {s}, s_out = {s_out}"
                );
                branches.insert(outcome.branch);
            }
        }

        for branch in [
            SolverBranch::Lowest,
            SolverBranch::LowerMiddle,
            SolverBranch::UpperMiddle,
            SolverBranch::Highest,
        ] {
            assert!(branches.contains(&branch), "x = {x}: {branch:?} not reached");
        }
    }
}

#[test]
fn default_budget() {
    let _guard = KNOBS.lock().unwrap_or_else(|e| e.into_inner());
    check_round_trips(SolverSettings::current().max_iterations);
}

#[test]
fn budget_of_four_with_bracketing() {
    let _guard = KNOBS.lock().unwrap_or_else(|e| e.into_inner());
    let previous = SolverSettings::current();
    SolverSettings::default().with_max_iterations(4).apply();

    check_round_trips(4);

    previous.apply();
}
