//! Tuning the process-wide solver knobs.
//!
//! Reads a settings snapshot from JSON, applies it, and shows how the
//! iteration budget and update order change the result for one price.
//!
//! Run with: `cargo run --example solver_settings`

use rationalvol::black::{normalised_black, normalised_implied_black_volatility_with_diagnostics};
use rationalvol::config::SolverSettings;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (x, s) = (-2.0, 0.9);
    let beta = normalised_black(x, s, 1.0);
    let defaults = SolverSettings::current();
    println!("defaults: {}", serde_json::to_string(&defaults)?);

    let configs = [
        r#"{"max_iterations": 0, "householder_order": 5}"#,
        r#"{"max_iterations": 1, "householder_order": 2}"#,
        r#"{"max_iterations": 1, "householder_order": 5}"#,
        r#"{"max_iterations": 2, "householder_order": 3}"#,
        r#"{"max_iterations": 2, "householder_order": 5}"#,
    ];

    println!("\n{:>10} {:>14} {:>6} {:>12}", "iterations", "method", "used", "rel. error");
    for json in configs {
        let settings: SolverSettings = serde_json::from_str(json)?;
        let effective = settings.apply();
        let outcome = normalised_implied_black_volatility_with_diagnostics(beta, x, 1.0);
        println!(
            "{:>10} {:>14} {:>6} {:>12.2e}",
            effective.max_iterations,
            format!("{:?}", effective.householder_method()),
            outcome.iterations,
            (outcome.normalised_volatility / s - 1.0).abs()
        );
    }

    defaults.apply();
    Ok(())
}
