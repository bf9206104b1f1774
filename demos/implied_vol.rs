//! Black implied volatility from undiscounted option prices.
//!
//! Shows how to:
//!   - Price calls and puts with the validated Black interface
//!   - Recover the volatility and inspect the solver branch used
//!   - Handle prices that no volatility can reproduce
//!   - Work at extreme moneyness with the raw normalised functions
//!
//! Run with: `cargo run --example implied_vol`

use rationalvol::black::{
    implied_volatility_attainable_accuracy, normalised_black,
    normalised_implied_black_volatility_with_diagnostics,
};
use rationalvol::conventions::{forward_price, log_moneyness, normalised_price, total_volatility};
use rationalvol::{BlackImpliedVol, OptionType, VolError, black_price};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (spot, rate) = (97.0, 0.04);
    let expiry = 0.75;
    let vol = 0.32;
    let forward = forward_price(spot, rate, expiry);
    println!("Spot {spot}, rate {rate}, expiry {expiry}: forward {forward:.6}\n");

    // ---------------------------------------------------------------
    // 1. Strike ladder: price, recover, report the branch
    // ---------------------------------------------------------------

    println!("{:>8} {:>6} {:>14} {:>16} {:>10} {:>14}", "Strike", "Type", "Price", "Implied vol", "Iter", "Branch");
    println!("{}", "-".repeat(74));

    for k in [40.0, 70.0, 90.0, 100.0, 110.0, 150.0, 300.0] {
        // out-of-the-money side of each strike
        let option_type = if k < forward { OptionType::Put } else { OptionType::Call };
        let price = black_price(forward, k, vol, expiry, option_type)?;
        let iv = BlackImpliedVol::compute(price, forward, k, expiry, option_type)?;

        let x = log_moneyness(forward, k);
        let beta = normalised_price(price, forward, k);
        let outcome = normalised_implied_black_volatility_with_diagnostics(beta, x, option_type.theta());

        println!(
            "{k:>8.0} {:>6} {price:>14.8} {:>16.13} {:>10} {:>14?}",
            format!("{option_type:?}"),
            iv.0,
            outcome.iterations,
            outcome.branch
        );
    }

    // ---------------------------------------------------------------
    // 2. Prices outside the attainable range
    // ---------------------------------------------------------------

    println!("\nRejected prices");
    for (price, option_type) in [(5.0, OptionType::Call), (120.0, OptionType::Put)] {
        match BlackImpliedVol::compute(price, forward, 90.0, expiry, option_type) {
            Ok(iv) => println!("  {price:>6} {option_type:?}: {:.6}", iv.0),
            Err(VolError::PriceBelowIntrinsic { intrinsic, .. }) => {
                println!("  {price:>6} {option_type:?}: below intrinsic {intrinsic}")
            }
            Err(VolError::PriceAboveMaximum { maximum, .. }) => {
                println!("  {price:>6} {option_type:?}: at or above maximum {maximum}")
            }
            Err(e) => return Err(e.into()),
        }
    }

    // ---------------------------------------------------------------
    // 3. Extreme moneyness in normalised terms
    // ---------------------------------------------------------------

    println!("\nNormalised round trips at x = ln(F/K) = -300");
    let x = -300.0;
    for sigma in [1.5, 2.0, 2.5, 3.0] {
        let s = total_volatility(sigma, 100.0);
        let beta = normalised_black(x, s, 1.0);
        let outcome = normalised_implied_black_volatility_with_diagnostics(beta, x, 1.0);
        let accuracy = implied_volatility_attainable_accuracy(x, s, 1.0);
        println!(
            "  s = {s:>5.1}  beta = {beta:.6e}  recovered = {:.15}  attainable = {accuracy:.1e}  {:?}",
            outcome.normalised_volatility, outcome.branch
        );
    }

    Ok(())
}
