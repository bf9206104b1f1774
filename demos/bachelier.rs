//! Normal (Bachelier) implied volatility for rates with negative forwards.
//!
//! Run with: `cargo run --example bachelier`

use rationalvol::bachelier::{inverse_phi_tilde, phi_tilde};
use rationalvol::{NormalImpliedVol, OptionType, normal_price};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let forward = -0.0025;
    let expiry = 2.0;
    let vol = 0.0085; // 85 bp per √year

    println!("Forward {:.2}%  expiry {expiry}y  normal vol {:.0} bp\n", forward * 100.0, vol * 1e4);
    println!("{:>10} {:>6} {:>14} {:>14}", "Strike", "Type", "Price", "Implied (bp)");
    println!("{}", "-".repeat(48));

    for k in [-0.02, -0.01, -0.0025, 0.0, 0.01, 0.025] {
        let option_type = if k < forward { OptionType::Put } else { OptionType::Call };
        let price = normal_price(forward, k, vol, expiry, option_type)?;
        let iv = NormalImpliedVol::compute(price, forward, k, expiry, option_type)?;
        println!(
            "{:>9.2}% {:>6} {price:>14.10} {:>14.10}",
            k * 100.0,
            format!("{option_type:?}"),
            iv.0 * 1e4
        );
    }

    println!("\nThe normalised time-value function and its inverse");
    for x in [-6.0, -2.0, -0.5, -0.01] {
        let f = phi_tilde(x);
        println!("  x = {x:>6}  phi_tilde = {f:.12e}  inverse = {:.15}", inverse_phi_tilde(f));
    }

    Ok(())
}
