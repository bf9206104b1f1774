//! Conversions between market quantities and the normalised variables used
//! by the pricing kernels.
//!
//! | Quantity | Normalised form |
//! |---|---|
//! | moneyness | `x = ln(F/K)` |
//! | total volatility | `s = σ·√T` |
//! | Black price | `β = price/√(F·K)` |

/// Convert forward and strike to log-moneyness: x = ln(F / K).
///
/// Note the sign: positive for in-the-money calls.
pub fn log_moneyness(forward: f64, strike: f64) -> f64 {
    (forward / strike).ln()
}

/// Total volatility s = σ·√T.
pub fn total_volatility(sigma: f64, expiry: f64) -> f64 {
    sigma * expiry.sqrt()
}

/// Normalise a Black price: β = price / √(F·K).
pub fn normalised_price(price: f64, forward: f64, strike: f64) -> f64 {
    price / (forward.sqrt() * strike.sqrt())
}

/// Undo [`normalised_price`].
pub fn denormalised_price(beta: f64, forward: f64, strike: f64) -> f64 {
    beta * (forward.sqrt() * strike.sqrt())
}

/// Intrinsic value `max(θ(F − K), 0)` with `θ = ±1`.
pub fn intrinsic_value(forward: f64, strike: f64, theta: f64) -> f64 {
    (if theta < 0.0 { strike - forward } else { forward - strike }).max(0.0)
}

/// Compute forward price from spot: F = S · exp(r · T).
pub fn forward_price(spot: f64, rate: f64, expiry: f64) -> f64 {
    spot * (rate * expiry).exp()
}
