//! Black (lognormal) prices, Greeks and implied volatility.
//!
//! Everything here works on raw `f64`s and signals the edge cases through
//! sentinel values rather than `Result`:
//!
//! | Condition | Implied volatility |
//! |---|---|
//! | price equals intrinsic | `0` |
//! | price below intrinsic | [`VOLATILITY_BELOW_INTRINSIC`](crate::constants::VOLATILITY_BELOW_INTRINSIC) (`−DBL_MAX`) |
//! | price at or above the attainable maximum | [`VOLATILITY_ABOVE_MAXIMUM`](crate::constants::VOLATILITY_ABOVE_MAXIMUM) (`+DBL_MAX`) |
//! | any NaN input | NaN |
//!
//! The direction `theta` is `+1.0` for calls and `−1.0` for puts. For a
//! validated interface returning [`Result`](crate::Result), see
//! [`implied`](crate::implied).
//!
//! In normalised terms, with `x = ln(F/K)`, `s = σ√T` and `β = price/√(FK)`,
//! the out-of-the-money price is
//!
//! ```text
//! b(x, s) = Φ(x/s + s/2)·exp(x/2) − Φ(x/s − s/2)·exp(−x/2),    x ≤ 0.
//! ```
//!
//! In-the-money prices reduce to this by reciprocal-strike put-call
//! symmetry. Each function also comes as a `_with` variant generic over
//! [`SpecialFunctions`]; the plain versions use [`Cody`].
//!
//! # Examples
//!
//! ```
//! use rationalvol::black::{black, implied_black_volatility};
//!
//! let price = black(100.0, 110.0, 0.25, 1.0, 1.0);
//! let vol = implied_black_volatility(price, 100.0, 110.0, 1.0, 1.0);
//! assert!((vol - 0.25).abs() < 1e-14);
//! ```

mod bounds;
mod regions;
mod solver;

pub use regions::BlackRegion;
pub use solver::{SolverBranch, SolverOutcome};

use crate::constants::{
    DBL_EPSILON, DBL_MAX, DBL_MIN, ONE_OVER_SQRT_TWO, ONE_OVER_SQRT_TWO_PI, SQRT_DBL_MIN,
    SQRT_TWO_PI, VOLATILITY_ABOVE_MAXIMUM,
};
use crate::conventions::{denormalised_price, log_moneyness, normalised_price, total_volatility};
use crate::special::{Cody, SpecialFunctions};
use solver::{IterationLimits, lets_be_rational};

/// Normalised intrinsic value `max(exp(θx/2) − exp(−θx/2), 0) = 2·sinh(θx/2)⁺`.
#[inline]
pub fn normalised_intrinsic(theta_x: f64) -> f64 {
    if theta_x <= 0.0 {
        return 0.0;
    }
    2.0 * (0.5 * theta_x).sinh()
}

/// Normalised Black price `β = price/√(FK)` at moneyness `x = ln(F/K)` and `s = σ√T`.
///
/// `s ≤ 0` gives the intrinsic value.
pub fn normalised_black(x: f64, s: f64, theta: f64) -> f64 {
    normalised_black_with::<Cody>(x, s, theta)
}

pub fn normalised_black_with<S: SpecialFunctions>(x: f64, s: f64, theta: f64) -> f64 {
    if x == 0.0 {
        return S::erf((0.5 * ONE_OVER_SQRT_TWO) * s);
    }
    let time_value = if s <= 0.0 {
        0.0
    } else {
        regions::normalised_black::<S>(-x.abs(), s)
    };
    normalised_intrinsic(if theta < 0.0 { -x } else { x }) + time_value
}

/// Undiscounted Black price of a call (`theta = 1`) or put (`theta = −1`).
pub fn black(forward: f64, strike: f64, sigma: f64, t: f64, theta: f64) -> f64 {
    black_with::<Cody>(forward, strike, sigma, t, theta)
}

pub fn black_with<S: SpecialFunctions>(forward: f64, strike: f64, sigma: f64, t: f64, theta: f64) -> f64 {
    let s = total_volatility(sigma, t);
    if strike == forward {
        return forward * S::erf((0.5 * ONE_OVER_SQRT_TWO) * s);
    }
    let intrinsic = if theta < 0.0 { strike - forward } else { forward - strike };
    let time_value = if s <= 0.0 {
        0.0
    } else {
        let x = log_moneyness(forward, strike);
        denormalised_price(regions::normalised_black::<S>(-x.abs(), s), forward, strike)
    };
    intrinsic.max(0.0) + time_value
}

/// `b̄ = bₘₐₓ − b` at `(x, s)` for `s > 0`, without subtractive cancellation.
///
/// Symmetric in `x`, with `b(−|x|, s) + b̄(x, s) = exp(−|x|/2)`.
pub fn complementary_normalised_black(x: f64, s: f64) -> f64 {
    regions::complementary_normalised_black::<Cody>(x / s, 0.5 * s)
}

/// Implied Black volatility `σ` of an undiscounted option price.
///
/// # Examples
///
/// ```
/// use rationalvol::black::implied_black_volatility;
/// use rationalvol::constants::VOLATILITY_ABOVE_MAXIMUM;
///
/// assert_eq!(implied_black_volatility(0.0, 100.0, 110.0, 1.0, 1.0), 0.0);
/// assert_eq!(implied_black_volatility(100.0, 100.0, 110.0, 1.0, 1.0), VOLATILITY_ABOVE_MAXIMUM);
/// ```
pub fn implied_black_volatility(price: f64, forward: f64, strike: f64, t: f64, theta: f64) -> f64 {
    implied_black_volatility_with::<Cody>(price, forward, strike, t, theta)
}

pub fn implied_black_volatility_with<S: SpecialFunctions>(
    price: f64,
    forward: f64,
    strike: f64,
    t: f64,
    theta: f64,
) -> f64 {
    if price >= (if theta < 0.0 { strike } else { forward }) {
        return VOLATILITY_ABOVE_MAXIMUM;
    }
    // in-the-money to out-of-the-money
    let mu = if theta < 0.0 { strike - forward } else { forward - strike };
    let beta = normalised_price(if mu > 0.0 { price - mu } else { price }, forward, strike);
    let outcome = lets_be_rational::<S>(
        beta,
        -log_moneyness(forward, strike).abs(),
        IterationLimits::from_knobs(),
    );
    outcome.normalised_volatility / t.sqrt()
}

/// Implied normalised volatility `s = σ√T` of a normalised price `β`.
pub fn normalised_implied_black_volatility(beta: f64, x: f64, theta: f64) -> f64 {
    normalised_implied_black_volatility_with_diagnostics(beta, x, theta).normalised_volatility
}

pub fn normalised_implied_black_volatility_with<S: SpecialFunctions>(beta: f64, x: f64, theta: f64) -> f64 {
    normalised_implied_black_volatility_with_diagnostics_with::<S>(beta, x, theta).normalised_volatility
}

/// As [`normalised_implied_black_volatility`], also reporting the solver
/// branch and the number of iterations taken.
///
/// # Examples
///
/// ```
/// use rationalvol::black::{
///     normalised_black, normalised_implied_black_volatility_with_diagnostics, SolverBranch,
/// };
///
/// let beta = normalised_black(-1.0, 0.2, 1.0);
/// let outcome = normalised_implied_black_volatility_with_diagnostics(beta, -1.0, 1.0);
/// assert_eq!(outcome.branch, SolverBranch::Lowest);
/// assert!(outcome.iterations <= 2);
/// ```
pub fn normalised_implied_black_volatility_with_diagnostics(beta: f64, x: f64, theta: f64) -> SolverOutcome {
    normalised_implied_black_volatility_with_diagnostics_with::<Cody>(beta, x, theta)
}

pub fn normalised_implied_black_volatility_with_diagnostics_with<S: SpecialFunctions>(
    beta: f64,
    x: f64,
    theta: f64,
) -> SolverOutcome {
    let intrinsic = normalised_intrinsic(if theta < 0.0 { -x } else { x });
    lets_be_rational::<S>(beta - intrinsic, -x.abs(), IterationLimits::from_knobs())
}

/// `∂b/∂s` at `(x, s)`. Zero for `s ≤ 0` and wherever it underflows.
pub fn normalised_vega(x: f64, s: f64) -> f64 {
    let ax = x.abs();
    if ax <= 0.0 {
        return ONE_OVER_SQRT_TWO_PI * (-0.125 * s * s).exp();
    }
    if s <= 0.0 || s <= ax * SQRT_DBL_MIN {
        return 0.0;
    }
    regions::normalised_vega(x, s)
}

/// `∂²b/∂s² = b′·(h² − t²)/s` at `(x, s)`, with `h = x/s` and `t = s/2`.
pub fn normalised_volga(x: f64, s: f64) -> f64 {
    let ax = x.abs();
    if s <= 0.0 || s <= ax * SQRT_DBL_MIN {
        return 0.0;
    }
    let h = x / s;
    let t = 0.5 * s;
    let h2 = h * h;
    let t2 = t * t;
    ONE_OVER_SQRT_TWO_PI * (-0.5 * (h2 + t2)).exp() * (h2 - t2) / s
}

/// `∂price/∂σ`.
pub fn vega(forward: f64, strike: f64, sigma: f64, t: f64) -> f64 {
    let (x, s) = (log_moneyness(forward, strike), total_volatility(sigma, t));
    denormalised_price(normalised_vega(x, s), forward, strike) * t.sqrt()
}

/// `∂²price/∂σ²`.
pub fn volga(forward: f64, strike: f64, sigma: f64, t: f64) -> f64 {
    let (x, s) = (log_moneyness(forward, strike), total_volatility(sigma, t));
    denormalised_price(normalised_volga(x, s), forward, strike) * t
}

/// `b/b′` at `(θx, s)`, for `s > 0` and `θx ≠ 0`.
///
/// Stays finite where `b` and `b′` both underflow.
pub fn scaled_normalised_black(theta_x: f64, s: f64) -> f64 {
    debug_assert!(!(s <= 0.0 || theta_x == 0.0));
    let intrinsic_part = if theta_x > 0.0 {
        normalised_intrinsic(theta_x) * SQRT_TWO_PI * (0.5 * ((theta_x / s).powi(2) + 0.25 * s * s)).exp()
    } else {
        0.0
    };
    intrinsic_part + regions::scaled_normalised_black_and_ln_vega::<Cody>(-theta_x.abs(), s).0
}

/// `s·b′/b`: the factor by which a relative price error shrinks when
/// mapped to a relative error in `s`.
pub fn black_accuracy_factor(x: f64, s: f64, theta: f64) -> f64 {
    if x == 0.0 {
        if s.abs() < DBL_EPSILON {
            return 1.0;
        }
        return s / (Cody::erf((0.5 * ONE_OVER_SQRT_TWO) * s) * SQRT_TWO_PI * (0.125 * s * s).exp());
    }
    let theta_x = if theta < 0.0 { -x } else { x };
    if s <= 0.0 {
        return if theta_x > 0.0 { 0.0 } else { DBL_MAX };
    }
    s / scaled_normalised_black(theta_x, s)
}

/// Best relative accuracy `ε·(1 + |b/(s·b′)|)` to which `s` can be
/// recovered from a price at `(x, s)`. Returns 1 where `b·b′` underflows.
pub fn implied_volatility_attainable_accuracy(x: f64, s: f64, theta: f64) -> f64 {
    if x == 0.0 {
        let ratio = if s <= DBL_EPSILON {
            1.0
        } else {
            Cody::erf((0.5 * ONE_OVER_SQRT_TWO) * s) * SQRT_TWO_PI * (0.125 * s * s).exp() / s
        };
        return DBL_EPSILON * (1.0 + ratio.abs());
    }
    let theta_x = if theta < 0.0 { -x } else { x };
    if s <= 0.0 {
        return if theta_x > 0.0 { 1.0 } else { DBL_EPSILON };
    }
    let bx = scaled_normalised_black(theta_x, s);
    if bx * regions::normalised_vega(theta_x, s) >= DBL_MIN {
        DBL_EPSILON * (1.0 + (bx / s).abs())
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::VOLATILITY_BELOW_INTRINSIC;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    // --- Prices ---

    #[test]
    fn at_the_money_reference() {
        assert_relative_eq!(black(100.0, 100.0, 0.2, 1.0, 1.0), 7.965567455405796, max_relative = 1e-15);
        assert_eq!(black(100.0, 100.0, 0.2, 1.0, 1.0), black(100.0, 100.0, 0.2, 1.0, -1.0));
    }

    #[test]
    fn out_of_the_money_reference() {
        let call = black(100.0, 110.0, 0.25, 1.0, 1.0);
        let put = black(100.0, 110.0, 0.25, 1.0, -1.0);
        assert_relative_eq!(call, 6.190426413768347, max_relative = 1e-14);
        assert_relative_eq!(put, 16.190426413768347, max_relative = 1e-14);
    }

    #[test]
    fn put_call_parity() {
        for &(f, k, sigma) in &[(100.0, 80.0, 0.3), (50.0, 51.0, 0.1), (1.0, 3.0, 1.5)] {
            let diff = black(f, k, sigma, 2.0, 1.0) - black(f, k, sigma, 2.0, -1.0);
            assert_abs_diff_eq!(diff, f - k, epsilon = 1e-13 * f.max(k));
        }
    }

    #[test]
    fn zero_volatility_gives_intrinsic() {
        assert_eq!(black(100.0, 90.0, 0.0, 1.0, 1.0), 10.0);
        assert_eq!(black(100.0, 90.0, 0.0, 1.0, -1.0), 0.0);
        assert_eq!(normalised_black(0.3, 0.0, 1.0), normalised_intrinsic(0.3));
        assert_eq!(normalised_black(0.3, 0.0, -1.0), 0.0);
    }

    #[test]
    fn normalised_black_scales_to_black() {
        let (f, k, sigma, t): (f64, f64, f64, f64) = (120.0, 100.0, 0.4, 0.5);
        let x = (f / k).ln();
        let s = sigma * f64::sqrt(t);
        for &theta in &[1.0, -1.0] {
            let beta = normalised_black(x, s, theta);
            assert_relative_eq!(beta * (f * k).sqrt(), black(f, k, sigma, t, theta), max_relative = 1e-14);
        }
    }

    #[test]
    fn out_of_the_money_price_is_denormalised_time_value() {
        use crate::conventions::forward_price;
        let f = forward_price(95.0, 0.03, 2.0);
        let (k, sigma, t) = (130.0, 0.35, 2.0);
        let x = log_moneyness(f, k);
        let s = total_volatility(sigma, t);
        let price = black(f, k, sigma, t, 1.0);
        assert_eq!(price, denormalised_price(normalised_black(x, s, 1.0), f, k));
        assert_relative_eq!(normalised_price(price, f, k), normalised_black(x, s, 1.0), max_relative = 1e-15);
        let vol = implied_black_volatility(price, f, k, t, 1.0);
        assert_relative_eq!(vol, sigma, max_relative = 1e-13);
    }

    #[test]
    fn intrinsic_is_two_sinh() {
        assert_eq!(normalised_intrinsic(-0.5), 0.0);
        assert_eq!(normalised_intrinsic(0.0), 0.0);
        assert_relative_eq!(
            normalised_intrinsic(0.4),
            0.2_f64.exp() - (-0.2_f64).exp(),
            max_relative = 1e-15
        );
    }

    #[test]
    fn complementary_identity() {
        for &(x, s) in &[(-0.5, 0.3), (-2.0, 3.0), (-10.0, 9.0), (3.0, 1.0)] {
            let b = normalised_black(-f64::abs(x), s, 1.0);
            let b_bar = complementary_normalised_black(x, s);
            let b_max = (-0.5 * f64::abs(x)).exp();
            assert_abs_diff_eq!(b + b_bar, b_max, epsilon = 4.0 * DBL_EPSILON * b_max);
        }
    }

    // --- Implied volatility ---

    #[test]
    fn implied_reference_scenarios() {
        let vol = implied_black_volatility(7.965567455405796, 100.0, 100.0, 1.0, 1.0);
        assert_relative_eq!(vol, 0.2, max_relative = 1e-14);
        assert_eq!(implied_black_volatility(0.0, 100.0, 110.0, 1.0, 1.0), 0.0);
        assert_eq!(implied_black_volatility(100.0, 100.0, 110.0, 1.0, 1.0), VOLATILITY_ABOVE_MAXIMUM);
    }

    #[test]
    fn implied_in_the_money_put() {
        let price = black(100.0, 130.0, 0.35, 2.0, -1.0);
        assert_relative_eq!(
            implied_black_volatility(price, 100.0, 130.0, 2.0, -1.0),
            0.35,
            max_relative = 1e-13
        );
    }

    #[test]
    fn implied_below_intrinsic() {
        assert_eq!(implied_black_volatility(5.0, 100.0, 90.0, 1.0, 1.0), VOLATILITY_BELOW_INTRINSIC);
        assert_eq!(normalised_implied_black_volatility(-1e-3, -0.5, 1.0), VOLATILITY_BELOW_INTRINSIC);
    }

    #[test]
    fn implied_at_intrinsic_is_zero() {
        let x = 0.7;
        assert_eq!(normalised_implied_black_volatility(normalised_intrinsic(x), x, 1.0), 0.0);
    }

    #[test]
    fn normalised_implied_at_maximum() {
        let b_max = (-0.25_f64).exp();
        assert_eq!(normalised_implied_black_volatility(b_max, -0.5, 1.0), VOLATILITY_ABOVE_MAXIMUM);
        assert_eq!(normalised_implied_black_volatility(b_max, 0.5, -1.0), VOLATILITY_ABOVE_MAXIMUM);
    }

    #[test]
    fn diagnostics_report_branch() {
        let outcome = normalised_implied_black_volatility_with_diagnostics(0.3, 0.0, 1.0);
        assert_eq!(outcome.branch, SolverBranch::AtTheMoney);
        assert_eq!(outcome.iterations, 0);
        let outcome = normalised_implied_black_volatility_with_diagnostics(0.0, 1.0, -1.0);
        assert_eq!(outcome.branch, SolverBranch::Boundary);
    }

    // --- Greeks ---

    #[test]
    fn vega_matches_reference_and_finite_difference() {
        assert_relative_eq!(vega(100.0, 110.0, 0.25, 1.0), 38.60577974896769, max_relative = 1e-14);
        let d = 1e-6;
        let fd = (black(100.0, 110.0, 0.25 + d, 1.0, 1.0) - black(100.0, 110.0, 0.25 - d, 1.0, 1.0)) / (2.0 * d);
        assert_relative_eq!(vega(100.0, 110.0, 0.25, 1.0), fd, max_relative = 1e-8);
    }

    #[test]
    fn volga_matches_finite_difference() {
        for &(f, k) in &[(100.0, 110.0), (100.0, 100.0), (100.0, 60.0)] {
            let d = 1e-5;
            let fd = (vega(f, k, 0.3 + d, 1.5) - vega(f, k, 0.3 - d, 1.5)) / (2.0 * d);
            assert_relative_eq!(volga(f, k, 0.3, 1.5), fd, max_relative = 1e-7, epsilon = 1e-9);
        }
    }

    #[test]
    fn vega_edge_cases() {
        assert_eq!(normalised_vega(-1.0, 0.0), 0.0);
        assert_eq!(normalised_vega(-1.0, 1e-300), 0.0);
        assert_relative_eq!(normalised_vega(0.0, 0.0), ONE_OVER_SQRT_TWO_PI, max_relative = 1e-15);
        assert_eq!(normalised_volga(-1.0, 0.0), 0.0);
    }

    // --- Conditioning ---

    #[test]
    fn accuracy_factor_is_inverse_scaled_black() {
        let (x, s) = (-1.0, 0.8);
        assert_relative_eq!(
            black_accuracy_factor(x, s, 1.0),
            s / scaled_normalised_black(x, s),
            max_relative = 1e-15
        );
        assert_eq!(black_accuracy_factor(x, 0.0, 1.0), DBL_MAX);
        assert_eq!(black_accuracy_factor(-x, 0.0, 1.0), 0.0);
        assert_eq!(black_accuracy_factor(0.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn scaled_black_includes_intrinsic_for_in_the_money() {
        let (theta_x, s) = (0.6, 0.9);
        let b = normalised_black(theta_x, s, 1.0);
        let bp = normalised_vega(theta_x, s);
        assert_relative_eq!(scaled_normalised_black(theta_x, s), b / bp, max_relative = 1e-14);
    }

    #[test]
    fn attainable_accuracy_edge_cases() {
        assert_eq!(implied_volatility_attainable_accuracy(-1.0, 0.0, 1.0), DBL_EPSILON);
        assert_eq!(implied_volatility_attainable_accuracy(1.0, 0.0, 1.0), 1.0);
        assert_eq!(implied_volatility_attainable_accuracy(0.0, 0.0, 1.0), 2.0 * DBL_EPSILON);
        // far in the wing the price underflows
        assert_eq!(implied_volatility_attainable_accuracy(-800.0, 1.0, 1.0), 1.0);
        let a = implied_volatility_attainable_accuracy(-1.0, 1.0, 1.0);
        assert!(a > DBL_EPSILON && a < 10.0 * DBL_EPSILON);
    }
}
