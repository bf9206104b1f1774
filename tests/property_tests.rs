//! Property-based tests using proptest.
//!
//! These tests verify invariant properties across random inputs rather than
//! testing fixed examples. None of them touch the solver knobs, so they run
//! with the default iteration budget and Householder order.

use proptest::prelude::*;
use rationalvol::bachelier::{bachelier, implied_normal_volatility};
use rationalvol::black::{
    black, complementary_normalised_black, implied_volatility_attainable_accuracy,
    normalised_black, normalised_implied_black_volatility, normalised_vega,
};
use rationalvol::constants::DBL_EPSILON;
use rationalvol::special::{erf, norm_cdf};

// --- Property Test 1: normalised round trip ---

proptest! {
    /// Recovering s from b(x, s) is accurate to the attainable accuracy,
    /// for both call and put representations of the same price.
    #[test]
    fn normalised_round_trip_within_attainable_accuracy(
        x in -50.0_f64..0.0,
        s in 0.05_f64..20.0,
        call in any::<bool>(),
    ) {
        let theta = if call { 1.0 } else { -1.0 };
        // out-of-the-money when θx ≤ 0; use the matching sign of x
        let x = theta * x;
        let beta = normalised_black(x, s, theta);
        prop_assume!(beta > f64::MIN_POSITIVE);
        let s_out = normalised_implied_black_volatility(beta, x, theta);
        let accuracy = implied_volatility_attainable_accuracy(x, s, theta);
        prop_assert!(
            (s_out - s).abs() <= 8.0 * s * accuracy,
            "x = {}, s = {}, s_out = {}, accuracy = {}", x, s, s_out, accuracy
        );
    }
}

// --- Property Test 2: in-the-money round trip ---

proptest! {
    /// In-the-money prices are reduced to out-of-the-money ones; the round
    /// trip still recovers s where the time value is not swamped by intrinsic.
    #[test]
    fn in_the_money_round_trip(
        x in 0.01_f64..2.0,
        s in 0.5_f64..5.0,
    ) {
        let beta = normalised_black(x, s, 1.0);
        let s_out = normalised_implied_black_volatility(beta, x, 1.0);
        prop_assert!((s_out - s).abs() <= 1e-9 * s, "x = {}, s = {}, s_out = {}", x, s, s_out);
    }
}

// --- Property Test 3: put-call parity ---

proptest! {
    /// C − P = F − K for undiscounted Black prices.
    #[test]
    fn put_call_parity(
        f in 10.0_f64..200.0,
        k in 10.0_f64..200.0,
        sigma in 0.01_f64..1.5,
        t in 0.01_f64..10.0,
    ) {
        let call = black(f, k, sigma, t, 1.0);
        let put = black(f, k, sigma, t, -1.0);
        let scale = f.max(k);
        prop_assert!(((call - put) - (f - k)).abs() <= 16.0 * DBL_EPSILON * scale);
    }
}

// --- Property Test 4: erf and Φ symmetries ---

proptest! {
    #[test]
    fn erf_is_odd(z in -30.0_f64..30.0) {
        prop_assert_eq!(erf(-z), -erf(z));
    }

    #[test]
    fn norm_cdf_reflection(z in -8.0_f64..8.0) {
        let sum = norm_cdf(-z) + norm_cdf(z);
        prop_assert!((sum - 1.0).abs() < 3.0 * DBL_EPSILON);
    }
}

// --- Property Test 5: complementary identity ---

proptest! {
    /// b(x, s) + b̄(x, s) = bₘₐₓ(x).
    #[test]
    fn complementary_identity(
        x in -20.0_f64..0.0,
        s in 0.01_f64..30.0,
    ) {
        let b_max = (0.5 * x).exp();
        let b = normalised_black(x, s, 1.0);
        let b_bar = complementary_normalised_black(x, s);
        prop_assert!((b + b_bar - b_max).abs() <= 8.0 * DBL_EPSILON * b_max);
    }
}

// --- Property Test 6: monotonicity and vega ---

proptest! {
    /// b is increasing in s and vega is positive.
    #[test]
    fn price_increases_with_volatility(
        x in -10.0_f64..0.0,
        s in 0.5_f64..10.0,
        ds in 0.01_f64..1.0,
    ) {
        let lo = normalised_black(x, s, 1.0);
        let hi = normalised_black(x, s + ds, 1.0);
        prop_assert!(hi > lo, "b({}, {}) = {} >= b({}, {}) = {}", x, s, lo, x, s + ds, hi);
        prop_assert!(normalised_vega(x, s) > 0.0);
    }
}

// --- Property Test 7: Bachelier round trip ---

proptest! {
    #[test]
    fn bachelier_round_trip(
        f in -0.05_f64..0.10,
        d in -3.0_f64..3.0,
        sigma in 0.001_f64..0.05,
        t in 0.1_f64..10.0,
        call in any::<bool>(),
    ) {
        let theta = if call { 1.0 } else { -1.0 };
        // strike within three standard deviations of the forward
        let k = f + d * sigma * t.sqrt();
        let price = bachelier(f, k, sigma, t, theta);
        let vol = implied_normal_volatility(price, f, k, t, theta);
        prop_assert!((vol - sigma).abs() <= 1e-9 * sigma, "vol = {}, sigma = {}", vol, sigma);
    }
}
