//! Error function family after W. J. Cody (1969).
//!
//! Three rational Chebyshev approximations cover the real line:
//!
//! ```text
//! |z| ≤ 0.46875        erf(z)    = z·A(z²)/B(z²)
//! 0.46875 < |z| ≤ 4    erfcx(|z|) = C(|z|)/D(|z|)
//! |z| > 4              erfcx(|z|) = (1/√π − P(1/z²)/Q(1/z²)) / |z|
//! ```
//!
//! Values for negative arguments follow from `erf(−z) = −erf(z)`,
//! `erfc(−z) = 2 − erfc(z)` and `erfcx(−z) = 2·exp(z²) − erfcx(z)`.
//! Converting between `erfc` and `erfcx` goes through a split exponential
//! `exp(−z̃²)·exp(−(z−z̃)(z+z̃))` with `z̃ = trunc(16z)/16`, which keeps
//! about one more decimal in the far tail than a single `exp(−z²)`.
//!
//! # References
//! - Cody, W. J. "Rational Chebyshev approximations for the error function",
//!   Math. Comp. 23 (1969), pp. 631–638.

use crate::polynomial::horner;

const A: [f64; 5] = [
    3.1611237438705656,
    113.864154151050156,
    377.485237685302021,
    3209.37758913846947,
    0.185777706184603153,
];
const B: [f64; 4] = [
    23.6012909523441209,
    244.024637934444173,
    1282.61652607737228,
    2844.23683343917062,
];
const C: [f64; 9] = [
    0.564188496988670089,
    8.88314979438837594,
    66.1191906371416295,
    298.635138197400131,
    881.95222124176909,
    1712.04761263407058,
    2051.07837782607147,
    1230.33935479799725,
    2.15311535474403846E-8,
];
const D: [f64; 8] = [
    15.7449261107098347,
    117.693950891312499,
    537.181101862009858,
    1621.38957456669019,
    3290.79923573345963,
    4362.61909014324716,
    3439.36767414372164,
    1230.33935480374942,
];
const P: [f64; 6] = [
    0.305326634961232344,
    0.360344899949804439,
    0.125781726111229246,
    0.0160837851487422766,
    6.58749161529837803E-4,
    0.0163153871373020978,
];
const Q: [f64; 5] = [
    2.56852019228982242,
    1.87295284992346047,
    0.527905102951428412,
    0.0605183413124413191,
    0.00233520497626869185,
];

const ONE_OVER_SQRT_PI: f64 = 0.56418958354775628695;
/// Boundary between the `erf` and `erfcx` approximations.
pub(crate) const CODY_THRESHOLD: f64 = 0.46875;
/// Below this, `erfcx` overflows: the root of `erfcx(z) = DBL_MAX`.
const XNEG: f64 = -26.6287357137514;
/// At and above this, `erfc` underflows to zero.
const XBIG: f64 = 26.543;
/// At and above this, `erfcx(z) = 1/(√π·z)` to machine precision.
const XHUGE: f64 = 6.71E7;
/// At and above this, `erfcx` underflows to zero.
const XMAX: f64 = 2.53E307;

#[inline]
fn small_ratio(z: f64) -> f64 {
    horner(z, &[A[3], A[2], A[1], A[0], A[4]]) / horner(z, &[B[3], B[2], B[1], B[0], 1.0])
}

#[inline]
fn medium_ratio(y: f64) -> f64 {
    horner(y, &[C[7], C[6], C[5], C[4], C[3], C[2], C[1], C[0], C[8]])
        / horner(y, &[D[7], D[6], D[5], D[4], D[3], D[2], D[1], D[0], 1.0])
}

#[inline]
fn large_ratio(z: f64) -> f64 {
    z * horner(z, &[P[4], P[3], P[2], P[1], P[0], P[5]])
        / horner(z, &[Q[4], Q[3], Q[2], Q[1], Q[0], 1.0])
}

/// `exp(−y²)` evaluated as `exp(−ỹ²)·exp(−(y−ỹ)(y+ỹ))` with `ỹ = trunc(16y)/16`.
#[inline]
fn smoothed_exp_of_negative_square(y: f64) -> f64 {
    let y_tilde = (y * 16.0).trunc() / 16.0;
    (-y_tilde * y_tilde).exp() * (-(y - y_tilde) * (y + y_tilde)).exp()
}

/// `exp(x²)` evaluated as `exp(x̃²)·exp((x−x̃)(x+x̃))` with `x̃ = trunc(16x)/16`.
#[inline]
fn smoothed_exp_of_positive_square(x: f64) -> f64 {
    let x_tilde = (x * 16.0).trunc() / 16.0;
    (x_tilde * x_tilde).exp() * ((x - x_tilde) * (x + x_tilde)).exp()
}

/// `erfcx(y)` for `y > 0.46875`. NaN passes through.
fn erfcx_above_threshold(y: f64) -> f64 {
    debug_assert!(!(y <= CODY_THRESHOLD));
    if y <= 4.0 {
        return medium_ratio(y);
    }
    if y >= XMAX {
        return 0.0;
    }
    if y >= XHUGE {
        return ONE_OVER_SQRT_PI / y;
    }
    (ONE_OVER_SQRT_PI - large_ratio(1.0 / (y * y))) / y
}

/// `erfc(|z|)` for `|z| > 0.46875`.
#[inline]
fn erfc_of_abs_above_threshold(y: f64) -> f64 {
    if y >= XBIG {
        return 0.0;
    }
    let erfcx = if y <= 4.0 {
        medium_ratio(y)
    } else {
        (ONE_OVER_SQRT_PI - large_ratio(1.0 / (y * y))) / y
    };
    erfcx * smoothed_exp_of_negative_square(y)
}

/// Error function `erf(z) = 2/√π ∫₀ᶻ exp(−t²) dt`.
///
/// # Examples
/// ```
/// use rationalvol::special::erf;
/// assert_eq!(erf(0.0), 0.0);
/// assert!((erf(1.0) - 0.8427007929497149).abs() < 1e-15);
/// ```
pub fn erf(z: f64) -> f64 {
    let y = z.abs();
    if y <= CODY_THRESHOLD {
        return z * small_ratio(y * y);
    }
    let erfc_abs = erfc_of_abs_above_threshold(y);
    if z < 0.0 { erfc_abs - 1.0 } else { 1.0 - erfc_abs }
}

/// Complementary error function `erfc(z) = 1 − erf(z)`, without cancellation for large `z`.
///
/// Returns exactly 0 for `z ≥ 26.543`.
pub fn erfc(z: f64) -> f64 {
    let y = z.abs();
    if y <= CODY_THRESHOLD {
        return 1.0 - z * small_ratio(y * y);
    }
    let erfc_abs = erfc_of_abs_above_threshold(y);
    if z < 0.0 { 2.0 - erfc_abs } else { erfc_abs }
}

/// Scaled complementary error function `erfcx(z) = exp(z²)·erfc(z)`.
///
/// Saturates to `DBL_MAX` for `z < −26.6287357137514`, decays as
/// `1/(√π·z)` for `z ≥ 6.71·10⁷` and returns 0 for `z ≥ 2.53·10³⁰⁷`.
pub fn erfcx(z: f64) -> f64 {
    let y = z.abs();
    if y <= CODY_THRESHOLD {
        let z2 = y * y;
        return z2.exp() * (1.0 - z * small_ratio(z2));
    }
    if z < XNEG {
        return f64::MAX;
    }
    let result = erfcx_above_threshold(y);
    if z < 0.0 {
        let exp_z2 = smoothed_exp_of_positive_square(z);
        return (exp_z2 + exp_z2) - result;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // --- Reference values (computed at 50 digits) ---

    #[test]
    fn erf_reference_values() {
        assert_relative_eq!(erf(0.1), 0.11246291601828489, max_relative = 1e-15);
        assert_relative_eq!(erf(0.5), 0.5204998778130465, max_relative = 1e-15);
        assert_relative_eq!(erf(1.0), 0.8427007929497149, max_relative = 1e-15);
        assert_relative_eq!(erf(2.0), 0.9953222650189527, max_relative = 1e-15);
        assert_relative_eq!(erf(-3.0), -0.9999779095030014, max_relative = 1e-15);
    }

    #[test]
    fn erfc_reference_values() {
        assert_relative_eq!(erfc(0.3), 0.6713732405408726, max_relative = 1e-15);
        assert_relative_eq!(erfc(1.0), 0.15729920705028513, max_relative = 1e-15);
        assert_relative_eq!(erfc(5.0), 1.5374597944280349e-12, max_relative = 1e-14);
        assert_relative_eq!(erfc(10.0), 2.088487583762545e-45, max_relative = 1e-14);
        assert_relative_eq!(erfc(-1.0), 1.8427007929497148, max_relative = 1e-15);
    }

    #[test]
    fn erfcx_reference_values() {
        assert_relative_eq!(erfcx(0.0), 1.0, max_relative = f64::EPSILON);
        assert_relative_eq!(erfcx(1.0), 0.42758357615580705, max_relative = 1e-15);
        assert_relative_eq!(erfcx(10.0), 0.05614099274382259, max_relative = 1e-15);
        assert_relative_eq!(erfcx(-1.0), 5.00898008076228, max_relative = 1e-15);
    }

    // --- Saturation policy ---

    #[test]
    fn erfc_underflows_to_zero_beyond_xbig() {
        assert_eq!(erfc(26.543), 0.0);
        assert_eq!(erfc(1e10), 0.0);
        assert_eq!(erfc(-30.0), 2.0);
    }

    #[test]
    fn erfcx_large_argument_policy() {
        let z = 1e8;
        assert_relative_eq!(erfcx(z), ONE_OVER_SQRT_PI / z, max_relative = f64::EPSILON);
        assert_eq!(erfcx(3e307), 0.0);
        assert_eq!(erfcx(-27.0), f64::MAX);
    }

    #[test]
    fn erfcx_asymptote_is_continuous_at_xhuge() {
        let below = erfcx(XHUGE * (1.0 - 1e-12));
        let above = erfcx(XHUGE);
        assert_relative_eq!(below, above, max_relative = 1e-11);
    }

    // --- Symmetries ---

    #[test]
    fn erf_is_odd() {
        for &z in &[1e-300, 1e-8, 0.3, 0.46875, 0.5, 1.7, 4.0, 4.5, 12.0, 30.0] {
            assert_eq!(erf(-z), -erf(z), "z = {z}");
        }
    }

    #[test]
    fn erf_and_erfc_are_complementary() {
        for &z in &[-3.0, -0.9, -0.2, 0.0, 0.2, 0.9, 3.0] {
            assert_relative_eq!(erf(z) + erfc(z), 1.0, max_relative = 1e-15);
        }
    }

    #[test]
    fn erfcx_matches_scaled_erfc_in_moderate_range() {
        for &z in &[0.1, 0.46875, 0.5, 1.0, 2.5, 4.0, 4.5, 6.0] {
            assert_relative_eq!(erfcx(z), (z * z).exp() * erfc(z), max_relative = 1e-14);
        }
    }

    #[test]
    fn nan_propagates() {
        assert!(erf(f64::NAN).is_nan());
        assert!(erfc(f64::NAN).is_nan());
        assert!(erfcx(f64::NAN).is_nan());
    }
}
