//! Standard normal density, distribution and quantile functions.
//!
//! The quantile uses two rational minimax approximations: one on the
//! central interval `|p − ½| < 0.3413447460685429` (the probability mass
//! within one standard deviation) and a five-piece approximation in
//! `r = √(−ln p)` for the tails. Both are accurate to better than `1E-16`
//! in perfect arithmetic, so no Newton polish step is applied.

use super::erf_cody::erfc;
use crate::constants::{DBL_EPSILON, ONE_OVER_SQRT_TWO, ONE_OVER_SQRT_TWO_PI};
use crate::polynomial::horner;

/// Below this, `Φ(z)` is summed from its asymptotic series.
const ASYMPTOTIC_EXPANSION_FIRST_THRESHOLD: f64 = -10.0;
/// `−1/√ε`. Below this, the first term of the series is already exact.
const ASYMPTOTIC_EXPANSION_SECOND_THRESHOLD: f64 = -67_108_864.0;

/// Half-width of the central quantile interval: `Φ(1) − ½`.
const U_MAX: f64 = 0.3413447460685429;

/// Standard normal density `φ(x) = exp(−x²/2)/√(2π)`.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    ONE_OVER_SQRT_TWO_PI * (-0.5 * x * x).exp()
}

/// Standard normal distribution function `Φ(z)`.
///
/// For `z ≤ −10` this sums the asymptotic series
/// `Φ(z) ≈ φ(z)/|z| · Σ (−1)ᵏ (2k−1)!! / z²ᵏ` until terms stop decreasing
/// or fall below `ε` relative to the partial sum; elsewhere it evaluates
/// `½·erfc(−z/√2)`.
///
/// # Examples
/// ```
/// use rationalvol::special::norm_cdf;
/// assert_eq!(norm_cdf(0.0), 0.5);
/// assert!((norm_cdf(-1.0) - 0.15865525393145705).abs() < 1e-15);
/// ```
pub fn norm_cdf(z: f64) -> f64 {
    if z <= ASYMPTOTIC_EXPANSION_FIRST_THRESHOLD {
        let mut sum = 1.0;
        if z >= ASYMPTOTIC_EXPANSION_SECOND_THRESHOLD {
            let zsqr = z * z;
            let mut i = 1.0;
            let mut g = 1.0;
            let mut a = f64::MAX;
            loop {
                let last_a = a;
                let x = (4.0 * i - 3.0) / zsqr;
                let y = x * ((4.0 * i - 1.0) / zsqr);
                a = g * (x - y);
                sum -= a;
                g *= y;
                i += 1.0;
                a = a.abs();
                if !(last_a > a && a >= (sum * DBL_EPSILON).abs()) {
                    break;
                }
            }
        }
        return -norm_pdf(z) * sum / z;
    }
    0.5 * erfc(-z * ONE_OVER_SQRT_TWO)
}

/// `Φ⁻¹(p)` for `p ≤ Φ(−1)`. NaN passes through.
pub(crate) fn inverse_norm_cdf_for_low_probabilities(p: f64) -> f64 {
    debug_assert!(!(p > 0.15865525393146));
    let r = (-p.ln()).sqrt();
    if r < 6.7 {
        if r < 3.41 {
            if r < 2.05 {
                horner(
                    r,
                    &[
                        3.691562302945566191,
                        4.7170590600740689449E1,
                        6.5451292110261454609E1,
                        -7.4594687726045926821E1,
                        -8.3383894003636969722E1,
                        -1.3054072340494093704E1,
                    ],
                ) / horner(
                    r,
                    &[
                        1.0,
                        2.0837211328697753726E1,
                        7.1813812182579255459E1,
                        5.9270122556046077717E1,
                        9.2216887978737432303,
                        1.8295174852053530579E-4,
                    ],
                )
            } else {
                horner(
                    r,
                    &[
                        3.2340179116317970288,
                        1.449177828689122096E1,
                        6.8397370256591532878E-1,
                        -1.81254427791789183E1,
                        -1.005916339568646151E1,
                        -1.2013147879435525574E0,
                    ],
                ) / horner(
                    r,
                    &[
                        1.0,
                        8.8820931773304337525,
                        1.4656370665176799712E1,
                        7.1369811056109768745,
                        8.4884892199149255469E-1,
                        1.0957576098829595323E-5,
                    ],
                )
            }
        } else {
            horner(
                r,
                &[
                    3.1252235780087584807,
                    9.9483724317036560676,
                    -5.1633929115525534628,
                    -1.1070534689309368061E1,
                    -2.8699061335882526744,
                    -1.5414319494013597492E-1,
                ],
            ) / horner(
                r,
                &[
                    1.0,
                    7.076769154309171622,
                    8.1086341122361532407,
                    2.0307076064309043613,
                    1.0897972234131828901E-1,
                    1.3565983564441297634E-7,
                ],
            )
        }
    } else if r < 12.9 {
        horner(
            r,
            &[
                2.6161264950897283681,
                2.250881388987032271,
                -3.688196041019692267,
                -2.9644251353150605663,
                -4.7595169546783216436E-1,
                -1.612303318390145052E-2,
            ],
        ) / horner(
            r,
            &[
                1.0,
                3.2517455169035921495,
                2.1282030272153188194,
                3.3663746405626400164E-1,
                1.1400087282177594359E-2,
                3.0848093570966787291E-9,
            ],
        )
    } else {
        horner(
            r,
            &[
                2.3226849047872302955,
                -4.2799650734502094297E-2,
                -2.5894451568465728432,
                -8.6385181219213758847E-1,
                -6.5127593753781672404E-2,
                -1.0566357727202585402E-3,
            ],
        ) / horner(
            r,
            &[
                1.0,
                1.9361316119254412206,
                6.1320841329197493341E-1,
                4.6054974512474443189E-2,
                7.471447992167225483E-4,
                2.3135343206304887818E-11,
            ],
        )
    }
}

/// `Φ⁻¹(½ + u)` for `|u| ≤ 0.3413447460685429`. NaN passes through.
fn inverse_norm_cdf_for_midrange_probabilities(u: f64) -> f64 {
    debug_assert!(!(u.abs() > U_MAX));
    let s = U_MAX * U_MAX - u * u;
    u * (horner(
        s,
        &[
            2.92958954698308805,
            5.0260572167303103E1,
            3.01870541922933937E2,
            7.4997781456657924E2,
            6.90489242061408612E2,
            1.34233243502653864E2,
            -7.58939881401259242,
        ],
    ) / horner(
        s,
        &[
            1.0,
            1.8918538074574598E1,
            1.29404120448755281E2,
            3.86821208540417453E2,
            4.79123914509756757E2,
            1.79227008508102628E2,
        ],
    ))
}

/// Inverse standard normal distribution function `Φ⁻¹(p)`.
///
/// Returns NaN for `p` outside `(0, 1)`.
///
/// # Examples
/// ```
/// use rationalvol::special::inverse_norm_cdf;
/// assert_eq!(inverse_norm_cdf(0.5), 0.0);
/// assert!((inverse_norm_cdf(0.975) - 1.959963984540054).abs() < 1e-14);
/// ```
pub fn inverse_norm_cdf(p: f64) -> f64 {
    let u = p - 0.5;
    if u.abs() < U_MAX {
        return inverse_norm_cdf_for_midrange_probabilities(u);
    }
    if u > 0.0 {
        -inverse_norm_cdf_for_low_probabilities(1.0 - p)
    } else {
        inverse_norm_cdf_for_low_probabilities(p)
    }
}

/// Inverse error function, `erf(erfinv(e)) = e` on `(−1, 1)`.
pub fn erfinv(e: f64) -> f64 {
    if e.abs() < 2.0 * U_MAX {
        return inverse_norm_cdf_for_midrange_probabilities(0.5 * e) * ONE_OVER_SQRT_TWO;
    }
    let q = if e < 0.0 {
        inverse_norm_cdf_for_low_probabilities(0.5 * e + 0.5)
    } else {
        -inverse_norm_cdf_for_low_probabilities(-0.5 * e + 0.5)
    };
    q * ONE_OVER_SQRT_TWO
}
