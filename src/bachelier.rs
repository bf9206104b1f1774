//! Bachelier (normal) prices and implied normal volatility.
//!
//! With `s = σ√T` the Bachelier price is `s·f(θ(F−K)/s)` where
//! `f(x) = x·Φ(x) + φ(x)`. Writing `Φ̃(x) = f(x)/x = Φ(x) + φ(x)/x`, the
//! implied volatility follows from `Φ̃⁻¹` in closed form: a rational seed
//! and one third-order correction step, with no iteration loop.
//!
//! `f` is evaluated piecewise, since both `x·Φ(x) + φ(x)` and `Φ(x) + φ(x)/x`
//! cancel once `x < −0.61200318096248076056`:
//!
//! | Range | Method |
//! |---|---|
//! | `|x| ≤ 0.612…` | `1/√(2π) + x·(½ + x·g(x²))` |
//! | `x > 0.612…` | `f(x) = f(−x) + x` |
//! | `−3.5 ≤ x < −0.612…` | `exp(−x²/2)·g(x)` |
//! | `x < −3.5` | `φ(x)·w·(1 − g(w)·w)` with `w = 1/x²` |
//!
//! # References
//! - Jäckel, P. "Implied Normal Volatility", Wilmott (2017), pp. 52–54.

use crate::constants::{ONE_OVER_SQRT_TWO_PI, SQRT_TWO_PI, VOLATILITY_BELOW_INTRINSIC};
use crate::conventions::intrinsic_value;
use crate::polynomial::{horner, mul_add};
use crate::special::{Cody, SpecialFunctions};

/// Root of `x·Φ(x)/φ(x) = −½`; below it the direct forms cancel.
const CANCELLATION_THRESHOLD: f64 = 0.61200318096248076056;

/// `x·Φ̃(x) = x·Φ(x) + φ(x)`.
///
/// # Examples
///
/// ```
/// use rationalvol::bachelier::phi_tilde_times_x;
///
/// assert!((phi_tilde_times_x(0.0) - 0.3989422804014327).abs() < 1e-16);
/// assert!((phi_tilde_times_x(-1.0) - 0.0833154705876863).abs() < 1e-16);
/// ```
pub fn phi_tilde_times_x(x: f64) -> f64 {
    if x.abs() <= CANCELLATION_THRESHOLD {
        let h = (x * x - 1.8727394675409748661E-1) * 5.3397710537550806412;
        let g = horner(h, &[1.9641549843774702457E-1, 2.9444812226268915305E-3, 3.095828855856470717E-5])
            / horner(
                h,
                &[
                    1.0,
                    3.0261016846592326803E-2,
                    3.3735461911896198861E-4,
                    1.290112376540573289E-6,
                    -1.6711975835244204502E-9,
                ],
            );
        return ONE_OVER_SQRT_TWO_PI + x * mul_add(x, g, 0.5);
    }
    if x > 0.0 {
        return phi_tilde_times_x(-x) + x;
    }
    if x >= -3.5 {
        let g = horner(
            x,
            &[
                3.9894228040096173296E-1,
                -2.8827250122716400843E-1,
                1.1748934770055073669E-1,
                -2.9208930498324232842E-2,
                4.6704817087348921557E-3,
                -4.4448405482476358857E-4,
                1.9865267442385935787E-5,
                7.6387393474143610035E-10,
                1.3291525220137582449E-11,
            ],
        ) / horner(
            x,
            &[
                1.0,
                -1.9759061396728604494,
                1.7709332198933623888,
                -9.4350250026446231963E-1,
                3.2816118145388593816E-1,
                -7.6697408088214742324E-2,
                1.1843224303096222834E-2,
                -1.1151416365524860908E-3,
                4.9741005333758689307E-5,
            ],
        );
        return (-0.5 * (x * x)).exp() * g;
    }
    // g(w) → 3 as w → 0; f underflows below x ≈ −38.37
    let w = 1.0 / (x * x);
    let g = horner(
        w,
        &[
            2.999999999999991221,
            2.3654556627823149931E2,
            6.8126773449358787324E3,
            8.9697941598360784061E4,
            5.5163920591268613879E5,
            1.4345061123335662019E6,
            1.1504988246344881836E6,
            1.1867600400997691371E4,
        ],
    ) / horner(
        w,
        &[
            1.0,
            8.3848522092737134602E1,
            2.6551350587809577877E3,
            4.0555290884673789153E4,
            3.166737476299376429E5,
            1.2329795958024320559E6,
            2.1409810540619049948E6,
            1.2145667804093160403E6,
        ],
    );
    ONE_OVER_SQRT_TWO_PI * (-0.5 * (x * x)).exp() * w * mul_add(-g, w, 1.0)
}

/// `Φ̃(x) = Φ(x) + φ(x)/x`.
#[inline]
pub fn phi_tilde(x: f64) -> f64 {
    phi_tilde_times_x(x) / x
}

/// Inverse of [`phi_tilde`].
///
/// `Φ̃` maps `(−∞, 0)` onto `(−∞, 0)` and `(0, ∞)` onto `(1, ∞)`; arguments
/// in `[0, 1]` return NaN.
pub fn inverse_phi_tilde(phi_tilde_star: f64) -> f64 {
    inverse_phi_tilde_with::<Cody>(phi_tilde_star)
}

pub fn inverse_phi_tilde_with<S: SpecialFunctions>(phi_tilde_star: f64) -> f64 {
    if phi_tilde_star > 1.0 {
        return -inverse_phi_tilde_with::<S>(1.0 - phi_tilde_star);
    }
    if phi_tilde_star >= 0.0 {
        return f64::NAN;
    }
    let x_bar = if phi_tilde_star < -0.00188203927 {
        let g = 1.0 / (phi_tilde_star - 0.5);
        let g2 = g * g;
        let xi_bar = horner(g2, &[0.032114372355, -0.016969777977, 0.002620733246, -0.000096066952861])
            / horner(g2, &[1.0, -0.6635646938, 0.14528712196, -0.010472855461]);
        g * mul_add(xi_bar, g2, ONE_OVER_SQRT_TWO_PI)
    } else {
        let h = (-(-phi_tilde_star).ln()).sqrt();
        horner(h, &[9.4883409779, -9.6320903635, 0.58556997323, 2.1464093351])
            / horner(h, &[1.0, -0.65174820867, -1.5120247828, -0.000066437847132])
    };
    // one third-order correction
    let q = (phi_tilde(x_bar) - phi_tilde_star) / S::norm_pdf(x_bar);
    let x2 = x_bar * x_bar;
    x_bar
        + 3.0 * q * x2 * (2.0 - q * x_bar * (2.0 + x2))
            / (6.0 + q * x_bar * (-12.0 + x_bar * (6.0 * q + x_bar * (-6.0 + q * x_bar * (3.0 + x2)))))
}

/// Bachelier price of a call (`theta = 1`) or put (`theta = −1`).
///
/// The sign of `sigma` is ignored. A total volatility below `DBL_MIN`
/// gives the intrinsic value.
pub fn bachelier(forward: f64, strike: f64, sigma: f64, t: f64, theta: f64) -> f64 {
    let s = sigma.abs() * t.sqrt();
    if s < f64::MIN_POSITIVE {
        return intrinsic_value(forward, strike, theta);
    }
    let moneyness = if theta < 0.0 { strike - forward } else { forward - strike };
    s * phi_tilde_times_x(moneyness / s)
}

/// Implied normal volatility of a Bachelier price.
///
/// Returns 0 at intrinsic and [`VOLATILITY_BELOW_INTRINSIC`] below it.
/// There is no upper bound on Bachelier prices.
///
/// # Examples
///
/// ```
/// use rationalvol::bachelier::{bachelier, implied_normal_volatility};
///
/// let price = bachelier(100.0, 110.0, 16.0, 1.0, 1.0);
/// let vol = implied_normal_volatility(price, 100.0, 110.0, 1.0, 1.0);
/// assert!((vol - 16.0).abs() < 1e-12);
/// ```
pub fn implied_normal_volatility(price: f64, forward: f64, strike: f64, t: f64, theta: f64) -> f64 {
    implied_normal_volatility_with::<Cody>(price, forward, strike, t, theta)
}

pub fn implied_normal_volatility_with<S: SpecialFunctions>(
    price: f64,
    forward: f64,
    strike: f64,
    t: f64,
    theta: f64,
) -> f64 {
    if forward == strike {
        return price * SQRT_TWO_PI / t.sqrt();
    }
    let intrinsic = intrinsic_value(forward, strike, theta);
    if price == intrinsic {
        return 0.0;
    }
    if price < intrinsic {
        return VOLATILITY_BELOW_INTRINSIC;
    }
    let absolute_moneyness = (forward - strike).abs();
    let phi_tilde_star = (intrinsic - price) / absolute_moneyness;
    let x_star = inverse_phi_tilde_with::<S>(phi_tilde_star);
    absolute_moneyness / (x_star * t.sqrt()).abs()
}
