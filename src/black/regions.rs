//! Region-wise evaluation of the normalised Black function.
//!
//! With `h = θx/s` and `t = s/2` the out-of-the-money normalised Black
//! price is
//!
//! ```text
//! b(θx, s) = Φ(h+t)·exp(θx/2) − Φ(h−t)·exp(−θx/2),     θx ≤ 0, s > 0.
//! ```
//!
//! Evaluating this literally loses all accuracy in the wings. Instead the
//! `(θx, s)` plane is split into four regions, each with its own formula:
//!
//! | Region | Test | Method |
//! |---|---|---|
//! | I   | `h < η` and `t < τ + ½ − h + η` | asymptotic series for `b/b′` |
//! | II  | `t < τ + ½·h/η` | Taylor series in `t` for `b/b′` |
//! | III | `h + t > 0.85` | one `exp` plus `erfc`/`erfcx` |
//! | IV  | otherwise | one `exp` plus `erfc`/`erfcx` |
//!
//! with `η = −13` and `τ = 2·ε^(1/16)`. Regions III and IV share the same
//! evaluator, which picks among four algebraically equivalent forms so that
//! Cody's `erfc`/`erfcx` are only ever called where they are accurate.

use crate::constants::{
    LN_TWO_PI, ONE_OVER_SQRT_TWO, ONE_OVER_SQRT_TWO_PI, SIXTEENTH_ROOT_DBL_EPSILON,
    SQRT_PI_OVER_TWO, SQRT_TWO_PI,
};
use crate::special::{CODY_THRESHOLD, SpecialFunctions};

/// Region I/II boundary parameter `η`.
pub(crate) const ETA: f64 = -13.0;
/// Region I/II boundary parameter `τ = 2·ε^(1/16)`.
pub(crate) const TAU: f64 = 2.0 * SIXTEENTH_ROOT_DBL_EPSILON;

/// Numerical regime used to evaluate the normalised Black function at `(θx, s)`.
///
/// # Examples
///
/// ```
/// use rationalvol::black::BlackRegion;
///
/// assert_eq!(BlackRegion::classify(-1000.0, 1.0), BlackRegion::AsymptoticExpansion);
/// assert_eq!(BlackRegion::classify(-0.01, 0.1), BlackRegion::SmallTimeExpansion);
/// assert_eq!(BlackRegion::classify(-1.0, 3.0), BlackRegion::CodyErfc);
/// assert_eq!(BlackRegion::classify(-5.0, 1.0), BlackRegion::CodyErfcx);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlackRegion {
    /// Region I: far out of the money at moderate volatility.
    AsymptoticExpansion,
    /// Region II: small total volatility.
    SmallTimeExpansion,
    /// Region III: `h + t > 0.85`.
    CodyErfc,
    /// Region IV: everything else.
    CodyErfcx,
}

impl BlackRegion {
    /// Classify `(θx, s)`, with `θx ≤ 0` and `s > 0`.
    pub fn classify(theta_x: f64, s: f64) -> Self {
        if theta_x < s * ETA && s * (0.5 * s - (TAU + 0.5 + ETA)) + theta_x < 0.0 {
            Self::AsymptoticExpansion
        } else if s * (s - 2.0 * TAU) - theta_x / ETA < 0.0 {
            Self::SmallTimeExpansion
        } else if s * (0.5 * s - 0.85) + theta_x > 0.0 {
            Self::CodyErfc
        } else {
            Self::CodyErfcx
        }
    }

    /// Whether `b/b′` is evaluated directly by a series in this region.
    pub fn is_series(self) -> bool {
        matches!(self, Self::AsymptoticExpansion | Self::SmallTimeExpansion)
    }
}

/// Values of `−h − t + τ + ½` above which the asymptotic series is cut one term shorter.
const ASYMPTOTIC_TRUNCATION_THRESHOLDS: [f64; 12] = [
    12.347, 12.958, 13.729, 14.718, 16.016, 17.769, 20.221, 23.816, 29.419, 38.93, 57.171, 99.347,
];

/// Coefficient `Aₖ(e)` of `qᵏ` in the asymptotic series, for `5 ≤ k ≤ 16`.
#[rustfmt::skip]
fn asymptotic_series_coefficient(k: usize, e: f64) -> f64 {
    match k {
        5 => -2.079E4 + e * (-3.1185E5 + e * (-8.7318E5 + e * (-6.237E5 + e * (-1.0395E5 - 1.89E3 * e)))),
        6 => 2.7027E5 + e * (5.94594E6 + e * (2.675673E7 + e * (3.567564E7 + e * (1.486485E7 + e * (1.62162E6 + 2.079E4 * e))))),
        7 => -4.05405E6 + e * (-1.2297285E8 + e * (-8.1162081E8 + e * (-1.73918745E9 + e * (-1.35270135E9 + e * (-3.6891855E8 + e * (-2.837835E7 - 2.7027E5 * e)))))),
        8 => 6.891885E7 + e * (2.756754E9 + e * (2.50864614E10 + e * (7.88431644E10 + e * (9.85539555E10 + e * (5.01729228E10 + e * (9.648639E9 + e * (5.513508E8 + 4.05405E6 * e))))))),
        9 => -1.30945815E9 + e * (-6.678236565E10 + e * (-8.013883878E11 + e * (-3.4726830138E12 + e * (-6.3665855253E12 + e * (-5.2090245207E12 + e * (-1.8699062382E12 + e * (-2.671294626E11 + e * (-1.178512335E10 - 6.891885E7 * e)))))))),
        10 => 2.749862115E10 + e * (1.7415793395E12 + e * (2.664616389435E13 + e * (1.52263793682E14 + e * (3.848890340295E14 + e * (4.618668408354E14 + e * (2.664616389435E14 + e * (7.10564370516E13 + e * (7.83710702775E12 + e * (2.749862115E11 + 1.30945815E9 * e))))))))),
        11 => -6.3246828645E11 + e * (-4.870005805665E13 + e * (-9.2530110307635E14 + e * (-6.74147946527055E15 + e * (-2.24715982175685E16 + e * (-3.71802806872497E16 + e * (-3.14602375045959E16 + e * (-1.34829589305411E16 + e * (-2.77590330922905E15 + e * (-2.4350029028325E14 + e * (-6.95715115095E12 - 2.749862115E10 * e)))))))))),
        12 => 1.581170716125E13 + e * (1.454677058835E15 + e * (3.36030400590885E16 + e * (3.04027505296515E17 + e * (1.29211689751018875E18 + e * (2.81916414002223E18 + e * (3.289024830025935E18 + e * (2.067387036016302E18 + e * (6.8406188691715875E17 + e * (1.12010133530295E17 + e * (8.0007238235925E15 + e * (1.89740485935E14 + 6.3246828645E11 * e))))))))))),
        13 => -4.2691609335375E14 + e * (-4.624924344665625E16 + e * (-1.2764791191277125E18 + e * (-1.40412703104048375E19 + e * (-7.41067044160255312E19 + e * (-2.06151377739125569E20 + e * (-3.17155965752500875E20 + e * (-2.74868503652167425E20 + e * (-1.33392067948845956E20 + e * (-3.51031757760120938E19 + e * (-4.6804234368016125E18 + e * (-2.774954606799375E17 + e * (-5.54990921359875E15 - 1.581170716125E13 * e)))))))))))),
        14 => 1.238056670725875E16 + e * (1.5599514051146025E18 + e * (5.06984206662245812E19 + e * (6.66322100184665925E20 + e * (4.27556680951827302E21 + e * (1.47701398874267613E22 + e * (2.89721974714909549E22 + e * (3.31110828245610914E22 + e * (2.2155209831140142E22 + e * (8.55113361903654604E21 + e * (1.83238577550783129E21 + e * (2.02793682664898325E20 + e * (1.01396841332449162E19 + e * (1.733279339016225E17 + 4.2691609335375E14 * e))))))))))))),
        15 => -3.8379756792502125E17 + e * (-5.56506473491280812E19 + e * (-2.10359446979704147E21 + e * (-3.25556286992399275E22 + e * (-2.49593153360839444E23 + e * (-1.04829124411552567E24 + e * (-2.55352995361474201E24 + e * (-3.72085793241005264E24 + e * (-3.28310994036181115E24 + e * (-1.74715207352587611E24 + e * (-5.49104937393846778E23 + e * (-9.76668860977197826E22 + e * (-9.11557603578717971E21 + e * (-3.89554531443896569E20 + e * (-5.75696351887531875E18 - 1.238056670725875E16 * e)))))))))))))),
        16 => 1.26653197415257012E19 + e * (2.09399953059891594E21 + e * (9.10889795810528434E22 + e * (1.63960163245895118E24 + e * (1.48019591819210871E25 + e * (7.42789224401858187E25 + e * (2.19979885688242617E26 + e * (3.98058840769200926E26 + e * (4.47816195865351041E26 + e * (3.1425697955463231E26 + e * (1.36178024473674001E26 + e * (3.55247020366106089E25 + e * (5.32870530549159134E24 + e * (4.25081904711579936E23 + e * (1.57049964794918696E22 + e * (2.0264511586441122E20 + 3.8379756792502125E17 * e))))))))))))))),
        _ => 0.0,
    }
}

/// `b/b′` in region I from the asymptotic expansion (Abramowitz & Stegun 26.2.12).
///
/// With `r = (h+t)(h−t)`, `q = (h/r)²` and `e = (t/h)²`, this is
/// `(t/r)·Σ Aₖ(e)·qᵏ`, truncated at between 5 and 17 terms depending on how
/// far out `h + t` lies.
pub(crate) fn asymptotic_expansion_of_scaled_normalised_black(h: f64, t: f64) -> f64 {
    debug_assert!(h < ETA);
    let e = (t / h) * (t / h);
    let r = (h + t) * (h - t);
    let q = (h / r) * (h / r);
    let cut = ASYMPTOTIC_TRUNCATION_THRESHOLDS.partition_point(|&threshold| threshold <= -h - t + TAU + 0.5);
    let mut omega = 0.0;
    for k in (5..=16 - cut).rev() {
        omega = q * (asymptotic_series_coefficient(k, e) + omega);
    }
    let a1 = -6.0 - 2.0 * e;
    let a2 = 30.0 + e * (60.0 + 6.0 * e);
    let a3 = -2.1E2 + e * (-1.05E3 + e * (-6.3E2 - 30.0 * e));
    let a4 = 1.89E3 + e * (1.764E4 + e * (2.646E4 + e * (7.56E3 + 2.1E2 * e)));
    omega = 2.0 + q * (a1 + q * (a2 + q * (a3 + q * (a4 + omega))));
    (t / r) * omega
}

/// `(Y′(h)/h² − 1)/h²` as a rational function of `w = 1/h²`, for `h < −4`.
#[inline]
fn y_prime_tail(w: f64) -> f64 {
    w * (-2.9999999999994663866
        + w * (-1.7556263323542206288E2
            + w * (-3.4735035445495633334E3
                + w * (-2.7805745693864308643E4
                    + w * (-8.3836021460741980839E4 - 6.6818249032616849037E4 * w)))))
        / (1.0
            + w * (6.3520877744831739102E1
                + w * (1.4404389037604337538E3
                    + w * (1.4562545638507033944E4
                        + w * (6.6886794165651675684E4
                            + w * (1.2569970380923908488E5 + 6.9286518679803751694E4 * w))))))
}

/// `Y′(h) = 1 + h·Y(h)` with `Y(h) = Φ(h)/φ(h)`, free of cancellation for `h → −∞`.
pub(crate) fn y_prime<S: SpecialFunctions>(h: f64) -> f64 {
    if h < -4.0 {
        let w = 1.0 / (h * h);
        return w * (1.0 + y_prime_tail(w));
    }
    if h <= -CODY_THRESHOLD {
        return (1.0000000000594317229
            - h * (6.1911449879694112749E-1
                - h * (2.2180844736576013957E-1
                    - h * (4.5650900351352987865E-2
                        - h * (5.545521007735379052E-3
                            - h * (3.0717392274913902347E-4
                                - h * (4.2766597835908713583E-8 + 8.4592436406580605619E-10 * h)))))))
            / (1.0
                - h * (1.8724286369589162071
                    - h * (1.5685497236077651429
                        - h * (7.6576489836589035112E-1
                            - h * (2.3677701403094640361E-1
                                - h * (4.6762548903194957675E-2
                                    - h * (5.5290453576936595892E-3 - 3.0822020417927147113E-4 * h)))))));
    }
    1.0 + h * SQRT_PI_OVER_TWO * S::erfcx(-ONE_OVER_SQRT_TWO * h)
}

/// `b/b′` in region II from the Taylor expansion in `t` to twelfth order.
pub(crate) fn small_t_expansion_of_scaled_normalised_black<S: SpecialFunctions>(h: f64, t: f64) -> f64 {
    let a = y_prime::<S>(h);
    let h2 = h * h;
    let t2 = t * t;
    let b0 = 2.0 * a;
    let b1 = (-1.0 + a * (3.0 + h2)) / 3.0;
    let b2 = (-7.0 - h2 + a * (15.0 + h2 * (10.0 + h2))) / 60.0;
    let b3 = (-57.0 + (-18.0 - h2) * h2 + a * (105.0 + h2 * (105.0 + h2 * (21.0 + h2)))) / 2520.0;
    let b4 = (-561.0
        + h2 * (-285.0 + (-33.0 - h2) * h2)
        + a * (945.0 + h2 * (1260.0 + h2 * (378.0 + h2 * (36.0 + h2)))))
        / 181440.0;
    let b5 = (-6555.0
        + h2 * (-4680.0 + h2 * (-840.0 + (-52.0 - h2) * h2))
        + a * (10395.0 + h2 * (17325.0 + h2 * (6930.0 + h2 * (990.0 + h2 * (55.0 + h2))))))
        / 19958400.0;
    let b6 = (-89055.0
        + h2 * (-82845.0 + h2 * (-20370.0 + h2 * (-1926.0 + (-75.0 - h2) * h2)))
        + a * (135135.0
            + h2 * (270270.0 + h2 * (135135.0 + h2 * (25740.0 + h2 * (2145.0 + h2 * (78.0 + h2)))))))
        / 3113510400.0;
    t * (b0 + t2 * (b1 + t2 * (b2 + t2 * (b3 + t2 * (b4 + t2 * (b5 + b6 * t2))))))
}

/// `b(θx, s)` in regions III and IV.
///
/// With `q₁ = −(h+t)/√2` and `q₂ = −(h−t)/√2`, each of the two terms of
/// `2b = exp(θx/2)·erfc(q₁) − exp(−θx/2)·erfc(q₂)` is evaluated through
/// `erfc` when its argument is below Cody's threshold and through
/// `exp(−(h²+t²)/2)·erfcx` otherwise.
pub(crate) fn normalised_black_with_optimal_use_of_codys_functions<S: SpecialFunctions>(
    theta_x: f64,
    s: f64,
) -> f64 {
    let h = theta_x / s;
    let t = 0.5 * s;
    let q1 = -ONE_OVER_SQRT_TWO * (h + t);
    let q2 = -ONE_OVER_SQRT_TWO * (h - t);
    // signed comparisons: negative arguments go through erfc
    let two_b = if q1 < CODY_THRESHOLD {
        if q2 < CODY_THRESHOLD {
            (0.5 * theta_x).exp() * S::erfc(q1) - (-0.5 * theta_x).exp() * S::erfc(q2)
        } else {
            (0.5 * theta_x).exp() * S::erfc(q1) - (-0.5 * (h * h + t * t)).exp() * S::erfcx(q2)
        }
    } else if q2 < CODY_THRESHOLD {
        (-0.5 * (h * h + t * t)).exp() * S::erfcx(q1) - (-0.5 * theta_x).exp() * S::erfc(q2)
    } else {
        (-0.5 * (h * h + t * t)).exp() * (S::erfcx(q1) - S::erfcx(q2))
    };
    (0.5 * two_b).max(0.0)
}

/// `∂b/∂s = exp(−(h²+t²)/2)/√(2π)` for `s > 0`.
#[inline]
pub(crate) fn normalised_vega(x: f64, s: f64) -> f64 {
    let h = x / s;
    let t = 0.5 * s;
    ONE_OVER_SQRT_TWO_PI * (-0.5 * (h * h + t * t)).exp()
}

/// `1/(∂b/∂s)` evaluated directly, for `s > 0`.
#[inline]
pub(crate) fn inv_normalised_vega(x: f64, s: f64) -> f64 {
    let h = x / s;
    let t = 0.5 * s;
    SQRT_TWO_PI * (0.5 * (h * h + t * t)).exp()
}

/// `ln(∂b/∂s)` for `s > 0`.
#[inline]
pub(crate) fn ln_normalised_vega(x: f64, s: f64) -> f64 {
    let h = x / s;
    let t = 0.5 * s;
    -0.5 * LN_TWO_PI - 0.5 * (h * h + t * t)
}

/// `b(θx, s)` for `θx < 0` and `s > 0`.
pub(crate) fn normalised_black<S: SpecialFunctions>(theta_x: f64, s: f64) -> f64 {
    debug_assert!(!(theta_x >= 0.0 || s <= 0.0));
    match BlackRegion::classify(theta_x, s) {
        BlackRegion::AsymptoticExpansion => {
            asymptotic_expansion_of_scaled_normalised_black(theta_x / s, 0.5 * s)
                * normalised_vega(theta_x, s)
        }
        BlackRegion::SmallTimeExpansion => {
            small_t_expansion_of_scaled_normalised_black::<S>(theta_x / s, 0.5 * s)
                * normalised_vega(theta_x, s)
        }
        BlackRegion::CodyErfc | BlackRegion::CodyErfcx => {
            normalised_black_with_optimal_use_of_codys_functions::<S>(theta_x, s)
        }
    }
}

/// `(b/b′, ln b′)` at `(θx, s)` for `θx < 0` and `s > 0`.
///
/// In regions I and II the ratio comes straight from the series, so it
/// stays finite even where `b` and `b′` both underflow.
pub(crate) fn scaled_normalised_black_and_ln_vega<S: SpecialFunctions>(theta_x: f64, s: f64) -> (f64, f64) {
    debug_assert!(!(theta_x >= 0.0 || s <= 0.0));
    let ln_vega = ln_normalised_vega(theta_x, s);
    let bx = match BlackRegion::classify(theta_x, s) {
        BlackRegion::AsymptoticExpansion => {
            asymptotic_expansion_of_scaled_normalised_black(theta_x / s, 0.5 * s)
        }
        BlackRegion::SmallTimeExpansion => {
            small_t_expansion_of_scaled_normalised_black::<S>(theta_x / s, 0.5 * s)
        }
        BlackRegion::CodyErfc | BlackRegion::CodyErfcx => {
            normalised_black_with_optimal_use_of_codys_functions::<S>(theta_x, s) * (-ln_vega).exp()
        }
    };
    (bx, ln_vega)
}

/// `b̄ = bₘₐₓ − b = ½·(erfcx((t+h)/√2) + erfcx((t−h)/√2))·exp(−(t²+h²)/2)`.
///
/// Both terms are positive, so there is no cancellation for prices close
/// to `bₘₐₓ`.
pub(crate) fn complementary_normalised_black<S: SpecialFunctions>(h: f64, t: f64) -> f64 {
    0.5 * (S::erfcx((t + h) * ONE_OVER_SQRT_TWO) + S::erfcx((t - h) * ONE_OVER_SQRT_TWO))
        * (-0.5 * (t * t + h * h)).exp()
}
