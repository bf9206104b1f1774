//! Branch boundaries and initial-guess transformations for the solver.
//!
//! For a given `θx < 0` the price axis `(0, bₘₐₓ)` is split at three
//! points. With the inflexion point `s_c = √(2|x|)` of `b(s)` and its vega
//! `v_c = bₘₐₓ/√(2π)` the tangent at `s_c` meets 0 at `sₗ` and `bₘₐₓ` at `sᵤ`:
//!
//! ```text
//! s_c = √(2|x|)            b_c = b(s_c) = ½·bₘₐₓ·(1 − erfcx(√|x|))
//! sₗ  = s_c − b_c/v_c      bₗ  = b(sₗ)
//! sᵤ  = s_c + (bₘₐₓ − b_c)/v_c   bᵤ = b(sᵤ)
//! ```
//!
//! `bₗ/bₘₐₓ` and `bᵤ/bₘₐₓ` depend on `s_c` alone and are evaluated by
//! four-piece rational approximations rather than by `b` itself.
//!
//! Outside `[bₗ, bᵤ]` the initial guess interpolates a transformed price
//! rather than `s`: the *lower map* `f = (2π/√27)·|x|·Φ(−|x|/(√3·s))³`
//! below `bₗ` and the *upper map* `f = Φ(−s/2)` above `bᵤ`, each of which
//! is close to linear in `β` and can be inverted in closed form.

use crate::constants::{
    ONE_OVER_SQRT_TWO, PI_OVER_SIX, SQRT_ONE_OVER_THREE, SQRT_PI_OVER_TWO, SQRT_THREE,
    SQRT_THREE_OVER_THIRD_ROOT_TWO_PI, TWO_PI, TWO_PI_OVER_SQRT_TWENTY_SEVEN,
};
use crate::polynomial::{horner, mul_add};
use crate::special::SpecialFunctions;

/// A transformed price and its first two derivatives with respect to `β`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MapDerivatives {
    pub f: f64,
    pub fp: f64,
    pub fpp: f64,
}

/// `1 − erfcx(x)` without cancellation for small `|x|`.
pub(crate) fn one_minus_erfcx<S: SpecialFunctions>(x: f64) -> f64 {
    if x < -1.0 / 5.0 || x > 1.0 / 3.0 {
        return 1.0 - S::erfcx(x);
    }
    // x·(2/√π − x·g(x)) with a (4,5) rational g on [−1/5, 1/3]
    let g = horner(
        x,
        &[
            1.0000000000000002,
            1.1514967181784756,
            5.7689001208873741E-1,
            1.4069188744609651E-1,
            1.4069285713634565E-2,
        ],
    ) / horner(
        x,
        &[
            1.0,
            1.9037494962421563,
            1.5089908593742723,
            6.2486081658640257E-1,
            1.358008134514386E-1,
            1.2463320728346347E-2,
        ],
    );
    x * mul_add(-x, g, 1.128379167095512573896)
}

/// `bₗ/bₘₐₓ` as a function of `s_c = √(2|x|)`.
pub(crate) fn bl_over_bmax(s_c: f64) -> f64 {
    if s_c < 2.6267851073127395 {
        if s_c < 0.7099295739719539 {
            // y²·(c₂ + y·(c₃ + y·g(y))) with the small-|x| expansion coefficients c₂, c₃
            let g = horner(
                s_c,
                &[
                    8.0741072372882856924E-2,
                    9.8078911786358897272E-2,
                    3.9760631445677058375E-2,
                    5.9716928459589189876E-3,
                    -6.4036399341479799981E-6,
                    4.5425102093616062245E-7,
                ],
            ) / horner(
                s_c,
                &[
                    1.0,
                    1.8594977672287664353,
                    1.3658801475711790419,
                    4.6132707108655653215E-1,
                    6.1254597049831720643E-2,
                ],
            );
            return (s_c * s_c)
                * mul_add(s_c, mul_add(s_c, g, -0.09672719281339436290858), 0.07560996640296361767172);
        }
        return horner(
            s_c,
            &[
                1.9795737927598581235E-9,
                -2.7081288564685588037E-8,
                7.5610142272549044609E-2,
                6.917130174466834016E-2,
                2.9537058950963019803E-2,
                6.5849252702302307774E-3,
                6.9711400639834715731E-4,
            ],
        ) / horner(
            s_c,
            &[
                1.0,
                2.1941448525586579756,
                2.1297103549995181357,
                1.1571483187179784072,
                3.7831622253060456794E-1,
                7.1714862448829349869E-2,
                6.6361975827861200167E-3,
            ],
        );
    }
    if s_c < 7.348469228349534 {
        return horner(
            s_c,
            &[
                -9.3325115354837883291E-5,
                5.3118033972794648837E-4,
                7.4114855448345002595E-2,
                7.4039658186822817454E-2,
                3.9225177407687604785E-2,
                1.0022913378254090083E-2,
                1.7012579407246055469E-3,
            ],
        ) / horner(
            s_c,
            &[
                1.0,
                2.2217238132228132256,
                2.3441816707087403282,
                1.3912323646271141826,
                5.3231258443501838354E-1,
                1.1744005919716101572E-1,
                1.6195405895930935811E-2,
            ],
        );
    }
    // Φ(−√(π/2)) + g(1/s_c)/s_c, simplified to a (6,6) rational in s_c
    horner(
        s_c,
        &[
            1.4500072297240603183E-3,
            -1.5116692485011195757E-3,
            7.1682178310936334831E-2,
            3.921610857820463493E-2,
            2.9342405658628443931E-2,
            5.1832526171631521426E-3,
            1.6930208078421474854E-3,
        ],
    ) / horner(
        s_c,
        &[
            1.0,
            1.6176313502305414664,
            1.6823159175281531664,
            8.4878307567372222113E-1,
            3.7543742137375791321E-1,
            7.126137099644302999E-2,
            1.6116992546788676159E-2,
        ],
    )
}

/// `bᵤ/bₘₐₓ` as a function of `s_c = √(2|x|)`.
pub(crate) fn bu_over_bmax(s_c: f64) -> f64 {
    if s_c < 1.7888543819998317 {
        if s_c < 0.7745966692414833 {
            // c₀ + y²·(c₂ + y·g(y))
            let g = horner(
                s_c,
                &[
                    -6.063099881233561706E-2,
                    -8.1011946637120604985E-2,
                    -4.2505564862438753828E-2,
                    -8.9880000946868691788E-3,
                    -7.5603072110443268356E-6,
                    4.3879556621540147458E-7,
                ],
            ) / horner(
                s_c,
                &[
                    1.0,
                    1.8400371530721828756,
                    1.5709283443886143691,
                    6.8913245453611400484E-1,
                    1.4703173061720980923E-1,
                ],
            );
            return mul_add(
                s_c * s_c,
                mul_add(s_c, g, 0.0614616805805147403487),
                0.7899085945560627246288,
            );
        }
        return horner(
            s_c,
            &[
                7.8990944435755287611E-1,
                -1.2655410534988972886,
                -2.8803040699221003256,
                -2.6936198689113258727,
                -1.1213067281643205754,
                -2.1277793801691629892E-1,
                5.1486445905299802703E-6,
            ],
        ) / horner(
            s_c,
            &[
                1.0,
                -1.6021222722060444448,
                -3.7242680976480704555,
                -3.2083117718907365085,
                -1.2922333835930958583,
                -2.3762328334050001161E-1,
            ],
        );
    }
    if s_c < 6.164414002968976 {
        return horner(
            s_c,
            &[
                7.8990640048967596475E-1,
                1.5993699253596663678,
                1.6481729039140370242,
                9.8227188109869200166E-1,
                3.6313557966186936883E-1,
                7.8277036261179606301E-2,
                9.3404307364538726214E-3,
            ],
        ) / horner(
            s_c,
            &[
                1.0,
                2.0247407005640401446,
                2.0087454279103740489,
                1.1627561803056961973,
                4.2004672123723823581E-1,
                8.9130862793887234546E-2,
                1.0436767768858021717E-2,
            ],
        );
    }
    // Φ(√(π/2)) + g(1/s_c)/s_c, simplified to a (6,6) rational in s_c
    horner(
        s_c,
        &[
            7.91133825948419359E-1,
            1.24653733210880042,
            1.32747426980537386,
            6.95009705717846778E-1,
            3.05965944268228457E-1,
            6.02200363391352887E-2,
            1.29050244454344842E-2,
        ],
    ) / horner(
        s_c,
        &[
            1.0,
            1.58117486714634672,
            1.60144713247629644,
            8.30040185836882436E-1,
            3.53071863813401531E-1,
            6.95901684131758475E-2,
            1.44197580643890011E-2,
        ],
    )
}

/// Lower map `f(β(s))` and its first two `β`-derivatives at `(x, s)`.
pub(crate) fn lower_map<S: SpecialFunctions>(x: f64, s: f64) -> MapDerivatives {
    let ax = x.abs();
    let z = SQRT_ONE_OVER_THREE * ax / s;
    let y = z * z;
    let s2 = s * s;
    let phi_cdf = 0.5 * S::erfc(ONE_OVER_SQRT_TWO * z);
    let phi_pdf = S::norm_pdf(z);
    let fpp = PI_OVER_SIX * y / (s2 * s)
        * phi_cdf
        * (8.0 * SQRT_THREE * s * ax + (3.0 * s2 * (s2 - 8.0) - 8.0 * x * x) * phi_cdf / phi_pdf)
        * (2.0 * y + 0.25 * s2).exp();
    let phi_cdf2 = phi_cdf * phi_cdf;
    MapDerivatives {
        f: TWO_PI_OVER_SQRT_TWENTY_SEVEN * ax * (phi_cdf2 * phi_cdf),
        fp: TWO_PI * y * phi_cdf2 * (y + 0.125 * s * s).exp(),
        fpp,
    }
}

/// Invert the lower map: the `s` at which it equals `f`.
///
/// The two cube roots are taken separately so that `f ≈ DBL_MIN` with
/// large `|x|` does not underflow.
pub(crate) fn inverse_lower_map<S: SpecialFunctions>(x: f64, f: f64) -> f64 {
    (x / (SQRT_THREE
        * S::inverse_norm_cdf(SQRT_THREE_OVER_THIRD_ROOT_TWO_PI * f.cbrt() / x.abs().cbrt())))
    .abs()
}

/// Upper map `f = Φ(−s/2)` and its first two `β`-derivatives at `(x, s)`.
pub(crate) fn upper_map<S: SpecialFunctions>(x: f64, s: f64) -> MapDerivatives {
    let w = (x / s) * (x / s);
    MapDerivatives {
        f: 0.5 * S::erfc((0.5 * ONE_OVER_SQRT_TWO) * s),
        fp: -0.5 * (0.5 * w).exp(),
        fpp: SQRT_PI_OVER_TWO * (w + 0.125 * s * s).exp() * w / s,
    }
}

/// Invert the upper map: `s = −2·Φ⁻¹(f)`.
#[inline]
pub(crate) fn inverse_upper_map<S: SpecialFunctions>(f: f64) -> f64 {
    -2.0 * S::inverse_norm_cdf(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black::regions::normalised_black;
    use crate::special::{Cody, erfcx};
    use approx::assert_relative_eq;

    struct Critical {
        b_max: f64,
        s_c: f64,
        s_l: f64,
        s_u: f64,
    }

    fn critical(theta_x: f64) -> Critical {
        let sqrt_ax = (-theta_x).sqrt();
        let s_c = std::f64::consts::SQRT_2 * sqrt_ax;
        let ome = one_minus_erfcx::<Cody>(sqrt_ax);
        Critical {
            b_max: (0.5 * theta_x).exp(),
            s_c,
            s_l: s_c - SQRT_PI_OVER_TWO * ome,
            s_u: s_c + SQRT_PI_OVER_TWO * (2.0 - ome),
        }
    }

    // --- 1 − erfcx ---

    #[test]
    fn one_minus_erfcx_matches_direct_difference() {
        for &x in &[-0.5, -0.19, -0.1, 0.05, 0.2, 0.33, 0.4, 2.0] {
            assert_relative_eq!(one_minus_erfcx::<Cody>(x), 1.0 - erfcx(x), max_relative = 1e-14);
        }
    }

    #[test]
    fn one_minus_erfcx_is_linear_near_zero() {
        let x = 1e-12;
        assert_relative_eq!(one_minus_erfcx::<Cody>(x), 1.128379167095512573896 * x, max_relative = 1e-11);
        assert_eq!(one_minus_erfcx::<Cody>(0.0), 0.0);
    }

    // --- bₗ and bᵤ ---

    #[test]
    fn bl_approximation_matches_black_at_sl() {
        // s_c = 0.45, 1.41, 3.16 and 10 hit each of the four pieces
        for &theta_x in &[-0.1, -1.0, -5.0, -50.0] {
            let c = critical(theta_x);
            let direct = normalised_black::<Cody>(theta_x, c.s_l) / c.b_max;
            assert_relative_eq!(bl_over_bmax(c.s_c), direct, max_relative = 1e-13);
        }
    }

    #[test]
    fn bu_approximation_matches_black_at_su() {
        for &theta_x in &[-0.1, -1.0, -5.0, -50.0] {
            let c = critical(theta_x);
            let direct = normalised_black::<Cody>(theta_x, c.s_u) / c.b_max;
            assert_relative_eq!(bu_over_bmax(c.s_c), direct, max_relative = 1e-13);
        }
    }

    #[test]
    fn branch_points_are_ordered() {
        for &theta_x in &[-1e-6, -0.3, -2.0, -30.0, -700.0] {
            let c = critical(theta_x);
            let b_l = bl_over_bmax(c.s_c);
            let b_u = bu_over_bmax(c.s_c);
            let b_c = 0.5 * one_minus_erfcx::<Cody>((-theta_x).sqrt());
            assert!(0.0 < c.s_l && c.s_l < c.s_c && c.s_c < c.s_u);
            assert!(b_l < b_c && b_c < b_u && b_u < 1.0, "θx = {theta_x}");
        }
    }

    // --- Lower and upper maps ---

    #[test]
    fn lower_map_derivatives_match_finite_differences() {
        let (x, s, ds) = (-2.0, 0.8, 1e-5);
        let m = lower_map::<Cody>(x, s);
        let up = lower_map::<Cody>(x, s + ds);
        let down = lower_map::<Cody>(x, s - ds);
        let db = normalised_black::<Cody>(x, s + ds) - normalised_black::<Cody>(x, s - ds);
        assert_relative_eq!((up.f - down.f) / db, m.fp, max_relative = 1e-7);
        assert_relative_eq!((up.fp - down.fp) / db, m.fpp, max_relative = 1e-6);
    }

    #[test]
    fn lower_map_round_trips() {
        for &(x, s) in &[(-0.5, 0.1), (-3.0, 1.0), (-40.0, 3.0)] {
            let m = lower_map::<Cody>(x, s);
            assert_relative_eq!(inverse_lower_map::<Cody>(x, m.f), s, max_relative = 1e-13);
        }
    }

    #[test]
    fn upper_map_derivatives_match_finite_differences() {
        let (x, s, ds) = (-1.5, 4.0, 1e-5);
        let m = upper_map::<Cody>(x, s);
        let up = upper_map::<Cody>(x, s + ds);
        let down = upper_map::<Cody>(x, s - ds);
        let db = normalised_black::<Cody>(x, s + ds) - normalised_black::<Cody>(x, s - ds);
        assert_relative_eq!((up.f - down.f) / db, m.fp, max_relative = 1e-7);
        assert_relative_eq!((up.fp - down.fp) / db, m.fpp, max_relative = 1e-6);
    }

    #[test]
    fn upper_map_round_trips() {
        for &s in &[0.5, 3.0, 20.0] {
            let m = upper_map::<Cody>(-1.0, s);
            assert_relative_eq!(inverse_upper_map::<Cody>(m.f), s, max_relative = 1e-14);
        }
    }
}
