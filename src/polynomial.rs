//! Polynomial evaluation shared by the rational approximations.
//!
//! With the `fma` feature every Horner step is a fused multiply-add with a
//! single rounding. Without it the steps are a plain multiply then add, and
//! the results are bit-identical to the nested `c₀ + x·(c₁ + x·(…))` form.

/// `x·a + b`.
#[inline(always)]
pub(crate) fn mul_add(x: f64, a: f64, b: f64) -> f64 {
    #[cfg(feature = "fma")]
    {
        x.mul_add(a, b)
    }
    #[cfg(not(feature = "fma"))]
    {
        x * a + b
    }
}

/// `c[0] + x·(c[1] + x·(c[2] + … + x·c[n]))`, lowest order first.
#[inline(always)]
pub(crate) fn horner(x: f64, coefficients: &[f64]) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| mul_add(acc, x, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mul_add_is_exact_on_small_integers() {
        assert_eq!(mul_add(2.0, 3.0, 1.0), 7.0);
        assert_eq!(mul_add(-4.0, 0.5, 2.0), 0.0);
    }

    #[test]
    fn horner_matches_nested_form() {
        let c = [1.5, -2.0, 0.25, 3.0];
        for &x in &[-1.3, 0.0, 0.7, 12.0] {
            let nested = c[0] + x * (c[1] + x * (c[2] + x * c[3]));
            assert_relative_eq!(horner(x, &c), nested, max_relative = 1e-15);
        }
    }

    #[test]
    fn horner_degenerate_lengths() {
        assert_eq!(horner(3.0, &[]), 0.0);
        assert_eq!(horner(3.0, &[2.5]), 2.5);
        assert!(horner(f64::NAN, &[1.0, 1.0]).is_nan());
    }

    #[cfg(not(feature = "fma"))]
    #[test]
    fn unfused_steps_round_twice() {
        // 1 + 2⁻³⁰ squared: the 2⁻⁶⁰ term is lost by a separate multiply
        let a = 1.0 + f64::powi(2.0, -30);
        let b = -(1.0 + f64::powi(2.0, -29));
        assert_eq!(mul_add(a, a, b), 0.0);
    }

    #[cfg(feature = "fma")]
    #[test]
    fn fused_steps_round_once() {
        let a = 1.0 + f64::powi(2.0, -30);
        let b = -(1.0 + f64::powi(2.0, -29));
        assert_eq!(mul_add(a, a, b), f64::powi(2.0, -60));
    }
}
