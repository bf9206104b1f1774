//! Validated Black (lognormal) pricing and implied volatility.
//!
//! Wraps [`crate::black`], which uses Jäckel's "Let's Be Rational" algorithm
//! and reaches full attainable accuracy in at most two iterations.

use crate::black;
use crate::constants::{VOLATILITY_ABOVE_MAXIMUM, VOLATILITY_BELOW_INTRINSIC};
use crate::conventions::intrinsic_value;
use crate::error::VolError;
use crate::special::{Cody, SpecialFunctions};
use crate::types::{OptionType, Vol};
use crate::validate::{validate_non_negative, validate_positive};

/// Undiscounted Black price of a vanilla option.
///
/// # Arguments
/// * `forward`: Forward price at expiry (must be > 0)
/// * `strike`: Strike price (must be > 0)
/// * `vol`: Black volatility (must be >= 0)
/// * `expiry`: Time to expiry in years (must be >= 0)
/// * `option_type`: Call or Put
///
/// # Errors
/// Returns [`VolError::InvalidInput`] for invalid inputs.
///
/// # Examples
/// ```
/// use rationalvol::implied::black_price;
/// use rationalvol::OptionType;
///
/// let call = black_price(100.0, 100.0, 0.2, 1.0, OptionType::Call).unwrap();
/// let put = black_price(100.0, 100.0, 0.2, 1.0, OptionType::Put).unwrap();
/// assert!((call - put).abs() < 1e-12);
/// ```
pub fn black_price(
    forward: f64,
    strike: f64,
    vol: f64,
    expiry: f64,
    option_type: OptionType,
) -> crate::error::Result<f64> {
    validate_positive(forward, "forward")?;
    validate_positive(strike, "strike")?;
    validate_non_negative(vol, "vol")?;
    validate_non_negative(expiry, "expiry")?;
    let price = black::black(forward, strike, vol, expiry, option_type.theta());
    if !price.is_finite() {
        return Err(VolError::NumericalError {
            message: format!("Black price is not finite: {price}"),
        });
    }
    Ok(price)
}

/// Black (lognormal) implied volatility calculator.
///
/// Uses Peter Jäckel's rational initial guess with a Householder
/// refinement for near-machine-precision extraction of Black implied
/// volatility. The iteration budget and update order follow the
/// process-wide knobs in [`crate::config`].
///
/// # References
/// - Jäckel, P. "Let's Be Rational" (2013)
/// - Jäckel, P. "Let's Be Rational" (2024 revision)
pub struct BlackImpliedVol;

impl BlackImpliedVol {
    /// Compute Black implied volatility from an option price.
    ///
    /// # Arguments
    /// * `option_price`: Undiscounted price of the vanilla option (must be >= 0)
    /// * `forward`: Forward price at expiry (must be > 0)
    /// * `strike`: Strike price (must be > 0)
    /// * `expiry`: Time to expiry in years (must be > 0)
    /// * `option_type`: Call or Put
    ///
    /// A price exactly at intrinsic value gives `Vol(0.0)`.
    ///
    /// # Errors
    /// Returns [`VolError::InvalidInput`] for non-positive or non-finite inputs,
    /// [`VolError::PriceBelowIntrinsic`] / [`VolError::PriceAboveMaximum`]
    /// when no volatility reproduces the price.
    ///
    /// # Examples
    /// ```
    /// use rationalvol::implied::{black_price, BlackImpliedVol};
    /// use rationalvol::OptionType;
    ///
    /// let price = black_price(100.0, 90.0, 0.3, 0.5, OptionType::Put).unwrap();
    /// let vol = BlackImpliedVol::compute(price, 100.0, 90.0, 0.5, OptionType::Put).unwrap();
    /// assert!((vol.0 - 0.3).abs() < 1e-13);
    /// ```
    pub fn compute(
        option_price: f64,
        forward: f64,
        strike: f64,
        expiry: f64,
        option_type: OptionType,
    ) -> crate::error::Result<Vol> {
        Self::compute_with::<Cody>(option_price, forward, strike, expiry, option_type)
    }

    /// As [`compute`](Self::compute), with caller-supplied special functions.
    pub fn compute_with<S: SpecialFunctions>(
        option_price: f64,
        forward: f64,
        strike: f64,
        expiry: f64,
        option_type: OptionType,
    ) -> crate::error::Result<Vol> {
        validate_non_negative(option_price, "option_price")?;
        validate_positive(forward, "forward")?;
        validate_positive(strike, "strike")?;
        validate_positive(expiry, "expiry")?;

        let theta = option_type.theta();
        let intrinsic = intrinsic_value(forward, strike, theta);
        let maximum = if theta < 0.0 { strike } else { forward };

        if option_price >= maximum {
            return Err(above_maximum(option_price, maximum));
        }
        if option_price < intrinsic {
            return Err(below_intrinsic(option_price, intrinsic));
        }

        let sigma =
            black::implied_black_volatility_with::<S>(option_price, forward, strike, expiry, theta);
        // -DBL_MAX/√T overflows to -∞ when T < 1
        if sigma == VOLATILITY_BELOW_INTRINSIC || sigma == f64::NEG_INFINITY {
            return Err(below_intrinsic(option_price, intrinsic));
        }
        if sigma == VOLATILITY_ABOVE_MAXIMUM || sigma == f64::INFINITY {
            return Err(above_maximum(option_price, maximum));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(VolError::NumericalError {
                message: format!("implied volatility is not a finite non-negative number: {sigma}"),
            });
        }
        Ok(Vol(sigma))
    }
}

fn below_intrinsic(price: f64, intrinsic: f64) -> VolError {
    #[cfg(feature = "logging")]
    tracing::debug!(price, intrinsic, "price below intrinsic value");
    VolError::PriceBelowIntrinsic { price, intrinsic }
}

fn above_maximum(price: f64, maximum: f64) -> VolError {
    #[cfg(feature = "logging")]
    tracing::debug!(price, maximum, "price at or above attainable maximum");
    VolError::PriceAboveMaximum { price, maximum }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // --- Pricing ---

    #[test]
    fn price_matches_raw_kernel() {
        let p = black_price(100.0, 110.0, 0.25, 1.0, OptionType::Call).unwrap();
        assert_relative_eq!(p, 6.190426413768347, max_relative = 1e-14);
    }

    #[test]
    fn price_zero_vol_is_intrinsic() {
        let p = black_price(100.0, 90.0, 0.0, 1.0, OptionType::Call).unwrap();
        assert_eq!(p, 10.0);
        let p = black_price(100.0, 90.0, 0.3, 0.0, OptionType::Put).unwrap();
        assert_eq!(p, 0.0);
    }

    #[test]
    fn price_rejects_invalid_inputs() {
        assert!(black_price(0.0, 100.0, 0.2, 1.0, OptionType::Call).is_err());
        assert!(black_price(100.0, -1.0, 0.2, 1.0, OptionType::Call).is_err());
        assert!(black_price(100.0, 100.0, -0.2, 1.0, OptionType::Call).is_err());
        assert!(black_price(100.0, 100.0, 0.2, f64::NAN, OptionType::Call).is_err());
    }

    // --- Implied volatility ---

    #[test]
    fn round_trip_call_and_put() {
        for (k, t, vol) in [(80.0, 0.25, 0.15), (100.0, 1.0, 0.2), (130.0, 5.0, 0.6)] {
            for option_type in [OptionType::Call, OptionType::Put] {
                let p = black_price(100.0, k, vol, t, option_type).unwrap();
                let iv = BlackImpliedVol::compute(p, 100.0, k, t, option_type).unwrap();
                assert_relative_eq!(iv.0, vol, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn intrinsic_price_gives_zero_vol() {
        let iv = BlackImpliedVol::compute(10.0, 100.0, 90.0, 1.0, OptionType::Call).unwrap();
        assert_eq!(iv, Vol(0.0));
        let iv = BlackImpliedVol::compute(0.0, 100.0, 110.0, 1.0, OptionType::Call).unwrap();
        assert_eq!(iv, Vol(0.0));
    }

    #[test]
    fn below_intrinsic_is_error() {
        let err = BlackImpliedVol::compute(5.0, 100.0, 90.0, 0.25, OptionType::Call).unwrap_err();
        match err {
            VolError::PriceBelowIntrinsic { price, intrinsic } => {
                assert_eq!(price, 5.0);
                assert_eq!(intrinsic, 10.0);
            }
            other => panic!("wrong variant: {other}"),
        }
    }

    #[test]
    fn above_maximum_is_error() {
        let err = BlackImpliedVol::compute(100.0, 100.0, 110.0, 1.0, OptionType::Call).unwrap_err();
        assert!(matches!(err, VolError::PriceAboveMaximum { maximum, .. } if maximum == 100.0));
        let err = BlackImpliedVol::compute(120.0, 100.0, 110.0, 1.0, OptionType::Put).unwrap_err();
        assert!(matches!(err, VolError::PriceAboveMaximum { maximum, .. } if maximum == 110.0));
    }

    #[test]
    fn rejects_invalid_inputs() {
        for (p, f, k, t) in [
            (-1.0, 100.0, 100.0, 1.0),
            (f64::NAN, 100.0, 100.0, 1.0),
            (5.0, 0.0, 100.0, 1.0),
            (5.0, 100.0, f64::INFINITY, 1.0),
            (5.0, 100.0, 100.0, 0.0),
        ] {
            let err = BlackImpliedVol::compute(p, f, k, t, OptionType::Call).unwrap_err();
            assert!(matches!(err, VolError::InvalidInput { .. }));
        }
    }

    #[test]
    fn generic_variant_agrees() {
        let p = black_price(100.0, 105.0, 0.4, 2.0, OptionType::Call).unwrap();
        let a = BlackImpliedVol::compute(p, 100.0, 105.0, 2.0, OptionType::Call).unwrap();
        let b = BlackImpliedVol::compute_with::<Cody>(p, 100.0, 105.0, 2.0, OptionType::Call).unwrap();
        assert_eq!(a, b);
    }
}
