//! Validated Bachelier (normal) pricing and implied volatility.
//!
//! Used in markets where the normal model is standard (rates, short-dated FX).
//! The Bachelier formula assumes arithmetic (Gaussian) returns rather than lognormal,
//! so forwards and strikes may be zero or negative.
//!
//! # Formula
//! ```text
//! C(F, K, T, σ) = (F - K)·N(d) + σ·√T·n(d)
//! where d = (F - K) / (σ√T)
//! ```

use crate::bachelier;
use crate::constants::VOLATILITY_BELOW_INTRINSIC;
use crate::conventions::intrinsic_value;
use crate::error::VolError;
use crate::special::{Cody, SpecialFunctions};
use crate::types::{OptionType, Vol};
use crate::validate::{validate_finite, validate_non_negative, validate_positive};

/// Bachelier price of a vanilla option.
///
/// # Errors
/// Returns [`VolError::InvalidInput`] for non-finite inputs or a negative
/// volatility or expiry.
///
/// # Examples
/// ```
/// use rationalvol::implied::normal_price;
/// use rationalvol::OptionType;
///
/// let p = normal_price(-0.001, 0.002, 0.01, 1.0, OptionType::Put).unwrap();
/// assert!(p > 0.003);
/// ```
pub fn normal_price(
    forward: f64,
    strike: f64,
    vol: f64,
    expiry: f64,
    option_type: OptionType,
) -> crate::error::Result<f64> {
    validate_finite(forward, "forward")?;
    validate_finite(strike, "strike")?;
    validate_non_negative(vol, "vol")?;
    validate_non_negative(expiry, "expiry")?;
    Ok(bachelier::bachelier(forward, strike, vol, expiry, option_type.theta()))
}

/// Bachelier (normal) implied volatility calculator.
///
/// Inverts the Bachelier formula analytically through the rational
/// approximation of Jäckel's "Implied Normal Volatility" (2017); no
/// iteration is needed.
#[derive(Debug)]
pub struct NormalImpliedVol;

impl NormalImpliedVol {
    /// Compute normal (Bachelier) implied volatility from an option price.
    ///
    /// # Arguments
    /// * `option_price`: Price of the vanilla option (must be >= 0)
    /// * `forward`: Forward price at expiry (any finite value)
    /// * `strike`: Strike price (any finite value)
    /// * `expiry`: Time to expiry in years (must be > 0)
    /// * `option_type`: Call or Put
    ///
    /// # Errors
    /// Returns [`VolError::InvalidInput`] for invalid inputs,
    /// [`VolError::PriceBelowIntrinsic`] when the price is below intrinsic value.
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
        validate_finite(forward, "forward")?;
        validate_finite(strike, "strike")?;
        validate_positive(expiry, "expiry")?;

        let theta = option_type.theta();
        let sigma =
            bachelier::implied_normal_volatility_with::<S>(option_price, forward, strike, expiry, theta);
        if sigma == VOLATILITY_BELOW_INTRINSIC {
            let intrinsic = intrinsic_value(forward, strike, theta);
            #[cfg(feature = "logging")]
            tracing::debug!(price = option_price, intrinsic, "price below intrinsic value");
            return Err(VolError::PriceBelowIntrinsic {
                price: option_price,
                intrinsic,
            });
        }
        if !sigma.is_finite() {
            return Err(VolError::NumericalError {
                message: format!("normal implied volatility is not finite: {sigma}"),
            });
        }
        Ok(Vol(sigma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn price_reference_value() {
        let p = normal_price(100.0, 110.0, 16.0, 1.0, OptionType::Call).unwrap();
        assert_relative_eq!(p, 2.5907202063189952, max_relative = 1e-14);
    }

    #[test]
    fn round_trip_negative_rates() {
        for (f, k) in [(-0.002, 0.001), (0.01, 0.01), (0.02, 0.005)] {
            for option_type in [OptionType::Call, OptionType::Put] {
                let p = normal_price(f, k, 0.008, 2.0, option_type).unwrap();
                let iv = NormalImpliedVol::compute(p, f, k, 2.0, option_type).unwrap();
                assert_relative_eq!(iv.0, 0.008, max_relative = 1e-10);
            }
        }
    }

    #[test]
    fn intrinsic_gives_zero() {
        let iv = NormalImpliedVol::compute(10.0, 100.0, 90.0, 1.0, OptionType::Call).unwrap();
        assert_eq!(iv, Vol(0.0));
    }

    #[test]
    fn below_intrinsic_is_error() {
        let err = NormalImpliedVol::compute(1.0, 100.0, 90.0, 1.0, OptionType::Call).unwrap_err();
        assert!(matches!(err, VolError::PriceBelowIntrinsic { intrinsic, .. } if intrinsic == 10.0));
    }

    #[test]
    fn generic_variant_agrees() {
        let p = normal_price(0.015, 0.02, 0.006, 3.0, OptionType::Put).unwrap();
        let a = NormalImpliedVol::compute(p, 0.015, 0.02, 3.0, OptionType::Put).unwrap();
        let b = NormalImpliedVol::compute_with::<Cody>(p, 0.015, 0.02, 3.0, OptionType::Put).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert!(NormalImpliedVol::compute(1.0, 100.0, 90.0, 0.0, OptionType::Call).is_err());
        assert!(NormalImpliedVol::compute(-1.0, 100.0, 90.0, 1.0, OptionType::Call).is_err());
        assert!(NormalImpliedVol::compute(1.0, f64::NAN, 90.0, 1.0, OptionType::Call).is_err());
        assert!(normal_price(100.0, 90.0, -1.0, 1.0, OptionType::Call).is_err());
    }
}
