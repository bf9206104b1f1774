//! Core domain types.
//!
//! The raw numerical functions take the option direction as `θ = ±1.0`
//! for compatibility with the usual formulas. The validated interface uses
//! [`OptionType`] instead and returns volatilities wrapped in [`Vol`].
//!
//! # Why no `Eq` or `Ord` on `Vol`?
//! It wraps `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// A Black vol of 0.20 represents 20% annualized volatility; a normal vol
/// is in price units per square root of a year.
///
/// # Examples
/// ```
/// use rationalvol::types::Vol;
/// let vol = Vol(0.20);
/// assert_eq!(vol.0, 0.20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Option type: call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

impl OptionType {
    /// Direction flag `θ`: `+1.0` for a call, `−1.0` for a put.
    ///
    /// # Examples
    /// ```
    /// use rationalvol::types::OptionType;
    /// assert_eq!(OptionType::Put.theta(), -1.0);
    /// ```
    #[inline]
    pub fn theta(self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_signs() {
        assert_eq!(OptionType::Call.theta(), 1.0);
        assert_eq!(OptionType::Put.theta(), -1.0);
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&OptionType::Put).unwrap();
        assert_eq!(json, "\"Put\"");
        let back: OptionType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OptionType::Put);

        let vol: Vol = serde_json::from_str("0.25").unwrap();
        assert_eq!(vol, Vol(0.25));
    }
}
